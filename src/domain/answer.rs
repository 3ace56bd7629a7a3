#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

/// Text of a single PDF page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub page_index: usize,
    pub text: String,
}

impl PageRecord {
    pub fn new(page_index: usize, text: String) -> Self {
        Self { page_index, text }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

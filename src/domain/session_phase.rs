use std::fmt;

use serde::Serialize;

/// Externally visible phase of the question-answering session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    DocumentLoading,
    DocumentReady,
    Querying,
    AnswerReady,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DocumentLoading => "document_loading",
            Self::DocumentReady => "document_ready",
            Self::Querying => "querying",
            Self::AnswerReady => "answer_ready",
        }
    }

    pub fn accepts_queries(&self) -> bool {
        matches!(self, Self::DocumentReady | Self::AnswerReady)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::DocumentLoading | Self::Querying)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

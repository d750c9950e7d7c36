use thiserror::Error;

use crate::speech::SpeechCheckType;

/// A configured tag pattern that could not be compiled.
#[derive(Debug, Error)]
#[error("invalid {kind} tag pattern '{pattern}': {source}")]
pub struct PatternError {
    pub kind: SpeechCheckType,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A display format string that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),
    #[error("unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
    #[error("invalid placeholder '{{{0}}}'")]
    InvalidPlaceholder(String),
    #[error("placeholder index {index} out of range ({count} arguments)")]
    IndexOutOfRange { index: usize, count: usize },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The render tree violates a structural rule the walker depends on.
    /// Fatal: the render is aborted and no output is surfaced.
    #[error("Malformed render tree: {0}")]
    MalformedTree(String),

    /// The syntax highlighter could not tokenize a code block.
    /// Recovered locally by rendering the block without highlighting.
    #[error("Highlight error: {0}")]
    Highlight(String),
}

impl Error {
    pub fn malformed_tree(message: impl Into<String>) -> Self {
        Self::MalformedTree(message.into())
    }

    pub fn highlight(message: impl Into<String>) -> Self {
        Self::Highlight(message.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Highlight(_))
    }
}

impl From<syntect::Error> for Error {
    fn from(err: syntect::Error) -> Self {
        Error::Highlight(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed_tree("table cell outside of a table");
        assert!(err.to_string().contains("Malformed render tree"));
        assert!(err.to_string().contains("table cell"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::highlight("bad token").is_recoverable());
        assert!(!Error::malformed_tree("heading level 9").is_recoverable());
    }
}

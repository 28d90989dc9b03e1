use std::fmt;

use thiserror::Error;

/// Conditions that abort processing of a single file. The file is left
/// untouched when any of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("line {line}: no Javadoc block found above {declaration}")]
    CommentNotFound { line: usize, declaration: String },

    #[error("line {line}: Javadoc above {declaration} does not match the parsed comment")]
    CommentMismatch { line: usize, declaration: String },

    #[error("line {line} of {declaration} is outside the file ({total} lines)")]
    LineOutOfRange {
        line: usize,
        declaration: String,
        total: usize,
    },

    #[error("edits for lines {first} and {second} overlap")]
    OverlappingEdit { first: usize, second: usize },
}

/// A non-fatal finding recorded while reconciling one declaration: a
/// dropped tag, a duplicate key, a tag whose text could not be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub line: usize,
    pub declaration: String,
    pub tag: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(line: usize, declaration: &str, tag: Option<&str>, message: impl Into<String>) -> Self {
        Issue {
            line,
            declaration: declaration.to_string(),
            tag: tag.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(
                f,
                "line {}: {} (@{}): {}",
                self.line, self.declaration, tag, self.message
            ),
            None => write!(f, "line {}: {}: {}", self.line, self.declaration, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_with_tag() {
        let issue = Issue::new(12, "pkg.Foo#run()", Some("param"), "Fixed unknown param 'x'");
        assert_eq!(
            issue.to_string(),
            "line 12: pkg.Foo#run() (@param): Fixed unknown param 'x'"
        );
    }

    #[test]
    fn error_display() {
        let err = FixError::CommentNotFound {
            line: 4,
            declaration: "pkg.Foo".into(),
        };
        assert_eq!(err.to_string(), "line 4: no Javadoc block found above pkg.Foo");
    }
}

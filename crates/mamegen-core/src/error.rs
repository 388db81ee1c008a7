use thiserror::Error;

/// Error kinds exposed at the mamegen boundary.
///
/// Parse-time errors carry the 1-based source line (and column for raw
/// syntax violations); generation errors carry only a message.
#[derive(Debug, Error)]
pub enum DslError {
    /// Raw syntax violation: forbidden symbol, multiple rules on one line,
    /// open range, unquoted reference label, stray tokens.
    #[error("[line {line}:{column}] syntax error: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// Invalid or inconsistent rule specification.
    #[error("[line {line}] invalid rule: {message}")]
    InvalidRule { line: usize, message: String },
    /// A selector or rule refers to a column not present in HEADER.
    #[error("[line {line}] unknown column: {message}")]
    UnknownColumn { line: usize, message: String },
    /// A rule refers to a reference table that was never defined.
    #[error("[line {line}] unknown reference: {message}")]
    UnknownReference { line: usize, message: String },
    /// Unrecoverable state while producing rows.
    #[error("generation error: {message}")]
    Generation { message: String },
}

impl DslError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        DslError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn invalid_rule(line: usize, message: impl Into<String>) -> Self {
        DslError::InvalidRule {
            line,
            message: message.into(),
        }
    }

    pub fn unknown_column(line: usize, message: impl Into<String>) -> Self {
        DslError::UnknownColumn {
            line,
            message: message.into(),
        }
    }

    pub fn unknown_reference(line: usize, message: impl Into<String>) -> Self {
        DslError::UnknownReference {
            line,
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        DslError::Generation {
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by mamegen crates.
pub type Result<T> = std::result::Result<T, DslError>;

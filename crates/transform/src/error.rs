//! Evaluation error types
//!
//! Errors produced while parsing or evaluating a rule condition. They are
//! never fatal to routing: a failing condition is treated as "no match".

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors that can occur during condition evaluation
///
/// `Clone` so that a failed parse can be cached and replayed for every
/// point that hits the same condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Expression text could not be parsed
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// Byte offset into the expression
        position: usize,
        /// What went wrong
        message: String,
    },

    /// Expression references a name the point does not carry
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// Operator applied to operands of the wrong type
    #[error("type mismatch: cannot apply '{operator}' to {left} and {right}")]
    TypeMismatch {
        /// Operator symbol
        operator: &'static str,
        /// Left operand type (or the single operand type for unary operators)
        left: &'static str,
        /// Right operand type
        right: &'static str,
    },

    /// Expression evaluated to something other than a boolean
    #[error("condition must evaluate to a boolean, got {0}")]
    NotBoolean(&'static str),

    /// Regex pattern failed to compile
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern
        pattern: String,
        /// Compiler message
        message: String,
    },
}

impl EvalError {
    /// Create a parse error
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(operator: &'static str, left: &'static str, right: &'static str) -> Self {
        Self::TypeMismatch {
            operator,
            left,
            right,
        }
    }

    /// Create an invalid regex error
    pub fn invalid_regex(pattern: impl Into<String>, err: &regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for evaluation
pub type EvalResult<T> = std::result::Result<T, EvalError>;

//! Error types for IR lowering.
//!
//! Each semantic failure is a variant whose `Display` text is the
//! diagnostic the driver prints. Variants carry the offending name or
//! operator so tests can assert on more than the message.

use inkwell::builder::BuilderError;
use thiserror::Error;

/// Error type for AST-to-IR lowering.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A variable reference did not resolve to a live binding.
    #[error("Unknown variable name")]
    UnknownVariable(String),

    /// A call referenced a function the module does not contain.
    #[error("Unknown function referenced")]
    UnknownFunction(String),

    /// A call's argument count does not match the callee's arity.
    #[error("Incorrect # arguments passed")]
    ArityMismatch {
        name: String,
        expected: u32,
        found: usize,
    },

    /// A definition named a function that already has a body.
    #[error("Function cannot be redefined")]
    Redefinition(String),

    /// A binary operator with no lowering rule.
    #[error("invalid binary operator")]
    InvalidBinaryOperator(char),

    /// A unary operator; none are defined yet.
    #[error("invalid unary operator")]
    InvalidUnaryOperator(char),

    /// The left side of `=` was not a variable reference.
    #[error("destination of '=' must be a variable")]
    InvalidAssignment,

    /// The IR builder rejected an instruction.
    #[error("LLVM builder error: {0}")]
    Builder(#[from] BuilderError),

    /// The debug-info builder rejected a request.
    #[error("debug info error: {0}")]
    DebugInfo(String),

    /// A completed function failed IR verification.
    #[error("generated function '{0}' failed verification")]
    Verify(String),

    /// A bookkeeping invariant broke; indicates a bug in lowering.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for lowering operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_diagnostics() {
        assert_eq!(
            CodegenError::UnknownVariable("x".into()).to_string(),
            "Unknown variable name"
        );
        assert_eq!(
            CodegenError::UnknownFunction("f".into()).to_string(),
            "Unknown function referenced"
        );
        assert_eq!(
            CodegenError::ArityMismatch {
                name: "f".into(),
                expected: 1,
                found: 2
            }
            .to_string(),
            "Incorrect # arguments passed"
        );
        assert_eq!(
            CodegenError::Redefinition("f".into()).to_string(),
            "Function cannot be redefined"
        );
        assert_eq!(
            CodegenError::InvalidBinaryOperator('|').to_string(),
            "invalid binary operator"
        );
        assert_eq!(
            CodegenError::InvalidUnaryOperator('-').to_string(),
            "invalid unary operator"
        );
    }
}

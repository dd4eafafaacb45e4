use std::fmt;

/// Errors raised across the VM boundary.
///
/// Both variants are fatal to the VM call in progress: there is no local
/// recovery inside the handle layer, and they propagate by `Result` to
/// whatever boundary the embedding host installs. Every other handle
/// operation is infallible under the stack-balance invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The dynamic value cannot satisfy the requested native type.
    ConversionMismatch {
        actual: &'static str,
        expected: &'static str,
    },
    /// A specialized handle was constructed from a stack value of the
    /// wrong VM type.
    ConstructionMismatch {
        actual: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::ConversionMismatch { actual, expected } => {
                write!(f, "cannot convert {} to {}", actual, expected)
            }
            RuntimeError::ConstructionMismatch { actual, expected } => {
                write!(f, "expected {} on the stack, found {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_both_type_names() {
        let err = RuntimeError::ConversionMismatch {
            actual: "string",
            expected: "integer",
        };
        assert_eq!(err.to_string(), "cannot convert string to integer");

        let err = RuntimeError::ConstructionMismatch {
            actual: "integer",
            expected: "table",
        };
        assert_eq!(err.to_string(), "expected table on the stack, found integer");
    }
}

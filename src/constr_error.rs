/// Constraint construction errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintError
{
    /// Found a NaN or infinite value at the flat index of the input slice.
    NonFinite {
        /// Flat index into the input slice.
        index: usize,
    },
    /// Slice length incompatible with the dimension.
    DimMismatch {
        /// Expected length, or the dimension the length must be a multiple of.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// Bound `max_M` is not a finite positive number.
    InvalidBound,
    /// Variable handle out of the problem size.
    VarOutOfRange {
        /// Index of the variable.
        index: usize,
        /// Number of variables of the problem.
        n: usize,
    },
}

impl core::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            ConstraintError::NonFinite { index } =>
                write!(f, "NonFinite: non-finite value at index {}", index),
            ConstraintError::DimMismatch { expected, actual } =>
                write!(f, "DimMismatch: length {} does not fit dimension {}", actual, expected),
            ConstraintError::InvalidBound =>
                write!(f, "InvalidBound: max_M must be finite and positive"),
            ConstraintError::VarOutOfRange { index, n } =>
                write!(f, "VarOutOfRange: variable {} out of {} variables", index, n),
        }
    }
}

impl std::error::Error for ConstraintError {}

//

#[test]
fn test_constr_error_display()
{
    let e = ConstraintError::DimMismatch { expected: 9, actual: 8 };
    assert_eq!(e.to_string(), "DimMismatch: length 8 does not fit dimension 9");

    let e = ConstraintError::NonFinite { index: 7 };
    assert_eq!(e.to_string(), "NonFinite: non-finite value at index 7");
}

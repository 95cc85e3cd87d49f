use std::error::Error as StdError;
use std::fmt;

/// Shape of a matrix as `(rows, cols)`.
pub type Shape = (usize, usize);

pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations reported by the matrix and network operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad range or scalar argument, e.g. `low > high` or a non-positive learning rate.
    InvalidArgument(String),

    /// Elementwise operands, input vectors or target vectors of the wrong shape.
    DimensionMismatch { expected: Shape, found: Shape },

    /// Matrix product where the left column count differs from the right row count.
    IncompatibleShape { left: Shape, right: Shape },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Error::DimensionMismatch { expected, found } => write!(
                f,
                "Dimension mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            Error::IncompatibleShape { left, right } => write!(
                f,
                "Incompatible shapes for matrix product: {}x{} cannot multiply {}x{}",
                left.0, left.1, right.0, right.1
            ),
        }
    }
}

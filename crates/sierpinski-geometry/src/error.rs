use std::fmt;

/// Error raised when a mesh cannot be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Requested depth is zero or exceeds the supported maximum.
    DepthOutOfRange { depth: usize, max: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::DepthOutOfRange { depth, max } => {
                write!(f, "sierpinski depth {depth} out of range (expected 1..={max})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

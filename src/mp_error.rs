use std::{error, fmt};

/// Unified error type
///
/// Everything the pipeline can refuse is reported through this type. Numeric
/// degeneracies found while deriving angular velocity are not errors and
/// never show up here, see `velocity`.
///
/// None of these are transient. Every operation in the crate is deterministic
/// so retrying with the same input gives the same error.
#[derive(Debug)]
pub enum MpError {
    SourceUnavailable(String),
    EmptySource,
    InvalidJointIndex(usize),
    BrokenAncestorChain(usize),
    InsufficientFrames(usize),
    IndexOutOfRange(usize),
    DimensionMismatch { expected: usize, actual: usize },
    UnknownJoint(String),
    DuplicateJoint(String),
    SerdeYamlError(Box<serde_yaml::Error>),
    StdIoError(std::io::Error),
}

impl error::Error for MpError {}

impl fmt::Display for MpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SourceUnavailable(s) => {
                write!(f, "animation source unavailable: {s}")
            }
            Self::EmptySource => write!(f, "animation source has no curves"),
            Self::InvalidJointIndex(a) => {
                write!(f, "joint index {a} is outside the skeleton")
            }
            Self::BrokenAncestorChain(a) => {
                write!(f, "ancestor chain for joint {a} is broken")
            }
            Self::InsufficientFrames(a) => {
                write!(f, "{a} frames is not enough, more than 2 are needed")
            }
            Self::IndexOutOfRange(a) => {
                write!(f, "frame index {a} is out of range")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch, expected {expected} got {actual}")
            }
            Self::UnknownJoint(s) => write!(f, "no joint named '{s}'"),
            Self::DuplicateJoint(s) => {
                write!(f, "joint '{s}' appears more than once")
            }
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
        }
    }
}

impl From<serde_yaml::Error> for MpError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for MpError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::MpError;

    #[test]
    fn display() {
        let e = MpError::DimensionMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(e.to_string(), "dimension mismatch, expected 4 got 3");
        let e = MpError::InsufficientFrames(2);
        assert!(e.to_string().starts_with("2 frames"));
    }

    #[test]
    fn from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: MpError = io.into();
        assert!(matches!(e, MpError::StdIoError(_)));
    }
}

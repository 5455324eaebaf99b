//! Bytecode-weaver error types
//!
//! Weave failures are per-class and non-halting: one malformed or
//! unreadable class file never stops a `weave_directory` pass over the
//! rest of the tree, it is reported as a `WeaveResult::Error` carrying one
//! of these.

use std::fmt;

/// An error raised while weaving a single class file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeaveError {
    /// The input bytes are not a valid class file (bad magic, truncated,
    /// or a malformed constant pool entry)
    MalformedClassFile {
        /// Description of what was malformed
        reason: String,
    },
    /// The class file declares a major version this weaver does not support
    UnsupportedVersion {
        /// The major version found
        major: u16,
    },
    /// A referenced constant pool index was out of range
    InvalidConstantPoolIndex {
        /// The index that was referenced
        index: u16,
    },
}

impl fmt::Display for WeaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeaveError::MalformedClassFile { reason } => {
                write!(f, "malformed class file: {reason}")
            }
            WeaveError::UnsupportedVersion { major } => {
                write!(f, "unsupported class file major version {major}")
            }
            WeaveError::InvalidConstantPoolIndex { index } => {
                write!(f, "constant pool index {index} out of range")
            }
        }
    }
}

impl std::error::Error for WeaveError {}

impl WeaveError {
    /// Creates a malformed-class-file error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedClassFile {
            reason: reason.into(),
        }
    }

    /// Creates an unsupported-version error
    pub fn unsupported_version(major: u16) -> Self {
        Self::UnsupportedVersion { major }
    }

    /// Creates an invalid-constant-pool-index error
    pub fn invalid_constant_pool_index(index: u16) -> Self {
        Self::InvalidConstantPoolIndex { index }
    }
}

/// Result type for class-file parsing and weaving
pub type WeaveResult<T> = Result<T, WeaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display() {
        let error = WeaveError::malformed("bad magic number");
        assert_eq!(error.to_string(), "malformed class file: bad magic number");
    }

    #[test]
    fn unsupported_version_display() {
        let error = WeaveError::unsupported_version(70);
        assert_eq!(
            error.to_string(),
            "unsupported class file major version 70"
        );
    }

    #[test]
    fn invalid_constant_pool_index_display() {
        let error = WeaveError::invalid_constant_pool_index(99);
        assert_eq!(error.to_string(), "constant pool index 99 out of range");
    }
}

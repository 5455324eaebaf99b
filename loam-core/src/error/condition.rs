//! Conditional-registration error types
//!
//! Condition evaluation is recoverable by design: a failing condition never
//! aborts boot, it excludes the component and records why. `ConditionError`
//! exists so evaluators have a typed failure to return before the caller
//! turns it into an `Excluded` record.

use std::fmt;

/// An error raised while evaluating a single condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// The named property was required but not present
    PropertyMissing {
        /// The property name that was looked up
        property: String,
    },
    /// The environment source could not be queried
    EnvironmentUnavailable {
        /// Reason the environment source failed
        reason: String,
    },
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionError::PropertyMissing { property } => {
                write!(f, "property '{property}' is required by a condition but missing")
            }
            ConditionError::EnvironmentUnavailable { reason } => {
                write!(f, "environment source unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ConditionError {}

impl ConditionError {
    /// Creates a property-missing error
    pub fn property_missing(property: impl Into<String>) -> Self {
        Self::PropertyMissing {
            property: property.into(),
        }
    }

    /// Creates an environment-unavailable error
    pub fn environment_unavailable(reason: impl Into<String>) -> Self {
        Self::EnvironmentUnavailable {
            reason: reason.into(),
        }
    }
}

/// Result type for condition evaluation
pub type ConditionResult<T> = Result<T, ConditionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_missing_display() {
        let error = ConditionError::property_missing("feature.flag");
        assert_eq!(
            error.to_string(),
            "property 'feature.flag' is required by a condition but missing"
        );
    }

    #[test]
    fn environment_unavailable_display() {
        let error = ConditionError::environment_unavailable("not booted yet");
        assert_eq!(
            error.to_string(),
            "environment source unavailable: not booted yet"
        );
    }
}

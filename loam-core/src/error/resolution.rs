//! Dependency-resolution error types
//!
//! This module defines the errors produced while building the dependency
//! graph and resolving injection points, before any component is created.

use std::fmt;

/// Errors produced by the dependency graph resolver
///
/// `ResolutionError` represents the fatal conditions the resolver can detect
/// while building the component graph: a dependency with no matching
/// producer, more than one producer with no way to disambiguate, a cycle
/// with no `Provider`/`Optional` edge to break it, or more than one
/// component marked primary for the same type.
///
/// # Examples
///
/// ```rust
/// use loam_core::error::resolution::ResolutionError;
///
/// let error = ResolutionError::unsatisfied_dependency("Engine", "Logger");
/// assert!(matches!(error, ResolutionError::UnsatisfiedDependency { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No component satisfies a required injection point
    UnsatisfiedDependency {
        /// The component that could not be constructed
        component: String,
        /// The requested dependency type name
        requested: String,
    },
    /// More than one candidate satisfies a required injection point and
    /// none is marked primary
    AmbiguousDependency {
        /// The component that could not be constructed
        component: String,
        /// The requested dependency type name
        requested: String,
        /// The candidate component names found
        candidates: Vec<String>,
    },
    /// A dependency cycle exists with no `Provider`/`Optional` edge to break it
    DependencyCycle {
        /// The components involved in the cycle, in discovery order
        cycle: Vec<String>,
    },
    /// More than one component is marked primary for the same type
    MultiplePrimary {
        /// The requested type name
        requested: String,
        /// The component names marked primary
        candidates: Vec<String>,
    },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::UnsatisfiedDependency {
                component,
                requested,
            } => write!(
                f,
                "component '{component}' requires '{requested}', but no component satisfies it"
            ),
            ResolutionError::AmbiguousDependency {
                component,
                requested,
                candidates,
            } => write!(
                f,
                "component '{component}' requires '{requested}', but {} candidates were found ({}) and none is primary",
                candidates.len(),
                candidates.join(", ")
            ),
            ResolutionError::DependencyCycle { cycle } => {
                write!(f, "dependency cycle detected: {}", cycle.join(" -> "))
            }
            ResolutionError::MultiplePrimary {
                requested,
                candidates,
            } => write!(
                f,
                "multiple primary components for '{requested}': {}",
                candidates.join(", ")
            ),
        }
    }
}

impl std::error::Error for ResolutionError {}

impl ResolutionError {
    /// Creates an unsatisfied-dependency error
    pub fn unsatisfied_dependency(component: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::UnsatisfiedDependency {
            component: component.into(),
            requested: requested.into(),
        }
    }

    /// Creates an ambiguous-dependency error
    pub fn ambiguous_dependency(
        component: impl Into<String>,
        requested: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self::AmbiguousDependency {
            component: component.into(),
            requested: requested.into(),
            candidates,
        }
    }

    /// Creates a dependency-cycle error
    pub fn dependency_cycle(cycle: Vec<String>) -> Self {
        Self::DependencyCycle { cycle }
    }

    /// Creates a multiple-primary error
    pub fn multiple_primary(requested: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::MultiplePrimary {
            requested: requested.into(),
            candidates,
        }
    }
}

/// Result type for resolution operations
pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfied_dependency_display() {
        let error = ResolutionError::unsatisfied_dependency("Engine", "Logger");
        assert_eq!(
            error.to_string(),
            "component 'Engine' requires 'Logger', but no component satisfies it"
        );
    }

    #[test]
    fn ambiguous_dependency_display() {
        let error = ResolutionError::ambiguous_dependency(
            "Engine",
            "Logger",
            vec!["FileLogger".into(), "ConsoleLogger".into()],
        );
        assert_eq!(
            error.to_string(),
            "component 'Engine' requires 'Logger', but 2 candidates were found (FileLogger, ConsoleLogger) and none is primary"
        );
    }

    #[test]
    fn dependency_cycle_display() {
        let error = ResolutionError::dependency_cycle(vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(error.to_string(), "dependency cycle detected: A -> B -> A");
    }

    #[test]
    fn multiple_primary_display() {
        let error = ResolutionError::multiple_primary("Logger", vec!["A".into(), "B".into()]);
        assert_eq!(
            error.to_string(),
            "multiple primary components for 'Logger': A, B"
        );
    }
}

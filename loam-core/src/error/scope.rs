//! Scope-engine error types

use std::fmt;

/// Errors raised by scope implementations
///
/// # Examples
///
/// ```rust
/// use loam_core::error::scope::ScopeError;
///
/// let error = ScopeError::no_request_context("RequestLogger");
/// assert!(matches!(error, ScopeError::NoRequestContext { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A request-scoped component was requested outside a request
    NoRequestContext {
        /// The component that was requested
        component: String,
    },
    /// A session-scoped component was requested outside a session
    NoSessionContext {
        /// The component that was requested
        component: String,
    },
    /// The session the component belonged to has expired
    SessionExpired {
        /// The session identifier
        session_id: String,
    },
    /// The scope's bean-per-scope-instance cap was exceeded
    ScopeBeanLimitExceeded {
        /// The scope name (e.g. "request", "session")
        scope: String,
        /// The configured limit
        limit: usize,
    },
    /// No scope is registered under the requested name
    NoSuchScope {
        /// The scope id that was requested
        scope_id: String,
    },
    /// The wrapped `create` closure failed while a scope was populating a key
    CreationFailed {
        /// The component that failed to construct
        component: String,
        /// The underlying failure
        reason: String,
    },
    /// More than one component satisfies a direct `Container` lookup and
    /// none is marked primary (or a qualifier matched more than one)
    AmbiguousComponent {
        /// The requested type name
        requested: String,
        /// The candidate component names found
        candidates: Vec<String>,
    },
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::NoRequestContext { component } => {
                write!(f, "no active request context to resolve '{component}'")
            }
            ScopeError::NoSessionContext { component } => {
                write!(f, "no active session context to resolve '{component}'")
            }
            ScopeError::SessionExpired { session_id } => {
                write!(f, "session '{session_id}' has expired")
            }
            ScopeError::ScopeBeanLimitExceeded { scope, limit } => {
                write!(f, "scope '{scope}' exceeded its limit of {limit} components")
            }
            ScopeError::NoSuchScope { scope_id } => {
                write!(f, "no scope registered under id '{scope_id}'")
            }
            ScopeError::CreationFailed { component, reason } => {
                write!(f, "failed to construct '{component}': {reason}")
            }
            ScopeError::AmbiguousComponent {
                requested,
                candidates,
            } => write!(
                f,
                "'{requested}' has {} candidates ({}) and none is primary",
                candidates.len(),
                candidates.join(", ")
            ),
        }
    }
}

impl std::error::Error for ScopeError {}

impl ScopeError {
    /// Creates a no-request-context error
    pub fn no_request_context(component: impl Into<String>) -> Self {
        Self::NoRequestContext {
            component: component.into(),
        }
    }

    /// Creates a no-session-context error
    pub fn no_session_context(component: impl Into<String>) -> Self {
        Self::NoSessionContext {
            component: component.into(),
        }
    }

    /// Creates a session-expired error
    pub fn session_expired(session_id: impl Into<String>) -> Self {
        Self::SessionExpired {
            session_id: session_id.into(),
        }
    }

    /// Creates a scope-bean-limit-exceeded error
    pub fn scope_bean_limit_exceeded(scope: impl Into<String>, limit: usize) -> Self {
        Self::ScopeBeanLimitExceeded {
            scope: scope.into(),
            limit,
        }
    }

    /// Creates a no-such-scope error
    pub fn no_such_scope(scope_id: impl Into<String>) -> Self {
        Self::NoSuchScope {
            scope_id: scope_id.into(),
        }
    }

    /// Creates a creation-failed error
    pub fn creation_failed(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Creates an ambiguous-component error
    pub fn ambiguous_component(requested: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousComponent {
            requested: requested.into(),
            candidates,
        }
    }
}

/// Result type for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_request_context_display() {
        let error = ScopeError::no_request_context("RequestLogger");
        assert_eq!(
            error.to_string(),
            "no active request context to resolve 'RequestLogger'"
        );
    }

    #[test]
    fn session_expired_display() {
        let error = ScopeError::session_expired("sess-42");
        assert_eq!(error.to_string(), "session 'sess-42' has expired");
    }

    #[test]
    fn scope_bean_limit_exceeded_display() {
        let error = ScopeError::scope_bean_limit_exceeded("request", 1000);
        assert_eq!(
            error.to_string(),
            "scope 'request' exceeded its limit of 1000 components"
        );
    }

    #[test]
    fn no_such_scope_display() {
        let error = ScopeError::no_such_scope("tenant");
        assert_eq!(error.to_string(), "no scope registered under id 'tenant'");
    }

    #[test]
    fn ambiguous_component_display() {
        let error =
            ScopeError::ambiguous_component("EmailService", vec!["Smtp".into(), "Sms".into()]);
        assert_eq!(
            error.to_string(),
            "'EmailService' has 2 candidates (Smtp, Sms) and none is primary"
        );
    }
}

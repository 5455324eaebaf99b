//! Lifecycle-phase error types

use std::fmt;

/// The lifecycle phase during which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Running `@PostConstruct`/`@PostInitialize` callbacks during `refresh`
    PostConstruct,
    /// Running `@OnStart`/smart-lifecycle `start` callbacks during `start`
    Start,
    /// Running `@OnStop`/smart-lifecycle `stop` callbacks during `stop`
    Stop,
    /// Running `@PreDestroy` callbacks during `destroy`
    PreDestroy,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::PostConstruct => write!(f, "post-construct"),
            LifecyclePhase::Start => write!(f, "start"),
            LifecyclePhase::Stop => write!(f, "stop"),
            LifecyclePhase::PreDestroy => write!(f, "pre-destroy"),
        }
    }
}

/// An error raised while running a lifecycle callback
///
/// # Examples
///
/// ```rust
/// use loam_core::error::lifecycle::{LifecycleError, LifecyclePhase};
///
/// let error = LifecycleError::new(LifecyclePhase::PostConstruct, "Cache", "failed to warm up");
/// assert_eq!(error.phase, LifecyclePhase::PostConstruct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleError {
    /// The phase the failing callback ran in
    pub phase: LifecyclePhase,
    /// The component whose callback failed
    pub component: String,
    /// A human-readable description of the failure
    pub message: String,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} callback on '{}' failed: {}",
            self.phase, self.component, self.message
        )
    }
}

impl std::error::Error for LifecycleError {}

impl LifecycleError {
    /// Creates a new lifecycle error
    pub fn new(
        phase: LifecyclePhase,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Result type for lifecycle callbacks
pub type LifecycleResult<T> = Result<T, LifecycleError>;

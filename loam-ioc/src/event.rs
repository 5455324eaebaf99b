//! Container lifecycle event system
//!
//! Observability hook for the boot and phase-transition sequence: every
//! phase the container moves through publishes one of these events to
//! whatever listeners are registered via `inventory`.

use crate::container::Container;
use std::any::TypeId;
use std::time::Duration;

/// Container lifecycle events
///
/// # Examples
///
/// ```rust
/// use loam_ioc::ContainerLifecycleEvent;
///
/// fn handle_event(event: &ContainerLifecycleEvent) {
///     match event {
///         ContainerLifecycleEvent::InitializationStarted { component_count, .. } => {
///             println!("Starting initialization of {} components", component_count);
///         }
///         ContainerLifecycleEvent::ContextRefreshed { component_count } => {
///             println!("Refreshed with {} components", component_count);
///         }
///         _ => {}
///     }
/// }
/// ```
pub enum ContainerLifecycleEvent<'a> {
    /// Fired when container initialization begins
    InitializationStarted {
        /// Reference to the container being initialized
        container: &'a Container,
        /// Total number of components to be initialized
        component_count: usize,
    },
    /// Fired when container initialization completes successfully
    InitializationCompleted {
        /// Reference to the initialized container
        container: &'a Container,
        /// Number of components that were successfully initialized
        component_count: usize,
        /// Total time taken for initialization
        duration: Duration,
    },
    /// Fired when an individual component is created
    ComponentCreated {
        /// Reference to the container
        container: &'a Container,
        /// Human-readable name of the component type
        component_name: &'static str,
        /// TypeId of the created component
        component_type_id: TypeId,
        /// Time taken to create this specific component
        creation_duration: Duration,
    },
    /// Fired at the end of `refresh`, after all `@PostConstruct`/
    /// `@PostInitialize` callbacks have run
    ContextRefreshed {
        /// Number of components brought up during refresh
        component_count: usize,
    },
    /// Fired at the end of `start`, after all `@OnStart` callbacks have run
    ContextStarted {
        /// Number of components in the construction order at start time
        component_count: usize,
    },
    /// Fired at the end of `stop`, after all `@OnStop` callbacks have run
    ContextStopped {
        /// Number of components in the construction order at stop time
        component_count: usize,
    },
    /// Fired at the end of `destroy`, after all `@PreDestroy` callbacks have run
    ContextClosed {
        /// Number of components in the construction order at destroy time
        component_count: usize,
    },
}

/// Trait for implementing lifecycle event listeners
///
/// Implement this trait to receive notifications about container lifecycle events.
/// Listeners must be thread-safe as they may be called from multiple threads.
pub trait LifecycleListener: Send + Sync {
    /// Called when a lifecycle event occurs
    fn on_lifecycle_event(&self, event: &ContainerLifecycleEvent);
}

/// Static definition of a lifecycle event listener
///
/// Registered with the container using the `lifecycle_listener!` macro.
pub struct LifecycleListenerDefinition {
    /// Unique name identifying this listener
    pub name: &'static str,
    /// Function to call when events occur
    pub handler: fn(&ContainerLifecycleEvent),
}

inventory::collect!(LifecycleListenerDefinition);

/// Publisher for container lifecycle events
///
/// Manages the collection of registered event listeners and dispatches
/// events to all registered handlers synchronously.
pub struct LifecycleEventPublisher {
    listeners: Vec<&'static LifecycleListenerDefinition>,
}

impl Default for LifecycleEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleEventPublisher {
    /// Creates a new publisher, discovering every registered listener via
    /// `inventory`
    pub fn new() -> Self {
        let listeners: Vec<&'static LifecycleListenerDefinition> =
            inventory::iter::<LifecycleListenerDefinition>().collect();

        Self { listeners }
    }

    /// Publishes an event to all registered listeners, in registration order
    pub fn publish(&self, event: &ContainerLifecycleEvent) {
        for listener in &self.listeners {
            (listener.handler)(event);
        }
    }
}

/// Registers a lifecycle event listener
///
/// # Examples
///
/// ```rust
/// use loam_ioc::{lifecycle_listener, ContainerLifecycleEvent};
///
/// fn my_event_handler(event: &ContainerLifecycleEvent) {
///     if let ContainerLifecycleEvent::ContextRefreshed { component_count } = event {
///         println!("Refreshed with {component_count} components");
///     }
/// }
///
/// lifecycle_listener!("my_listener", my_event_handler);
/// ```
#[macro_export]
macro_rules! lifecycle_listener {
    ($name:expr, $handler:expr) => {
        inventory::submit! {
            $crate::LifecycleListenerDefinition {
                name: $name,
                handler: $handler,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static EVENT_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn test_event_handler(_event: &ContainerLifecycleEvent) {
        EVENT_COUNTER.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn lifecycle_listener_definition_invokes_handler() {
        let definition = LifecycleListenerDefinition {
            name: "test_listener",
            handler: test_event_handler,
        };
        assert_eq!(definition.name, "test_listener");

        EVENT_COUNTER.store(0, Ordering::SeqCst);
        (definition.handler)(&ContainerLifecycleEvent::ContextRefreshed { component_count: 5 });
        assert_eq!(EVENT_COUNTER.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publisher_publish_does_not_panic_with_no_listeners() {
        let publisher = LifecycleEventPublisher { listeners: vec![] };
        publisher.publish(&ContainerLifecycleEvent::ContextStarted { component_count: 1 });
    }

    #[test]
    fn new_phase_events_carry_component_counts() {
        let events = vec![
            ContainerLifecycleEvent::ContextRefreshed { component_count: 3 },
            ContainerLifecycleEvent::ContextStarted { component_count: 3 },
            ContainerLifecycleEvent::ContextStopped { component_count: 3 },
            ContainerLifecycleEvent::ContextClosed { component_count: 3 },
        ];

        for event in &events {
            let count = match event {
                ContainerLifecycleEvent::ContextRefreshed { component_count }
                | ContainerLifecycleEvent::ContextStarted { component_count }
                | ContainerLifecycleEvent::ContextStopped { component_count }
                | ContainerLifecycleEvent::ContextClosed { component_count } => *component_count,
                _ => unreachable!(),
            };
            assert_eq!(count, 3);
        }
    }
}

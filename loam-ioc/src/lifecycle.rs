//! Lifecycle processor
//!
//! The container used to create every component in a single flat loop and
//! call it done. This module generalizes that into the full boot-time and
//! phase-transition callback sequence: which hooks run, in what order,
//! and what happens to a failure at each phase.

use crate::event::{ContainerLifecycleEvent, LifecycleEventPublisher};
use crate::registry::IndexedRegistry;
use loam_core::error::lifecycle::{LifecycleError, LifecyclePhase};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// A type-erased component instance, as stored by the scope engine
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// Runs once, right after construction and dependency injection
///
/// Implemented by the struct a component derives from and wired by
/// `#[post_construct]`; the macro generates a function pointer that
/// downcasts the erased instance back to the concrete type and calls this.
pub trait PostConstruct {
    /// Runs after dependency injection, before `after_properties_set`
    fn post_construct(&self) -> Result<(), String>;
}

/// Runs once, during teardown, before the instance is dropped
///
/// Wired by `#[pre_destroy]`, the same way as [`PostConstruct`].
pub trait PreDestroy {
    /// Runs during `destroy`, in reverse registration order
    fn pre_destroy(&self) -> Result<(), String>;
}

/// An `InitializingBean`-style capability run after `@PostConstruct`
///
/// Wired by `#[component(initializing_bean)]`. Distinct from
/// [`PostConstruct`] the way Spring keeps `@PostConstruct` and
/// `InitializingBean::afterPropertiesSet` as two separate extension points
/// that both run during the same phase.
pub trait InitializingBean {
    /// Runs after `@PostConstruct`, before `@PostInitialize`
    fn after_properties_set(&self) -> Result<(), String>;
}

/// A component with explicit `start`/`stop` phase transitions
///
/// Wired by `#[component(lifecycle)]` for a plain lifecycle bean (no
/// ordering against other lifecycle beans) or `#[component(smart_lifecycle)]`
/// for a [`SmartLifecycle`] one.
pub trait Lifecycle: Send + Sync {
    /// Runs during `start`
    fn start(&self) -> Result<(), String>;
    /// Runs during `stop`
    fn stop(&self) -> Result<(), String>;
}

/// A [`Lifecycle`] bean that starts/stops in a declared phase relative to
/// other smart-lifecycle beans: ascending on `start`, descending on `stop`
pub trait SmartLifecycle: Lifecycle {
    /// This bean's phase; lower phases start first and stop last
    fn phase(&self) -> i32 {
        0
    }
}

/// A hook run around a component's construction, mirroring Spring's
/// `BeanPostProcessor`
///
/// Post processors observe rather than replace: they validate, log, or
/// register side effects against the freshly built instance, but do not
/// swap its identity — the scope engine, not the lifecycle processor, owns
/// what instance callers ultimately see.
pub trait BeanPostProcessor: Send + Sync {
    /// Relative execution order among other post processors (ascending)
    fn order(&self) -> i32 {
        0
    }
    /// Runs immediately after construction and dependency injection, before
    /// `@PostConstruct`
    fn before_init(&self, _name: &str, _instance: &AnyInstance) -> Result<(), LifecycleError> {
        Ok(())
    }
    /// Runs after `@PostConstruct`
    fn after_init(&self, _name: &str, _instance: &AnyInstance) -> Result<(), LifecycleError> {
        Ok(())
    }
}

/// A `@PostInitialize`/`@OnStart`/`@OnStop` callback collected via
/// `inventory`, emitted by `#[derive(Component)]` for an inherent method
/// carrying the matching marker attribute
#[derive(Clone, Copy)]
pub struct PhaseCallback {
    /// The owning component's type
    pub component: fn() -> TypeId,
    /// Relative execution order among callbacks of the same kind (ascending)
    pub order: i32,
    /// Invokes the callback against the type-erased instance
    pub call: fn(&AnyInstance) -> Result<(), String>,
}

/// `@PostInitialize` callbacks, run once during `refresh`
pub struct PostInitializeCallback(pub PhaseCallback);
inventory::collect!(PostInitializeCallback);

/// `@OnStart` callbacks, run ascending during `start`
pub struct OnStartCallback(pub PhaseCallback);
inventory::collect!(OnStartCallback);

/// `@OnStop` callbacks, run in reverse order during `stop`
pub struct OnStopCallback(pub PhaseCallback);
inventory::collect!(OnStopCallback);

fn sorted_callbacks<T>(items: impl Iterator<Item = &'static T>, get: impl Fn(&'static T) -> PhaseCallback) -> Vec<PhaseCallback> {
    let mut callbacks: Vec<PhaseCallback> = items.map(get).collect();
    callbacks.sort_by_key(|c| c.order);
    callbacks
}

/// Drives the `refresh -> start -> stop -> destroy` phase machine over a
/// booted registry and its already-constructed singleton instances
pub struct LifecycleProcessor {
    registry: Arc<IndexedRegistry>,
    /// Dense indices of every eagerly-constructed singleton, in resolver order
    construction_order: Vec<usize>,
    /// The instances constructed for each index in `construction_order`
    instances: HashMap<usize, AnyInstance>,
    post_processors: Vec<Arc<dyn BeanPostProcessor>>,
    publisher: Arc<LifecycleEventPublisher>,
}

impl LifecycleProcessor {
    /// Creates a lifecycle processor over the given boot-time construction
    /// order and the instances already produced for it
    pub fn new(
        registry: Arc<IndexedRegistry>,
        construction_order: Vec<usize>,
        instances: HashMap<usize, AnyInstance>,
        publisher: Arc<LifecycleEventPublisher>,
    ) -> Self {
        Self {
            registry,
            construction_order,
            instances,
            post_processors: Vec::new(),
            publisher,
        }
    }

    /// Registers a bean post processor to run around every component's
    /// construction during the next `refresh`
    pub fn register_post_processor(&mut self, processor: Arc<dyn BeanPostProcessor>) {
        self.post_processors.push(processor);
    }

    fn sorted_post_processors(&self) -> Vec<&Arc<dyn BeanPostProcessor>> {
        let mut processors: Vec<&Arc<dyn BeanPostProcessor>> = self.post_processors.iter().collect();
        processors.sort_by_key(|p| p.order());
        processors
    }

    /// Step 1-4 of the boot sequence: runs post processors and
    /// `@PostConstruct`/`after_properties_set` for every eagerly-constructed
    /// singleton in resolver order, then `@PostInitialize` ascending, then
    /// publishes `ContextRefreshed`
    pub fn refresh(&self) -> Result<(), LifecycleError> {
        let post_processors = self.sorted_post_processors();

        for &index in &self.construction_order {
            let Some(instance) = self.instances.get(&index) else {
                continue;
            };
            let name = self.registry.factory(index).component_name();

            for processor in &post_processors {
                processor.before_init(name, instance)?;
            }
            self.registry.invoke_post_construct(index, instance)?;
            self.registry.factory(index).invoke_after_properties_set(instance)?;
            for processor in &post_processors {
                processor.after_init(name, instance)?;
            }
        }

        for callback in sorted_callbacks(
            inventory::iter::<PostInitializeCallback>(),
            |c| c.0,
        ) {
            self.invoke_phase_callback(&callback, LifecyclePhase::PostConstruct)?;
        }

        self.publisher.publish(&ContainerLifecycleEvent::ContextRefreshed {
            component_count: self.construction_order.len(),
        });
        Ok(())
    }

    /// Starts smart-lifecycle beans ascending by phase, then plain lifecycle
    /// beans, then runs `@OnStart` callbacks ascending, and publishes
    /// `ContextStarted`
    pub fn start(&self) -> Result<(), LifecycleError> {
        for &index in &self.lifecycle_beans_by_phase() {
            let Some(instance) = self.instances.get(&index) else {
                continue;
            };
            self.registry.factory(index).start_lifecycle(instance)?;
        }

        for callback in sorted_callbacks(inventory::iter::<OnStartCallback>(), |c| c.0) {
            self.invoke_phase_callback(&callback, LifecyclePhase::Start)?;
        }
        self.publisher.publish(&ContainerLifecycleEvent::ContextStarted {
            component_count: self.construction_order.len(),
        });
        Ok(())
    }

    /// Runs `@OnStop` callbacks in reverse order, then stops smart-lifecycle
    /// beans descending by phase and plain lifecycle beans, swallowing
    /// failures along the way (best-effort teardown), and publishes
    /// `ContextStopped`
    pub fn stop(&self) {
        let mut callbacks = sorted_callbacks(inventory::iter::<OnStopCallback>(), |c| c.0);
        callbacks.reverse();
        for callback in callbacks {
            if let Err(error) = self.invoke_phase_callback(&callback, LifecyclePhase::Stop) {
                tracing::error!(%error, "on-stop callback failed during shutdown");
            }
        }

        let mut lifecycle_beans = self.lifecycle_beans_by_phase();
        lifecycle_beans.reverse();
        for index in lifecycle_beans {
            let Some(instance) = self.instances.get(&index) else {
                continue;
            };
            if let Err(error) = self.registry.factory(index).stop_lifecycle(instance) {
                tracing::error!(%error, "lifecycle stop callback failed during shutdown");
            }
        }

        self.publisher.publish(&ContainerLifecycleEvent::ContextStopped {
            component_count: self.construction_order.len(),
        });
    }

    /// Every eagerly-constructed index declaring a lifecycle, ordered for
    /// `start`: smart-lifecycle beans first, ascending by phase (ties broken
    /// by construction order), then plain lifecycle beans in construction
    /// order. `stop` reverses this list.
    fn lifecycle_beans_by_phase(&self) -> Vec<usize> {
        let mut smart: Vec<(i32, usize)> = Vec::new();
        let mut plain: Vec<usize> = Vec::new();

        for &index in &self.construction_order {
            let factory = self.registry.factory(index);
            if !factory.has_lifecycle() {
                continue;
            }
            match factory.lifecycle_phase() {
                Some(phase) => smart.push((phase, index)),
                None => plain.push(index),
            }
        }

        smart.sort_by_key(|(phase, _)| *phase);
        smart.into_iter().map(|(_, index)| index).chain(plain).collect()
    }

    /// Stops (if not already stopped), invokes `@PreDestroy` in reverse
    /// registration order while swallowing failures, and publishes
    /// `ContextClosed`
    pub fn destroy(&self) {
        self.stop();

        for &index in self.construction_order.iter().rev() {
            let Some(instance) = self.instances.get(&index) else {
                continue;
            };
            if let Err(error) = self.registry.invoke_pre_destroy(index, instance) {
                tracing::error!(%error, "pre-destroy callback failed during shutdown");
            }
        }

        self.publisher.publish(&ContainerLifecycleEvent::ContextClosed {
            component_count: self.construction_order.len(),
        });
    }

    fn invoke_phase_callback(
        &self,
        callback: &PhaseCallback,
        phase: LifecyclePhase,
    ) -> Result<(), LifecycleError> {
        let type_id = (callback.component)();
        let Some(index) = self.registry.index_of(type_id) else {
            return Ok(());
        };
        let Some(instance) = self.instances.get(&index) else {
            return Ok(());
        };
        let name = self.registry.factory(index).component_name();
        (callback.call)(instance).map_err(|message| LifecycleError::new(phase, name, message))
    }
}

//! Resolver runtime facade
//!
//! The old container did everything in one flat loop: iterate
//! `inventory::iter::<ComponentDefinition>()`, recursively resolve each
//! bean's dependencies, cache the result in a `DashMap`. This module
//! replaces that loop with the boot pipeline the rest of this crate now
//! implements as separate stages: `condition::boot` decides what's even in
//! the registry, `resolver::GraphResolver` decides what order to build it
//! in, the scope engine decides how to cache it, and `LifecycleProcessor`
//! decides what callbacks run around it. `Container` is what's left: the
//! facade that wires those stages together and the index-array lookups
//! callers resolve through afterward.

use crate::component::ComponentInstance;
use crate::condition::{self, EnvironmentSource};
use crate::event::{ContainerLifecycleEvent, LifecycleEventPublisher};
use crate::lifecycle::{AnyInstance, LifecycleProcessor};
use crate::registry::IndexedRegistry;
use crate::resolver::GraphResolver;
use crate::scope::{PrototypeScope, RequestScope, Scope, ScopeProviderDefinition, SessionScope, SingletonScope};
use loam_core::error::resolution::ResolutionError;
use loam_core::error::scope::ScopeError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Everything that can keep a container from booting
#[derive(Debug)]
pub enum BootError {
    /// The dependency graph failed to resolve (unsatisfied/ambiguous/cyclic)
    Resolution(Vec<ResolutionError>),
    /// A scope failed to produce an eagerly-constructed singleton
    Construction(ScopeError),
    /// A `@PostConstruct`/`@PostInitialize`/`@OnStart` callback failed
    Lifecycle(loam_core::error::lifecycle::LifecycleError),
}

impl std::fmt::Display for BootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootError::Resolution(errors) => {
                write!(f, "dependency graph failed to resolve: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            BootError::Construction(error) => write!(f, "construction failed during boot: {error}"),
            BootError::Lifecycle(error) => write!(f, "lifecycle callback failed during boot: {error}"),
        }
    }
}

impl std::error::Error for BootError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerState {
    Building,
    Started,
    Destroyed,
}

const DEFAULT_CONTEXT_KEY: &str = "default";

/// The central resolver runtime
///
/// Owns the booted [`IndexedRegistry`], the scope engine and the
/// [`LifecycleProcessor`], and exposes every retrieval shape the
/// annotation IR can express as a plain index-array lookup. There is no
/// container-wide lock held across a `get` call; `SingletonScope::get` is
/// the only point where concurrent resolution of the same key suspends.
pub struct Container {
    registry: Arc<IndexedRegistry>,
    scopes: RwLock<HashMap<&'static str, Arc<dyn Scope>>>,
    state: RwLock<ContainerState>,
    lifecycle: RwLock<Option<LifecycleProcessor>>,
    active_profiles: RwLock<Vec<String>>,
    publisher: Arc<LifecycleEventPublisher>,
    /// Instances handed to the container by its host rather than discovered
    /// via `inventory` (e.g. an `ApplicationContext`'s own `ConfigManager`).
    /// Treated by the resolver as already-satisfied dependencies and by
    /// `resolve_index` as a fallback source when a dependency type has no
    /// registry index of its own.
    external: RwLock<HashMap<TypeId, AnyInstance>>,
}

impl Container {
    /// Runs the full boot sequence: conditional registration, dependency
    /// resolution, eager singleton construction, `refresh`, then `start`.
    /// Boot is all-or-nothing; a partially built container is never handed
    /// back to the caller.
    pub fn boot(environment: &dyn EnvironmentSource) -> Result<Arc<Container>, BootError> {
        Self::boot_with_externals(environment, Vec::new())
    }

    /// Boots the same way as [`Container::boot`], but first seeds the
    /// container with host-constructed instances that components can depend
    /// on through `#[autowired]` without themselves being discovered
    /// `ComponentDefinition`s: a `ConfigManager`, or a `Configuration` struct
    /// parsed from it before the graph even starts resolving.
    pub fn boot_with_externals(
        environment: &dyn EnvironmentSource,
        externals: Vec<(TypeId, AnyInstance)>,
    ) -> Result<Arc<Container>, BootError> {
        let (registry, excluded) = condition::boot(environment);
        for exclusion in &excluded {
            tracing::info!(component = exclusion.component, reason = %exclusion.reason, "component excluded by condition");
        }

        let external_types: std::collections::HashSet<TypeId> =
            externals.iter().map(|(id, _)| *id).collect();

        let resolver = GraphResolver::discover();
        let report = resolver.resolve_with_externals(&external_types);
        if !report.is_ok() {
            return Err(BootError::Resolution(report.errors));
        }
        for cycle in &report.informational_cycles {
            tracing::info!(?cycle, "dependency cycle broken by a Provider/Optional edge");
        }

        let indexed = Arc::new(registry.into_indexed());
        let publisher = Arc::new(LifecycleEventPublisher::new());

        let mut scopes: HashMap<&'static str, Arc<dyn Scope>> = HashMap::new();
        scopes.insert("singleton", Arc::new(SingletonScope::new()));
        scopes.insert("prototype", Arc::new(PrototypeScope));
        scopes.insert("request", Arc::new(RequestScope::new()));
        scopes.insert("session", Arc::new(SessionScope::new()));
        for provider in inventory::iter::<ScopeProviderDefinition>() {
            scopes.insert(provider.scope_id, Arc::from((provider.build)()));
        }

        let container = Arc::new(Container {
            registry: indexed.clone(),
            scopes: RwLock::new(scopes),
            state: RwLock::new(ContainerState::Building),
            lifecycle: RwLock::new(None),
            active_profiles: RwLock::new(environment.active_profiles().into_iter().collect()),
            publisher: publisher.clone(),
            external: RwLock::new(externals.into_iter().collect()),
        });

        let component_count = indexed.len();
        publisher.publish(&ContainerLifecycleEvent::InitializationStarted {
            container: &container,
            component_count,
        });
        let started_at = Instant::now();

        let mut construction_order = Vec::new();
        let mut instances: HashMap<usize, AnyInstance> = HashMap::new();

        for type_id in &report.order {
            let Some(index) = indexed.index_of(*type_id) else {
                continue;
            };
            if indexed.is_lazy(index) || indexed.scope_id(index) != "singleton" {
                continue;
            }

            let creation_started = Instant::now();
            let instance = container
                .resolve_index(index, &instances)
                .map_err(BootError::Construction)?;
            let name = indexed.factory(index).component_name();
            publisher.publish(&ContainerLifecycleEvent::ComponentCreated {
                container: &container,
                component_name: name,
                component_type_id: *type_id,
                creation_duration: creation_started.elapsed(),
            });

            instances.insert(index, instance);
            construction_order.push(index);
        }

        publisher.publish(&ContainerLifecycleEvent::InitializationCompleted {
            container: &container,
            component_count,
            duration: started_at.elapsed(),
        });

        let processor = LifecycleProcessor::new(indexed, construction_order, instances, publisher);
        *container.lifecycle.write().unwrap() = Some(processor);

        {
            let guard = container.lifecycle.read().unwrap();
            let processor = guard.as_ref().expect("lifecycle processor was just installed");
            processor.refresh().map_err(BootError::Lifecycle)?;
            processor.start().map_err(BootError::Lifecycle)?;
        }

        *container.state.write().unwrap() = ContainerState::Started;
        Ok(container)
    }

    /// Resolves (constructing if necessary) the instance at a dense index,
    /// recursing into its dependency types first. `base_instances` short
    /// circuits instances already constructed during eager boot.
    fn resolve_index(
        &self,
        index: usize,
        base_instances: &HashMap<usize, AnyInstance>,
    ) -> Result<AnyInstance, ScopeError> {
        if let Some(existing) = base_instances.get(&index) {
            return Ok(existing.clone());
        }

        let factory = self.registry.factory(index);
        let scope_id = factory.scope_id();
        let scope = self
            .scopes
            .read()
            .unwrap()
            .get(scope_id)
            .cloned()
            .ok_or_else(|| ScopeError::no_such_scope(scope_id))?;

        let type_id = factory.component_type();
        let component_name = factory.component_name();
        scope.get(DEFAULT_CONTEXT_KEY, type_id, &|| {
            let mut deps: HashMap<TypeId, ComponentInstance> = HashMap::new();
            for point in factory.injection_points() {
                let requested = (point.requested_type)();
                let qualifier = point.qualifier.map(|q| q.0);
                match self
                    .registry
                    .resolve_single(requested, qualifier, point.requested_type_name)
                {
                    Ok(dependency_index) => {
                        let dependency_instance = self.resolve_index(dependency_index, base_instances)?;
                        deps.insert(requested, dependency_instance);
                    }
                    Err(_) => {
                        if let Some(external) = self.external.read().unwrap().get(&requested) {
                            deps.insert(requested, external.clone());
                        }
                    }
                }
            }
            self.registry
                .create(index, deps)
                .map_err(|error| ScopeError::creation_failed(component_name, error.to_string()))
        })
    }

    /// Registers a host-constructed instance after boot, making it available
    /// to dependents the same way a `boot_with_externals` seed would. Does
    /// not retroactively satisfy a component already constructed during
    /// boot; only affects components resolved from this point on.
    pub fn register_instance<T: Any + Send + Sync>(&self, instance: Arc<T>) {
        self.external.write().unwrap().insert(TypeId::of::<T>(), instance);
    }

    /// Resolves a host-registered external instance directly, bypassing the
    /// registry entirely. Returns `None` if nothing was ever registered
    /// under `T` via `boot_with_externals` or `register_instance`.
    pub fn get_external<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.external
            .read()
            .unwrap()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// Looks up the dense index for a concrete type, honoring `@Primary`
    /// when more than one candidate implements it as a supertype, and
    /// reporting ambiguity instead of silently picking an arbitrary
    /// candidate when no single primary exists
    fn index_for<T: Any>(&self) -> Result<usize, ScopeError> {
        self.registry
            .resolve_single(TypeId::of::<T>(), None, std::any::type_name::<T>())
    }

    /// Resolves the single component registered under `T`'s concrete type,
    /// or its primary implementer if `T` is a supertype with multiple
    /// candidates. Fails with [`ScopeError::AmbiguousComponent`] when `T` is
    /// a supertype with more than one candidate and none is marked primary.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ScopeError> {
        match self.index_for::<T>() {
            Ok(index) => self.resolve_by_index::<T>(index),
            Err(error) => self.get_external::<T>().ok_or(error),
        }
    }

    /// Like [`Container::get`], but narrows candidates to the given
    /// qualifier — the scenario `get(EmailService, "SMS")` describes, where
    /// `get::<EmailService>()` alone would resolve the primary SMTP
    /// implementer instead.
    pub fn get_qualified<T: Any + Send + Sync>(&self, qualifier: &str) -> Result<Arc<T>, ScopeError> {
        let index = self.registry.resolve_single(
            TypeId::of::<T>(),
            Some(qualifier),
            std::any::type_name::<T>(),
        )?;
        self.resolve_by_index::<T>(index)
    }

    /// Resolves the component registered under the given declared name
    pub fn get_named<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ScopeError> {
        let index = self
            .registry
            .index_of_name(name)
            .ok_or_else(|| ScopeError::no_such_scope(name))?;
        self.resolve_by_index::<T>(index)
    }

    /// Resolves every component implementing `T` as a concrete type or
    /// supertype, in registration order
    pub fn get_all<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        let type_id = TypeId::of::<T>();
        self.registry
            .indices_for_type(type_id)
            .iter()
            .filter_map(|&index| self.resolve_by_index::<T>(index).ok())
            .collect()
    }

    /// Like [`Container::get`], but returns `None` instead of an error when
    /// nothing satisfies `T`. An ambiguous `T` with no primary also yields
    /// `None`, the same as an absent one — `get` is the call to use when the
    /// distinction matters.
    pub fn get_optional<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self.index_for::<T>() {
            Ok(index) => self.resolve_by_index::<T>(index).ok(),
            Err(_) => self.get_external::<T>(),
        }
    }

    /// Returns a deferred handle that resolves `T` on first use, honoring
    /// whatever scope the producer was registered with
    pub fn provider<T: Any + Send + Sync>(self: &Arc<Self>) -> Option<Provider<T>> {
        let index = self.index_for::<T>().ok()?;
        Some(Provider {
            container: self.clone(),
            index,
            _marker: PhantomData,
        })
    }

    fn resolve_by_index<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ScopeError> {
        let instance = self.resolve_index(index, &HashMap::new())?;
        instance
            .downcast::<T>()
            .map_err(|_| ScopeError::creation_failed(std::any::type_name::<T>(), "downcast failed"))
    }

    /// Resolves a component by one of its declared interfaces rather than
    /// its concrete type, honoring the same primary/qualifier rules as
    /// [`Container::get`]. `T` is the trait object type, e.g. `dyn Greeter`;
    /// since `Arc<dyn Greeter + Send + Sync>` is itself a sized, `'static`
    /// value, the component's `cast_to_interface` hands it back boxed as
    /// `dyn Any`, and this downcasts the box rather than the instance.
    pub fn get_interface<T: ?Sized + 'static>(&self) -> Result<Arc<T>, ScopeError> {
        let interface = TypeId::of::<T>();
        let index = self
            .registry
            .resolve_single(interface, None, std::any::type_name::<T>())?;
        let instance = self.resolve_index(index, &HashMap::new())?;
        let factory = self.registry.factory(index);
        let boxed = factory
            .cast_to_interface(&instance, interface)
            .ok_or_else(|| {
                ScopeError::creation_failed(std::any::type_name::<T>(), "component does not implement this interface")
            })?;
        boxed
            .downcast::<Arc<T>>()
            .map(|arc| *arc)
            .map_err(|_| ScopeError::creation_failed(std::any::type_name::<T>(), "interface downcast failed"))
    }

    /// Registers a custom scope at runtime, superseding any built-in or SPI
    /// scope already registered under the same id
    pub fn register_scope(&self, scope: Box<dyn Scope>) {
        self.scopes.write().unwrap().insert(scope.id(), Arc::from(scope));
    }

    /// Replaces the set of active profiles. Conditions are evaluated once,
    /// at boot; changing profiles afterward does not retroactively include
    /// or exclude components, but it is visible to anything reading
    /// `active_profiles` at runtime (e.g. a custom scope keyed by tenant).
    pub fn set_active_profiles(&self, profiles: Vec<String>) {
        *self.active_profiles.write().unwrap() = profiles;
    }

    /// The profiles active when this container booted, or as last set via
    /// `set_active_profiles`
    pub fn active_profiles(&self) -> Vec<String> {
        self.active_profiles.read().unwrap().clone()
    }

    /// The number of components in the booted registry
    pub fn component_count(&self) -> usize {
        self.registry.len()
    }

    /// Drives `stop` then `destroy` against every eagerly-constructed
    /// singleton, in reverse construction order. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.state.write().unwrap();
        if *state == ContainerState::Destroyed {
            return;
        }
        if let Some(processor) = self.lifecycle.read().unwrap().as_ref() {
            processor.stop();
            processor.destroy();
        }
        *state = ContainerState::Destroyed;
    }
}

/// A deferred, re-resolvable handle to a component
///
/// Where `Container::get` resolves immediately, a `Provider` defers
/// resolution until `.get()` is called, letting a singleton depend on a
/// `request`/`session`/`prototype`-scoped component without eagerly
/// resolving it at the singleton's own construction time.
pub struct Provider<T> {
    container: Arc<Container>,
    index: usize,
    _marker: PhantomData<T>,
}

impl<T: Any + Send + Sync> Provider<T> {
    /// Resolves the current instance, honoring the producer's scope
    pub fn get(&self) -> Result<Arc<T>, ScopeError> {
        self.container.resolve_by_index::<T>(self.index)
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            index: self.index,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ComponentDefinition, InjectionPointDef};
    use crate::registry::{DefinitionFactory, Registry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn no_conditions() -> Vec<crate::ir::Condition> {
        Vec::new()
    }

    fn no_points() -> Vec<InjectionPointDef> {
        Vec::new()
    }

    fn no_interfaces() -> Vec<TypeId> {
        Vec::new()
    }

    #[derive(Debug)]
    struct Greeter {
        value: AtomicUsize,
    }

    fn greeter_creator(
        _deps: HashMap<TypeId, ComponentInstance>,
    ) -> Result<ComponentInstance, loam_core::error::component::ComponentError> {
        Ok(Arc::new(Greeter {
            value: AtomicUsize::new(42),
        }))
    }

    fn leaked_greeter_def() -> &'static ComponentDefinition {
        Box::leak(Box::new(ComponentDefinition {
            type_id: || TypeId::of::<Greeter>(),
            type_name: "Greeter",
            component_name: None,
            qualifiers: &[],
            primary: false,
            lazy: false,
            order: 0,
            destroy_order: 0,
            scope_id: "singleton",
            depends_on: &[],
            conditions: no_conditions,
            injection_points: no_points,
            implemented_interfaces: no_interfaces,
            cast_to_interface: |_instance, _interface| None,
            creator: greeter_creator,
            post_construct: None,
            after_properties_set: None,
            pre_destroy: None,
            lifecycle_phase: None,
            lifecycle_start: None,
            lifecycle_stop: None,
        }))
    }

    fn build_test_container() -> Arc<Container> {
        let mut registry = Registry::new();
        registry.add(Arc::new(DefinitionFactory::new(leaked_greeter_def())));
        let indexed = Arc::new(registry.into_indexed());

        let mut scopes: HashMap<&'static str, Arc<dyn Scope>> = HashMap::new();
        scopes.insert("singleton", Arc::new(SingletonScope::new()));

        Arc::new(Container {
            registry: indexed,
            scopes: RwLock::new(scopes),
            state: RwLock::new(ContainerState::Started),
            lifecycle: RwLock::new(None),
            active_profiles: RwLock::new(Vec::new()),
            publisher: Arc::new(LifecycleEventPublisher::new()),
            external: RwLock::new(HashMap::new()),
        })
    }

    #[test]
    fn resolves_and_caches_a_singleton() {
        let container = build_test_container();

        let greeter = container.get::<Greeter>().unwrap();
        assert_eq!(greeter.value.load(Ordering::SeqCst), 42);

        let again = container.get::<Greeter>().unwrap();
        assert!(Arc::ptr_eq(&greeter, &again));

        assert!(container.get_optional::<Greeter>().is_some());
        assert_eq!(container.get_all::<Greeter>().len(), 1);
        assert!(container.get_named::<Greeter>("Greeter").is_ok());
    }

    #[test]
    fn provider_resolves_the_same_singleton_instance() {
        let container = build_test_container();
        let direct = container.get::<Greeter>().unwrap();
        let provider = container.provider::<Greeter>().unwrap();
        assert!(Arc::ptr_eq(&provider.get().unwrap(), &direct));
    }

    #[test]
    fn get_fails_for_an_unregistered_type() {
        let container = build_test_container();
        struct NotRegistered;
        assert!(container.get::<NotRegistered>().is_err());
        assert!(container.get_optional::<NotRegistered>().is_none());
    }

    #[test]
    fn external_instance_is_resolvable_but_not_registered_as_a_component() {
        let container = build_test_container();
        struct Settings {
            port: u16,
        }
        assert!(container.get_optional::<Settings>().is_none());

        container.register_instance(Arc::new(Settings { port: 8080 }));
        let settings = container.get::<Settings>().unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(container.component_count(), 1);
    }

    #[test]
    fn shutdown_is_idempotent_with_no_lifecycle_processor() {
        let container = build_test_container();
        container.shutdown();
        container.shutdown();
    }
}

//! Component factory registry
//!
//! Generalizes the single-method `component::factory::ComponentFactory`
//! trait (a lookup-only interface the container implemented for callers)
//! into the fuller capability vtable `#[derive(Component)]` now emits one
//! instance of per component, plus the dense, boot-time-immutable index
//! structures the runtime resolves through.

use loam_core::error::lifecycle::LifecycleError;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::ComponentInstance;
use crate::ir::{ComponentDefinition, InjectionPointDef};

/// Per-component capability surface generated by `#[derive(Component)]`
///
/// Where the original `ComponentFactory` trait only supported looking a
/// component up by type, this trait is the full vtable the resolver,
/// condition evaluator, scope engine and lifecycle processor each need a
/// slice of; a hidden struct generated by the derive macro implements it
/// once per component and is registered alongside its `ComponentDefinition`.
pub trait ComponentFactory: Send + Sync {
    /// Builds an instance from already-resolved dependencies
    fn create(
        &self,
        deps: HashMap<TypeId, ComponentInstance>,
    ) -> Result<ComponentInstance, loam_core::error::component::ComponentError>;
    /// The component's concrete type
    fn component_type(&self) -> TypeId;
    /// The component's human-readable type name
    fn component_name(&self) -> &'static str;
    /// The scope this component is created in
    fn scope_id(&self) -> &'static str;
    /// Whether this component is the default pick among ambiguous candidates
    fn is_primary(&self) -> bool;
    /// Whether construction is deferred until first use
    fn is_lazy(&self) -> bool;
    /// Relative construction order
    fn order(&self) -> i32;
    /// Relative destruction order
    fn destroy_order(&self) -> i32;
    /// The qualifier strings this component satisfies
    fn qualifier(&self) -> &'static [&'static str];
    /// Supertypes/interfaces this component is registered under
    fn implemented_interfaces(&self) -> Vec<TypeId>;
    /// Casts a constructed instance to one of `implemented_interfaces`
    fn cast_to_interface(
        &self,
        instance: &ComponentInstance,
        interface: TypeId,
    ) -> Option<Box<dyn std::any::Any + Send + Sync>>;
    /// The concrete `TypeId`s this component depends on
    fn dependency_types(&self) -> Vec<TypeId>;
    /// The full injection points this component declares, carrying qualifier
    /// and wrapper information the runtime needs to pick the same candidate
    /// the boot-time resolver already validated
    fn injection_points(&self) -> Vec<InjectionPointDef>;
    /// Explicit `@DependsOn`-style destruction-ordering dependencies
    fn destruction_dependencies(&self) -> &'static [&'static str];
    /// Whether this component has any conditions to evaluate
    fn has_conditions(&self) -> bool;
    /// Invokes the `@PostConstruct` callback, if any
    fn invoke_post_construct(&self, instance: &ComponentInstance) -> Result<(), LifecycleError>;
    /// Invokes the `InitializingBean::after_properties_set` callback, if any
    fn invoke_after_properties_set(&self, instance: &ComponentInstance) -> Result<(), LifecycleError>;
    /// Invokes the `@PreDestroy` callback, if any
    fn invoke_pre_destroy(&self, instance: &ComponentInstance) -> Result<(), LifecycleError>;
    /// `Some(phase)` for a smart-lifecycle bean; `None` with
    /// [`ComponentFactory::has_lifecycle`] true marks a plain lifecycle bean
    fn lifecycle_phase(&self) -> Option<i32>;
    /// Whether this component declares `Lifecycle::start`/`stop` callbacks
    fn has_lifecycle(&self) -> bool;
    /// Invokes `Lifecycle::start`, if declared
    fn start_lifecycle(&self, instance: &ComponentInstance) -> Result<(), LifecycleError>;
    /// Invokes `Lifecycle::stop`, if declared
    fn stop_lifecycle(&self, instance: &ComponentInstance) -> Result<(), LifecycleError>;
}

/// The default `ComponentFactory` implementation, adapting a `'static`
/// [`ComponentDefinition`] (as produced by `#[derive(Component)]` and
/// collected via `inventory`) to the capability trait above.
pub struct DefinitionFactory {
    def: &'static ComponentDefinition,
}

impl DefinitionFactory {
    /// Wraps a static component definition
    pub fn new(def: &'static ComponentDefinition) -> Self {
        Self { def }
    }
}

impl ComponentFactory for DefinitionFactory {
    fn create(
        &self,
        deps: HashMap<TypeId, ComponentInstance>,
    ) -> Result<ComponentInstance, loam_core::error::component::ComponentError> {
        (self.def.creator)(deps)
    }

    fn component_type(&self) -> TypeId {
        (self.def.type_id)()
    }

    fn component_name(&self) -> &'static str {
        self.def.type_name
    }

    fn scope_id(&self) -> &'static str {
        self.def.scope_id
    }

    fn is_primary(&self) -> bool {
        self.def.primary
    }

    fn is_lazy(&self) -> bool {
        self.def.lazy
    }

    fn order(&self) -> i32 {
        self.def.order
    }

    fn destroy_order(&self) -> i32 {
        self.def.destroy_order
    }

    fn qualifier(&self) -> &'static [&'static str] {
        self.def.qualifiers
    }

    fn implemented_interfaces(&self) -> Vec<TypeId> {
        (self.def.implemented_interfaces)()
    }

    fn cast_to_interface(
        &self,
        instance: &ComponentInstance,
        interface: TypeId,
    ) -> Option<Box<dyn std::any::Any + Send + Sync>> {
        (self.def.cast_to_interface)(instance, interface)
    }

    fn dependency_types(&self) -> Vec<TypeId> {
        (self.def.injection_points)()
            .into_iter()
            .map(|p| (p.requested_type)())
            .collect()
    }

    fn injection_points(&self) -> Vec<InjectionPointDef> {
        (self.def.injection_points)()
    }

    fn destruction_dependencies(&self) -> &'static [&'static str] {
        self.def.depends_on
    }

    fn has_conditions(&self) -> bool {
        !(self.def.conditions)().is_empty()
    }

    fn invoke_post_construct(&self, instance: &ComponentInstance) -> Result<(), LifecycleError> {
        if let Some(callback) = self.def.post_construct {
            callback(instance).map_err(|message| {
                LifecycleError::new(
                    loam_core::error::lifecycle::LifecyclePhase::PostConstruct,
                    self.def.type_name,
                    message,
                )
            })
        } else {
            Ok(())
        }
    }

    fn invoke_after_properties_set(&self, instance: &ComponentInstance) -> Result<(), LifecycleError> {
        if let Some(callback) = self.def.after_properties_set {
            callback(instance).map_err(|message| {
                LifecycleError::new(
                    loam_core::error::lifecycle::LifecyclePhase::PostConstruct,
                    self.def.type_name,
                    message,
                )
            })
        } else {
            Ok(())
        }
    }

    fn invoke_pre_destroy(&self, instance: &ComponentInstance) -> Result<(), LifecycleError> {
        if let Some(callback) = self.def.pre_destroy {
            callback(instance).map_err(|message| {
                LifecycleError::new(
                    loam_core::error::lifecycle::LifecyclePhase::PreDestroy,
                    self.def.type_name,
                    message,
                )
            })
        } else {
            Ok(())
        }
    }

    fn lifecycle_phase(&self) -> Option<i32> {
        self.def.lifecycle_phase
    }

    fn has_lifecycle(&self) -> bool {
        self.def.lifecycle_start.is_some() || self.def.lifecycle_stop.is_some()
    }

    fn start_lifecycle(&self, instance: &ComponentInstance) -> Result<(), LifecycleError> {
        if let Some(callback) = self.def.lifecycle_start {
            callback(instance).map_err(|message| {
                LifecycleError::new(
                    loam_core::error::lifecycle::LifecyclePhase::Start,
                    self.def.type_name,
                    message,
                )
            })
        } else {
            Ok(())
        }
    }

    fn stop_lifecycle(&self, instance: &ComponentInstance) -> Result<(), LifecycleError> {
        if let Some(callback) = self.def.lifecycle_stop {
            callback(instance).map_err(|message| {
                LifecycleError::new(
                    loam_core::error::lifecycle::LifecyclePhase::Stop,
                    self.def.type_name,
                    message,
                )
            })
        } else {
            Ok(())
        }
    }
}

/// A mutable, pre-boot collection of factories, keyed for lookup by type,
/// name and qualifier
#[derive(Default)]
pub struct Registry {
    factories: Vec<Arc<dyn ComponentFactory>>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory to the registry
    pub fn add(&mut self, factory: Arc<dyn ComponentFactory>) {
        self.factories.push(factory);
    }

    /// All registered factories, in registration order
    pub fn all_factories(&self) -> &[Arc<dyn ComponentFactory>] {
        &self.factories
    }

    /// The first factory whose concrete type matches exactly
    pub fn factory_by_type(&self, type_id: TypeId) -> Option<&Arc<dyn ComponentFactory>> {
        self.factories.iter().find(|f| f.component_type() == type_id)
    }

    /// The first factory whose component name matches
    pub fn factory_by_name(&self, name: &str) -> Option<&Arc<dyn ComponentFactory>> {
        self.factories.iter().find(|f| f.component_name() == name)
    }

    /// Every factory implementing the given supertype/interface
    pub fn factories_for_type(&self, type_id: TypeId) -> Vec<&Arc<dyn ComponentFactory>> {
        self.factories
            .iter()
            .filter(|f| f.component_type() == type_id || f.implemented_interfaces().contains(&type_id))
            .collect()
    }

    /// The primary factory for a supertype, if exactly one is marked primary
    pub fn primary_factory(&self, type_id: TypeId) -> Option<&Arc<dyn ComponentFactory>> {
        self.factories_for_type(type_id)
            .into_iter()
            .find(|f| f.is_primary())
    }

    /// Freezes the registry into a dense, index-addressable form
    pub fn into_indexed(self) -> IndexedRegistry {
        let mut by_type: HashMap<TypeId, usize> = HashMap::new();
        let mut by_supertype: HashMap<TypeId, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<&'static str, usize> = HashMap::new();
        let mut by_qualifier: HashMap<&'static str, Vec<usize>> = HashMap::new();

        for (index, factory) in self.factories.iter().enumerate() {
            by_type.insert(factory.component_type(), index);
            by_name.insert(factory.component_name(), index);

            for qualifier in factory.qualifier() {
                by_qualifier.entry(qualifier).or_default().push(index);
            }

            by_supertype
                .entry(factory.component_type())
                .or_default()
                .push(index);
            for interface in factory.implemented_interfaces() {
                by_supertype.entry(interface).or_default().push(index);
            }
        }

        IndexedRegistry {
            factories: self.factories,
            by_type,
            by_supertype,
            by_name,
            by_qualifier,
        }
    }
}

/// The immutable, post-boot registry the runtime resolves against
///
/// Exact-type and name lookups are `O(1)` via `HashMap<TypeId, usize>` /
/// `HashMap<&str, usize>`; supertype queries are `O(k)` in the number of
/// matching components. Nothing here is ever mutated after boot, so reads
/// never need synchronization beyond the `Arc` the container wraps it in.
pub struct IndexedRegistry {
    factories: Vec<Arc<dyn ComponentFactory>>,
    by_type: HashMap<TypeId, usize>,
    by_supertype: HashMap<TypeId, Vec<usize>>,
    by_name: HashMap<&'static str, usize>,
    by_qualifier: HashMap<&'static str, Vec<usize>>,
}

impl IndexedRegistry {
    /// Number of components in the registry
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry has no components
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// The dense index of the component with this exact concrete type
    pub fn index_of(&self, type_id: TypeId) -> Option<usize> {
        self.by_type.get(&type_id).copied()
    }

    /// The dense index of the component with this declared name
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Every dense index implementing the given supertype
    pub fn indices_for_type(&self, type_id: TypeId) -> &[usize] {
        self.by_supertype
            .get(&type_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every dense index carrying the given qualifier
    pub fn indices_for_qualifier(&self, qualifier: &str) -> &[usize] {
        self.by_qualifier
            .get(qualifier)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Creates a component instance at the given index from resolved deps
    pub fn create(
        &self,
        index: usize,
        deps: HashMap<TypeId, ComponentInstance>,
    ) -> Result<ComponentInstance, loam_core::error::component::ComponentError> {
        self.factories[index].create(deps)
    }

    /// The scope id the component at this index is created in
    pub fn scope_id(&self, index: usize) -> &'static str {
        self.factories[index].scope_id()
    }

    /// Whether the component at this index defers construction
    pub fn is_lazy(&self, index: usize) -> bool {
        self.factories[index].is_lazy()
    }

    /// Direct access to the factory at a dense index
    pub fn factory(&self, index: usize) -> &Arc<dyn ComponentFactory> {
        &self.factories[index]
    }

    /// Invokes the post-construct callback for the component at this index
    pub fn invoke_post_construct(
        &self,
        index: usize,
        instance: &ComponentInstance,
    ) -> Result<(), LifecycleError> {
        self.factories[index].invoke_post_construct(instance)
    }

    /// Invokes the pre-destroy callback for the component at this index
    pub fn invoke_pre_destroy(
        &self,
        index: usize,
        instance: &ComponentInstance,
    ) -> Result<(), LifecycleError> {
        self.factories[index].invoke_pre_destroy(instance)
    }

    /// All dense indices, in registration order
    pub fn all_indices(&self) -> std::ops::Range<usize> {
        0..self.factories.len()
    }

    /// Picks the single component satisfying `type_id`, narrowing by
    /// `qualifier` when given and falling back to the primary-law rule when
    /// several unqualified candidates exist. Mirrors the same candidate
    /// selection the boot-time resolver already validated, so runtime
    /// wiring never picks a different instance than the graph that was
    /// proven viable at boot. `requested_name` is only used to label errors.
    pub fn resolve_single(
        &self,
        type_id: TypeId,
        qualifier: Option<&str>,
        requested_name: &str,
    ) -> Result<usize, loam_core::error::scope::ScopeError> {
        if qualifier.is_none() {
            if let Some(index) = self.by_type.get(&type_id).copied() {
                return Ok(index);
            }
        }

        let mut candidates: Vec<usize> = self.indices_for_type(type_id).to_vec();
        if let Some(q) = qualifier {
            candidates.retain(|i| self.factories[*i].qualifier().contains(&q));
        }

        match candidates.len() {
            1 => Ok(candidates[0]),
            0 => Err(loam_core::error::scope::ScopeError::no_such_scope(requested_name)),
            _ => {
                let primaries: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|i| self.factories[*i].is_primary())
                    .collect();
                if qualifier.is_none() && primaries.len() == 1 {
                    return Ok(primaries[0]);
                }
                let names: Vec<String> = candidates
                    .iter()
                    .map(|i| self.factories[*i].component_name().to_string())
                    .collect();
                Err(loam_core::error::scope::ScopeError::ambiguous_component(
                    requested_name,
                    names,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Arc as StdArc;

    struct Dummy;

    struct DummyFactory {
        name: &'static str,
        primary: bool,
    }

    impl ComponentFactory for DummyFactory {
        fn create(
            &self,
            _deps: HashMap<TypeId, ComponentInstance>,
        ) -> Result<ComponentInstance, loam_core::error::component::ComponentError> {
            Ok(StdArc::new(Dummy {}))
        }
        fn component_type(&self) -> TypeId {
            TypeId::of::<Dummy>()
        }
        fn component_name(&self) -> &'static str {
            self.name
        }
        fn scope_id(&self) -> &'static str {
            "singleton"
        }
        fn is_primary(&self) -> bool {
            self.primary
        }
        fn is_lazy(&self) -> bool {
            false
        }
        fn order(&self) -> i32 {
            0
        }
        fn destroy_order(&self) -> i32 {
            0
        }
        fn qualifier(&self) -> &'static [&'static str] {
            &[]
        }
        fn implemented_interfaces(&self) -> Vec<TypeId> {
            Vec::new()
        }
        fn cast_to_interface(
            &self,
            _instance: &ComponentInstance,
            _interface: TypeId,
        ) -> Option<Box<dyn std::any::Any + Send + Sync>> {
            None
        }
        fn dependency_types(&self) -> Vec<TypeId> {
            Vec::new()
        }
        fn injection_points(&self) -> Vec<InjectionPointDef> {
            Vec::new()
        }
        fn destruction_dependencies(&self) -> &'static [&'static str] {
            &[]
        }
        fn has_conditions(&self) -> bool {
            false
        }
        fn invoke_post_construct(&self, _instance: &ComponentInstance) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn invoke_after_properties_set(&self, _instance: &ComponentInstance) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn invoke_pre_destroy(&self, _instance: &ComponentInstance) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn lifecycle_phase(&self) -> Option<i32> {
            None
        }
        fn has_lifecycle(&self) -> bool {
            false
        }
        fn start_lifecycle(&self, _instance: &ComponentInstance) -> Result<(), LifecycleError> {
            Ok(())
        }
        fn stop_lifecycle(&self, _instance: &ComponentInstance) -> Result<(), LifecycleError> {
            Ok(())
        }
    }

    #[test]
    fn indexed_registry_looks_up_by_type_and_name() {
        let mut registry = Registry::new();
        registry.add(StdArc::new(DummyFactory {
            name: "Dummy",
            primary: true,
        }));

        let indexed = registry.into_indexed();
        assert_eq!(indexed.len(), 1);
        let idx = indexed.index_of(TypeId::of::<Dummy>()).unwrap();
        assert_eq!(indexed.index_of_name("Dummy"), Some(idx));

        let instance = indexed.create(idx, StdHashMap::new()).unwrap();
        assert!(instance.downcast::<Dummy>().is_ok());
    }
}

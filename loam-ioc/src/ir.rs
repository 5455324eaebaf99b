//! Annotation intermediate representation
//!
//! `#[derive(Component)]` never talks to the container directly: it emits a
//! static `ComponentDefinition` into the `inventory` registry, the same way
//! the original component macro did, generalized to carry everything the
//! resolver, condition evaluator, scope engine and lifecycle processor need
//! to act on a component without re-parsing anything at runtime.

use loam_core::error::component::ComponentError;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::ComponentInstance;

/// A qualifier used to disambiguate components that share a supertype
///
/// Wraps the bare `&'static str` qualifier the original component
/// descriptor carried, so it can be attached to both definitions and
/// injection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Qualifier(pub &'static str);

/// How an injection point expects its dependency to be wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    /// The dependency is injected directly (`Arc<T>`)
    Direct,
    /// The dependency is injected as a `Provider<T>` for deferred resolution
    Provider,
    /// The dependency is injected as `Option<Arc<T>>`
    Optional,
    /// The dependency is injected as `Vec<Arc<T>>`, one per matching component
    Collection,
}

/// The syntactic position of an injection point within its owning component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionKind {
    /// A positional constructor argument
    ConstructorArg {
        /// Zero-based argument index
        index: usize,
    },
    /// A named struct field
    Field {
        /// The field name
        name: &'static str,
    },
    /// A setter-style parameter (used by field-injection mode)
    SetterParam {
        /// The generated setter name (`__di_set_<field>`)
        setter_name: &'static str,
    },
    /// An argument to an `@Bean`-style factory method
    FactoryMethodArg {
        /// The factory method name
        method: &'static str,
        /// Zero-based argument index
        index: usize,
    },
}

/// A single point where a dependency is injected into a component
#[derive(Debug, Clone, Copy)]
pub struct InjectionPointDef {
    /// The component this injection point belongs to
    pub owner_type_id: fn() -> TypeId,
    /// Where in the owner this injection point sits
    pub kind: InjectionKind,
    /// The requested dependency's `TypeId`
    pub requested_type: fn() -> TypeId,
    /// The requested dependency's human-readable type name
    pub requested_type_name: &'static str,
    /// An optional qualifier narrowing which candidate satisfies this point
    pub qualifier: Option<Qualifier>,
    /// How the dependency should be wrapped when injected
    pub wrapper: Wrapper,
    /// Whether resolution must succeed (ignored for `Optional`/`Collection`)
    pub required: bool,
}

/// What produces a component instance
#[derive(Debug, Clone)]
pub enum Producer {
    /// A plain `#[derive(Component)]` constructor
    Component {
        /// The produced type's id
        type_id: fn() -> TypeId,
    },
    /// An `@Bean`-style factory method on another component
    FactoryMethod {
        /// The owning component's type id
        owner: fn() -> TypeId,
        /// The factory method name
        method: &'static str,
        /// The parameter types the factory method needs, in order
        params: Vec<fn() -> TypeId>,
    },
}

/// How a list of names in a [`Condition`] must be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every listed name must satisfy the condition
    All,
    /// At least one listed name must satisfy the condition
    Any,
}

/// A condition gating whether a component is registered
#[derive(Debug, Clone)]
pub enum Condition {
    /// Requires a named property to hold a given value, or merely to be
    /// present, or tolerates its absence
    PropertyMatch {
        /// The property name
        name: &'static str,
        /// The expected value; `None` means "present with any value"
        expected: Option<&'static str>,
        /// Whether a missing property should still satisfy the condition
        match_if_missing: bool,
    },
    /// Requires a type name to be registered in the component graph
    ClassPresence {
        /// The type name that must be present
        type_name: &'static str,
    },
    /// Requires none of the given type/bean names to be registered
    MissingBean {
        /// The type/bean names that must all be absent
        type_names: &'static [&'static str],
    },
    /// Requires the given type/bean names to already be registered,
    /// according to `strategy`
    PresentBean {
        /// The type/bean names to check
        type_names: &'static [&'static str],
        /// Whether all names must be present, or merely one of them
        strategy: Strategy,
    },
    /// Requires the active profile set to match the given profiles,
    /// according to `strategy`
    ProfileMatch {
        /// The profile names to check
        profiles: &'static [&'static str],
        /// Whether all profiles must be active, or merely one of them
        strategy: Strategy,
    },
}

/// Generalized component definition collected via `inventory`
///
/// This is the single source of truth `#[derive(Component)]` emits. It
/// replaces the narrower definition the container used to consume directly;
/// the resolver, registry, condition evaluator, scope engine and lifecycle
/// processor all read from this type instead of re-deriving the same
/// information from scattered fields.
pub struct ComponentDefinition {
    /// Function returning this component's `TypeId`
    pub type_id: fn() -> TypeId,
    /// Human-readable type name
    pub type_name: &'static str,
    /// Optional explicit component name (independent of any qualifier)
    pub component_name: Option<&'static str>,
    /// Qualifiers this component satisfies
    pub qualifiers: &'static [&'static str],
    /// Whether this component is the default pick among ambiguous candidates
    pub primary: bool,
    /// Whether construction is deferred until first use
    pub lazy: bool,
    /// Relative construction order (ascending) among tied candidates
    pub order: i32,
    /// Relative destruction order (ascending) during teardown
    pub destroy_order: i32,
    /// The scope this component is created in (e.g. `"singleton"`)
    pub scope_id: &'static str,
    /// Explicit `@DependsOn`-style ordering constraints, by type name
    pub depends_on: &'static [&'static str],
    /// Conditions gating registration, evaluated during boot
    pub conditions: fn() -> Vec<Condition>,
    /// Injection points this component declares
    pub injection_points: fn() -> Vec<InjectionPointDef>,
    /// Supertypes/interfaces this component is registered under
    pub implemented_interfaces: fn() -> Vec<TypeId>,
    /// Casts a constructed instance to one of `implemented_interfaces`,
    /// returning it boxed as `dyn Any` so a caller can downcast the box to
    /// the concrete `Arc<dyn Trait>` it asked for. Returns `None` when
    /// `interface` isn't one of this component's declared interfaces.
    pub cast_to_interface:
        fn(&Arc<dyn std::any::Any + Send + Sync>, TypeId) -> Option<Box<dyn std::any::Any + Send + Sync>>,
    /// Builds an instance from its resolved dependencies
    pub creator:
        fn(deps: HashMap<TypeId, ComponentInstance>) -> Result<ComponentInstance, ComponentError>,
    /// Optional `@PostConstruct` callback
    pub post_construct: Option<fn(&Arc<dyn std::any::Any + Send + Sync>) -> Result<(), String>>,
    /// Optional `InitializingBean`-style `after-properties-set` callback,
    /// invoked after post processors and `@PostConstruct` during `refresh`
    pub after_properties_set: Option<fn(&Arc<dyn std::any::Any + Send + Sync>) -> Result<(), String>>,
    /// Optional `@PreDestroy` callback
    pub pre_destroy: Option<fn(&Arc<dyn std::any::Any + Send + Sync>) -> Result<(), String>>,
    /// `Some(phase)` for a smart-lifecycle bean (ascending start/descending
    /// stop by phase); `None` with `lifecycle_start`/`lifecycle_stop` set
    /// marks a plain lifecycle bean (no phase ordering)
    pub lifecycle_phase: Option<i32>,
    /// Optional `Lifecycle::start` callback
    pub lifecycle_start: Option<fn(&Arc<dyn std::any::Any + Send + Sync>) -> Result<(), String>>,
    /// Optional `Lifecycle::stop` callback
    pub lifecycle_stop: Option<fn(&Arc<dyn std::any::Any + Send + Sync>) -> Result<(), String>>,
}

inventory::collect!(ComponentDefinition);

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    struct Leaf;

    fn leaf_creator(
        _deps: HashMap<TypeId, ComponentInstance>,
    ) -> Result<ComponentInstance, ComponentError> {
        Ok(Arc::new(Leaf {}))
    }

    #[test]
    fn definition_fields_are_reachable_through_fn_pointers() {
        let def = ComponentDefinition {
            type_id: || TypeId::of::<Leaf>(),
            type_name: "Leaf",
            component_name: None,
            qualifiers: &[],
            primary: false,
            lazy: false,
            order: 0,
            destroy_order: 0,
            scope_id: "singleton",
            depends_on: &[],
            conditions: Vec::new,
            injection_points: Vec::new,
            implemented_interfaces: Vec::new,
            cast_to_interface: |_instance, _interface| None,
            creator: leaf_creator,
            post_construct: None,
            after_properties_set: None,
            pre_destroy: None,
            lifecycle_phase: None,
            lifecycle_start: None,
            lifecycle_stop: None,
        };

        assert_eq!((def.type_id)(), TypeId::of::<Leaf>());
        assert!((def.conditions)().is_empty());
        assert!((def.creator)(HashMap::new()).is_ok());
    }

    #[test]
    fn injection_point_wrapper_kinds_are_distinct() {
        let direct = Wrapper::Direct;
        let provider = Wrapper::Provider;
        assert_ne!(direct, provider);
    }
}

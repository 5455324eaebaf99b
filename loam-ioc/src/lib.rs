//! Loam IoC container - the core dependency injection engine of Loam
//!
//! This crate is the resolver runtime: it discovers `#[derive(Component)]`
//! definitions via `inventory`, evaluates their conditions, resolves the
//! dependency graph, constructs and caches instances through a pluggable
//! scope engine, and drives them through a Spring-style
//! `refresh -> start -> stop -> destroy` lifecycle.
//!
//! ## Boot pipeline
//!
//! * [`condition`] decides which components are even in play, evaluating
//!   `@ConditionalOnProperty`/`@ConditionalOnClass`/`@ConditionalOnBean`/
//!   `@ConditionalOnMissingBean`/`@Profile`-style conditions in a fixed order.
//! * [`resolver`] builds the "A needs B" graph from every surviving
//!   component and topologically sorts it, aggregating every unsatisfied or
//!   ambiguous dependency and fatal cycle instead of failing on the first.
//! * [`registry`] freezes the result into a dense, index-addressable
//!   [`registry::IndexedRegistry`] the rest of the crate resolves through.
//! * [`scope`] caches (or doesn't) constructed instances per scope:
//!   singleton, prototype, request, session, or a custom SPI scope.
//! * [`lifecycle`] runs post processors and `@PostConstruct`/
//!   `@PostInitialize`/`@OnStart`/`@OnStop`/`@PreDestroy` callbacks around
//!   construction and phase transitions.
//! * [`container`] is the facade tying all of the above together:
//!   [`Container::boot`] runs the whole pipeline and hands back a ready
//!   [`Container`] callers resolve components through.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loam_ioc::Container;
//!
//! let container = Container::boot(&environment)?;
//! let service: Arc<DatabaseService> = container.get()?;
//! ```

mod component;
mod condition;
mod container;
mod event;
mod ir;
mod lifecycle;
mod registry;
mod resolver;
mod scope;

pub use component::ComponentInstance;
pub use condition::{ClassPresenceOracle, Excluded, EnvironmentSource};
pub use container::{BootError, Container, Provider};
pub use event::{
    ContainerLifecycleEvent, LifecycleEventPublisher, LifecycleListener, LifecycleListenerDefinition,
};
pub use ir::{
    Condition, ComponentDefinition, InjectionKind, InjectionPointDef, Producer, Qualifier, Strategy, Wrapper,
};
pub use lifecycle::{
    AnyInstance, BeanPostProcessor, InitializingBean, Lifecycle, LifecycleProcessor, OnStartCallback,
    OnStopCallback, PhaseCallback, PostConstruct, PostInitializeCallback, PreDestroy, SmartLifecycle,
};
pub use registry::{ComponentFactory, DefinitionFactory, IndexedRegistry, Registry};
pub use resolver::{BootReport, GraphResolver};
pub use scope::{
    PrototypeScope, RequestScope, Scope, ScopeProviderDefinition, SessionScope, SingletonScope,
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_REQUEST_BEAN_LIMIT, DEFAULT_SESSION_TIMEOUT_SECS,
};

// `lifecycle_listener!` (event.rs) and `register_scope_provider!` (scope.rs)
// are both `#[macro_export]`, which already places them at this crate's
// root (`loam_ioc::lifecycle_listener!`, `loam_ioc::register_scope_provider!`)
// without a `pub use` here.

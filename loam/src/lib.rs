//! # Loam
//!
//! Loam is a compile-time dependency-injection container for Rust: a
//! `#[derive(Component)]`'d struct is discovered via `inventory`, wired into
//! a dependency graph at boot, conditionally filtered, and handed to a
//! pluggable scope engine, all without runtime reflection.
//!
//! ## Core Features
//!
//! - **Dependency Injection**: constructor- and field-level `#[autowired]`
//!   injection, resolved through an index-addressed registry
//! - **Conditional Registration**: `#[conditional_on_property]`,
//!   `#[conditional_on_class]`, `#[conditional_on_missing_bean]`,
//!   `#[conditional_on_present_bean]`, `#[conditional_on_profile]`
//! - **Scopes**: `singleton`, `prototype`, `request`, `session`, and custom
//!   scopes registered through an SPI
//! - **Lifecycle**: post-processors, `@PostConstruct`/`@PreDestroy`,
//!   `@PostInitialize`/`@OnStart`/`@OnStop`, and container lifecycle events
//! - **Application Context**: configuration-driven bootstrapping that seeds
//!   the container with a `ConfigManager` and any `#[derive(Configuration)]`
//!   structs before the graph resolves
//!
//! ## Quick Start
//!
//! Add Loam to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! loam = "0.0.1"
//! inventory = "0.3"  # Required for component discovery
//! ```
//!
//! ### Building Your First Application
//!
//! ```rust,ignore
//! use loam::{ApplicationContext, Component};
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct DatabaseService {
//!     connection_string: String,
//! }
//!
//! #[derive(Component)]
//! struct UserService {
//!     #[autowired]
//!     db: Arc<DatabaseService>,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ApplicationContext::builder()
//!         .with_property("app.name", "MyApp")
//!         .build()?;
//!
//!     context.initialize()?;
//!
//!     let user_service: Arc<UserService> = context
//!         .get_component()
//!         .ok_or("UserService not found")?;
//!
//!     if let Some(container) = context.container() {
//!         container.shutdown();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Using the IoC container directly
//!
//! ```rust,ignore
//! use loam::{Component, Container};
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct UserService {
//!     #[autowired]
//!     repository: Arc<UserRepository>,
//! }
//!
//! #[derive(Component)]
//! struct UserRepository;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let environment = loam::config::ConfigManager::new();
//!     let container = Container::boot(&environment)?;
//!
//!     let user_service: Arc<UserService> = container.get()?;
//!     container.shutdown();
//!     Ok(())
//! }
//! ```

// Re-export the derive macros
pub use loam_macros::Component;
pub use loam_macros::Configuration;

// Re-export error handling types
pub use loam_core::error;

// Re-export the IoC container: boot pipeline, facade, scope/lifecycle SPI
pub use loam_ioc::{
    lifecycle_listener, register_scope_provider, BootError, BootReport, ComponentDefinition,
    ComponentFactory, ComponentInstance, Condition, Container, ContainerLifecycleEvent,
    GraphResolver, IndexedRegistry, InitializingBean, InjectionKind, InjectionPointDef, Lifecycle,
    LifecycleEventPublisher, LifecycleListener, LifecycleListenerDefinition, PostConstruct,
    PreDestroy, Producer, Provider, Qualifier, Scope, SmartLifecycle, Strategy, Wrapper,
};

// Re-export the bytecode weaver
pub use loam_weave::{weave_class, weave_directory, WeaveResult};

// Re-export context module types and traits
pub use loam_context::{config, event, ApplicationContext, ContextResult};

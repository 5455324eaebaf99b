//! Loam Procedural Macros - Annotation Processing for Loam
//!
//! This crate provides the procedural macros that drive Loam's
//! declarative, annotation-style programming model: `#[derive(Component)]`
//! and `#[derive(Configuration)]` expand into `inventory::submit!`
//! registrations the rest of the framework discovers at boot without any
//! build-time code generation step of its own.
//!
//! # Macros
//!
//! * `#[derive(Component)]` - generates a hidden constructor function and
//!   submits a `loam_ioc::ComponentDefinition` describing the component's
//!   scope, qualifiers, conditions and injection points
//! * `#[derive(Configuration)]` - binds a struct from a `ConfigManager`
//!   under a dotted key prefix
//!
//! # Attributes
//!
//! * `#[autowired]` - marks an `Arc<T>` or `Option<Arc<T>>` field for
//!   automatic dependency injection, optionally narrowed with
//!   `#[autowired(qualifier = "...")]`
//! * `#[component(...)]` - component configuration: `name`, `scope`,
//!   `qualifier`, `order`, `destroy_order`, `primary`, `lazy`,
//!   `field_injection`, `depends_on(...)`
//! * `#[conditional_on_property]`, `#[conditional_on_class]`,
//!   `#[conditional_on_missing_bean]`, `#[conditional_on_present_bean]`,
//!   `#[conditional_on_profile]` - attach a boot-time condition
//!
//! # Examples
//!
//! ```rust
//! use loam::Component;
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
//!     cache_size: usize,
//! }
//! ```
//!
//! The `#[derive(Component)]` macro will:
//!
//! 1. Generate a hidden `__loam_create` constructor that pulls each
//!    `#[autowired]` dependency out of a type-keyed instance map
//! 2. Submit a `ComponentDefinition` to the `inventory`-backed registry
//! 3. Leave every non-autowired field to `Default::default()`, or `None`
//!    for `Option<T>`

mod component;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro for automatic component registration and dependency injection
///
/// The `Component` derive macro generates a hidden constructor and submits a
/// `ComponentDefinition` to the `inventory`-backed registry the `loam-ioc`
/// resolver discovers at boot. It wires up dependency injection for fields
/// marked with `#[autowired]` and initializes every other field with
/// `Default::default()` (or `None` for `Option<T>`).
///
/// # Attributes
///
/// * `#[autowired]` - Marks a field for automatic dependency injection. The
///   field must be `Arc<T>` or `Option<Arc<T>>`, optionally narrowed with
///   `#[autowired(qualifier = "...")]`
/// * `#[component(scope = "...")]` - Sets the component scope (defaults to
///   `"singleton"`); also accepts `name`, `qualifier`, `order`,
///   `destroy_order`, `primary`, `lazy`, `field_injection`, `depends_on(...)`
///
/// # Field Initialization Rules
///
/// 1. **Autowired fields**: Automatically injected by the container
/// 2. **Option fields**: Initialized to `None`
/// 3. **Other fields**: Initialized using `Default::default()`
///
/// # Examples
///
/// ```rust
/// use loam::Component;
/// use std::sync::Arc;
///
/// // Simple component with no dependencies
/// #[derive(Component)]
/// struct ConfigService {
///     config_path: String, // Will be initialized with Default::default() = ""
///     port: u16,           // Will be initialized with Default::default() = 0
/// }
///
/// // Component with dependencies
/// #[derive(Component)]
/// struct DatabaseService {
///     #[autowired]
///     config: Arc<ConfigService>, // Automatically injected
///     optional_cache: Option<String>, // Initialized to None
///     connection_pool_size: usize,    // Default::default() = 0
/// }
///
/// // Component with a custom scope
/// #[derive(Component)]
/// #[component(scope = "prototype")]
/// struct RequestHandler {
///     #[autowired]
///     db: Arc<DatabaseService>,
///     request_id: String,
/// }
/// ```
///
/// # Generated Code
///
/// The macro generates a hidden `__loam_create` constructor and registers
/// the component's `ComponentDefinition` with the `inventory` crate.
///
/// # Panics
///
/// The macro will produce compile-time errors in the following cases:
///
/// * Applying to enums or unions (only structs with named fields are supported)
/// * Using `#[autowired]` on fields that are not `Arc<T>`
/// * Invalid syntax in component attributes
#[proc_macro_derive(Component, attributes(component, autowired))]
pub fn component_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    component::impl_component_derive(&ast).into()
}

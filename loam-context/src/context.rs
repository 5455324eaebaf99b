//! Application context implementation
//!
//! This module provides the main `ApplicationContext` implementation that serves as the
//! central hub for application-wide state, configuration, environment management, and
//! integration with the IoC container.

use crate::config::{ConfigFactory, ConfigManager, ConfigSource, ConfigValue};
use crate::error::{ContextError, ContextResult};
use crate::event::{
    ConfigurationChangedEvent, ContextAwareEventListener, ContextInitializedEvent,
    ContextInitializingEvent, Event, EventListener, EventPublisher, ProfileActivatedEvent,
};
use crate::profile::Profile;
use dashmap::DashMap;
use loam_ioc::{AnyInstance, Container};
use parking_lot::RwLock;
use std::any::TypeId;
use std::path::Path;
use std::sync::Arc;

/// Application context builder
///
/// `ApplicationContextBuilder` provides a fluent API for constructing
/// an `ApplicationContext` with various configuration sources, profiles,
/// and settings.
///
/// # Examples
///
/// ```rust
/// use loam_context::{ApplicationContextBuilder, Profile};
/// use std::collections::HashMap;
///
/// // Create the profile first
/// let profile = Profile::new("development", HashMap::new());
///
/// let context = ApplicationContextBuilder::new()
///     .with_profile(profile)
///     .with_active_profile("development")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ApplicationContextBuilder {
    config_sources: Vec<ConfigSource>,
    active_profiles: Vec<String>,
    profiles: Vec<Profile>,
    properties: std::collections::HashMap<String, String>,
}

impl ApplicationContextBuilder {
    /// Creates a new application context builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            config_sources: Vec::new(),
            active_profiles: Vec::new(),
            profiles: Vec::new(),
            properties: std::collections::HashMap::new(),
        }
    }

    /// Adds a configuration source
    ///
    /// # Arguments
    ///
    /// * `source` - The configuration source to add
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContextBuilder, ConfigSource};
    /// use std::collections::HashMap;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_config_source(ConfigSource::Environment);
    /// ```
    pub fn with_config_source(mut self, source: ConfigSource) -> Self {
        self.config_sources.push(source);
        self
    }

    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_toml_config_file("config/app.toml");
    /// ```
    pub fn with_toml_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path_str = path.as_ref().to_string_lossy().to_string();
        self.config_sources.push(ConfigSource::TomlFile(path_str));
        self
    }

    /// Loads configuration from a YAML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_yaml_config_file("config/app.yaml");
    /// ```
    pub fn with_yaml_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path_str = path.as_ref().to_string_lossy().to_string();
        self.config_sources.push(ConfigSource::YamlFile(path_str));
        self
    }

    /// Loads configuration from a Properties file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Properties configuration file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_properties_config_file("config/app.properties");
    /// ```
    pub fn with_properties_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path_str = path.as_ref().to_string_lossy().to_string();
        self.config_sources
            .push(ConfigSource::PropertiesFile(path_str));
        self
    }

    /// Loads configuration from a file with automatic format detection
    ///
    /// The format is detected based on the file extension:
    /// - `.toml` -> TOML format
    /// - `.yaml` or `.yml` -> YAML format  
    /// - `.properties` -> Properties format
    /// - Others -> Attempts to parse as TOML first, then YAML, then Properties
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_config_file("config/app.yaml")
    ///     .with_config_file("config/database.properties")
    ///     .with_config_file("config/server.toml");
    /// ```
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path_str = path.as_ref().to_string_lossy().to_string();
        self.config_sources.push(ConfigSource::ConfigFile(path_str));
        self
    }

    /// Sets an active profile
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile name to activate
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_active_profile("production");
    /// ```
    pub fn with_active_profile(mut self, profile: impl Into<String>) -> Self {
        self.active_profiles.push(profile.into());
        self
    }

    /// Adds a profile
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile to add
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContextBuilder, Profile};
    /// use std::collections::HashMap;
    ///
    /// let profile = Profile::new("test", HashMap::new());
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_profile(profile);
    /// ```
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Sets a property value
    ///
    /// # Arguments
    ///
    /// * `key` - The property key
    /// * `value` - The property value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContextBuilder;
    ///
    /// let builder = ApplicationContextBuilder::new()
    ///     .with_property("app.name", "MyApplication");
    /// ```
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Builds the application context
    ///
    /// # Returns
    ///
    /// A new `ApplicationContext` instance configured with the specified settings
    ///
    /// # Errors
    ///
    /// Returns an error if context initialization fails
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContextBuilder, Profile};
    /// use std::collections::HashMap;
    ///
    /// // Create the profile first
    /// let profile = Profile::new("development", HashMap::new());
    ///
    /// let context = ApplicationContextBuilder::new()
    ///     .with_profile(profile)
    ///     .with_active_profile("development")
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn build(self) -> ContextResult<ApplicationContext> {
        let context = ApplicationContext::new();

        // Add configuration sources
        for source in self.config_sources {
            context.config_manager.add_source(source)?;
        }

        // Add properties as a configuration source
        if !self.properties.is_empty() {
            context
                .config_manager
                .add_source(ConfigSource::Properties(self.properties))?;
        }

        // Add profiles
        for profile in self.profiles {
            context
                .config_manager
                .profile_manager_mut()
                .add_profile(profile)?;
        }

        // Activate profiles
        for profile_name in self.active_profiles {
            context
                .config_manager
                .profile_manager_mut()
                .activate_profile(&profile_name)?;

            // Get properties count for the activated profile
            let properties_count = context
                .config_manager
                .profile_manager()
                .get_profile_properties_count(&profile_name);

            // Publish profile activated event
            let event = ProfileActivatedEvent {
                profile_name: profile_name.clone(),
                properties_count,
                timestamp: std::time::SystemTime::now(),
            };
            context.event_publisher.publish(&event);
        }

        Ok(context)
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application context
///
/// `ApplicationContext` serves as the central hub for application-wide services,
/// configuration, environment management, and integration with the IoC container.
/// It provides a unified interface for accessing all framework services.
///
/// # Examples
///
/// ```rust
/// use loam_context::ApplicationContext;
///
/// let context = ApplicationContext::builder()
///     .with_property("app.name", "MyApp")
///     .build()
///     .unwrap();
///
/// // Access configuration
/// let app_name = context.get_config("app.name");
///
/// // Access IoC container
/// let container = context.container();
/// ```
pub struct ApplicationContext {
    /// Configuration manager
    config_manager: Arc<ConfigManager>,
    /// Event publisher for application-wide events
    event_publisher: EventPublisher,
    /// IoC container, populated once `initialize` boots it. `Container`'s
    /// conditional registration and dependency graph are evaluated once at
    /// boot, so there is no empty container to hand back before that point.
    container: RwLock<Option<Arc<Container>>>,
    /// Application properties cache
    properties_cache: DashMap<String, ConfigValue>,
}

impl ApplicationContext {
    /// Creates a new application context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let context = ApplicationContext::new();
    /// ```
    pub fn new() -> Self {
        Self {
            config_manager: Arc::new(ConfigManager::new()),
            event_publisher: EventPublisher::new(),
            container: RwLock::new(None),
            properties_cache: DashMap::new(),
        }
    }

    /// Creates a builder for constructing an application context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let context = ApplicationContext::builder()
    ///     .with_property("app.version", "1.0.0")
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }
    /// Builds the externally-constructed instances the IoC container should
    /// treat as already-satisfied dependencies when it boots: the
    /// `ConfigManager` itself, plus one instance per `#[derive(Configuration)]`
    /// struct discovered via `inventory`. These never go through the
    /// conditional/dependency-graph pipeline themselves; components depend
    /// on them as ordinary `#[autowired]` fields regardless.
    fn initialize_early(&self) -> ContextResult<Vec<(TypeId, AnyInstance)>> {
        let mut externals: Vec<(TypeId, AnyInstance)> =
            vec![(TypeId::of::<ConfigManager>(), self.config_manager.clone())];

        for factory in inventory::iter::<ConfigFactory> {
            let config_component = (factory.create_fn)(self.config_manager.clone())?;
            externals.push(((factory.type_id)(), config_component));
        }
        Ok(externals)
    }

    /// Initializes the application context
    ///
    /// Boots the IoC container: conditional registration, dependency
    /// resolution, eager singleton construction, and the
    /// `refresh -> start` lifecycle phases all run here, seeded with the
    /// configuration manager and any `#[derive(Configuration)]` structs.
    ///
    /// # Returns
    ///
    /// `Ok(())` if initialization succeeds, an error otherwise
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let context = ApplicationContext::new();
    /// context.initialize().unwrap();
    /// ```
    pub fn initialize(&self) -> ContextResult<()> {
        let externals = self.initialize_early()?;
        // Publish context-initializing event at the start
        let initializing_event = ContextInitializingEvent {
            config_sources_count: self.config_manager.sources_count(),
            active_profiles_count: self
                .config_manager
                .profile_manager()
                .active_profiles()
                .len(),
            timestamp: std::time::SystemTime::now(),
        };
        self.event_publisher
            .publish_with_context(&initializing_event, self);

        let booted = Container::boot_with_externals(self.config_manager.as_ref(), externals)
            .map_err(|e| {
                ContextError::initialization_failed(format!(
                    "IoC container initialization failed: {}",
                    e
                ))
            })?;
        *self.container.write() = Some(booted);

        // Publish context initialized event at the end
        let initialized_event = ContextInitializedEvent {
            config_sources_count: self.config_manager.sources_count(),
            active_profiles_count: self
                .config_manager
                .profile_manager()
                .active_profiles()
                .len(),
            timestamp: std::time::SystemTime::now(),
        };
        self.event_publisher
            .publish_with_context(&initialized_event, self);

        Ok(())
    }

    /// Gets a configuration value by key
    ///
    /// # Arguments
    ///
    /// * `key` - The configuration key
    ///
    /// # Returns
    ///
    /// The configuration value as a string, or an empty string if not found
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, ConfigSource};
    /// use std::collections::HashMap;
    ///
    /// let mut context = ApplicationContext::new();
    ///
    /// let mut props = HashMap::new();
    /// props.insert("app.name".to_string(), "MyApp".to_string());
    /// context.add_config_source(ConfigSource::Properties(props)).unwrap();
    ///
    /// assert_eq!(context.get_config("app.name"), "MyApp");
    /// ```
    pub fn get_config(&self, key: &str) -> String {
        self.config_manager.get_string_or_default(key, "")
    }

    /// Gets a configuration value as a specific type
    ///
    /// # Arguments
    ///
    /// * `key` - The configuration key
    ///
    /// # Returns
    ///
    /// The configuration value parsed as the requested type
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or cannot be parsed as the requested type
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, ConfigSource};
    /// use std::collections::HashMap;
    ///
    /// let mut context = ApplicationContext::new();
    ///
    /// let mut props = HashMap::new();
    /// props.insert("app.port".to_string(), "8080".to_string());
    /// context.add_config_source(ConfigSource::Properties(props)).unwrap();
    ///
    /// let port: i64 = context.get_config_as("app.port").unwrap();
    /// assert_eq!(port, 8080);
    /// ```
    pub fn get_config_as<T>(&self, key: &str) -> ContextResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.config_manager.get_string(key)?;
        value
            .parse::<T>()
            .map_err(|e| ContextError::invalid_configuration(key, e.to_string()))
    }

    /// Gets a configuration value with a default
    ///
    /// # Arguments
    ///
    /// * `key` - The configuration key
    /// * `default` - The default value to return if key is not found
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let context = ApplicationContext::new();
    /// let port = context.get_config_or_default("app.port", "8080");
    /// assert_eq!(port, "8080");
    /// ```
    pub fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.config_manager.get_string_or_default(key, default)
    }

    /// Sets a configuration property
    ///
    /// # Arguments
    ///
    /// * `key` - The configuration key
    /// * `value` - The configuration value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let mut context = ApplicationContext::new();
    /// context.set_config("runtime.property", "runtime.value");
    ///
    /// assert_eq!(context.get_config("runtime.property"), "runtime.value");
    /// ```
    /// Sets a configuration property
    pub fn set_config(&self, key: &str, value: &str) {
        let old_value = self.get_config(key);
        let old_value_opt = if old_value.is_empty() {
            None
        } else {
            Some(old_value)
        };

        self.config_manager
            .set(key, ConfigValue::String(value.to_string()));

        let event = ConfigurationChangedEvent {
            key: key.to_string(),
            old_value: old_value_opt,
            new_value: value.to_string(),
            timestamp: std::time::SystemTime::now(),
        };
        self.event_publisher.publish(&event);
    }

    /// Adds a configuration source
    pub fn add_config_source(&self, source: ConfigSource) -> ContextResult<()> {
        self.config_manager.add_source(source)
    }

    /// Gets the IoC container, if `initialize` has booted it
    ///
    /// # Returns
    ///
    /// `None` until `initialize` has run; `Some` afterward
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    ///
    /// let context = ApplicationContext::new();
    /// assert!(context.container().is_none());
    /// context.initialize().unwrap();
    /// assert!(context.container().is_some());
    /// ```
    pub fn container(&self) -> Option<Arc<Container>> {
        self.container.read().clone()
    }

    /// Gets a shared reference to the ConfigManager for IoC registration
    pub fn config_manager(&self) -> Arc<ConfigManager> {
        self.config_manager.clone()
    }

    /// Gets a component from the IoC container
    ///
    /// Returns `None` before `initialize` has booted the container, as well
    /// as when nothing satisfies `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::ApplicationContext;
    /// use std::sync::Arc;
    ///
    /// let context = ApplicationContext::new();
    /// context.initialize().unwrap();
    ///
    /// let retrieved: Option<Arc<loam_context::ConfigManager>> = context.get_component();
    /// assert!(retrieved.is_some());
    /// ```
    pub fn get_component<T: 'static + Send + Sync>(&self) -> Option<Arc<T>> {
        self.container.read().as_ref()?.get_optional::<T>()
    }

    /// Publishes an event
    ///
    /// # Arguments
    ///
    /// * `event` - The event to publish
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, Event};
    /// use std::any::Any;
    ///
    /// #[derive(Debug, Clone)]
    /// struct MyEvent {
    ///     message: String,
    /// }
    ///
    /// impl Event for MyEvent {
    ///     fn name(&self) -> &'static str { "MyEvent" }
    ///     fn as_any(&self) -> &dyn Any { self }
    ///     fn into_any(self: Box<Self>) -> Box<dyn Any> { self }
    /// }
    ///
    /// let context = ApplicationContext::new();
    /// let event = MyEvent {
    ///     message: "Hello, World!".to_string(),
    /// };
    ///
    /// context.publish_event(&event);
    /// ```
    pub fn publish_event<T: Event + 'static>(&self, event: &T) {
        self.event_publisher.publish(event);
    }

    /// Subscribes to events with context access
    ///
    /// Context-aware listeners receive both the event and a reference to the ApplicationContext,
    /// allowing them to interact with the context during event handling.
    ///
    /// # Arguments
    ///
    /// * `listener` - The context-aware event listener to register
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, ContextInitializedEvent, ContextAwareEventListener};
    ///
    /// struct StartupListener;
    ///
    /// impl ContextAwareEventListener<ContextInitializedEvent> for StartupListener {
    ///     fn on_context_event(&self, event: &ContextInitializedEvent, context: &ApplicationContext) {
    ///         println!("Context initialized! App name: {}", context.get_config("app.name"));
    ///         println!("Active profiles: {:?}", context.active_profiles());
    ///     }
    /// }
    ///
    /// let mut context = ApplicationContext::new();
    /// context.subscribe_to_context_events(StartupListener);
    /// ```
    /// Subscribes to events with context access
    pub fn subscribe_to_context_events<
        T: Event + 'static,
        L: ContextAwareEventListener<T> + 'static,
    >(
        &self,
        listener: L,
    ) {
        self.event_publisher.subscribe_context_aware(listener);
    }
    ///
    /// # Arguments
    ///
    /// * `listener` - The event listener to register
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, Event, EventListener};
    /// use std::any::Any;
    ///
    /// #[derive(Debug, Clone)]
    /// struct TestEvent;
    ///
    /// impl Event for TestEvent {
    ///     fn name(&self) -> &'static str { "TestEvent" }
    ///     fn as_any(&self) -> &dyn Any { self }
    ///     fn into_any(self: Box<Self>) -> Box<dyn Any> { self }
    /// }
    ///
    /// struct TestListener;
    ///
    /// impl EventListener<TestEvent> for TestListener {
    ///     fn on_event(&self, _event: &TestEvent) {
    ///         println!("Event received!");
    ///     }
    /// }
    ///
    /// let mut context = ApplicationContext::new();
    /// context.subscribe_to_events(TestListener);
    /// ```
    /// Subscribes to events
    pub fn subscribe_to_events<T: Event + 'static, L: EventListener<T> + 'static>(
        &self,
        listener: L,
    ) {
        self.event_publisher.subscribe(listener);
    }

    /// Gets the active profiles
    pub fn active_profiles(&self) -> Vec<String> {
        self.config_manager.profile_manager().active_profiles().to_vec()
    }

    /// Checks if a specific profile is active
    ///
    /// # Arguments
    ///
    /// * `profile_name` - The profile name to check
    ///
    /// # Returns
    ///
    /// `true` if the profile is active, `false` otherwise
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, Profile};
    /// use std::collections::HashMap;
    ///
    /// // Create the profiles first
    /// let prod_profile = Profile::new("production", HashMap::new());
    /// let dev_profile = Profile::new("development", HashMap::new());
    ///
    /// let context = ApplicationContext::builder()
    ///     .with_profile(prod_profile)
    ///     .with_profile(dev_profile)
    ///     .with_active_profile("production")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(context.is_profile_active("production"));
    /// assert!(!context.is_profile_active("development"));
    /// ```
    pub fn is_profile_active(&self, profile_name: &str) -> bool {
        self.active_profiles().contains(&profile_name.to_string())
    }

    /// Gets environment information
    ///
    /// # Returns
    ///
    /// A string representing the current environment (based on active profiles)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use loam_context::{ApplicationContext, Profile};
    /// use std::collections::HashMap;
    ///
    /// // Create the profile first
    /// let profile = Profile::new("staging", HashMap::new());
    ///
    /// let context = ApplicationContext::builder()
    ///     .with_profile(profile)
    ///     .with_active_profile("staging")
    ///     .build()
    ///     .unwrap();
    ///
    /// println!("Environment: {}", context.environment());
    /// ```
    pub fn environment(&self) -> String {
        let profiles = self.active_profiles();
        if profiles.is_empty() {
            "default".to_string()
        } else {
            profiles.join(",")
        }
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Scope engine
//!
//! Generalizes the container's old `ComponentScope` enum (which the
//! container only ever branched on to decide "cache in the `DashMap` or
//! not") into a trait object scope registry, so new scopes can be added
//! without touching the container. `SingletonScope` additionally
//! serializes concurrent creation of the same key, a guarantee a plain
//! unconditional-insert `DashMap` never made.

use dashmap::DashMap;
use loam_core::error::scope::ScopeError;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Default bean-per-request cap (matches the host's default policy)
pub const DEFAULT_REQUEST_BEAN_LIMIT: usize = 1000;
/// Default concurrent-request cap (matches the host's default policy)
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10_000;
/// Default session idle timeout (matches the host's default policy)
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 30 * 60;

type Instance = Arc<dyn Any + Send + Sync>;

/// A strategy for caching (or not caching) component instances by key
///
/// Implemented by the built-in `SingletonScope`/`PrototypeScope`/
/// `RequestScope`/`SessionScope`, and by any type registered via
/// `Container::register_scope` or discovered through the
/// `register_scope_provider!` SPI, mirroring how the container's lifecycle
/// listeners are discovered via `inventory`.
pub trait Scope: Send + Sync {
    /// The scope's unique id (e.g. `"singleton"`, `"request"`)
    fn id(&self) -> &'static str;

    /// Returns a cached instance for `(context_key, type_id)`, or creates one
    /// with `create` and caches it according to this scope's policy
    fn get(
        &self,
        context_key: &str,
        type_id: TypeId,
        create: &dyn Fn() -> Result<Instance, ScopeError>,
    ) -> Result<Instance, ScopeError>;

    /// Removes a cached instance, returning it if present
    fn remove(&self, context_key: &str, type_id: TypeId) -> Option<Instance>;

    /// Drops every instance cached under `context_key` (e.g. end of request)
    fn destroy(&self, context_key: &str);

    /// Whether this scope currently has an active context for `context_key`
    fn is_active(&self, context_key: &str) -> bool;
}

/// Creates exactly one instance per key and serves it to every subsequent
/// caller; concurrent `get`s for an unresolved key block on the first
/// creator rather than racing
pub struct SingletonScope {
    instances: DashMap<TypeId, Instance>,
    creation_locks: DashMap<TypeId, Arc<Mutex<()>>>,
}

impl Default for SingletonScope {
    fn default() -> Self {
        Self::new()
    }
}

impl SingletonScope {
    /// Creates an empty singleton scope
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
            creation_locks: DashMap::new(),
        }
    }
}

impl Scope for SingletonScope {
    fn id(&self) -> &'static str {
        "singleton"
    }

    fn get(
        &self,
        _context_key: &str,
        type_id: TypeId,
        create: &dyn Fn() -> Result<Instance, ScopeError>,
    ) -> Result<Instance, ScopeError> {
        if let Some(existing) = self.instances.get(&type_id) {
            return Ok(existing.clone());
        }

        let lock = self
            .creation_locks
            .entry(type_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        // Re-check: another thread may have finished creating while we waited.
        if let Some(existing) = self.instances.get(&type_id) {
            return Ok(existing.clone());
        }

        let instance = create()?;
        self.instances.insert(type_id, instance.clone());
        Ok(instance)
    }

    fn remove(&self, _context_key: &str, type_id: TypeId) -> Option<Instance> {
        self.instances.remove(&type_id).map(|(_, v)| v)
    }

    fn destroy(&self, _context_key: &str) {
        self.instances.clear();
    }

    fn is_active(&self, _context_key: &str) -> bool {
        true
    }
}

/// Never caches; every `get` constructs a fresh instance
#[derive(Default)]
pub struct PrototypeScope;

impl Scope for PrototypeScope {
    fn id(&self) -> &'static str {
        "prototype"
    }

    fn get(
        &self,
        _context_key: &str,
        _type_id: TypeId,
        create: &dyn Fn() -> Result<Instance, ScopeError>,
    ) -> Result<Instance, ScopeError> {
        create()
    }

    fn remove(&self, _context_key: &str, _type_id: TypeId) -> Option<Instance> {
        None
    }

    fn destroy(&self, _context_key: &str) {}

    fn is_active(&self, _context_key: &str) -> bool {
        true
    }
}

struct RequestBucket {
    instances: HashMap<TypeId, Instance>,
}

/// Caches instances per request id, enforcing a bean-per-request cap and a
/// concurrent-request cap
pub struct RequestScope {
    requests: DashMap<String, Mutex<RequestBucket>>,
    bean_limit: usize,
    max_concurrent: usize,
}

impl RequestScope {
    /// Creates a request scope with the fixed default caps
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_REQUEST_BEAN_LIMIT, DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Creates a request scope with explicit caps
    pub fn with_limits(bean_limit: usize, max_concurrent: usize) -> Self {
        Self {
            requests: DashMap::new(),
            bean_limit,
            max_concurrent,
        }
    }

    /// Opens a new request context, failing if the concurrent-request cap
    /// would be exceeded
    pub fn begin_request(&self, request_id: &str) -> Result<(), ScopeError> {
        if self.requests.len() >= self.max_concurrent && !self.requests.contains_key(request_id) {
            return Err(ScopeError::scope_bean_limit_exceeded(
                "request (concurrent)",
                self.max_concurrent,
            ));
        }
        self.requests.insert(
            request_id.to_string(),
            Mutex::new(RequestBucket {
                instances: HashMap::new(),
            }),
        );
        Ok(())
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for RequestScope {
    fn id(&self) -> &'static str {
        "request"
    }

    fn get(
        &self,
        context_key: &str,
        type_id: TypeId,
        create: &dyn Fn() -> Result<Instance, ScopeError>,
    ) -> Result<Instance, ScopeError> {
        let bucket_ref = self
            .requests
            .get(context_key)
            .ok_or_else(|| ScopeError::no_request_context(context_key))?;
        let mut bucket = bucket_ref.lock();

        if let Some(existing) = bucket.instances.get(&type_id) {
            return Ok(existing.clone());
        }

        if bucket.instances.len() >= self.bean_limit {
            return Err(ScopeError::scope_bean_limit_exceeded("request", self.bean_limit));
        }

        let instance = create()?;
        bucket.instances.insert(type_id, instance.clone());
        Ok(instance)
    }

    fn remove(&self, context_key: &str, type_id: TypeId) -> Option<Instance> {
        self.requests
            .get(context_key)
            .and_then(|bucket| bucket.lock().instances.remove(&type_id))
    }

    fn destroy(&self, context_key: &str) {
        self.requests.remove(context_key);
    }

    fn is_active(&self, context_key: &str) -> bool {
        self.requests.contains_key(context_key)
    }
}

struct SessionBucket {
    instances: HashMap<TypeId, Instance>,
    last_accessed: Instant,
}

/// Caches instances per session id, enforcing a bean-per-session cap and an
/// idle timeout
pub struct SessionScope {
    sessions: DashMap<String, Mutex<SessionBucket>>,
    bean_limit: usize,
    timeout_secs: u64,
}

impl SessionScope {
    /// Creates a session scope with the fixed default timeout
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_REQUEST_BEAN_LIMIT, DEFAULT_SESSION_TIMEOUT_SECS)
    }

    /// Creates a session scope with explicit caps
    pub fn with_limits(bean_limit: usize, timeout_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            bean_limit,
            timeout_secs,
        }
    }

    fn is_expired(&self, bucket: &SessionBucket) -> bool {
        bucket.last_accessed.elapsed().as_secs() > self.timeout_secs
    }
}

impl Default for SessionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for SessionScope {
    fn id(&self) -> &'static str {
        "session"
    }

    fn get(
        &self,
        context_key: &str,
        type_id: TypeId,
        create: &dyn Fn() -> Result<Instance, ScopeError>,
    ) -> Result<Instance, ScopeError> {
        let bucket_ref = self
            .sessions
            .entry(context_key.to_string())
            .or_insert_with(|| {
                Mutex::new(SessionBucket {
                    instances: HashMap::new(),
                    last_accessed: Instant::now(),
                })
            });
        let mut bucket = bucket_ref.lock();

        if self.is_expired(&bucket) {
            return Err(ScopeError::session_expired(context_key));
        }
        bucket.last_accessed = Instant::now();

        if let Some(existing) = bucket.instances.get(&type_id) {
            return Ok(existing.clone());
        }

        if bucket.instances.len() >= self.bean_limit {
            return Err(ScopeError::scope_bean_limit_exceeded("session", self.bean_limit));
        }

        let instance = create()?;
        bucket.instances.insert(type_id, instance.clone());
        Ok(instance)
    }

    fn remove(&self, context_key: &str, type_id: TypeId) -> Option<Instance> {
        self.sessions
            .get(context_key)
            .and_then(|bucket| bucket.lock().instances.remove(&type_id))
    }

    fn destroy(&self, context_key: &str) {
        self.sessions.remove(context_key);
    }

    fn is_active(&self, context_key: &str) -> bool {
        self.sessions
            .get(context_key)
            .map(|b| !self.is_expired(&b.lock()))
            .unwrap_or(false)
    }
}

/// Static definition of a custom scope, discovered via `inventory` the same
/// way `LifecycleListenerDefinition` is
pub struct ScopeProviderDefinition {
    /// The scope id this provider registers
    pub scope_id: &'static str,
    /// Constructs the scope instance
    pub build: fn() -> Box<dyn Scope>,
}

inventory::collect!(ScopeProviderDefinition);

/// Registers a custom scope provider for discovery at boot
///
/// # Examples
///
/// ```rust,ignore
/// register_scope_provider!("tenant", || Box::new(TenantScope::new()));
/// ```
#[macro_export]
macro_rules! register_scope_provider {
    ($scope_id:expr, $build:expr) => {
        inventory::submit! {
            $crate::scope::ScopeProviderDefinition {
                scope_id: $scope_id,
                build: $build,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Marker;

    fn make(counter: &'static AtomicUsize) -> impl Fn() -> Result<Instance, ScopeError> + '_ {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Marker {}) as Instance)
        }
    }

    #[test]
    fn singleton_scope_creates_once() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let scope = SingletonScope::new();
        let creator = make(&COUNTER);

        let a = scope.get("ignored", TypeId::of::<Marker>(), &creator).unwrap();
        let b = scope.get("ignored", TypeId::of::<Marker>(), &creator).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prototype_scope_creates_every_time() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let scope = PrototypeScope;
        let creator = make(&COUNTER);

        let a = scope.get("ignored", TypeId::of::<Marker>(), &creator).unwrap();
        let b = scope.get("ignored", TypeId::of::<Marker>(), &creator).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(COUNTER.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn request_scope_requires_active_context() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let scope = RequestScope::new();
        let creator = make(&COUNTER);

        let err = scope.get("req-1", TypeId::of::<Marker>(), &creator).unwrap_err();
        assert!(matches!(err, ScopeError::NoRequestContext { .. }));

        scope.begin_request("req-1").unwrap();
        assert!(scope.get("req-1", TypeId::of::<Marker>(), &creator).is_ok());
        scope.destroy("req-1");
        assert!(!scope.is_active("req-1"));
    }

    #[test]
    fn request_scope_enforces_bean_limit() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let scope = RequestScope::with_limits(1, 10);
        scope.begin_request("req-1").unwrap();
        let creator = make(&COUNTER);

        assert!(scope.get("req-1", TypeId::of::<Marker>(), &creator).is_ok());
        struct Other;
        let err = scope
            .get("req-1", TypeId::of::<Other>(), &creator)
            .unwrap_err();
        assert!(matches!(err, ScopeError::ScopeBeanLimitExceeded { .. }));
    }

    #[test]
    fn session_scope_caches_until_destroyed() {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let scope = SessionScope::new();
        let creator = make(&COUNTER);

        let a = scope.get("sess-1", TypeId::of::<Marker>(), &creator).unwrap();
        let b = scope.get("sess-1", TypeId::of::<Marker>(), &creator).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(scope.is_active("sess-1"));
        scope.destroy("sess-1");
        assert!(!scope.is_active("sess-1"));
    }
}

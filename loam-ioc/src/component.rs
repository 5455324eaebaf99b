//! Component instance storage
//!
//! All components are stored as `Arc<dyn Any + Send + Sync>` regardless of
//! scope, so the registry, scope engine and lifecycle processor can pass
//! them around without knowing their concrete type until a caller downcasts.

use std::any::Any;
use std::sync::Arc;

/// Type alias for a type-erased component instance
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct SimpleComponent {
        value: i32,
    }

    #[test]
    fn component_instance_round_trips_through_downcast() {
        let instance: ComponentInstance = Arc::new(SimpleComponent { value: 123 });
        let downcasted = instance.downcast::<SimpleComponent>();
        assert!(downcasted.is_ok());
        assert_eq!(downcasted.unwrap().value, 123);
    }
}

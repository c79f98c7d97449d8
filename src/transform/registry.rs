use std::collections::HashMap;

use crate::transform::{GrayscaleTransform, IdentityTransform, Transform};

/// Registry for managing available frame transforms
///
/// The registry provides a central place to discover and instantiate
/// transforms. Transforms are registered by name and retrieved when a
/// pipeline job is assembled.
pub struct TransformRegistry {
    transforms: HashMap<String, Box<dyn Fn() -> Box<dyn Transform>>>,
}

impl TransformRegistry {
    /// Create a new registry with all built-in transforms
    pub fn new() -> Self {
        let mut registry = Self {
            transforms: HashMap::new(),
        };

        registry.register_builtin_transforms();
        registry
    }

    fn register_builtin_transforms(&mut self) {
        self.transforms.insert(
            "identity".to_string(),
            Box::new(|| Box::new(IdentityTransform::new())),
        );

        self.transforms.insert(
            "grayscale".to_string(),
            Box::new(|| Box::new(GrayscaleTransform::new())),
        );
    }

    /// Register a custom transform
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name for the transform
    /// * `factory` - Function that creates new instances of the transform
    pub fn register<F>(&mut self, name: String, factory: F)
    where
        F: Fn() -> Box<dyn Transform> + 'static,
    {
        self.transforms.insert(name, Box::new(factory));
    }

    /// Get a transform by name
    ///
    /// Returns a new instance of the requested transform, or None if it is
    /// not registered.
    pub fn get(&self, name: &str) -> Option<Box<dyn Transform>> {
        self.transforms.get(name).map(|factory| factory())
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_transforms_registered() {
        let registry = TransformRegistry::new();

        assert_eq!(registry.get("identity").unwrap().name(), "identity");
        assert_eq!(registry.get("grayscale").unwrap().name(), "grayscale");
    }

    #[test]
    fn test_unknown_transform_is_none() {
        let registry = TransformRegistry::new();
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_custom_transform_registration() {
        let mut registry = TransformRegistry::new();

        registry.register("custom".to_string(), || {
            Box::new(IdentityTransform::new())
        });

        assert_eq!(registry.get("custom").unwrap().name(), "identity");
    }
}

//! The feature registry.

use std::collections::HashMap;

use super::{FeatureDescription, FeaturePlugin};

/// Owns feature plug-ins, keyed by name.
///
/// Registration is idempotent with first-wins semantics: a plug-in whose
/// name is already registered is dropped and the existing one retained.
/// Listing order is registration order.
#[derive(Default)]
pub struct FeatureRegistry {
    order: Vec<String>,
    features: HashMap<String, FeaturePlugin>,
}

impl FeatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plug-in, taking ownership. A duplicate name keeps the
    /// previously registered plug-in.
    pub fn register(&mut self, feature: FeaturePlugin) {
        let name = feature.description().name;
        if self.features.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.features.insert(name, feature);
    }

    /// True if a feature with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Borrow a plug-in by name.
    pub fn get(&self, name: &str) -> Option<&FeaturePlugin> {
        self.features.get(name)
    }

    /// Borrow a plug-in mutably by name.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FeaturePlugin> {
        self.features.get_mut(name)
    }

    /// Descriptions of all registered features, in registration order.
    pub fn list(&self) -> Vec<FeatureDescription> {
        self.order
            .iter()
            .filter_map(|name| self.features.get(name))
            .map(|f| f.description())
            .collect()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Mass, Size};

    #[test]
    fn first_registration_wins() {
        let mut registry = FeatureRegistry::new();
        registry.register(FeaturePlugin::LineBased(Box::new(Size::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Size::new())));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Size"));
    }

    #[test]
    fn list_in_registration_order() {
        let mut registry = FeatureRegistry::new();
        registry.register(FeaturePlugin::LineBased(Box::new(Mass::new())));
        registry.register(FeaturePlugin::LineBased(Box::new(Size::new())));
        let names: Vec<_> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Mass", "Size"]);
    }

    #[test]
    fn lookup_missing() {
        let registry = FeatureRegistry::new();
        assert!(registry.get("Size").is_none());
        assert!(registry.is_empty());
    }
}

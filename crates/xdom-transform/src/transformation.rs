//! The transformation capability and its registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use xdom_core::Block;

use crate::context::TransformationContext;
use crate::error::TransformationError;

/// Priority given to transformations that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// A named pass that rewrites a block tree in place.
///
/// A failing transformation may leave the tree partially rewritten; the
/// manager does not roll back.
pub trait Transformation: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower values run first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn transform(
        &self,
        block: &mut Block,
        context: &TransformationContext<'_>,
    ) -> Result<(), TransformationError>;
}

/// Transformations available by name, populated at startup.
#[derive(Default)]
pub struct TransformationRegistry {
    transformations: BTreeMap<&'static str, Arc<dyn Transformation>>,
}

impl TransformationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transformation`, replacing any previous one of the same name.
    pub fn register(&mut self, transformation: impl Transformation + 'static) {
        self.register_arc(Arc::new(transformation));
    }

    pub fn register_arc(&mut self, transformation: Arc<dyn Transformation>) {
        self.transformations.insert(transformation.name(), transformation);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Transformation>> {
        self.transformations.get(name).map(Arc::clone)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transformations.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(&'static str);

    impl Transformation for Noop {
        fn name(&self) -> &'static str {
            self.0
        }

        fn transform(
            &self,
            _block: &mut Block,
            _context: &TransformationContext<'_>,
        ) -> Result<(), TransformationError> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = TransformationRegistry::new();
        registry.register(Noop("b"));
        registry.register(Noop("a"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
        assert_eq!(registry.get("b").map(|t| t.priority()), Some(DEFAULT_PRIORITY));
    }
}

//! Runs an ordered set of transformations over a tree.

use std::cell::RefCell;
use std::sync::Arc;

use xdom_core::{Block, XDom};

use crate::context::TransformationContext;
use crate::error::TransformationError;
use crate::transformation::{Transformation, TransformationRegistry};

/// Progress of one [`TransformationManager::perform`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Ordered list of transformations run as one pass.
///
/// Transformations run by ascending priority. Equal priorities keep the
/// order in which they were added.
#[derive(Default, Clone)]
pub struct TransformationManager {
    transformations: Vec<Arc<dyn Transformation>>,
}

impl TransformationManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager running the registry entries named in `names`.
    pub fn from_registry<S: AsRef<str>>(
        registry: &TransformationRegistry,
        names: &[S],
    ) -> Result<Self, TransformationError> {
        let mut manager = Self::new();
        for name in names {
            let name = name.as_ref();
            let transformation = registry
                .get(name)
                .ok_or_else(|| TransformationError::Unknown(name.to_owned()))?;
            manager.add(transformation);
        }
        Ok(manager)
    }

    #[must_use]
    pub fn with(mut self, transformation: impl Transformation + 'static) -> Self {
        self.add(Arc::new(transformation));
        self
    }

    pub fn add(&mut self, transformation: Arc<dyn Transformation>) {
        let priority = transformation.priority();
        let index = self
            .transformations
            .partition_point(|existing| existing.priority() <= priority);
        self.transformations.insert(index, transformation);
    }

    /// Names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transformations.iter().map(|t| t.name())
    }

    /// Run every transformation on `block`, stopping at the first failure.
    ///
    /// Changes made before the failure stay in the tree.
    pub fn perform(
        &self,
        block: &mut Block,
        context: &TransformationContext<'_>,
    ) -> Result<(), TransformationError> {
        let mut status = PassStatus::NotStarted;
        tracing::debug!(?status, count = self.transformations.len(), "Transformation pass");
        status = PassStatus::Running;
        tracing::debug!(?status, depth = context.depth(), "Transformation pass");

        for transformation in &self.transformations {
            tracing::debug!(transformation = transformation.name(), "Running transformation");
            if let Err(e) = transformation.transform(block, context) {
                status = PassStatus::Failed;
                tracing::debug!(
                    ?status,
                    transformation = transformation.name(),
                    error = %e,
                    "Transformation pass"
                );
                return Err(TransformationError::Failed {
                    transformation: transformation.name(),
                    source: Box::new(e),
                });
            }
        }

        status = PassStatus::Completed;
        tracing::debug!(?status, "Transformation pass");
        Ok(())
    }

    /// Run the pass over a whole document, drawing new ids from its
    /// generator. The context syntax defaults to the document's.
    pub fn transform_xdom(
        &self,
        xdom: &mut XDom,
        context: &TransformationContext<'_>,
    ) -> Result<(), TransformationError> {
        let ids = RefCell::new(std::mem::take(xdom.id_generator_mut()));
        let mut context = context.with_id_generator(&ids);
        if context.syntax.is_none() {
            context.syntax = xdom.syntax();
        }
        let result = self.perform(xdom.root_mut(), &context);
        drop(context);
        *xdom.id_generator_mut() = ids.into_inner();
        result
    }
}

//! Invalidation after committed mutations.
//!
//! Some cached views embed other resources (a course detail embeds its
//! lessons and assignments, course rows carry enrollment counts), so one
//! mutation can stale several families. [`InvalidationPlan`] lists them and
//! [`InvalidationCoordinator`] drops them after the store commit and before
//! the caller acknowledges the write.

use std::sync::Arc;

use syllabus_core::{LmsResult, ResourceType};

use super::traits::CacheBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Families made stale by one mutation, in invalidation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    families: Vec<ResourceType>,
}

impl InvalidationPlan {
    pub fn for_mutation(resource: ResourceType, kind: MutationKind) -> Self {
        use MutationKind::*;
        use ResourceType::*;

        let families = match (resource, kind) {
            (Course, Create) => vec![Course],
            // Child visibility follows the course's is_active flag.
            (Course, Update) => vec![Course, Lesson, Assignment],
            (Course, Delete) => ResourceType::ALL.to_vec(),
            (Lesson, _) => vec![Lesson, Course],
            (Assignment, Delete) => vec![Assignment, Course, Submission],
            (Assignment, _) => vec![Assignment, Course],
            (Enrollment, _) => vec![Enrollment, Course],
            (Submission, _) => vec![Submission],
        };
        Self { families }
    }

    pub fn families(&self) -> &[ResourceType] {
        &self.families
    }

    pub fn contains(&self, family: ResourceType) -> bool {
        self.families.contains(&family)
    }
}

/// Drops stale cache families after committed writes.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for InvalidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationCoordinator").finish_non_exhaustive()
    }
}

impl InvalidationCoordinator {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Remove every list and detail entry of `family`.
    pub async fn invalidate_family(&self, family: ResourceType) -> LmsResult<u64> {
        let removed = self.backend.delete_family(family).await?;
        tracing::debug!(family = %family, removed, "cache family invalidated");
        Ok(removed)
    }

    /// Apply the plan for a committed mutation.
    ///
    /// Stops at the first backend failure; families already processed stay
    /// invalidated.
    pub async fn after_commit(&self, resource: ResourceType, kind: MutationKind) -> LmsResult<()> {
        let plan = InvalidationPlan::for_mutation(resource, kind);
        for family in plan.families() {
            if let Err(err) = self.invalidate_family(*family).await {
                tracing::error!(
                    resource = %resource,
                    family = %family,
                    error = %err,
                    "cache invalidation failed after commit"
                );
                return Err(err);
            }
        }
        Ok(())
    }
}

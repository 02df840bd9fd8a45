//! Service Layer
//!
//! One service per resource. Every operation follows the same shape: load
//! what the authorization decision needs from the backing store, build a
//! [`ResourceDescriptor`], ask [`authorize`](syllabus_core::authorize), then
//! either read through the cache or write to the store and invalidate.
//! A denied request never reads or populates the cache.

mod assignment_service;
mod course_service;
mod enrollment_service;
mod lesson_service;
mod submission_service;

pub use assignment_service::*;
pub use course_service::*;
pub use enrollment_service::*;
pub use lesson_service::*;
pub use submission_service::*;

use std::sync::Arc;

use syllabus_core::{
    Actor, Assignment, AssignmentId, Course, CourseId, EnrollmentStatus, Lesson, LessonId,
    LmsError, LmsResult, ResourceDescriptor, ResourceType, SharedClock,
};
use syllabus_storage::{
    BackingStore, CacheBackend, CacheConfig, InvalidationCoordinator, MutationKind,
    ReadThroughCache,
};

// ============================================================================
// SERVICE CONTEXT
// ============================================================================

/// Collaborators shared by every resource service.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn BackingStore>,
    pub cache: ReadThroughCache,
    pub invalidation: InvalidationCoordinator,
    pub clock: SharedClock,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn BackingStore>,
        cache_backend: Arc<dyn CacheBackend>,
        clock: SharedClock,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            store,
            cache: ReadThroughCache::new(cache_backend.clone(), clock.clone(), cache_config),
            invalidation: InvalidationCoordinator::new(cache_backend),
            clock,
        }
    }

    pub(crate) async fn load_course(&self, id: CourseId) -> LmsResult<Course> {
        self.store
            .course_get(id)
            .await?
            .ok_or_else(|| LmsError::not_found(ResourceType::Course, id))
    }

    pub(crate) async fn load_lesson(&self, id: LessonId) -> LmsResult<Lesson> {
        self.store
            .lesson_get(id)
            .await?
            .ok_or_else(|| LmsError::not_found(ResourceType::Lesson, id))
    }

    pub(crate) async fn load_assignment(&self, id: AssignmentId) -> LmsResult<Assignment> {
        self.store
            .assignment_get(id)
            .await?
            .ok_or_else(|| LmsError::not_found(ResourceType::Assignment, id))
    }

    /// The actor's enrollment in `course_id`. Anonymous callers have none.
    pub(crate) async fn enrollment_status(
        &self,
        actor: Option<&Actor>,
        course_id: CourseId,
    ) -> LmsResult<EnrollmentStatus> {
        let Some(actor) = actor else {
            return Ok(EnrollmentStatus::None);
        };
        let status = match self.store.enrollment_find(actor.id, course_id).await? {
            Some(enrollment) if enrollment.is_active => EnrollmentStatus::Active,
            Some(_) => EnrollmentStatus::Inactive,
            None => EnrollmentStatus::None,
        };
        Ok(status)
    }

    /// Drop the cache families a committed mutation made stale.
    pub(crate) async fn committed(&self, resource: ResourceType, kind: MutationKind) -> LmsResult<()> {
        self.invalidation.after_commit(resource, kind).await
    }
}

/// Descriptor for a course itself. Active courses are public.
pub(crate) fn course_descriptor(course: &Course) -> ResourceDescriptor {
    ResourceDescriptor::new(ResourceType::Course)
        .with_id(course.id)
        .owned_by(course.instructor_id)
        .public(course.is_active)
}

/// Descriptor for a resource that lives inside `course`.
pub(crate) fn child_descriptor(resource_type: ResourceType, course: &Course) -> ResourceDescriptor {
    ResourceDescriptor::new(resource_type)
        .in_course(course.id)
        .owned_by(course.instructor_id)
}

// ============================================================================
// SERVICE BUNDLE
// ============================================================================

/// All resource services over one shared context.
#[derive(Debug, Clone)]
pub struct Services {
    pub courses: CourseService,
    pub lessons: LessonService,
    pub assignments: AssignmentService,
    pub enrollments: EnrollmentService,
    pub submissions: SubmissionService,
}

impl Services {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            courses: CourseService::new(ctx.clone()),
            lessons: LessonService::new(ctx.clone()),
            assignments: AssignmentService::new(ctx.clone()),
            enrollments: EnrollmentService::new(ctx.clone()),
            submissions: SubmissionService::new(ctx),
        }
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

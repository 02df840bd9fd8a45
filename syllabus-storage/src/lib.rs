//! Syllabus Storage - Backing Store Trait, In-Memory Store and Cache
//!
//! Defines the persistence seam for Syllabus entities. Services talk to an
//! `Arc<dyn BackingStore>`; the in-memory implementation backs tests, demos
//! and single-node deployments.

pub mod cache;
pub mod memory_store;

pub use cache::{
    CacheBackend, CacheConfig, CacheEntry, CacheKey, CacheKeyKind, CacheRead, CacheStats,
    InMemoryCacheBackend, InvalidationCoordinator, InvalidationPlan, MutationKind,
    ReadThroughCache, Watermark, WatermarkTable,
};
pub use memory_store::InMemoryStore;

use async_trait::async_trait;
use syllabus_core::{
    ActorId, Assignment, AssignmentId, AssignmentPatch, Course, CourseFilter, CourseId,
    CoursePatch, CourseSummary, Enrollment, EnrollmentId, Lesson, LessonId, LessonPatch,
    NewAssignment, NewCourse, NewEnrollment, NewLesson, NewSubmission, StorageResult, Submission,
    SubmissionGrade, SubmissionId,
};

// ============================================================================
// BACKING STORE TRAIT
// ============================================================================

/// Persistence for courses, lessons, assignments, enrollments and submissions.
///
/// Lookups return `Ok(None)` for a missing row. Updates and deletes of a
/// missing row return [`StorageError::NotFound`](syllabus_core::StorageError::NotFound).
/// Transient failures surface as `StorageError::Unavailable` and may be
/// retried by readers.
#[async_trait]
pub trait BackingStore: Send + Sync {
    // ========================================================================
    // COURSE OPERATIONS
    // ========================================================================

    /// Active courses matching `filter`, ordered by id, with active
    /// enrollment counts.
    async fn course_list(&self, filter: &CourseFilter) -> StorageResult<Vec<CourseSummary>>;

    async fn course_get(&self, id: CourseId) -> StorageResult<Option<Course>>;

    /// Insert a course. The slug must be unique.
    async fn course_create(&self, draft: NewCourse) -> StorageResult<Course>;

    async fn course_update(&self, id: CourseId, patch: CoursePatch) -> StorageResult<Course>;

    /// Delete a course together with its lessons, assignments, enrollments
    /// and submissions.
    async fn course_delete(&self, id: CourseId) -> StorageResult<()>;

    // ========================================================================
    // LESSON OPERATIONS
    // ========================================================================

    /// Lessons of a course ordered by `(order, id)`.
    async fn lesson_list(
        &self,
        course_id: CourseId,
        published_only: bool,
    ) -> StorageResult<Vec<Lesson>>;

    async fn lesson_get(&self, id: LessonId) -> StorageResult<Option<Lesson>>;

    /// Insert a lesson. The slug must be unique within the course.
    async fn lesson_create(&self, draft: NewLesson) -> StorageResult<Lesson>;

    async fn lesson_update(&self, id: LessonId, patch: LessonPatch) -> StorageResult<Lesson>;

    async fn lesson_delete(&self, id: LessonId) -> StorageResult<()>;

    // ========================================================================
    // ASSIGNMENT OPERATIONS
    // ========================================================================

    /// Assignments of a course ordered by `(due_date, id)`.
    async fn assignment_list(&self, course_id: CourseId) -> StorageResult<Vec<Assignment>>;

    async fn assignment_get(&self, id: AssignmentId) -> StorageResult<Option<Assignment>>;

    async fn assignment_create(&self, draft: NewAssignment) -> StorageResult<Assignment>;

    async fn assignment_update(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> StorageResult<Assignment>;

    /// Delete an assignment and its submissions.
    async fn assignment_delete(&self, id: AssignmentId) -> StorageResult<()>;

    /// Mean score over graded submissions, `None` when nothing is graded.
    async fn assignment_average_score(&self, id: AssignmentId) -> StorageResult<Option<f64>>;

    // ========================================================================
    // ENROLLMENT OPERATIONS
    // ========================================================================

    /// Active enrollments of a learner ordered by id.
    async fn enrollment_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Enrollment>>;

    async fn enrollment_get(&self, id: EnrollmentId) -> StorageResult<Option<Enrollment>>;

    /// The learner's enrollment record in a course, active or not.
    async fn enrollment_find(
        &self,
        learner_id: ActorId,
        course_id: CourseId,
    ) -> StorageResult<Option<Enrollment>>;

    /// Insert an active enrollment. One record per `(learner, course)`.
    async fn enrollment_create(&self, draft: NewEnrollment) -> StorageResult<Enrollment>;

    /// Mark an existing enrollment active again.
    async fn enrollment_reactivate(&self, id: EnrollmentId) -> StorageResult<Enrollment>;

    /// Number of active enrollments in a course.
    async fn enrollment_count(&self, course_id: CourseId) -> StorageResult<u64>;

    // ========================================================================
    // SUBMISSION OPERATIONS
    // ========================================================================

    async fn submission_list_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>>;

    async fn submission_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Submission>>;

    async fn submission_get(&self, id: SubmissionId) -> StorageResult<Option<Submission>>;

    async fn submission_find(
        &self,
        assignment_id: AssignmentId,
        learner_id: ActorId,
    ) -> StorageResult<Option<Submission>>;

    /// Insert a submission. One record per `(assignment, learner)`.
    async fn submission_create(&self, draft: NewSubmission) -> StorageResult<Submission>;

    async fn submission_grade(
        &self,
        id: SubmissionId,
        grade: SubmissionGrade,
    ) -> StorageResult<Submission>;
}

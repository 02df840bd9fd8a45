//! Syllabus Test Utilities
//!
//! Shared test infrastructure for the Syllabus workspace:
//! - Proptest generators for actors and course filters
//! - Fixtures for course and assignment drafts
//! - `FlakyStore`, a backing store wrapper that fails on demand
//! - Assertions for the error taxonomy

pub use syllabus_core::{
    Action, Actor, ActorId, CourseFilter, CourseLevel, DenyReason, EnrollmentStatus, LmsError,
    LmsResult, ResourceDescriptor, ResourceType, Role, StorageError, Timestamp,
};
pub use syllabus_storage::{BackingStore, InMemoryStore};

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use syllabus_core::{
    Assignment, AssignmentId, AssignmentPatch, Course, CourseId, CoursePatch, CourseSummary,
    Enrollment, EnrollmentId, Lesson, LessonId, LessonPatch, NewAssignment, NewCourse,
    NewEnrollment, NewLesson, NewSubmission, StorageResult, Submission, SubmissionGrade,
    SubmissionId,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for principals and catalogue filters.

    use super::*;
    use proptest::prelude::*;

    /// Small id space so owner/subject collisions with the actor are common.
    pub fn arb_actor_id() -> impl Strategy<Value = ActorId> {
        1i64..8
    }

    pub fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    pub fn arb_actor() -> impl Strategy<Value = Actor> {
        (arb_actor_id(), arb_role()).prop_map(|(id, role)| Actor::new(id, role))
    }

    /// An actor, or none for anonymous requests.
    pub fn arb_principal() -> impl Strategy<Value = Option<Actor>> {
        prop::option::of(arb_actor())
    }

    /// A non-admin actor.
    pub fn arb_non_admin() -> impl Strategy<Value = Actor> {
        (
            arb_actor_id(),
            prop_oneof![Just(Role::Instructor), Just(Role::Learner)],
        )
            .prop_map(|(id, role)| Actor::new(id, role))
    }

    pub fn arb_course_level() -> impl Strategy<Value = CourseLevel> {
        prop_oneof![
            Just(CourseLevel::Beginner),
            Just(CourseLevel::Intermediate),
            Just(CourseLevel::Advanced),
        ]
    }

    pub fn arb_course_filter() -> impl Strategy<Value = CourseFilter> {
        (
            prop::option::of("[A-Za-z][A-Za-z ]{0,11}"),
            prop::option::of(arb_course_level()),
            prop::option::of(arb_actor_id()),
        )
            .prop_map(|(category, level, instructor_id)| CourseFilter {
                category,
                level,
                instructor_id,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Drafts for the common scenario: instructor 2 owns course 1, learner 3
    //! is the student, instructor 5 is a bystander.

    use super::*;
    use syllabus_core::DEFAULT_MAX_SCORE;

    pub const ADMIN: ActorId = 1;
    pub const OWNER: ActorId = 2;
    pub const LEARNER: ActorId = 3;
    pub const OTHER_INSTRUCTOR: ActorId = 5;

    pub fn admin() -> Actor {
        Actor::admin(ADMIN)
    }

    pub fn owner() -> Actor {
        Actor::instructor(OWNER)
    }

    pub fn learner() -> Actor {
        Actor::learner(LEARNER)
    }

    pub fn other_instructor() -> Actor {
        Actor::instructor(OTHER_INSTRUCTOR)
    }

    pub fn new_course(instructor_id: ActorId, slug: &str, category: &str) -> NewCourse {
        NewCourse {
            title: format!("Course {}", slug),
            slug: slug.to_string(),
            description: "A test course".to_string(),
            instructor_id,
            category: category.to_string(),
            level: CourseLevel::Beginner,
            is_active: true,
        }
    }

    pub fn new_assignment(course_id: CourseId, title: &str, due_date: Timestamp) -> NewAssignment {
        NewAssignment {
            course_id,
            title: title.to_string(),
            description: String::new(),
            instructions: String::new(),
            max_score: DEFAULT_MAX_SCORE,
            due_date,
        }
    }
}

// ============================================================================
// FLAKY STORE
// ============================================================================

/// Backing store wrapper that fails the next `n` calls with
/// [`StorageError::Unavailable`] and counts every call it sees.
///
/// It can also answer enrollment lookups with `None`, which is what a caller
/// observes when a concurrent enroll commits between its lookup and insert.
#[derive(Clone)]
pub struct FlakyStore {
    inner: Arc<dyn BackingStore>,
    failures_left: Arc<AtomicU32>,
    calls: Arc<AtomicUsize>,
    stale_enrollment_lookups: Arc<AtomicBool>,
}

impl std::fmt::Debug for FlakyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlakyStore")
            .field("failures_left", &self.failures_left.load(Ordering::SeqCst))
            .field("calls", &self.calls.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn BackingStore>) -> Self {
        Self {
            inner,
            failures_left: Arc::new(AtomicU32::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
            stale_enrollment_lookups: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make `enrollment_find` report no enrollment from now on.
    pub fn stale_enrollment_lookups(&self) {
        self.stale_enrollment_lookups.store(true, Ordering::SeqCst);
    }

    /// Fail the next `n` calls.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Calls seen so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn trip(&self) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            Err(StorageError::Unavailable {
                reason: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BackingStore for FlakyStore {
    async fn course_list(&self, filter: &CourseFilter) -> StorageResult<Vec<CourseSummary>> {
        self.trip()?;
        self.inner.course_list(filter).await
    }

    async fn course_get(&self, id: CourseId) -> StorageResult<Option<Course>> {
        self.trip()?;
        self.inner.course_get(id).await
    }

    async fn course_create(&self, draft: NewCourse) -> StorageResult<Course> {
        self.trip()?;
        self.inner.course_create(draft).await
    }

    async fn course_update(&self, id: CourseId, patch: CoursePatch) -> StorageResult<Course> {
        self.trip()?;
        self.inner.course_update(id, patch).await
    }

    async fn course_delete(&self, id: CourseId) -> StorageResult<()> {
        self.trip()?;
        self.inner.course_delete(id).await
    }

    async fn lesson_list(
        &self,
        course_id: CourseId,
        published_only: bool,
    ) -> StorageResult<Vec<Lesson>> {
        self.trip()?;
        self.inner.lesson_list(course_id, published_only).await
    }

    async fn lesson_get(&self, id: LessonId) -> StorageResult<Option<Lesson>> {
        self.trip()?;
        self.inner.lesson_get(id).await
    }

    async fn lesson_create(&self, draft: NewLesson) -> StorageResult<Lesson> {
        self.trip()?;
        self.inner.lesson_create(draft).await
    }

    async fn lesson_update(&self, id: LessonId, patch: LessonPatch) -> StorageResult<Lesson> {
        self.trip()?;
        self.inner.lesson_update(id, patch).await
    }

    async fn lesson_delete(&self, id: LessonId) -> StorageResult<()> {
        self.trip()?;
        self.inner.lesson_delete(id).await
    }

    async fn assignment_list(&self, course_id: CourseId) -> StorageResult<Vec<Assignment>> {
        self.trip()?;
        self.inner.assignment_list(course_id).await
    }

    async fn assignment_get(&self, id: AssignmentId) -> StorageResult<Option<Assignment>> {
        self.trip()?;
        self.inner.assignment_get(id).await
    }

    async fn assignment_create(&self, draft: NewAssignment) -> StorageResult<Assignment> {
        self.trip()?;
        self.inner.assignment_create(draft).await
    }

    async fn assignment_update(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> StorageResult<Assignment> {
        self.trip()?;
        self.inner.assignment_update(id, patch).await
    }

    async fn assignment_delete(&self, id: AssignmentId) -> StorageResult<()> {
        self.trip()?;
        self.inner.assignment_delete(id).await
    }

    async fn assignment_average_score(&self, id: AssignmentId) -> StorageResult<Option<f64>> {
        self.trip()?;
        self.inner.assignment_average_score(id).await
    }

    async fn enrollment_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Enrollment>> {
        self.trip()?;
        self.inner.enrollment_list_for_learner(learner_id).await
    }

    async fn enrollment_get(&self, id: EnrollmentId) -> StorageResult<Option<Enrollment>> {
        self.trip()?;
        self.inner.enrollment_get(id).await
    }

    async fn enrollment_find(
        &self,
        learner_id: ActorId,
        course_id: CourseId,
    ) -> StorageResult<Option<Enrollment>> {
        self.trip()?;
        if self.stale_enrollment_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.enrollment_find(learner_id, course_id).await
    }

    async fn enrollment_create(&self, draft: NewEnrollment) -> StorageResult<Enrollment> {
        self.trip()?;
        self.inner.enrollment_create(draft).await
    }

    async fn enrollment_reactivate(&self, id: EnrollmentId) -> StorageResult<Enrollment> {
        self.trip()?;
        self.inner.enrollment_reactivate(id).await
    }

    async fn enrollment_count(&self, course_id: CourseId) -> StorageResult<u64> {
        self.trip()?;
        self.inner.enrollment_count(course_id).await
    }

    async fn submission_list_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>> {
        self.trip()?;
        self.inner.submission_list_for_assignment(assignment_id).await
    }

    async fn submission_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Submission>> {
        self.trip()?;
        self.inner.submission_list_for_learner(learner_id).await
    }

    async fn submission_get(&self, id: SubmissionId) -> StorageResult<Option<Submission>> {
        self.trip()?;
        self.inner.submission_get(id).await
    }

    async fn submission_find(
        &self,
        assignment_id: AssignmentId,
        learner_id: ActorId,
    ) -> StorageResult<Option<Submission>> {
        self.trip()?;
        self.inner.submission_find(assignment_id, learner_id).await
    }

    async fn submission_create(&self, draft: NewSubmission) -> StorageResult<Submission> {
        self.trip()?;
        self.inner.submission_create(draft).await
    }

    async fn submission_grade(
        &self,
        id: SubmissionId,
        grade: SubmissionGrade,
    ) -> StorageResult<Submission> {
        self.trip()?;
        self.inner.submission_grade(id, grade).await
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over the error taxonomy.

    use super::*;

    /// Assert that a result is a denial with `reason`.
    #[track_caller]
    pub fn assert_denied<T: std::fmt::Debug>(result: &LmsResult<T>, reason: DenyReason) {
        match result {
            Err(LmsError::Denied(actual)) => {
                assert_eq!(*actual, reason, "Wrong deny reason");
            }
            other => panic!("Expected Denied({:?}), got: {:?}", reason, other),
        }
    }

    #[track_caller]
    pub fn assert_unauthenticated<T: std::fmt::Debug>(result: &LmsResult<T>) {
        assert!(
            matches!(result, Err(LmsError::Unauthenticated)),
            "Expected Unauthenticated, got: {:?}",
            result
        );
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &LmsResult<T>, resource: ResourceType) {
        match result {
            Err(LmsError::NotFound { resource: actual, .. }) => {
                assert_eq!(*actual, resource, "Wrong resource type in NotFound error");
            }
            other => panic!("Expected NotFound for {:?}, got: {:?}", resource, other),
        }
    }

    /// Assert that a result is a validation failure on `field`.
    #[track_caller]
    pub fn assert_validation_failure<T: std::fmt::Debug>(result: &LmsResult<T>, field: &str) {
        match result {
            Err(LmsError::ValidationFailure { field: actual, .. }) => {
                assert_eq!(actual, field, "Wrong field in ValidationFailure");
            }
            other => panic!("Expected ValidationFailure on {}, got: {:?}", field, other),
        }
    }
}

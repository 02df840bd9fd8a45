//! In-memory backing store.
//!
//! All tables live behind a single `tokio::sync::RwLock`, so every mutation
//! (including cascading deletes) is atomic with respect to readers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use syllabus_core::{
    ActorId, Assignment, AssignmentId, AssignmentPatch, Course, CourseFilter, CourseId,
    CoursePatch, CourseSummary, EntityId, Enrollment, EnrollmentId, Lesson, LessonId,
    LessonPatch, NewAssignment, NewCourse, NewEnrollment, NewLesson, NewSubmission, ResourceType,
    SharedClock, StorageError, StorageResult, Submission, SubmissionGrade, SubmissionId,
    SystemClock,
};
use tokio::sync::RwLock;

use crate::BackingStore;

#[derive(Debug, Default)]
struct Tables {
    /// Last id handed out, per table.
    last_ids: HashMap<ResourceType, EntityId>,
    courses: BTreeMap<CourseId, Course>,
    lessons: BTreeMap<LessonId, Lesson>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    submissions: BTreeMap<SubmissionId, Submission>,
}

impl Tables {
    fn allocate_id(&mut self, table: ResourceType) -> EntityId {
        let last = self.last_ids.entry(table).or_insert(0);
        *last += 1;
        *last
    }

    fn require_course(&self, course_id: CourseId, resource: ResourceType) -> StorageResult<()> {
        if self.courses.contains_key(&course_id) {
            Ok(())
        } else {
            Err(StorageError::ForeignKeyViolation {
                resource,
                field: "course_id".to_string(),
            })
        }
    }

    fn course_slug_taken(&self, slug: &str, except: Option<CourseId>) -> bool {
        self.courses
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn lesson_slug_taken(&self, course_id: CourseId, slug: &str, except: Option<LessonId>) -> bool {
        self.lessons
            .values()
            .any(|l| l.course_id == course_id && l.slug == slug && Some(l.id) != except)
    }

    fn active_enrollments(&self, course_id: CourseId) -> u64 {
        self.enrollments
            .values()
            .filter(|e| e.course_id == course_id && e.is_active)
            .count() as u64
    }

    fn remove_submissions_for(&mut self, assignment_ids: &[AssignmentId]) {
        self.submissions
            .retain(|_, s| !assignment_ids.contains(&s.assignment_id));
    }
}

fn not_found(resource: ResourceType, id: EntityId) -> StorageError {
    StorageError::NotFound { resource, id }
}

fn unique(resource: ResourceType, field: &str) -> StorageError {
    StorageError::UniqueViolation {
        resource,
        field: field.to_string(),
    }
}

/// Backing store holding every table in process memory.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    clock: SharedClock,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty store stamped by `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock,
        }
    }

    pub async fn course_count(&self) -> usize {
        self.tables.read().await.courses.len()
    }

    pub async fn submission_count(&self) -> usize {
        self.tables.read().await.submissions.len()
    }
}

#[async_trait]
impl BackingStore for InMemoryStore {
    // === Course Operations ===

    async fn course_list(&self, filter: &CourseFilter) -> StorageResult<Vec<CourseSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .values()
            .filter(|c| filter.matches(c))
            .map(|c| CourseSummary {
                course: c.clone(),
                enrollment_count: tables.active_enrollments(c.id),
            })
            .collect())
    }

    async fn course_get(&self, id: CourseId) -> StorageResult<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn course_create(&self, draft: NewCourse) -> StorageResult<Course> {
        let mut tables = self.tables.write().await;
        if tables.course_slug_taken(&draft.slug, None) {
            return Err(unique(ResourceType::Course, "slug"));
        }

        let now = self.clock.now();
        let course = Course {
            id: tables.allocate_id(ResourceType::Course),
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            instructor_id: draft.instructor_id,
            category: draft.category,
            level: draft.level,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn course_update(&self, id: CourseId, patch: CoursePatch) -> StorageResult<Course> {
        let mut tables = self.tables.write().await;
        if let Some(slug) = &patch.slug {
            if tables.course_slug_taken(slug, Some(id)) {
                return Err(unique(ResourceType::Course, "slug"));
            }
        }

        let now = self.clock.now();
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| not_found(ResourceType::Course, id))?;

        if let Some(title) = patch.title {
            course.title = title;
        }
        if let Some(slug) = patch.slug {
            course.slug = slug;
        }
        if let Some(description) = patch.description {
            course.description = description;
        }
        if let Some(category) = patch.category {
            course.category = category;
        }
        if let Some(level) = patch.level {
            course.level = level;
        }
        if let Some(is_active) = patch.is_active {
            course.is_active = is_active;
        }
        course.updated_at = now;

        Ok(course.clone())
    }

    async fn course_delete(&self, id: CourseId) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if tables.courses.remove(&id).is_none() {
            return Err(not_found(ResourceType::Course, id));
        }

        let assignment_ids: Vec<AssignmentId> = tables
            .assignments
            .values()
            .filter(|a| a.course_id == id)
            .map(|a| a.id)
            .collect();
        tables.remove_submissions_for(&assignment_ids);
        tables.assignments.retain(|_, a| a.course_id != id);
        tables.lessons.retain(|_, l| l.course_id != id);
        tables.enrollments.retain(|_, e| e.course_id != id);
        Ok(())
    }

    // === Lesson Operations ===

    async fn lesson_list(
        &self,
        course_id: CourseId,
        published_only: bool,
    ) -> StorageResult<Vec<Lesson>> {
        let tables = self.tables.read().await;
        let mut lessons: Vec<Lesson> = tables
            .lessons
            .values()
            .filter(|l| l.course_id == course_id && (!published_only || l.is_published))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.order, l.id));
        Ok(lessons)
    }

    async fn lesson_get(&self, id: LessonId) -> StorageResult<Option<Lesson>> {
        Ok(self.tables.read().await.lessons.get(&id).cloned())
    }

    async fn lesson_create(&self, draft: NewLesson) -> StorageResult<Lesson> {
        let mut tables = self.tables.write().await;
        tables.require_course(draft.course_id, ResourceType::Lesson)?;
        if tables.lesson_slug_taken(draft.course_id, &draft.slug, None) {
            return Err(unique(ResourceType::Lesson, "slug"));
        }

        let now = self.clock.now();
        let lesson = Lesson {
            id: tables.allocate_id(ResourceType::Lesson),
            course_id: draft.course_id,
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            content: draft.content,
            video_url: draft.video_url,
            duration_minutes: draft.duration_minutes,
            order: draft.order,
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        };
        tables.lessons.insert(lesson.id, lesson.clone());
        Ok(lesson)
    }

    async fn lesson_update(&self, id: LessonId, patch: LessonPatch) -> StorageResult<Lesson> {
        let mut tables = self.tables.write().await;
        let course_id = tables
            .lessons
            .get(&id)
            .map(|l| l.course_id)
            .ok_or_else(|| not_found(ResourceType::Lesson, id))?;
        if let Some(slug) = &patch.slug {
            if tables.lesson_slug_taken(course_id, slug, Some(id)) {
                return Err(unique(ResourceType::Lesson, "slug"));
            }
        }

        let now = self.clock.now();
        let lesson = tables
            .lessons
            .get_mut(&id)
            .ok_or_else(|| not_found(ResourceType::Lesson, id))?;

        if let Some(title) = patch.title {
            lesson.title = title;
        }
        if let Some(slug) = patch.slug {
            lesson.slug = slug;
        }
        if let Some(description) = patch.description {
            lesson.description = description;
        }
        if let Some(content) = patch.content {
            lesson.content = content;
        }
        if let Some(video_url) = patch.video_url {
            lesson.video_url = video_url;
        }
        if let Some(duration) = patch.duration_minutes {
            lesson.duration_minutes = duration;
        }
        if let Some(order) = patch.order {
            lesson.order = order;
        }
        if let Some(is_published) = patch.is_published {
            lesson.is_published = is_published;
        }
        lesson.updated_at = now;

        Ok(lesson.clone())
    }

    async fn lesson_delete(&self, id: LessonId) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .lessons
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(ResourceType::Lesson, id))
    }

    // === Assignment Operations ===

    async fn assignment_list(&self, course_id: CourseId) -> StorageResult<Vec<Assignment>> {
        let tables = self.tables.read().await;
        let mut assignments: Vec<Assignment> = tables
            .assignments
            .values()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.due_date, a.id));
        Ok(assignments)
    }

    async fn assignment_get(&self, id: AssignmentId) -> StorageResult<Option<Assignment>> {
        Ok(self.tables.read().await.assignments.get(&id).cloned())
    }

    async fn assignment_create(&self, draft: NewAssignment) -> StorageResult<Assignment> {
        let mut tables = self.tables.write().await;
        tables.require_course(draft.course_id, ResourceType::Assignment)?;

        let assignment = Assignment {
            id: tables.allocate_id(ResourceType::Assignment),
            course_id: draft.course_id,
            title: draft.title,
            description: draft.description,
            instructions: draft.instructions,
            max_score: draft.max_score,
            due_date: draft.due_date,
            created_at: self.clock.now(),
        };
        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn assignment_update(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> StorageResult<Assignment> {
        let mut tables = self.tables.write().await;
        let assignment = tables
            .assignments
            .get_mut(&id)
            .ok_or_else(|| not_found(ResourceType::Assignment, id))?;

        if let Some(title) = patch.title {
            assignment.title = title;
        }
        if let Some(description) = patch.description {
            assignment.description = description;
        }
        if let Some(instructions) = patch.instructions {
            assignment.instructions = instructions;
        }
        if let Some(max_score) = patch.max_score {
            assignment.max_score = max_score;
        }
        if let Some(due_date) = patch.due_date {
            assignment.due_date = due_date;
        }

        Ok(assignment.clone())
    }

    async fn assignment_delete(&self, id: AssignmentId) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if tables.assignments.remove(&id).is_none() {
            return Err(not_found(ResourceType::Assignment, id));
        }
        tables.remove_submissions_for(&[id]);
        Ok(())
    }

    async fn assignment_average_score(&self, id: AssignmentId) -> StorageResult<Option<f64>> {
        let tables = self.tables.read().await;
        if !tables.assignments.contains_key(&id) {
            return Err(not_found(ResourceType::Assignment, id));
        }

        let scores: Vec<f64> = tables
            .submissions
            .values()
            .filter(|s| s.assignment_id == id)
            .filter_map(|s| s.score)
            .collect();
        if scores.is_empty() {
            return Ok(None);
        }
        Ok(Some(scores.iter().sum::<f64>() / scores.len() as f64))
    }

    // === Enrollment Operations ===

    async fn enrollment_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Enrollment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .values()
            .filter(|e| e.learner_id == learner_id && e.is_active)
            .cloned()
            .collect())
    }

    async fn enrollment_get(&self, id: EnrollmentId) -> StorageResult<Option<Enrollment>> {
        Ok(self.tables.read().await.enrollments.get(&id).cloned())
    }

    async fn enrollment_find(
        &self,
        learner_id: ActorId,
        course_id: CourseId,
    ) -> StorageResult<Option<Enrollment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .values()
            .find(|e| e.learner_id == learner_id && e.course_id == course_id)
            .cloned())
    }

    async fn enrollment_create(&self, draft: NewEnrollment) -> StorageResult<Enrollment> {
        let mut tables = self.tables.write().await;
        tables.require_course(draft.course_id, ResourceType::Enrollment)?;
        let exists = tables
            .enrollments
            .values()
            .any(|e| e.learner_id == draft.learner_id && e.course_id == draft.course_id);
        if exists {
            return Err(unique(ResourceType::Enrollment, "course_id"));
        }

        let enrollment = Enrollment {
            id: tables.allocate_id(ResourceType::Enrollment),
            learner_id: draft.learner_id,
            course_id: draft.course_id,
            enrolled_at: self.clock.now(),
            is_active: true,
            progress: 0,
        };
        tables.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    async fn enrollment_reactivate(&self, id: EnrollmentId) -> StorageResult<Enrollment> {
        let mut tables = self.tables.write().await;
        let enrollment = tables
            .enrollments
            .get_mut(&id)
            .ok_or_else(|| not_found(ResourceType::Enrollment, id))?;
        enrollment.is_active = true;
        Ok(enrollment.clone())
    }

    async fn enrollment_count(&self, course_id: CourseId) -> StorageResult<u64> {
        Ok(self.tables.read().await.active_enrollments(course_id))
    }

    // === Submission Operations ===

    async fn submission_list_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn submission_list_for_learner(
        &self,
        learner_id: ActorId,
    ) -> StorageResult<Vec<Submission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.learner_id == learner_id)
            .cloned()
            .collect())
    }

    async fn submission_get(&self, id: SubmissionId) -> StorageResult<Option<Submission>> {
        Ok(self.tables.read().await.submissions.get(&id).cloned())
    }

    async fn submission_find(
        &self,
        assignment_id: AssignmentId,
        learner_id: ActorId,
    ) -> StorageResult<Option<Submission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .find(|s| s.assignment_id == assignment_id && s.learner_id == learner_id)
            .cloned())
    }

    async fn submission_create(&self, draft: NewSubmission) -> StorageResult<Submission> {
        let mut tables = self.tables.write().await;
        let now = self.clock.now();
        let Some(is_late) = tables
            .assignments
            .get(&draft.assignment_id)
            .map(|a| a.is_late_at(now))
        else {
            return Err(StorageError::ForeignKeyViolation {
                resource: ResourceType::Submission,
                field: "assignment_id".to_string(),
            });
        };
        let exists = tables
            .submissions
            .values()
            .any(|s| s.assignment_id == draft.assignment_id && s.learner_id == draft.learner_id);
        if exists {
            return Err(unique(ResourceType::Submission, "assignment_id"));
        }

        let submission = Submission {
            id: tables.allocate_id(ResourceType::Submission),
            assignment_id: draft.assignment_id,
            learner_id: draft.learner_id,
            content: draft.content,
            submitted_at: now,
            updated_at: now,
            is_late,
            score: None,
            feedback: String::new(),
            graded_at: None,
            graded_by: None,
        };
        tables.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn submission_grade(
        &self,
        id: SubmissionId,
        grade: SubmissionGrade,
    ) -> StorageResult<Submission> {
        let mut tables = self.tables.write().await;
        let now = self.clock.now();
        let submission = tables
            .submissions
            .get_mut(&id)
            .ok_or_else(|| not_found(ResourceType::Submission, id))?;

        submission.score = Some(grade.score);
        submission.feedback = grade.feedback;
        submission.graded_by = Some(grade.graded_by);
        submission.graded_at = Some(now);
        submission.updated_at = now;

        Ok(submission.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

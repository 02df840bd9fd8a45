//! Assignment Service
//!
//! Assignments are cached as stored; `is_overdue` is attached per response
//! from the service clock.

use syllabus_core::{
    authorize, Action, Actor, Assignment, AssignmentId, Clock, CourseId, LmsError, LmsResult,
    ResourceType,
};
use syllabus_storage::{CacheKey, CacheRead, MutationKind};

use super::{child_descriptor, ServiceContext};
use crate::types::{
    AssignmentView, AverageScoreResponse, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::validation::Validate;

#[derive(Debug, Clone)]
pub struct AssignmentService {
    ctx: ServiceContext,
}

impl AssignmentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Assignments of a course ordered by due date.
    pub async fn list_for_course(
        &self,
        actor: Option<&Actor>,
        course_id: CourseId,
    ) -> LmsResult<CacheRead<Vec<AssignmentView>>> {
        let course = self.ctx.load_course(course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course).public(course.is_active);
        authorize(actor, Action::List, &target).into_result()?;

        let store = &self.ctx.store;
        let read = self
            .ctx
            .cache
            .read(
                CacheKey::list(ResourceType::Assignment, [("course_id", course_id)]),
                || async move { Ok(store.assignment_list(course_id).await?) },
            )
            .await?;

        let now = self.ctx.clock.now();
        Ok(read.map(|assignments: Vec<Assignment>| {
            assignments
                .into_iter()
                .map(|a| AssignmentView::at(a, now))
                .collect()
        }))
    }

    pub async fn get(
        &self,
        actor: Option<&Actor>,
        id: AssignmentId,
    ) -> LmsResult<CacheRead<AssignmentView>> {
        let assignment = self.ctx.load_assignment(id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course)
            .with_id(id)
            .public(course.is_active);
        authorize(actor, Action::Read, &target).into_result()?;

        let store = &self.ctx.store;
        let read = self
            .ctx
            .cache
            .read(CacheKey::detail(ResourceType::Assignment, id), || async move {
                store
                    .assignment_get(id)
                    .await?
                    .ok_or_else(|| LmsError::not_found(ResourceType::Assignment, id))
            })
            .await?;

        let now = self.ctx.clock.now();
        Ok(read.map(|a: Assignment| AssignmentView::at(a, now)))
    }

    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateAssignmentRequest,
    ) -> LmsResult<AssignmentView> {
        let course = self.ctx.load_course(req.course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course);
        authorize(Some(actor), Action::Create, &target).into_result()?;
        req.validate()?;

        let assignment = self.ctx.store.assignment_create(req.into()).await?;
        self.ctx
            .committed(ResourceType::Assignment, MutationKind::Create)
            .await?;

        tracing::info!(assignment_id = assignment.id, course_id = course.id, "assignment created");
        Ok(AssignmentView::at(assignment, self.ctx.clock.now()))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: AssignmentId,
        req: UpdateAssignmentRequest,
    ) -> LmsResult<AssignmentView> {
        let assignment = self.ctx.load_assignment(id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course).with_id(id);
        authorize(Some(actor), Action::Update, &target).into_result()?;
        req.validate()?;

        let assignment = self.ctx.store.assignment_update(id, req.into()).await?;
        self.ctx
            .committed(ResourceType::Assignment, MutationKind::Update)
            .await?;

        tracing::info!(assignment_id = id, actor_id = actor.id, "assignment updated");
        Ok(AssignmentView::at(assignment, self.ctx.clock.now()))
    }

    /// Delete an assignment together with its submissions.
    pub async fn delete(&self, actor: &Actor, id: AssignmentId) -> LmsResult<()> {
        let assignment = self.ctx.load_assignment(id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course).with_id(id);
        authorize(Some(actor), Action::Delete, &target).into_result()?;

        self.ctx.store.assignment_delete(id).await?;
        self.ctx
            .committed(ResourceType::Assignment, MutationKind::Delete)
            .await?;

        tracing::info!(assignment_id = id, actor_id = actor.id, "assignment deleted");
        Ok(())
    }

    /// Mean score of graded submissions. Same audience as grading; never
    /// cached.
    pub async fn average_score(
        &self,
        actor: &Actor,
        id: AssignmentId,
    ) -> LmsResult<AverageScoreResponse> {
        let assignment = self.ctx.load_assignment(id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course).with_id(id);
        authorize(Some(actor), Action::Grade, &target).into_result()?;

        Ok(AverageScoreResponse {
            assignment_id: id,
            average_score: self.ctx.store.assignment_average_score(id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{harness, start};
    use crate::types::CreateCourseRequest;
    use chrono::Duration;
    use syllabus_core::{CourseLevel, DenyReason};

    async fn setup() -> LmsResult<(crate::services::testing::Harness, CourseId)> {
        let h = harness();
        let course = h
            .services
            .courses
            .create(
                &Actor::instructor(2),
                CreateCourseRequest {
                    title: "Data Science".to_string(),
                    slug: "data-science".to_string(),
                    description: String::new(),
                    category: "Data".to_string(),
                    level: CourseLevel::Intermediate,
                    is_active: true,
                    instructor_id: None,
                },
            )
            .await?;
        Ok((h, course.id))
    }

    fn assignment_req(course_id: CourseId) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            course_id,
            title: "Pandas Exercise".to_string(),
            description: String::new(),
            instructions: "Load the CSV".to_string(),
            max_score: None,
            due_date: start() + Duration::minutes(1),
        }
    }

    #[tokio::test]
    async fn test_overdue_follows_clock_even_when_cached() -> LmsResult<()> {
        let (h, course_id) = setup().await?;
        let created = h
            .services
            .assignments
            .create(&Actor::instructor(2), assignment_req(course_id))
            .await?;
        assert!(!created.is_overdue);

        let first = h.services.assignments.get(None, created.assignment.id).await?;
        assert!(!first.value().is_overdue);

        h.clock.advance(std::time::Duration::from_secs(120));
        let second = h.services.assignments.get(None, created.assignment.id).await?;
        assert!(second.was_cache_hit());
        assert!(second.value().is_overdue);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_max_score_rejected() -> LmsResult<()> {
        let (h, course_id) = setup().await?;
        let mut req = assignment_req(course_id);
        req.max_score = Some(0);

        let result = h.services.assignments.create(&Actor::instructor(2), req).await;
        assert!(matches!(result, Err(LmsError::ValidationFailure { ref field, .. }) if field == "max_score"));
        Ok(())
    }

    #[tokio::test]
    async fn test_average_score_restricted_to_owner() -> LmsResult<()> {
        let (h, course_id) = setup().await?;
        let created = h
            .services
            .assignments
            .create(&Actor::instructor(2), assignment_req(course_id))
            .await?;
        let id = created.assignment.id;

        let denied = h.services.assignments.average_score(&Actor::learner(3), id).await;
        assert_eq!(denied, Err(LmsError::Denied(DenyReason::NotOwner)));

        let avg = h.services.assignments.average_score(&Actor::instructor(2), id).await?;
        assert_eq!(avg.average_score, None);
        Ok(())
    }
}

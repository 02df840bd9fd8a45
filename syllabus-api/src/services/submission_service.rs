//! Submission Service

use syllabus_core::{
    authorize, Action, Actor, Assignment, AssignmentId, Course, LmsError, LmsResult,
    NewSubmission, ResourceDescriptor, ResourceType, Submission, SubmissionGrade, SubmissionId,
};
use syllabus_storage::{CacheKey, CacheRead, MutationKind};

use super::{child_descriptor, ServiceContext};
use crate::types::{GradeRequest, SubmitRequest};
use crate::validation::Validate;

#[derive(Debug, Clone)]
pub struct SubmissionService {
    ctx: ServiceContext,
}

impl SubmissionService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load_submission(&self, id: SubmissionId) -> LmsResult<Submission> {
        self.ctx
            .store
            .submission_get(id)
            .await?
            .ok_or_else(|| LmsError::not_found(ResourceType::Submission, id))
    }

    /// The submission with the assignment and course it hangs off.
    async fn load_chain(&self, id: SubmissionId) -> LmsResult<(Submission, Assignment, Course)> {
        let submission = self.load_submission(id).await?;
        let assignment = self.ctx.load_assignment(submission.assignment_id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        Ok((submission, assignment, course))
    }

    fn descriptor(submission: &Submission, course: &Course) -> ResourceDescriptor {
        child_descriptor(ResourceType::Submission, course)
            .with_id(submission.id)
            .for_subject(submission.learner_id)
    }

    /// Submit once per assignment. Lateness is fixed at this moment.
    pub async fn submit(&self, actor: &Actor, req: SubmitRequest) -> LmsResult<Submission> {
        let assignment = self.ctx.load_assignment(req.assignment_id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let status = self.ctx.enrollment_status(Some(actor), course.id).await?;
        let target = child_descriptor(ResourceType::Assignment, &course)
            .with_id(assignment.id)
            .public(course.is_active)
            .with_enrollment(status);
        authorize(Some(actor), Action::Submit, &target).into_result()?;
        req.validate()?;

        if self
            .ctx
            .store
            .submission_find(assignment.id, actor.id)
            .await?
            .is_some()
        {
            return Err(LmsError::validation(
                "assignment_id",
                "a submission for this assignment already exists",
            ));
        }

        let submission = self
            .ctx
            .store
            .submission_create(NewSubmission {
                assignment_id: assignment.id,
                learner_id: actor.id,
                content: req.content,
            })
            .await?;
        self.ctx
            .committed(ResourceType::Submission, MutationKind::Create)
            .await?;

        tracing::info!(
            submission_id = submission.id,
            assignment_id = assignment.id,
            learner_id = actor.id,
            is_late = submission.is_late,
            "submission received"
        );
        Ok(submission)
    }

    /// The caller's own submissions.
    pub async fn list_mine(&self, actor: &Actor) -> LmsResult<CacheRead<Vec<Submission>>> {
        let target = ResourceDescriptor::new(ResourceType::Submission).for_subject(actor.id);
        authorize(Some(actor), Action::List, &target).into_result()?;

        let store = &self.ctx.store;
        let learner_id = actor.id;
        self.ctx
            .cache
            .read(
                CacheKey::list(ResourceType::Submission, [("learner_id", learner_id)]),
                || async move { Ok(store.submission_list_for_learner(learner_id).await?) },
            )
            .await
    }

    /// Every submission to an assignment. Course instructor only.
    pub async fn list_for_assignment(
        &self,
        actor: &Actor,
        assignment_id: AssignmentId,
    ) -> LmsResult<CacheRead<Vec<Submission>>> {
        let assignment = self.ctx.load_assignment(assignment_id).await?;
        let course = self.ctx.load_course(assignment.course_id).await?;
        let target = child_descriptor(ResourceType::Submission, &course);
        authorize(Some(actor), Action::List, &target).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(
                CacheKey::list(ResourceType::Submission, [("assignment_id", assignment_id)]),
                || async move { Ok(store.submission_list_for_assignment(assignment_id).await?) },
            )
            .await
    }

    pub async fn get(&self, actor: &Actor, id: SubmissionId) -> LmsResult<CacheRead<Submission>> {
        let (submission, _, course) = self.load_chain(id).await?;
        authorize(Some(actor), Action::Read, &Self::descriptor(&submission, &course))
            .into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(CacheKey::detail(ResourceType::Submission, id), || async move {
                store
                    .submission_get(id)
                    .await?
                    .ok_or_else(|| LmsError::not_found(ResourceType::Submission, id))
            })
            .await
    }

    /// Grade a submission. Regrading overwrites the previous grade.
    pub async fn grade(
        &self,
        actor: &Actor,
        id: SubmissionId,
        req: GradeRequest,
    ) -> LmsResult<Submission> {
        let (submission, assignment, course) = self.load_chain(id).await?;
        authorize(Some(actor), Action::Grade, &Self::descriptor(&submission, &course))
            .into_result()?;
        req.validate_against(assignment.max_score)?;

        let graded = self
            .ctx
            .store
            .submission_grade(
                id,
                SubmissionGrade {
                    score: req.score,
                    feedback: req.feedback,
                    graded_by: actor.id,
                },
            )
            .await?;
        self.ctx
            .committed(ResourceType::Submission, MutationKind::Update)
            .await?;

        tracing::info!(submission_id = id, graded_by = actor.id, score = req.score, "submission graded");
        Ok(graded)
    }
}

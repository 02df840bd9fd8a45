//! Enrollment Service

use syllabus_core::{
    authorize, Action, Actor, CourseId, DenyReason, Enrollment, EnrollmentId, EnrollmentStatus,
    LmsError, LmsResult, NewEnrollment, ResourceDescriptor, ResourceType, StorageError,
};
use syllabus_storage::{CacheKey, CacheRead, MutationKind};

use super::{child_descriptor, course_descriptor, ServiceContext};

#[derive(Debug, Clone)]
pub struct EnrollmentService {
    ctx: ServiceContext,
}

impl EnrollmentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Enroll `actor` in an active course.
    ///
    /// A previously deactivated enrollment is reactivated rather than
    /// duplicated. The caller's role is checked before the course is looked
    /// up, so non-learners never learn whether a course exists.
    pub async fn enroll(&self, actor: &Actor, course_id: CourseId) -> LmsResult<Enrollment> {
        let role_gate = ResourceDescriptor::new(ResourceType::Course).with_id(course_id);
        authorize(Some(actor), Action::Enroll, &role_gate).into_result()?;

        let course = self.ctx.load_course(course_id).await?;
        if !course.is_active {
            return Err(LmsError::not_found(ResourceType::Course, course_id));
        }

        let existing = self.ctx.store.enrollment_find(actor.id, course_id).await?;
        let status = match &existing {
            Some(e) if e.is_active => EnrollmentStatus::Active,
            Some(_) => EnrollmentStatus::Inactive,
            None => EnrollmentStatus::None,
        };
        let target = course_descriptor(&course).with_enrollment(status);
        authorize(Some(actor), Action::Enroll, &target).into_result()?;
        // Admins pass the engine unconditionally but still get one record.
        if status == EnrollmentStatus::Active {
            return Err(LmsError::Denied(DenyReason::AlreadyEnrolled));
        }

        let (enrollment, kind) = match existing {
            Some(inactive) => (
                self.ctx.store.enrollment_reactivate(inactive.id).await?,
                MutationKind::Update,
            ),
            None => (
                self.ctx
                    .store
                    .enrollment_create(NewEnrollment {
                        learner_id: actor.id,
                        course_id,
                    })
                    .await
                    .map_err(|err| match err {
                        // A concurrent enroll committed after our lookup.
                        StorageError::UniqueViolation { .. } => {
                            LmsError::Denied(DenyReason::AlreadyEnrolled)
                        }
                        other => other.into(),
                    })?,
                MutationKind::Create,
            ),
        };
        self.ctx.committed(ResourceType::Enrollment, kind).await?;

        tracing::info!(
            enrollment_id = enrollment.id,
            learner_id = actor.id,
            course_id,
            "learner enrolled"
        );
        Ok(enrollment)
    }

    /// The caller's active enrollments.
    pub async fn list_mine(&self, actor: &Actor) -> LmsResult<CacheRead<Vec<Enrollment>>> {
        let target = ResourceDescriptor::new(ResourceType::Enrollment).for_subject(actor.id);
        authorize(Some(actor), Action::List, &target).into_result()?;

        let store = &self.ctx.store;
        let learner_id = actor.id;
        self.ctx
            .cache
            .read(
                CacheKey::list(ResourceType::Enrollment, [("learner_id", learner_id)]),
                || async move { Ok(store.enrollment_list_for_learner(learner_id).await?) },
            )
            .await
    }

    /// Readable by the enrolled learner and the course instructor.
    pub async fn get(&self, actor: &Actor, id: EnrollmentId) -> LmsResult<CacheRead<Enrollment>> {
        let enrollment = self
            .ctx
            .store
            .enrollment_get(id)
            .await?
            .ok_or_else(|| LmsError::not_found(ResourceType::Enrollment, id))?;
        let course = self.ctx.load_course(enrollment.course_id).await?;
        let target = child_descriptor(ResourceType::Enrollment, &course)
            .with_id(id)
            .for_subject(enrollment.learner_id);
        authorize(Some(actor), Action::Read, &target).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(CacheKey::detail(ResourceType::Enrollment, id), || async move {
                store
                    .enrollment_get(id)
                    .await?
                    .ok_or_else(|| LmsError::not_found(ResourceType::Enrollment, id))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::harness;
    use crate::types::{CreateCourseRequest, UpdateCourseRequest};
    use syllabus_core::CourseLevel;

    async fn course(h: &crate::services::testing::Harness, active: bool) -> LmsResult<CourseId> {
        let course = h
            .services
            .courses
            .create(
                &Actor::instructor(2),
                CreateCourseRequest {
                    title: "Web Development".to_string(),
                    slug: format!("web-{}", active),
                    description: String::new(),
                    category: "Web".to_string(),
                    level: CourseLevel::Beginner,
                    is_active: active,
                    instructor_id: None,
                },
            )
            .await?;
        Ok(course.id)
    }

    #[tokio::test]
    async fn test_enroll_twice_is_rejected_with_one_record() -> LmsResult<()> {
        let h = harness();
        let course_id = course(&h, true).await?;
        let learner = Actor::learner(3);

        h.services.enrollments.enroll(&learner, course_id).await?;
        let again = h.services.enrollments.enroll(&learner, course_id).await;
        assert_eq!(again, Err(LmsError::Denied(DenyReason::AlreadyEnrolled)));

        let mine = h.services.enrollments.list_mine(&learner).await?;
        assert_eq!(mine.value().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_course_cannot_be_joined() -> LmsResult<()> {
        let h = harness();
        let course_id = course(&h, false).await?;
        let result = h.services.enrollments.enroll(&Actor::learner(3), course_id).await;
        assert_eq!(result, Err(LmsError::not_found(ResourceType::Course, course_id)));
        Ok(())
    }

    #[tokio::test]
    async fn test_instructor_cannot_enroll() -> LmsResult<()> {
        let h = harness();
        let course_id = course(&h, true).await?;
        let result = h.services.enrollments.enroll(&Actor::instructor(5), course_id).await;
        assert_eq!(result, Err(LmsError::Denied(DenyReason::InsufficientRole)));
        Ok(())
    }

    #[tokio::test]
    async fn test_role_is_checked_before_course_visibility() -> LmsResult<()> {
        let h = harness();
        let inactive = course(&h, false).await?;
        let result = h.services.enrollments.enroll(&Actor::instructor(5), inactive).await;
        assert_eq!(result, Err(LmsError::Denied(DenyReason::InsufficientRole)));

        let missing = h.services.enrollments.enroll(&Actor::instructor(5), 999).await;
        assert_eq!(missing, Err(LmsError::Denied(DenyReason::InsufficientRole)));
        Ok(())
    }

    #[tokio::test]
    async fn test_enrollment_updates_course_count() -> LmsResult<()> {
        let h = harness();
        let course_id = course(&h, true).await?;
        let before = h.services.courses.get(None, course_id).await?;
        assert_eq!(before.value().enrollment_count, 0);

        h.services.enrollments.enroll(&Actor::learner(3), course_id).await?;
        let after = h.services.courses.get(None, course_id).await?;
        assert!(!after.was_cache_hit());
        assert_eq!(after.value().enrollment_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_enrollment_visible_to_learner_and_owner_only() -> LmsResult<()> {
        let h = harness();
        let course_id = course(&h, true).await?;
        let enrollment = h.services.enrollments.enroll(&Actor::learner(3), course_id).await?;

        assert!(h.services.enrollments.get(&Actor::learner(3), enrollment.id).await.is_ok());
        assert!(h.services.enrollments.get(&Actor::instructor(2), enrollment.id).await.is_ok());
        let other = h.services.enrollments.get(&Actor::learner(4), enrollment.id).await;
        assert_eq!(
            other.map(|r| r.into_value().id),
            Err(LmsError::Denied(DenyReason::NotOwner))
        );

        // Deactivating the course does not touch existing enrollments.
        h.services
            .courses
            .update(
                &Actor::instructor(2),
                course_id,
                UpdateCourseRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        assert!(h.services.enrollments.get(&Actor::learner(3), enrollment.id).await.is_ok());
        Ok(())
    }
}

//! Course Service

use syllabus_core::{
    authorize, Action, Actor, Course, CourseDetail, CourseFilter, CourseId, CourseSummary,
    LmsError, LmsResult, NewCourse, ResourceDescriptor, ResourceType, Role,
};
use syllabus_storage::{CacheKey, CacheRead, MutationKind};

use super::{course_descriptor, ServiceContext};
use crate::types::{CreateCourseRequest, UpdateCourseRequest};
use crate::validation::Validate;

#[derive(Debug, Clone)]
pub struct CourseService {
    ctx: ServiceContext,
}

impl CourseService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Active courses matching `filter`. Open to anonymous callers.
    pub async fn list(
        &self,
        actor: Option<&Actor>,
        filter: &CourseFilter,
    ) -> LmsResult<CacheRead<Vec<CourseSummary>>> {
        let catalogue = ResourceDescriptor::new(ResourceType::Course).public(true);
        authorize(actor, Action::List, &catalogue).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(CacheKey::list(ResourceType::Course, filter.params()), || async move {
                Ok(store.course_list(filter).await?)
            })
            .await
    }

    /// Course with its published lessons and all assignments.
    pub async fn get(&self, actor: Option<&Actor>, id: CourseId) -> LmsResult<CacheRead<CourseDetail>> {
        let course = self.ctx.load_course(id).await?;
        authorize(actor, Action::Read, &course_descriptor(&course)).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(CacheKey::detail(ResourceType::Course, id), || async move {
                let course = store
                    .course_get(id)
                    .await?
                    .ok_or_else(|| LmsError::not_found(ResourceType::Course, id))?;
                Ok(CourseDetail {
                    enrollment_count: store.enrollment_count(id).await?,
                    lessons: store.lesson_list(id, true).await?,
                    assignments: store.assignment_list(id).await?,
                    course,
                })
            })
            .await
    }

    /// Instructors always own what they create; admins may name the owner.
    pub async fn create(&self, actor: &Actor, req: CreateCourseRequest) -> LmsResult<Course> {
        let target = ResourceDescriptor::new(ResourceType::Course);
        authorize(Some(actor), Action::Create, &target).into_result()?;
        req.validate()?;

        let instructor_id = match actor.role {
            Role::Admin => req.instructor_id.unwrap_or(actor.id),
            _ => actor.id,
        };
        let course = self
            .ctx
            .store
            .course_create(NewCourse {
                title: req.title,
                slug: req.slug,
                description: req.description,
                instructor_id,
                category: req.category,
                level: req.level,
                is_active: req.is_active,
            })
            .await?;
        self.ctx.committed(ResourceType::Course, MutationKind::Create).await?;

        tracing::info!(course_id = course.id, actor_id = actor.id, "course created");
        Ok(course)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: CourseId,
        req: UpdateCourseRequest,
    ) -> LmsResult<Course> {
        let course = self.ctx.load_course(id).await?;
        authorize(Some(actor), Action::Update, &course_descriptor(&course)).into_result()?;
        req.validate()?;

        let course = self.ctx.store.course_update(id, req.into()).await?;
        self.ctx.committed(ResourceType::Course, MutationKind::Update).await?;

        tracing::info!(course_id = id, actor_id = actor.id, "course updated");
        Ok(course)
    }

    /// Delete a course and everything inside it.
    pub async fn delete(&self, actor: &Actor, id: CourseId) -> LmsResult<()> {
        let course = self.ctx.load_course(id).await?;
        authorize(Some(actor), Action::Delete, &course_descriptor(&course)).into_result()?;

        self.ctx.store.course_delete(id).await?;
        self.ctx.committed(ResourceType::Course, MutationKind::Delete).await?;

        tracing::info!(course_id = id, actor_id = actor.id, "course deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::harness;
    use syllabus_core::{CourseLevel, DenyReason};
    use syllabus_storage::CacheBackend;

    fn create_req(slug: &str) -> CreateCourseRequest {
        CreateCourseRequest {
            title: "Python Programming Fundamentals".to_string(),
            slug: slug.to_string(),
            description: String::new(),
            category: "Programming".to_string(),
            level: CourseLevel::Beginner,
            is_active: true,
            instructor_id: None,
        }
    }

    #[tokio::test]
    async fn test_instructor_owns_created_course() -> LmsResult<()> {
        let h = harness();
        let mut req = create_req("python");
        req.instructor_id = Some(99);

        let course = h.services.courses.create(&Actor::instructor(2), req).await?;
        assert_eq!(course.instructor_id, 2);

        let mut req = create_req("rust");
        req.instructor_id = Some(5);
        let course = h.services.courses.create(&Actor::admin(1), req).await?;
        assert_eq!(course.instructor_id, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_learner_cannot_create_course() {
        let h = harness();
        let result = h
            .services
            .courses
            .create(&Actor::learner(3), create_req("python"))
            .await;
        assert_eq!(result, Err(LmsError::Denied(DenyReason::InsufficientRole)));
    }

    #[tokio::test]
    async fn test_list_served_from_cache_until_write() -> LmsResult<()> {
        let h = harness();
        let courses = &h.services.courses;
        let filter = CourseFilter::default();
        courses.create(&Actor::instructor(2), create_req("python")).await?;

        let first = courses.list(None, &filter).await?;
        assert!(!first.was_cache_hit());
        let second = courses.list(None, &filter).await?;
        assert!(second.was_cache_hit());
        assert_eq!(second.value().len(), 1);

        courses.create(&Actor::instructor(2), create_req("rust")).await?;
        let third = courses.list(None, &filter).await?;
        assert!(!third.was_cache_hit());
        assert_eq!(third.value().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_owner_update_is_denied_and_cache_kept() -> LmsResult<()> {
        let h = harness();
        let courses = &h.services.courses;
        let course = courses.create(&Actor::instructor(2), create_req("python")).await?;
        let filter = CourseFilter::default().with_category("Programming");
        courses.list(None, &filter).await?;

        let patch = UpdateCourseRequest {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let denied = courses.update(&Actor::instructor(5), course.id, patch.clone()).await;
        assert_eq!(denied, Err(LmsError::Denied(DenyReason::NotOwner)));
        assert!(courses.list(None, &filter).await?.was_cache_hit());

        courses.update(&Actor::instructor(2), course.id, patch).await?;
        let key = CacheKey::list(ResourceType::Course, filter.params());
        assert!(h.cache.get(&key).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_course_hidden_from_anonymous() -> LmsResult<()> {
        let h = harness();
        let mut req = create_req("draft");
        req.is_active = false;
        let course = h.services.courses.create(&Actor::instructor(2), req).await?;

        assert_eq!(
            h.services.courses.get(None, course.id).await.map(|r| r.into_value().course.id),
            Err(LmsError::Unauthenticated)
        );
        assert_eq!(
            h.services
                .courses
                .get(Some(&Actor::learner(3)), course.id)
                .await
                .map(|r| r.into_value().course.id),
            Err(LmsError::Denied(DenyReason::Forbidden))
        );
        let owner_view = h.services.courses.get(Some(&Actor::instructor(2)), course.id).await?;
        assert_eq!(owner_view.value().course.id, course.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_course_is_not_found() {
        let h = harness();
        let result = h.services.courses.delete(&Actor::admin(1), 404).await;
        assert_eq!(result, Err(LmsError::not_found(ResourceType::Course, 404)));
    }
}

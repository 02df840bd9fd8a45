//! Lesson Service
//!
//! Lesson lists and course details only ever show published lessons. An
//! unpublished lesson is readable by its course instructor (and admins).

use syllabus_core::{
    authorize, Action, Actor, CourseId, Lesson, LessonId, LmsError, LmsResult, ResourceType,
};
use syllabus_storage::{CacheKey, CacheRead, MutationKind};

use super::{child_descriptor, ServiceContext};
use crate::types::{CreateLessonRequest, UpdateLessonRequest};
use crate::validation::Validate;

#[derive(Debug, Clone)]
pub struct LessonService {
    ctx: ServiceContext,
}

impl LessonService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Published lessons of a course, ordered by `(order, id)`.
    pub async fn list_for_course(
        &self,
        actor: Option<&Actor>,
        course_id: CourseId,
    ) -> LmsResult<CacheRead<Vec<Lesson>>> {
        let course = self.ctx.load_course(course_id).await?;
        let target = child_descriptor(ResourceType::Lesson, &course).public(course.is_active);
        authorize(actor, Action::List, &target).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(
                CacheKey::list(ResourceType::Lesson, [("course_id", course_id)]),
                || async move { Ok(store.lesson_list(course_id, true).await?) },
            )
            .await
    }

    pub async fn get(&self, actor: Option<&Actor>, id: LessonId) -> LmsResult<CacheRead<Lesson>> {
        let lesson = self.ctx.load_lesson(id).await?;
        let course = self.ctx.load_course(lesson.course_id).await?;
        let target = child_descriptor(ResourceType::Lesson, &course)
            .with_id(id)
            .public(course.is_active && lesson.is_published);
        authorize(actor, Action::Read, &target).into_result()?;

        let store = &self.ctx.store;
        self.ctx
            .cache
            .read(CacheKey::detail(ResourceType::Lesson, id), || async move {
                store
                    .lesson_get(id)
                    .await?
                    .ok_or_else(|| LmsError::not_found(ResourceType::Lesson, id))
            })
            .await
    }

    pub async fn create(&self, actor: &Actor, req: CreateLessonRequest) -> LmsResult<Lesson> {
        let course = self.ctx.load_course(req.course_id).await?;
        let target = child_descriptor(ResourceType::Lesson, &course);
        authorize(Some(actor), Action::Create, &target).into_result()?;
        req.validate()?;

        let lesson = self.ctx.store.lesson_create(req.into()).await?;
        self.ctx.committed(ResourceType::Lesson, MutationKind::Create).await?;

        tracing::info!(lesson_id = lesson.id, course_id = course.id, "lesson created");
        Ok(lesson)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: LessonId,
        req: UpdateLessonRequest,
    ) -> LmsResult<Lesson> {
        let lesson = self.ctx.load_lesson(id).await?;
        let course = self.ctx.load_course(lesson.course_id).await?;
        let target = child_descriptor(ResourceType::Lesson, &course).with_id(id);
        authorize(Some(actor), Action::Update, &target).into_result()?;
        req.validate()?;

        let lesson = self.ctx.store.lesson_update(id, req.into()).await?;
        self.ctx.committed(ResourceType::Lesson, MutationKind::Update).await?;

        tracing::info!(lesson_id = id, actor_id = actor.id, "lesson updated");
        Ok(lesson)
    }

    pub async fn delete(&self, actor: &Actor, id: LessonId) -> LmsResult<()> {
        let lesson = self.ctx.load_lesson(id).await?;
        let course = self.ctx.load_course(lesson.course_id).await?;
        let target = child_descriptor(ResourceType::Lesson, &course).with_id(id);
        authorize(Some(actor), Action::Delete, &target).into_result()?;

        self.ctx.store.lesson_delete(id).await?;
        self.ctx.committed(ResourceType::Lesson, MutationKind::Delete).await?;

        tracing::info!(lesson_id = id, actor_id = actor.id, "lesson deleted");
        Ok(())
    }
}

//! Shared application state for Axum routers.

use std::sync::Arc;

use syllabus_core::SharedClock;
use syllabus_storage::{BackingStore, CacheBackend};

use crate::auth::{AuthConfig, JwtVerifier, PrincipalResolver};
use crate::config::ApiConfig;
use crate::services::{
    AssignmentService, CourseService, EnrollmentService, LessonService, ServiceContext, Services,
    SubmissionService,
};

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub courses: CourseService,
    pub lessons: LessonService,
    pub assignments: AssignmentService,
    pub enrollments: EnrollmentService,
    pub submissions: SubmissionService,
    pub resolver: PrincipalResolver,
    pub auth_config: Arc<AuthConfig>,
    pub api_config: Arc<ApiConfig>,
    /// Held for health reporting; services reach the cache through their context.
    pub cache_backend: Arc<dyn CacheBackend>,
    pub clock: SharedClock,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire services, cache and credential verification together.
    ///
    /// The auth configuration's clock drives token validation, cache expiry
    /// and entity timestamps alike.
    pub fn new(
        store: Arc<dyn BackingStore>,
        cache_backend: Arc<dyn CacheBackend>,
        api_config: ApiConfig,
        auth_config: AuthConfig,
    ) -> Self {
        let clock = auth_config.clock.clone();
        let ctx = ServiceContext::new(
            store,
            cache_backend.clone(),
            clock.clone(),
            api_config.cache.clone(),
        );
        let Services {
            courses,
            lessons,
            assignments,
            enrollments,
            submissions,
        } = Services::new(ctx);

        let resolver = PrincipalResolver::new(Arc::new(JwtVerifier::new(auth_config.clone())));

        Self {
            courses,
            lessons,
            assignments,
            enrollments,
            submissions,
            resolver,
            auth_config: Arc::new(auth_config),
            api_config: Arc::new(api_config),
            cache_backend,
            clock,
            start_time: std::time::Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_config", &self.api_config)
            .field("auth_config", &self.auth_config)
            .finish_non_exhaustive()
    }
}

crate::impl_from_ref!(CourseService, courses);
crate::impl_from_ref!(LessonService, lessons);
crate::impl_from_ref!(AssignmentService, assignments);
crate::impl_from_ref!(EnrollmentService, enrollments);
crate::impl_from_ref!(SubmissionService, submissions);
crate::impl_from_ref!(PrincipalResolver, resolver);
crate::impl_from_ref!(Arc<AuthConfig>, auth_config);
crate::impl_from_ref!(Arc<ApiConfig>, api_config);
crate::impl_from_ref!(Arc<dyn CacheBackend>, cache_backend);
crate::impl_from_ref!(SharedClock, clock);
crate::impl_from_ref!(std::time::Instant, start_time);

//! Middleware modules for the Syllabus API
//!
//! - `principal`: bearer token resolution and the actor extractors
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .nest("/api/v1", api_routes.layer(from_fn_with_state(resolver, principal_middleware)))
//!     .layer(TraceLayer::new_for_http())
//!     // Outermost
//!     .layer(cors)
//! ```

mod principal;

pub use principal::{principal_middleware, CurrentActor, OptionalActor};

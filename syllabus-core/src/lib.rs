//! Syllabus Core - Domain Types and Authorization
//!
//! Entity types, list filters, the error taxonomy, an injectable clock and
//! the role-based authorization engine. No I/O lives here; every other crate
//! depends on this one.

pub mod access;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;

pub use access::{
    authorize, Action, Actor, DenyReason, EnrollmentStatus, ResourceDescriptor, Verdict,
};
pub use clock::{Clock, FixedClock, ManualClock, SharedClock, SystemClock};
pub use entities::*;
pub use enums::{CourseLevel, ResourceType, Role};
pub use error::{
    CacheError, ConfigError, LmsError, LmsResult, StorageError, StorageResult, ValidationError,
};
pub use filter::CourseFilter;
pub use identity::*;

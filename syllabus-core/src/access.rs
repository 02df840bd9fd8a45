//! Authorization engine.
//!
//! [`authorize`] is a pure decision table over `(actor, action, resource)`.
//! It performs no I/O: callers load whatever facts a decision needs (owner,
//! visibility, the actor's enrollment) into a [`ResourceDescriptor`] first.
//!
//! Rules are evaluated top to bottom and the first match wins:
//!
//! | # | condition | verdict |
//! |---|-----------|---------|
//! | 1 | actor is admin | allow |
//! | 2 | list/read of a public course, lesson or assignment | allow, even anonymous |
//! | - | no actor | deny `Unauthenticated` |
//! | 3 | create content | instructor (and parent course owner for lessons and assignments) |
//! | 4 | update/delete content | instructor who owns the course |
//! | 5 | enroll | learner not already actively enrolled |
//! | 6 | submit | learner actively enrolled in the course |
//! | 7 | grade | instructor who owns the course |
//! | 7a | list/read a submission or enrollment | its learner or the course instructor |
//! | 7b | read non-public content | the course instructor |
//! | 8 | anything else | deny `Forbidden` |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ActorId, EntityId, LmsError, ResourceType, Role};

// ============================================================================
// ACTOR
// ============================================================================

/// Authenticated principal for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: ActorId) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn instructor(id: ActorId) -> Self {
        Self::new(id, Role::Instructor)
    }

    pub fn learner(id: ActorId) -> Self {
        Self::new(id, Role::Learner)
    }
}

// ============================================================================
// ACTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
    Enroll,
    Submit,
    Grade,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::List,
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Enroll,
        Action::Submit,
        Action::Grade,
    ];

    /// List and detail reads.
    pub fn is_read(&self) -> bool {
        matches!(self, Action::List | Action::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Action::List => "list",
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Enroll => "enroll",
            Action::Submit => "submit",
            Action::Grade => "grade",
        };
        f.write_str(value)
    }
}

// ============================================================================
// RESOURCE DESCRIPTOR
// ============================================================================

/// The acting principal's enrollment in the descriptor's course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    None,
    Active,
    Inactive,
}

/// Everything the engine may consult about the target of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub resource_type: ResourceType,
    pub id: Option<EntityId>,
    /// Instructor of the course the resource belongs to.
    pub owner_id: Option<ActorId>,
    pub parent_course_id: Option<EntityId>,
    /// Learner a submission or enrollment belongs to.
    pub subject_id: Option<ActorId>,
    /// Visible to anonymous readers.
    pub public: bool,
    pub actor_enrollment: EnrollmentStatus,
}

impl ResourceDescriptor {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            id: None,
            owner_id: None,
            parent_course_id: None,
            subject_id: None,
            public: false,
            actor_enrollment: EnrollmentStatus::None,
        }
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn owned_by(mut self, owner_id: ActorId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn in_course(mut self, course_id: EntityId) -> Self {
        self.parent_course_id = Some(course_id);
        self
    }

    pub fn for_subject(mut self, subject_id: ActorId) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_enrollment(mut self, status: EnrollmentStatus) -> Self {
        self.actor_enrollment = status;
        self
    }

    fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id == Some(actor.id)
    }

    fn is_subject(&self, actor: &Actor) -> bool {
        self.subject_id == Some(actor.id)
    }
}

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole,
    NotOwner,
    NotEnrolled,
    AlreadyEnrolled,
    Forbidden,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::InsufficientRole => "insufficient_role",
            DenyReason::NotOwner => "not_owner",
            DenyReason::NotEnrolled => "not_enrolled",
            DenyReason::AlreadyEnrolled => "already_enrolled",
            DenyReason::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// `Ok(())` on allow; the matching error otherwise.
    pub fn into_result(self) -> Result<(), LmsError> {
        match self {
            Verdict::Allow => Ok(()),
            Verdict::Deny(DenyReason::Unauthenticated) => Err(LmsError::Unauthenticated),
            Verdict::Deny(reason) => Err(LmsError::Denied(reason)),
        }
    }
}

// ============================================================================
// DECISION TABLE
// ============================================================================

/// Decide whether `actor` may perform `action` on `resource`.
pub fn authorize(actor: Option<&Actor>, action: Action, resource: &ResourceDescriptor) -> Verdict {
    use Verdict::{Allow, Deny};

    if actor.is_some_and(|a| a.role == Role::Admin) {
        return Allow;
    }

    let content = resource.resource_type.is_content();
    if action.is_read() && content && resource.public {
        return Allow;
    }

    let Some(actor) = actor else {
        return Deny(DenyReason::Unauthenticated);
    };

    match action {
        Action::Create if content => {
            if actor.role != Role::Instructor {
                Deny(DenyReason::InsufficientRole)
            } else if resource.resource_type != ResourceType::Course && !resource.is_owned_by(actor)
            {
                Deny(DenyReason::NotOwner)
            } else {
                Allow
            }
        }
        Action::Update | Action::Delete if content => {
            if actor.role == Role::Instructor && resource.is_owned_by(actor) {
                Allow
            } else {
                Deny(DenyReason::NotOwner)
            }
        }
        Action::Enroll => {
            if actor.role != Role::Learner {
                Deny(DenyReason::InsufficientRole)
            } else if resource.actor_enrollment == EnrollmentStatus::Active {
                Deny(DenyReason::AlreadyEnrolled)
            } else {
                Allow
            }
        }
        Action::Submit => {
            if actor.role == Role::Learner
                && resource.actor_enrollment == EnrollmentStatus::Active
            {
                Allow
            } else {
                Deny(DenyReason::NotEnrolled)
            }
        }
        Action::Grade => {
            if actor.role == Role::Instructor && resource.is_owned_by(actor) {
                Allow
            } else {
                Deny(DenyReason::NotOwner)
            }
        }
        Action::List | Action::Read if !content => {
            if resource.is_subject(actor) || resource.is_owned_by(actor) {
                Allow
            } else {
                Deny(DenyReason::NotOwner)
            }
        }
        Action::List | Action::Read => {
            if actor.role == Role::Instructor && resource.is_owned_by(actor) {
                Allow
            } else {
                Deny(DenyReason::Forbidden)
            }
        }
        _ => Deny(DenyReason::Forbidden),
    }
}

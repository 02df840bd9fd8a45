//! Property-Based Tests for the Authorization Engine
//!
//! The decision table must be total and deterministic, must let admins do
//! anything, and must tie content mutations to course ownership.

use proptest::prelude::*;
use syllabus_core::{
    authorize, Action, Actor, DenyReason, EnrollmentStatus, ResourceDescriptor, ResourceType,
    Role, Verdict,
};

// ============================================================================
// STRATEGIES
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Instructor), Just(Role::Learner)]
}

fn actor_strategy() -> impl Strategy<Value = Actor> {
    (1i64..20, role_strategy()).prop_map(|(id, role)| Actor::new(id, role))
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

fn resource_type_strategy() -> impl Strategy<Value = ResourceType> {
    prop::sample::select(ResourceType::ALL.to_vec())
}

fn enrollment_strategy() -> impl Strategy<Value = EnrollmentStatus> {
    prop_oneof![
        Just(EnrollmentStatus::None),
        Just(EnrollmentStatus::Active),
        Just(EnrollmentStatus::Inactive),
    ]
}

prop_compose! {
    fn descriptor_strategy()(
        resource_type in resource_type_strategy(),
        id in proptest::option::of(1i64..100),
        owner_id in proptest::option::of(1i64..20),
        parent_course_id in proptest::option::of(1i64..100),
        subject_id in proptest::option::of(1i64..20),
        public in any::<bool>(),
        actor_enrollment in enrollment_strategy(),
    ) -> ResourceDescriptor {
        ResourceDescriptor {
            resource_type,
            id,
            owner_id,
            parent_course_id,
            subject_id,
            public,
            actor_enrollment,
        }
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_authorize_is_deterministic(
        actor in proptest::option::of(actor_strategy()),
        action in action_strategy(),
        resource in descriptor_strategy(),
    ) {
        let first = authorize(actor.as_ref(), action, &resource);
        let second = authorize(actor.as_ref(), action, &resource);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_admin_is_always_allowed(
        id in 1i64..20,
        action in action_strategy(),
        resource in descriptor_strategy(),
    ) {
        let admin = Actor::admin(id);
        prop_assert_eq!(authorize(Some(&admin), action, &resource), Verdict::Allow);
    }

    #[test]
    fn prop_content_mutation_requires_ownership(
        id in 1i64..20,
        delete in any::<bool>(),
        resource in descriptor_strategy(),
    ) {
        prop_assume!(resource.resource_type.is_content());
        let action = if delete { Action::Delete } else { Action::Update };
        let instructor = Actor::instructor(id);

        let verdict = authorize(Some(&instructor), action, &resource);
        if resource.owner_id == Some(id) {
            prop_assert_eq!(verdict, Verdict::Allow);
        } else {
            prop_assert_eq!(verdict, Verdict::Deny(DenyReason::NotOwner));
        }
    }

    #[test]
    fn prop_anonymous_only_reads_public_content(
        action in action_strategy(),
        resource in descriptor_strategy(),
    ) {
        let verdict = authorize(None, action, &resource);
        let public_read =
            action.is_read() && resource.resource_type.is_content() && resource.public;

        if public_read {
            prop_assert_eq!(verdict, Verdict::Allow);
        } else {
            prop_assert_eq!(verdict, Verdict::Deny(DenyReason::Unauthenticated));
        }
    }

    #[test]
    fn prop_unauthenticated_reason_only_without_actor(
        actor in actor_strategy(),
        action in action_strategy(),
        resource in descriptor_strategy(),
    ) {
        let verdict = authorize(Some(&actor), action, &resource);
        prop_assert_ne!(verdict, Verdict::Deny(DenyReason::Unauthenticated));
    }

    #[test]
    fn prop_only_learners_enroll(
        actor in actor_strategy(),
        resource in descriptor_strategy(),
    ) {
        let verdict = authorize(Some(&actor), Action::Enroll, &resource);
        match actor.role {
            Role::Admin => prop_assert_eq!(verdict, Verdict::Allow),
            Role::Instructor => {
                prop_assert_eq!(verdict, Verdict::Deny(DenyReason::InsufficientRole))
            }
            Role::Learner if resource.actor_enrollment == EnrollmentStatus::Active => {
                prop_assert_eq!(verdict, Verdict::Deny(DenyReason::AlreadyEnrolled))
            }
            Role::Learner => prop_assert_eq!(verdict, Verdict::Allow),
        }
    }

    #[test]
    fn prop_public_content_is_readable_by_everyone(
        actor in proptest::option::of(actor_strategy()),
        read in prop_oneof![Just(Action::List), Just(Action::Read)],
        resource_type in resource_type_strategy(),
    ) {
        prop_assume!(resource_type.is_content());
        let resource = ResourceDescriptor::new(resource_type).public(true);
        prop_assert_eq!(authorize(actor.as_ref(), read, &resource), Verdict::Allow);
    }

    #[test]
    fn prop_learners_never_create_content(
        id in 1i64..20,
        resource in descriptor_strategy(),
    ) {
        prop_assume!(resource.resource_type.is_content());
        prop_assert_eq!(
            authorize(Some(&Actor::learner(id)), Action::Create, &resource),
            Verdict::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn prop_grading_requires_course_ownership(
        actor in actor_strategy(),
        owner in 1i64..20,
    ) {
        let resource = ResourceDescriptor::new(ResourceType::Submission).owned_by(owner);
        let verdict = authorize(Some(&actor), Action::Grade, &resource);
        let expected = actor.role == Role::Admin
            || (actor.role == Role::Instructor && actor.id == owner);
        prop_assert_eq!(verdict.is_allowed(), expected);
    }

    #[test]
    fn prop_submit_requires_active_enrollment(
        actor in actor_strategy(),
        enrollment in enrollment_strategy(),
    ) {
        let resource = ResourceDescriptor::new(ResourceType::Assignment).with_enrollment(enrollment);
        let verdict = authorize(Some(&actor), Action::Submit, &resource);
        let expected = actor.role == Role::Admin
            || (actor.role == Role::Learner && enrollment == EnrollmentStatus::Active);
        prop_assert_eq!(verdict.is_allowed(), expected);
    }

    #[test]
    fn prop_verdict_result_agrees_with_verdict(
        actor in proptest::option::of(actor_strategy()),
        action in action_strategy(),
        resource in descriptor_strategy(),
    ) {
        let verdict = authorize(actor.as_ref(), action, &resource);
        prop_assert_eq!(verdict.into_result().is_ok(), verdict.is_allowed());
    }
}

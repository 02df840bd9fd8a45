//! Demo catalogue
//!
//! Populates an empty store with three courses, lessons, assignments,
//! enrollments and two submissions so a fresh server has something to list.
//! Writes go straight to the backing store; run it before the server starts
//! taking requests so no cache entry predates the data.
//!
//! Demo actors (use `POST /api/v1/auth/dev/token` to get tokens):
//! - 1: admin
//! - 2, 3: instructors
//! - 4..=8: learners

use chrono::Duration;
use syllabus_core::{
    ActorId, CourseFilter, CourseLevel, LmsResult, NewAssignment, NewCourse, NewEnrollment,
    NewLesson, NewSubmission, SubmissionGrade, Timestamp, DEFAULT_MAX_SCORE,
};
use syllabus_storage::BackingStore;

pub const DEMO_ADMIN: ActorId = 1;
pub const DEMO_INSTRUCTORS: [ActorId; 2] = [2, 3];
pub const DEMO_LEARNERS: [ActorId; 5] = [4, 5, 6, 7, 8];

const MARKER_SLUG: &str = "python-programming";

/// What a seeding run created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub courses: usize,
    pub lessons: usize,
    pub assignments: usize,
    pub enrollments: usize,
    pub submissions: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn course(
    title: &str,
    slug: &str,
    description: &str,
    instructor_id: ActorId,
    category: &str,
    level: CourseLevel,
) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        slug: slug.to_string(),
        description: description.to_string(),
        instructor_id,
        category: category.to_string(),
        level,
        is_active: true,
    }
}

/// Seed the demo catalogue. Does nothing if it is already present.
pub async fn seed_demo_data(store: &dyn BackingStore, now: Timestamp) -> LmsResult<SeedSummary> {
    let existing = store.course_list(&CourseFilter::default()).await?;
    if existing.iter().any(|row| row.course.slug == MARKER_SLUG) {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(SeedSummary::default());
    }

    let [first_instructor, second_instructor] = DEMO_INSTRUCTORS;
    let mut summary = SeedSummary::default();

    let python = store
        .course_create(course(
            "Python Programming Fundamentals",
            MARKER_SLUG,
            "Learn Python programming from scratch with hands-on projects",
            first_instructor,
            "Programming",
            CourseLevel::Beginner,
        ))
        .await?;
    let web = store
        .course_create(course(
            "Modern Web Development",
            "web-development",
            "Build modern web applications end to end",
            first_instructor,
            "Web Development",
            CourseLevel::Intermediate,
        ))
        .await?;
    store
        .course_create(course(
            "Data Science with Python",
            "data-science",
            "Master data science concepts using Python and popular libraries",
            second_instructor,
            "Data Science",
            CourseLevel::Advanced,
        ))
        .await?;
    summary.courses = 3;

    let lessons = [
        (
            "Introduction to Python",
            "intro-python",
            "Getting started with Python programming",
            "Python is a high-level, interpreted programming language...",
            30,
        ),
        (
            "Variables and Data Types",
            "variables-datatypes",
            "Understanding Python variables and data types",
            "In Python, variables are used to store data...",
            45,
        ),
        (
            "Control Flow",
            "control-flow",
            "If statements, loops, and more",
            "Control flow statements control the order...",
            60,
        ),
    ];
    for (order, (title, slug, description, content, minutes)) in (1u32..).zip(lessons) {
        store
            .lesson_create(NewLesson {
                course_id: python.id,
                title: title.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
                content: content.to_string(),
                video_url: None,
                duration_minutes: minutes,
                order,
                is_published: true,
            })
            .await?;
        summary.lessons += 1;
    }

    let quiz = store
        .assignment_create(NewAssignment {
            course_id: python.id,
            title: "Python Basics Quiz".to_string(),
            description: "Test your understanding of Python basics".to_string(),
            instructions: "Complete the quiz within the time limit".to_string(),
            max_score: DEFAULT_MAX_SCORE,
            due_date: now + Duration::days(7),
        })
        .await?;
    store
        .assignment_create(NewAssignment {
            course_id: python.id,
            title: "Build a Calculator".to_string(),
            description: "Create a simple calculator application".to_string(),
            instructions: "Use functions and handle exceptions properly".to_string(),
            max_score: DEFAULT_MAX_SCORE,
            due_date: now + Duration::days(14),
        })
        .await?;
    summary.assignments = 2;

    for learner_id in &DEMO_LEARNERS[..3] {
        store
            .enrollment_create(NewEnrollment {
                learner_id: *learner_id,
                course_id: python.id,
            })
            .await?;
        summary.enrollments += 1;
    }
    for learner_id in &DEMO_LEARNERS[2..] {
        store
            .enrollment_create(NewEnrollment {
                learner_id: *learner_id,
                course_id: web.id,
            })
            .await?;
        summary.enrollments += 1;
    }

    let graded = store
        .submission_create(NewSubmission {
            assignment_id: quiz.id,
            learner_id: DEMO_LEARNERS[0],
            content: "My quiz submission with all answers".to_string(),
        })
        .await?;
    store
        .submission_grade(
            graded.id,
            SubmissionGrade {
                score: 85.0,
                feedback: "Good work! Keep it up.".to_string(),
                graded_by: first_instructor,
            },
        )
        .await?;
    store
        .submission_create(NewSubmission {
            assignment_id: quiz.id,
            learner_id: DEMO_LEARNERS[1],
            content: "Quiz answers, first attempt".to_string(),
        })
        .await?;
    summary.submissions = 2;

    tracing::info!(?summary, "Demo data seeded");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use syllabus_storage::InMemoryStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() -> LmsResult<()> {
        let store = InMemoryStore::new();
        let first = seed_demo_data(&store, Utc::now()).await?;
        assert_eq!(first.courses, 3);
        assert_eq!(first.enrollments, 6);
        assert_eq!(first.submissions, 2);

        let second = seed_demo_data(&store, Utc::now()).await?;
        assert!(second.is_empty());
        assert_eq!(store.course_count().await, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_seeded_catalogue_shape() -> LmsResult<()> {
        let store = InMemoryStore::new();
        seed_demo_data(&store, Utc::now()).await?;

        let rows = store.course_list(&CourseFilter::default()).await?;
        let python = rows
            .iter()
            .find(|row| row.course.slug == MARKER_SLUG)
            .map(|row| (row.course.id, row.enrollment_count));
        let Some((python_id, enrolled)) = python else {
            panic!("python course missing");
        };
        assert_eq!(enrolled, 3);
        assert_eq!(store.lesson_list(python_id, true).await?.len(), 3);

        let assignments = store.assignment_list(python_id).await?;
        let average = store.assignment_average_score(assignments[0].id).await?;
        assert_eq!(average, Some(85.0));
        Ok(())
    }
}

use crate::core::classroom::{ClassroomDirectory, Course, CourseState};
use crate::core::remote::RemoteError;

/// Phrase the operator must type before anything is deleted.
pub const CONFIRMATION_PHRASE: &str = "DELETE_ALL";

/// Per-course tally of a purge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub course_id: String,
    pub course_name: String,
    pub materials_deleted: usize,
    pub work_deleted: usize,
    pub failures: usize,
    /// Set when a listing call failed and the pass stopped early.
    pub aborted: bool,
}

/// Removes every course material and every coursework from courses.
/// Courses and rosters are left alone.
pub struct CleanupService<C: ClassroomDirectory> {
    classroom: C,
}

impl<C: ClassroomDirectory> CleanupService<C> {
    pub fn new(classroom: C) -> Self {
        Self { classroom }
    }

    /// Active and archived courses, optionally limited to `only` ids.
    pub async fn targets(&self, only: &[String]) -> Result<Vec<Course>, RemoteError> {
        let courses = self
            .classroom
            .list_courses(&[CourseState::Active, CourseState::Archived])
            .await?;

        if only.is_empty() {
            return Ok(courses);
        }
        Ok(courses
            .into_iter()
            .filter(|c| only.iter().any(|id| id == &c.id))
            .collect())
    }

    pub fn is_confirmed(phrase: &str) -> bool {
        phrase.trim() == CONFIRMATION_PHRASE
    }

    pub async fn purge(&self, courses: &[Course]) -> Vec<PurgeReport> {
        let mut reports = Vec::with_capacity(courses.len());
        for course in courses {
            reports.push(self.purge_course(course).await);
        }
        reports
    }

    /// Materials first, then coursework.
    pub async fn purge_course(&self, course: &Course) -> PurgeReport {
        let mut report = PurgeReport {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            ..Default::default()
        };

        match self.classroom.list_materials(&course.id).await {
            Ok(materials) => {
                for material in materials {
                    match self.classroom.delete_material(&course.id, &material.id).await {
                        Ok(()) => {
                            tracing::info!(course_id = %course.id, "Deleted material '{}'", material.title);
                            report.materials_deleted += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to delete material '{}' (id={}): {}",
                                material.title,
                                material.id,
                                e
                            );
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(course_id = %course.id, "Failed to list materials: {}", e);
                report.aborted = true;
                return report;
            }
        }

        match self.classroom.list_course_work(&course.id).await {
            Ok(works) => {
                for work in works {
                    match self.classroom.delete_course_work(&course.id, &work.id).await {
                        Ok(()) => {
                            tracing::info!(course_id = %course.id, "Deleted coursework '{}'", work.title);
                            report.work_deleted += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to delete coursework '{}' (id={}): {}",
                                work.title,
                                work.id,
                                e
                            );
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(course_id = %course.id, "Failed to list coursework: {}", e);
                report.aborted = true;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{course, work, FakeClassroom};

    async fn seeded() -> FakeClassroom {
        let classroom = FakeClassroom::new();
        classroom.add_course(course("c1", "One", CourseState::Active)).await;
        classroom.add_course(course("c2", "Two", CourseState::Archived)).await;
        classroom.add_course(course("c3", "Three", CourseState::Declined)).await;
        classroom.add_material("c1", "m1", "Handout").await;
        classroom.add_material("c1", "m2", "Slides").await;
        classroom.add_work("c1", work("w1", "Quiz 1", Some(10.0))).await;
        classroom.add_work("c1", work("w2", "Quiz 2", Some(10.0))).await;
        classroom.add_work("c2", work("w3", "Old quiz", None)).await;
        classroom
    }

    #[tokio::test]
    async fn test_targets_are_active_and_archived() {
        let service = CleanupService::new(seeded().await);

        let all = service.targets(&[]).await.unwrap();
        let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        let only = service.targets(&["c2".to_string()]).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "c2");
    }

    #[tokio::test]
    async fn test_purge_deletes_everything() {
        let classroom = seeded().await;
        let service = CleanupService::new(classroom.clone());

        let targets = service.targets(&[]).await.unwrap();
        let reports = service.purge(&targets).await;

        assert_eq!(reports[0].materials_deleted, 2);
        assert_eq!(reports[0].work_deleted, 2);
        assert_eq!(reports[1].work_deleted, 1);
        assert_eq!(classroom.remaining_materials("c1").await, 0);
        assert_eq!(classroom.remaining_work("c1").await, 0);
        assert_eq!(classroom.remaining_work("c2").await, 0);
    }

    #[tokio::test]
    async fn test_single_delete_failure_continues() {
        let classroom = seeded().await;
        classroom.fail_on("delete_work:w1").await;
        let service = CleanupService::new(classroom.clone());

        let report = service
            .purge_course(&course("c1", "One", CourseState::Active))
            .await;

        assert_eq!(report.work_deleted, 1);
        assert_eq!(report.failures, 1);
        assert!(!report.aborted);
        assert_eq!(classroom.remaining_work("c1").await, 1);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_course() {
        let classroom = seeded().await;
        classroom.fail_on("list_materials:c1").await;
        let service = CleanupService::new(classroom.clone());

        let report = service
            .purge_course(&course("c1", "One", CourseState::Active))
            .await;

        assert!(report.aborted);
        assert_eq!(report.work_deleted, 0);
        assert_eq!(classroom.remaining_work("c1").await, 2);
    }

    #[test]
    fn test_confirmation_phrase() {
        assert!(CleanupService::<FakeClassroom>::is_confirmed("DELETE_ALL"));
        assert!(CleanupService::<FakeClassroom>::is_confirmed("  DELETE_ALL\n"));
        assert!(!CleanupService::<FakeClassroom>::is_confirmed("delete_all"));
        assert!(!CleanupService::<FakeClassroom>::is_confirmed("yes"));
    }
}

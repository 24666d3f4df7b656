// Course management: listing, creating, archiving, deleting, rosters.
// Classroom only deletes archived courses, so removal is always
// archive-then-delete.

use thiserror::Error;

use crate::core::classroom::{ClassroomDirectory, Course, CourseState, NewCourse, Student, Topic};
use crate::core::remote::RemoteError;

#[derive(Debug, Error)]
pub enum CourseError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Course {0} is not archived; archive it before deleting")]
    NotArchived(String),

    #[error("Course name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Archived,
    AlreadyArchived,
}

/// Result of removing one course in a batch.
#[derive(Debug)]
pub struct RemovalReport {
    pub course_id: String,
    pub archive: Result<ArchiveOutcome, CourseError>,
    /// `None` when deletion was not attempted.
    pub delete: Option<Result<(), CourseError>>,
}

impl RemovalReport {
    pub fn succeeded(&self) -> bool {
        self.archive.is_ok() && !matches!(self.delete, Some(Err(_)))
    }
}

pub struct CourseService<C: ClassroomDirectory> {
    classroom: C,
}

impl<C: ClassroomDirectory> CourseService<C> {
    pub fn new(classroom: C) -> Self {
        Self { classroom }
    }

    pub async fn list_courses(&self, states: &[CourseState]) -> Result<Vec<Course>, CourseError> {
        Ok(self.classroom.list_courses(states).await?)
    }

    pub async fn list_topics(&self, course_id: &str) -> Result<Vec<Topic>, CourseError> {
        Ok(self.classroom.list_topics(course_id).await?)
    }

    pub async fn list_students(&self, course_id: &str) -> Result<Vec<Student>, CourseError> {
        Ok(self.classroom.list_students(course_id).await?)
    }

    pub async fn create_course(&self, course: NewCourse) -> Result<Course, CourseError> {
        if course.name.trim().is_empty() {
            return Err(CourseError::EmptyName);
        }
        let created = self.classroom.create_course(&course).await?;
        tracing::info!(course_id = %created.id, "Created course '{}'", created.name);
        Ok(created)
    }

    pub async fn archive_course(&self, course_id: &str) -> Result<ArchiveOutcome, CourseError> {
        let course = self.classroom.get_course(course_id).await?;
        if course.state == CourseState::Archived {
            return Ok(ArchiveOutcome::AlreadyArchived);
        }

        self.classroom
            .update_course_state(course_id, CourseState::Archived)
            .await?;
        tracing::info!(course_id, "Archived course");
        Ok(ArchiveOutcome::Archived)
    }

    /// Permanently deletes a course that is already archived.
    pub async fn delete_archived_course(&self, course_id: &str) -> Result<(), CourseError> {
        let course = self.classroom.get_course(course_id).await?;
        if course.state != CourseState::Archived {
            return Err(CourseError::NotArchived(course_id.to_string()));
        }

        self.classroom.delete_course(course_id).await?;
        tracing::info!(course_id, "Deleted course");
        Ok(())
    }

    /// Archives then (unless `archive_only`) deletes each course. One failing
    /// course does not stop the rest.
    pub async fn remove_courses(&self, course_ids: &[String], archive_only: bool) -> Vec<RemovalReport> {
        let mut reports = Vec::with_capacity(course_ids.len());

        for course_id in course_ids {
            let archive = self.archive_course(course_id).await;
            if let Err(e) = &archive {
                tracing::warn!(course_id = %course_id, "Failed to archive course: {}", e);
            }

            let delete = if archive_only || archive.is_err() {
                None
            } else {
                let result = self.delete_archived_course(course_id).await;
                if let Err(e) = &result {
                    tracing::warn!(course_id = %course_id, "Failed to delete course: {}", e);
                }
                Some(result)
            };

            reports.push(RemovalReport {
                course_id: course_id.clone(),
                archive,
                delete,
            });
        }

        reports
    }
}

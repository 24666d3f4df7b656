use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::score_sheet::{collect_scores, DATA_RANGE, HEADER_RANGE};
use crate::core::classroom::{ClassroomDirectory, CourseWork};
use crate::core::remote::RemoteError;

/// Read access to spreadsheet values (Google Sheets).
#[async_trait]
pub trait SpreadsheetReader: Send + Sync {
    /// Rows of the A1 `range`, each trimmed of trailing empty cells.
    async fn read_range(&self, sheet_id: &str, range: &str)
        -> Result<Vec<Vec<String>>, RemoteError>;
}

#[derive(Debug, Error)]
pub enum GradeSyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Coursework {0} not found in course")]
    UnknownCourseWork(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeSyncReport {
    pub course_work_id: String,
    pub title: String,
    pub work_type: Option<String>,
    /// Google Forms linked from the coursework.
    pub form_ids: Vec<String>,
    pub applied: usize,
    pub skipped_no_student: usize,
    pub skipped_no_submission: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct GradeSyncRequest {
    pub course_id: String,
    pub sheet_id: String,
    /// Restricts the run to one coursework; all coursework otherwise.
    pub course_work_id: Option<String>,
    /// Skip coursework that links no Google Form.
    pub forms_only: bool,
}

/// Copies quiz scores from a response sheet into Classroom grades.
pub struct GradeSyncService<C: ClassroomDirectory, S: SpreadsheetReader> {
    classroom: C,
    sheets: S,
    /// email -> user id, used when the roster hides an email.
    fallback_emails: HashMap<String, String>,
}

impl<C: ClassroomDirectory, S: SpreadsheetReader> GradeSyncService<C, S> {
    pub fn new(classroom: C, sheets: S, fallback_emails: HashMap<String, String>) -> Self {
        let fallback_emails = fallback_emails
            .into_iter()
            .map(|(email, user_id)| (email.trim().to_lowercase(), user_id))
            .collect();
        Self {
            classroom,
            sheets,
            fallback_emails,
        }
    }

    pub async fn read_scores(&self, sheet_id: &str) -> Result<HashMap<String, f64>, RemoteError> {
        let header = self
            .sheets
            .read_range(sheet_id, HEADER_RANGE)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        let rows = self.sheets.read_range(sheet_id, DATA_RANGE).await?;

        let scores = collect_scores(&header, &rows);
        tracing::info!(count = scores.len(), "Read scores from sheet");
        Ok(scores)
    }

    /// Lowercase email -> user id for everyone enrolled.
    pub async fn student_emails(&self, course_id: &str) -> Result<HashMap<String, String>, RemoteError> {
        let mut map = HashMap::new();
        for student in self.classroom.list_students(course_id).await? {
            match &student.email {
                Some(email) if !email.trim().is_empty() => {
                    map.insert(email.trim().to_lowercase(), student.user_id.clone());
                }
                _ => {
                    tracing::warn!(
                        user_id = %student.user_id,
                        "Student email is hidden, relying on fallback mapping"
                    );
                }
            }
        }

        for (email, user_id) in &self.fallback_emails {
            let already_mapped = map.values().any(|id| id == user_id);
            if !already_mapped {
                map.entry(email.clone()).or_insert_with(|| user_id.clone());
            }
        }

        Ok(map)
    }

    pub async fn sync(&self, request: &GradeSyncRequest) -> Result<Vec<GradeSyncReport>, GradeSyncError> {
        let scores = self.read_scores(&request.sheet_id).await?;
        let students = self.student_emails(&request.course_id).await?;

        let all_work = self.classroom.list_course_work(&request.course_id).await?;
        let targets: Vec<CourseWork> = match &request.course_work_id {
            Some(id) => {
                let found: Vec<_> = all_work.into_iter().filter(|w| &w.id == id).collect();
                if found.is_empty() {
                    return Err(GradeSyncError::UnknownCourseWork(id.clone()));
                }
                found
            }
            None => all_work,
        };
        let targets: Vec<CourseWork> = if request.forms_only {
            targets
                .into_iter()
                .filter(|w| !w.linked_form_ids().is_empty())
                .collect()
        } else {
            targets
        };

        let mut reports = Vec::with_capacity(targets.len());
        for work in &targets {
            reports.push(
                self.sync_course_work(&request.course_id, work, &scores, &students)
                    .await?,
            );
        }
        Ok(reports)
    }

    async fn sync_course_work(
        &self,
        course_id: &str,
        work: &CourseWork,
        scores: &HashMap<String, f64>,
        students: &HashMap<String, String>,
    ) -> Result<GradeSyncReport, GradeSyncError> {
        let mut report = GradeSyncReport {
            course_work_id: work.id.clone(),
            title: work.title.clone(),
            work_type: work.work_type.clone(),
            form_ids: work.linked_form_ids(),
            ..Default::default()
        };

        let submissions: HashMap<String, String> = self
            .classroom
            .list_submissions(course_id, &work.id)
            .await?
            .into_iter()
            .map(|s| (s.user_id, s.id))
            .collect();

        let mut emails: Vec<_> = scores.keys().collect();
        emails.sort();

        for email in emails {
            let Some(user_id) = students.get(email) else {
                tracing::debug!("No enrolled student for {}", email);
                report.skipped_no_student += 1;
                continue;
            };
            let Some(submission_id) = submissions.get(user_id) else {
                tracing::debug!("No submission from {} on '{}'", email, work.title);
                report.skipped_no_submission += 1;
                continue;
            };

            let mut grade = scores[email];
            if let Some(max) = work.max_points {
                grade = grade.min(max);
            }

            match self
                .classroom
                .grade_submission(course_id, &work.id, submission_id, grade)
                .await
            {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    tracing::warn!("Failed to grade {} on '{}': {}", email, work.title, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            course_work_id = %work.id,
            applied = report.applied,
            "Synced grades for '{}'",
            work.title
        );
        Ok(report)
    }
}

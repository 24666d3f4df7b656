// Provisions whole training courses: course, then topics, then the documents
// of each topic uploaded to Drive and attached as course materials.

use std::path::PathBuf;

use thiserror::Error;

use super::training_models::TrainingCourse;
use crate::core::classroom::{ClassroomDirectory, NewCourse, NewCourseMaterial};
use crate::core::quiz::FileStorage;
use crate::core::remote::RemoteError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const MATERIAL_DESCRIPTION: &str = "Training material. Open the attached document.";

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Training structure is empty")]
    EmptyStructure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub courses_created: usize,
    pub topics_created: usize,
    pub materials_created: usize,
    /// Filenames that were listed but not found locally.
    pub missing_files: Vec<String>,
}

pub struct TrainingService<C: ClassroomDirectory, D: FileStorage> {
    classroom: C,
    storage: D,
    documents_dir: PathBuf,
    drive_folder_id: Option<String>,
}

impl<C: ClassroomDirectory, D: FileStorage> TrainingService<C, D> {
    pub fn new(
        classroom: C,
        storage: D,
        documents_dir: impl Into<PathBuf>,
        drive_folder_id: Option<String>,
    ) -> Self {
        Self {
            classroom,
            storage,
            documents_dir: documents_dir.into(),
            drive_folder_id,
        }
    }

    /// Stops at the first remote failure. A missing local document only skips
    /// that material.
    pub async fn provision(&self, courses: &[TrainingCourse]) -> Result<ProvisionReport, TrainingError> {
        if courses.is_empty() {
            return Err(TrainingError::EmptyStructure);
        }

        let mut report = ProvisionReport::default();

        for training in courses {
            let new_course = NewCourse {
                section: training.section.clone(),
                ..NewCourse::active(training.name.clone())
            };
            let course = self.classroom.create_course(&new_course).await?;
            report.courses_created += 1;
            tracing::info!(course_id = %course.id, "Created training course '{}'", course.name);

            for training_topic in &training.topics {
                let topic = self
                    .classroom
                    .create_topic(&course.id, &training_topic.name)
                    .await?;
                report.topics_created += 1;
                tracing::info!(topic_id = %topic.topic_id, "Created topic '{}'", topic.name);

                for material in &training_topic.materials {
                    let path = self.documents_dir.join(&material.filename);
                    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                        tracing::warn!("Document not found, skipping: {}", path.display());
                        report.missing_files.push(material.filename.clone());
                        continue;
                    }

                    let file_id = self
                        .storage
                        .upload_file(&path, DOCX_MIME, self.drive_folder_id.as_deref())
                        .await?;

                    let created = self
                        .classroom
                        .create_material(
                            &course.id,
                            &NewCourseMaterial {
                                title: material.title.clone(),
                                description: MATERIAL_DESCRIPTION.to_string(),
                                drive_file_id: file_id,
                                topic_id: Some(topic.topic_id.clone()),
                            },
                        )
                        .await?;
                    report.materials_created += 1;
                    tracing::info!(material_id = %created.id, "Added material '{}'", created.title);
                }
            }
        }

        Ok(report)
    }
}

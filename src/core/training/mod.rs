pub mod training_models;
pub mod training_service;

pub use training_models::{parse_structure, TrainingCourse, TrainingMaterial, TrainingTopic};
pub use training_service::{ProvisionReport, TrainingError, TrainingService, DOCX_MIME};

use std::path::Path;

use async_trait::async_trait;

use super::question_parser::Question;
use crate::core::remote::RemoteError;

/// A freshly created form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormHandle {
    pub form_id: String,
    pub responder_uri: Option<String>,
}

/// Remote quiz builder (Google Forms).
#[async_trait]
pub trait QuizForms: Send + Sync {
    async fn create_form(&self, title: &str) -> Result<FormHandle, RemoteError>;

    /// Turns the form into a quiz that collects respondent emails and appends
    /// one graded multiple-choice item per question, in order.
    async fn add_questions(&self, form_id: &str, questions: &[Question])
        -> Result<(), RemoteError>;

    async fn responder_uri(&self, form_id: &str) -> Result<Option<String>, RemoteError>;
}

/// Remote document storage (Google Drive).
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Lets anyone with the link open the file.
    async fn share_with_anyone(&self, file_id: &str) -> Result<(), RemoteError>;

    /// Uploads a local file and returns its id.
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<String, RemoteError>;
}

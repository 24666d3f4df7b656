use thiserror::Error;

use super::question_parser::{ParseError, Question};
use super::quiz_ports::{FileStorage, QuizForms};
use crate::core::classroom::{ClassroomDirectory, LinkMaterial, NewCourseWork};
use crate::core::remote::RemoteError;

const ASSIGNMENT_DESCRIPTION: &str = "Assessment created automatically.";

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Form {0} was created but has no responder link")]
    MissingResponderLink(String),
}

/// Where and how to publish a quiz.
#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub course_id: String,
    pub topic_id: Option<String>,
    pub title: String,
    pub max_points: f64,
}

/// What got created.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPublication {
    pub form_id: String,
    pub responder_uri: String,
    pub course_work_id: String,
    /// False when the form could not be opened to anyone with the link.
    pub shared_publicly: bool,
}

/// Builds a Forms quiz from parsed questions and posts it as a Classroom assignment.
pub struct QuizService<C: ClassroomDirectory, F: QuizForms, D: FileStorage> {
    classroom: C,
    forms: F,
    storage: D,
}

impl<C, F, D> QuizService<C, F, D>
where
    C: ClassroomDirectory,
    F: QuizForms,
    D: FileStorage,
{
    pub fn new(classroom: C, forms: F, storage: D) -> Self {
        Self {
            classroom,
            forms,
            storage,
        }
    }

    /// Creates the form, shares it, adds the questions and posts the assignment.
    ///
    /// Takes already-parsed questions, so a malformed batch never reaches this
    /// point and nothing is created for it.
    pub async fn publish(
        &self,
        request: &QuizRequest,
        questions: &[Question],
    ) -> Result<QuizPublication, QuizError> {
        if questions.is_empty() {
            return Err(ParseError::NoValidQuestions.into());
        }

        let form = self.forms.create_form(&request.title).await?;
        tracing::info!(form_id = %form.form_id, "Created quiz form");

        // Sharing can be blocked by domain policy; the quiz still works for
        // signed-in users of the domain, so this is not fatal.
        let shared_publicly = match self.storage.share_with_anyone(&form.form_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Could not make form {} public, share it manually: {}",
                    form.form_id,
                    e
                );
                false
            }
        };

        self.forms.add_questions(&form.form_id, questions).await?;
        tracing::info!(count = questions.len(), "Added questions to form");

        let responder_uri = match self.forms.responder_uri(&form.form_id).await? {
            Some(uri) => uri,
            None => form
                .responder_uri
                .clone()
                .ok_or_else(|| QuizError::MissingResponderLink(form.form_id.clone()))?,
        };

        let work = NewCourseWork {
            title: request.title.clone(),
            description: ASSIGNMENT_DESCRIPTION.to_string(),
            link: Some(LinkMaterial {
                url: responder_uri.clone(),
                title: request.title.clone(),
            }),
            topic_id: request.topic_id.clone(),
            max_points: request.max_points,
        };

        let created = self
            .classroom
            .create_course_work(&request.course_id, &work)
            .await?;
        tracing::info!(course_work_id = %created.id, "Created Classroom assignment");

        Ok(QuizPublication {
            form_id: form.form_id,
            responder_uri,
            course_work_id: created.id,
            shared_publicly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quiz::question_parser::parse_questions;
    use crate::core::test_support::{FakeClassroom, FakeForms, FakeStorage};

    fn request() -> QuizRequest {
        QuizRequest {
            course_id: "c1".to_string(),
            topic_id: Some("t1".to_string()),
            title: "Safety quiz".to_string(),
            max_points: 10.0,
        }
    }

    #[tokio::test]
    async fn test_publish_creates_form_and_assignment() {
        let classroom = FakeClassroom::new();
        let forms = FakeForms::new();
        let storage = FakeStorage::new();
        let service = QuizService::new(classroom.clone(), forms.clone(), storage.clone());

        let questions = parse_questions(
            "P1: First?\nA) a\nB) b\nG: B\nP2: Second?\nA) c\nB) d\nC) e\nG: A",
        )
        .unwrap();

        let publication = service.publish(&request(), &questions).await.unwrap();

        assert_eq!(publication.form_id, "form-1");
        assert_eq!(publication.responder_uri, "https://docs.google.com/forms/d/e/form-1/viewform");
        assert!(publication.shared_publicly);
        assert_eq!(storage.shared().await, vec!["form-1".to_string()]);

        let added = forms.added().await;
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].0, "form-1");
        assert_eq!(added[0].1, questions);

        let works = classroom.created_work().await;
        assert_eq!(works.len(), 1);
        let (course_id, work) = &works[0];
        assert_eq!(course_id, "c1");
        assert_eq!(work.topic_id.as_deref(), Some("t1"));
        assert_eq!(work.max_points, 10.0);
        assert_eq!(
            work.link.as_ref().map(|l| l.url.as_str()),
            Some("https://docs.google.com/forms/d/e/form-1/viewform")
        );
    }

    #[tokio::test]
    async fn test_share_failure_is_not_fatal() {
        let classroom = FakeClassroom::new();
        let storage = FakeStorage::new();
        storage.fail_sharing().await;
        let service = QuizService::new(classroom.clone(), FakeForms::new(), storage);

        let questions = parse_questions("P1: Q\nA) x\nB) y\nG: A").unwrap();
        let publication = service.publish(&request(), &questions).await.unwrap();

        assert!(!publication.shared_publicly);
        assert_eq!(classroom.created_work().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_list_creates_nothing() {
        let forms = FakeForms::new();
        let service = QuizService::new(FakeClassroom::new(), forms.clone(), FakeStorage::new());

        let err = service.publish(&request(), &[]).await.unwrap_err();
        assert!(matches!(err, QuizError::Parse(ParseError::NoValidQuestions)));
        assert_eq!(forms.created_count().await, 0);
    }
}

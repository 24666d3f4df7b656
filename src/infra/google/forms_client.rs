use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::google_api::GoogleApi;
use crate::core::quiz::{FormHandle, Question, QuizForms};
use crate::core::remote::RemoteError;

const FORMS_BASE: &str = "https://forms.googleapis.com/v1";

/// Google Forms v1 client for building graded quizzes.
pub struct FormsApiClient {
    api: GoogleApi,
}

impl FormsApiClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiForm {
    form_id: String,
    responder_uri: Option<String>,
}

/// Quiz mode and respondent email collection, then one item per question.
/// A single batch keeps the items in question order.
fn quiz_batch(questions: &[Question]) -> Value {
    let mut requests = vec![json!({
        "updateSettings": {
            "settings": {
                "quizSettings": { "isQuiz": true },
                "emailCollectionType": "RESPONDER_INPUT",
            },
            "updateMask": "quizSettings.isQuiz,emailCollectionType",
        }
    })];

    for (index, question) in questions.iter().enumerate() {
        let options: Vec<Value> = question
            .choices()
            .iter()
            .map(|choice| json!({ "value": choice }))
            .collect();

        requests.push(json!({
            "createItem": {
                "item": {
                    "title": question.title(),
                    "questionItem": {
                        "question": {
                            "required": true,
                            "choiceQuestion": {
                                "type": "RADIO",
                                "options": options,
                                "shuffle": false,
                            },
                            "grading": {
                                "pointValue": 1,
                                "correctAnswers": {
                                    "answers": [{ "value": question.correct_choice() }]
                                },
                            },
                        }
                    },
                },
                "location": { "index": index },
            }
        }));
    }

    json!({ "requests": requests })
}

#[async_trait]
impl QuizForms for FormsApiClient {
    async fn create_form(&self, title: &str) -> Result<FormHandle, RemoteError> {
        let url = format!("{}/forms", FORMS_BASE);
        let form: ApiForm = self
            .api
            .post_json(&url, &json!({ "info": { "title": title } }))
            .await?;
        Ok(FormHandle {
            form_id: form.form_id,
            responder_uri: form.responder_uri,
        })
    }

    async fn add_questions(&self, form_id: &str, questions: &[Question]) -> Result<(), RemoteError> {
        let url = format!("{}/forms/{}:batchUpdate", FORMS_BASE, form_id);
        let _: Value = self.api.post_json(&url, &quiz_batch(questions)).await?;
        Ok(())
    }

    async fn responder_uri(&self, form_id: &str) -> Result<Option<String>, RemoteError> {
        let url = format!("{}/forms/{}", FORMS_BASE, form_id);
        let form: ApiForm = self.api.get_json(&url, &[]).await?;
        Ok(form.responder_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quiz::parse_questions;

    #[test]
    fn test_batch_layout() {
        let questions =
            parse_questions("P1: Capital?\nA) Rome\nB) Paris\nG: B\nP2: Sum?\nA) 1\nB) 2\nC) 3\nG: C")
                .unwrap();

        let batch = quiz_batch(&questions);
        let requests = batch["requests"].as_array().unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0]["updateSettings"]["settings"]["emailCollectionType"],
            "RESPONDER_INPUT"
        );

        let second = &requests[2]["createItem"];
        assert_eq!(second["location"]["index"], 1);
        assert_eq!(second["item"]["title"], "Sum?");
        let question = &second["item"]["questionItem"]["question"];
        assert_eq!(question["required"], true);
        assert_eq!(question["choiceQuestion"]["type"], "RADIO");
        assert_eq!(question["choiceQuestion"]["options"].as_array().unwrap().len(), 3);
        assert_eq!(question["grading"]["pointValue"], 1);
        assert_eq!(question["grading"]["correctAnswers"]["answers"][0]["value"], "3");
    }
}

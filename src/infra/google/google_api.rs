use std::future::Future;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::google_auth::TokenProvider;
use crate::core::remote::RemoteError;

/// Upper bound on pages followed by one listing, in case the API keeps
/// handing back a token.
const MAX_PAGES: usize = 500;

/// One page of a Google list response.
pub trait Paged: DeserializeOwned {
    type Item;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

/// Authenticated JSON transport shared by every Google API client.
#[derive(Clone)]
pub struct GoogleApi {
    client: Client,
    auth: Arc<dyn TokenProvider>,
}

impl GoogleApi {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("classroom-admin/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self { client, auth })
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        let token = self.auth.access_token().await?;
        Ok(builder.bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .authorized(builder)
            .await?
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} returned {}: {}", url, status, body);
        Err(api_error(status, &url, &body))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url).query(query)).await?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        tracing::debug!("POST {}", url);
        let response = self.send(self.client.post(url).json(body)).await?;
        Self::decode(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, RemoteError> {
        tracing::debug!("PATCH {}", url);
        let response = self
            .send(self.client.patch(url).query(query).json(body))
            .await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, url: &str) -> Result<(), RemoteError> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    /// Sends a prebuilt body (used for multipart uploads).
    pub async fn post_raw<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<T, RemoteError> {
        tracing::debug!("POST {} ({} bytes)", url, body.len());
        let builder = self
            .client
            .post(url)
            .query(query)
            .header("Content-Type", content_type)
            .body(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Follows `nextPageToken` until the listing is complete.
    pub async fn list_all<P: Paged>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<P::Item>, RemoteError> {
        collect_pages(|token: Option<String>| async move {
            let mut params = query.to_vec();
            if let Some(token) = token {
                params.push(("pageToken", token));
            }
            self.get_json::<P>(url, &params).await
        })
        .await
    }
}

/// Drives a page fetcher until no further token is returned.
pub async fn collect_pages<P, F, Fut>(mut fetch: F) -> Result<Vec<P::Item>, RemoteError>
where
    P: Paged,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P, RemoteError>>,
{
    let mut items = Vec::new();
    let mut token = None;

    for _ in 0..MAX_PAGES {
        let (page_items, next) = fetch(token.take()).await?.into_page();
        items.extend(page_items);

        match next {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }

    tracing::warn!("Stopped listing after {} pages", MAX_PAGES);
    Ok(items)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Turns a failed response into a `RemoteError`, keeping Google's message and
/// any machine-readable reasons.
fn api_error(status: StatusCode, url: &str, body: &str) -> RemoteError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reasons: Vec<String> = envelope
                .error
                .details
                .into_iter()
                .filter_map(|d| d.reason)
                .collect();
            if reasons.is_empty() {
                envelope.error.message
            } else {
                format!("{} [{}]", envelope.error.message, reasons.join(", "))
            }
        }
        Err(_) => body.trim().to_string(),
    };

    if status == StatusCode::NOT_FOUND {
        return RemoteError::NotFound(format!("{} ({})", url, message));
    }
    if status == StatusCode::UNAUTHORIZED {
        return RemoteError::Auth(message);
    }

    RemoteError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct NumberPage {
        numbers: Vec<u32>,
        next: Option<String>,
    }

    impl Paged for NumberPage {
        type Item = u32;

        fn into_page(self) -> (Vec<u32>, Option<String>) {
            (self.numbers, self.next)
        }
    }

    #[tokio::test]
    async fn test_collect_pages_follows_tokens() {
        let mut seen = Vec::new();
        let items = collect_pages(|token: Option<String>| {
            seen.push(token.clone());
            async move {
                Ok(match token.as_deref() {
                    None => NumberPage {
                        numbers: vec![1, 2],
                        next: Some("p2".to_string()),
                    },
                    Some("p2") => NumberPage {
                        numbers: vec![3],
                        next: Some("p3".to_string()),
                    },
                    _ => NumberPage {
                        numbers: vec![4],
                        next: None,
                    },
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            seen,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_ends_listing() {
        let items = collect_pages(|_token: Option<String>| async {
            Ok(NumberPage {
                numbers: vec![7],
                next: Some(String::new()),
            })
        })
        .await
        .unwrap();

        assert_eq!(items, vec![7]);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let result = collect_pages(|token: Option<String>| async move {
            match token {
                None => Ok(NumberPage {
                    numbers: vec![1],
                    next: Some("p2".to_string()),
                }),
                Some(_) => Err(RemoteError::Transport("reset".to_string())),
            }
        })
        .await;

        assert!(matches!(result, Err(RemoteError::Transport(_))));
    }

    #[test]
    fn test_api_error_keeps_reasons() {
        let body = r#"{"error": {"code": 403, "message": "Request had insufficient authentication scopes.",
            "status": "PERMISSION_DENIED",
            "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "ACCESS_TOKEN_SCOPE_INSUFFICIENT"}]}}"#;

        let err = api_error(StatusCode::FORBIDDEN, "https://x", body);

        assert!(crate::core::remote::reports_insufficient_scope(&err.to_string()));
        assert!(err.to_string().contains("insufficient authentication scopes"));
    }

    #[test]
    fn test_api_error_status_mapping() {
        assert!(matches!(
            api_error(StatusCode::NOT_FOUND, "https://x/courses/1", "gone"),
            RemoteError::NotFound(msg) if msg.contains("courses/1")
        ));
        assert!(matches!(
            api_error(StatusCode::UNAUTHORIZED, "https://x", "{}"),
            RemoteError::Auth(_)
        ));
        assert!(matches!(
            api_error(StatusCode::BAD_REQUEST, "https://x", "plain text"),
            RemoteError::Api { status: 400, message } if message == "plain text"
        ));
    }
}

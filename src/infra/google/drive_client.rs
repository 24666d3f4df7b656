use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::google_api::GoogleApi;
use crate::core::quiz::FileStorage;
use crate::core::remote::RemoteError;

const DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD: &str = "https://www.googleapis.com/upload/drive/v3/files";
const BOUNDARY: &str = "classroom_admin_upload_boundary";

/// Google Drive v3 client: link sharing and document uploads.
pub struct DriveApiClient {
    api: GoogleApi,
}

impl DriveApiClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    id: String,
}

/// `multipart/related` body: JSON metadata part followed by the file bytes.
fn multipart_body(metadata: &Value, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn file_metadata(path: &Path, folder_id: Option<&str>) -> Value {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut metadata = json!({ "name": name });
    if let Some(folder) = folder_id {
        metadata["parents"] = json!([folder]);
    }
    metadata
}

#[async_trait]
impl FileStorage for DriveApiClient {
    async fn share_with_anyone(&self, file_id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/files/{}/permissions?fields=id", DRIVE_BASE, file_id);
        let _: Value = self
            .api
            .post_json(&url, &json!({ "type": "anyone", "role": "reader" }))
            .await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<String, RemoteError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| RemoteError::Transport(format!("Cannot read {}: {}", path.display(), e)))?;

        let body = multipart_body(&file_metadata(path, folder_id), mime_type, &content);
        let file: ApiFile = self
            .api
            .post_raw(
                DRIVE_UPLOAD,
                &[
                    ("uploadType", "multipart".to_string()),
                    ("fields", "id".to_string()),
                ],
                &format!("multipart/related; boundary={}", BOUNDARY),
                body,
            )
            .await?;

        tracing::info!(file_id = %file.id, "Uploaded {}", path.display());
        Ok(file.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_with_folder() {
        let metadata = file_metadata(Path::new("/docs/week1/intro.docx"), Some("folder-1"));
        assert_eq!(metadata["name"], "intro.docx");
        assert_eq!(metadata["parents"][0], "folder-1");

        let metadata = file_metadata(Path::new("intro.docx"), None);
        assert!(metadata.get("parents").is_none());
    }

    #[test]
    fn test_multipart_layout() {
        let body = multipart_body(&json!({ "name": "a.docx" }), "application/pdf", b"BYTES");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with(&format!("--{}\r\n", BOUNDARY)));
        assert!(text.contains("{\"name\":\"a.docx\"}"));
        assert!(text.contains("Content-Type: application/pdf\r\n\r\nBYTES\r\n"));
        assert!(text.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }
}

// Runtime configuration, read once at startup from the environment (after
// `.env` has been loaded) and handed to each collaborator.
//
// Environment variables:
// - `CLASSROOM_ADMIN_TOKEN_FILE` - authorized-user token JSON (default `token.json`)
// - `GOOGLE_SERVICE_ACCOUNT_KEY` - path to a service account key
// - `GOOGLE_SERVICE_ACCOUNT_JSON` - service account key content (alternative)
// - `GOOGLE_IMPERSONATE_USER` - user the service account acts for
// - `CLASSROOM_ADMIN_DRIVE_FOLDER_ID` - Drive folder for uploaded documents
// - `CLASSROOM_ADMIN_SHEET_ID` - default quiz response spreadsheet
// - `CLASSROOM_ADMIN_FALLBACK_EMAILS` - `email=userId,...` for hidden roster emails
// - `CLASSROOM_ADMIN_QUIZ_MAX_POINTS` - points of a generated quiz (default 10)

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::remote::RemoteError;
use crate::infra::google::{AuthorizedUserAuth, ServiceAccountAuth, TokenProvider};

pub const DEFAULT_TOKEN_FILE: &str = "token.json";
pub const DEFAULT_QUIZ_MAX_POINTS: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("CLASSROOM_ADMIN_FALLBACK_EMAILS entry '{0}' is not of the form email=userId")]
    InvalidFallbackEntry(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceAccountSource {
    KeyFile(PathBuf),
    Json(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub token_file: PathBuf,
    pub service_account: Option<ServiceAccountSource>,
    pub impersonate_user: Option<String>,
    pub drive_folder_id: Option<String>,
    pub sheet_id: Option<String>,
    pub fallback_emails: HashMap<String, String>,
    pub quiz_max_points: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            service_account: None,
            impersonate_user: None,
            drive_folder_id: None,
            sheet_id: None,
            fallback_emails: HashMap::new(),
            quiz_max_points: DEFAULT_QUIZ_MAX_POINTS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let service_account = match (
            get("GOOGLE_SERVICE_ACCOUNT_KEY"),
            get("GOOGLE_SERVICE_ACCOUNT_JSON"),
        ) {
            (Some(path), _) => Some(ServiceAccountSource::KeyFile(PathBuf::from(path))),
            (None, Some(json)) => Some(ServiceAccountSource::Json(json)),
            (None, None) => None,
        };

        let quiz_max_points = match get("CLASSROOM_ADMIN_QUIZ_MAX_POINTS") {
            Some(value) => parse_points("CLASSROOM_ADMIN_QUIZ_MAX_POINTS", &value)?,
            None => DEFAULT_QUIZ_MAX_POINTS,
        };

        let fallback_emails = match get("CLASSROOM_ADMIN_FALLBACK_EMAILS") {
            Some(value) => parse_fallback_emails(&value)?,
            None => HashMap::new(),
        };

        Ok(Self {
            token_file: get("CLASSROOM_ADMIN_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
            service_account,
            impersonate_user: get("GOOGLE_IMPERSONATE_USER"),
            drive_folder_id: get("CLASSROOM_ADMIN_DRIVE_FOLDER_ID"),
            sheet_id: get("CLASSROOM_ADMIN_SHEET_ID"),
            fallback_emails,
            quiz_max_points,
        })
    }

    /// Service account when configured, otherwise the authorized-user token file.
    pub async fn token_provider(&self) -> Result<Arc<dyn TokenProvider>, RemoteError> {
        match &self.service_account {
            Some(ServiceAccountSource::KeyFile(path)) => {
                tracing::info!("Authenticating with service account key {}", path.display());
                let auth = ServiceAccountAuth::from_file(
                    &path.to_string_lossy(),
                    self.impersonate_user.clone(),
                )
                .await?;
                Ok(Arc::new(auth))
            }
            Some(ServiceAccountSource::Json(json)) => {
                tracing::info!("Authenticating with inline service account key");
                let auth = ServiceAccountAuth::from_json(json, self.impersonate_user.clone())?;
                Ok(Arc::new(auth))
            }
            None => {
                tracing::info!("Authenticating with token file {}", self.token_file.display());
                let auth = AuthorizedUserAuth::from_file(&self.token_file.to_string_lossy()).await?;
                Ok(Arc::new(auth))
            }
        }
    }
}

pub fn parse_points(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

/// `"a@x.org=123, b@x.org=456"` -> lowercase email -> user id.
pub fn parse_fallback_emails(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut map = HashMap::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (email, user_id) = entry
            .split_once('=')
            .map(|(e, u)| (e.trim(), u.trim()))
            .filter(|(e, u)| e.contains('@') && !u.is_empty())
            .ok_or_else(|| ConfigError::InvalidFallbackEntry(entry.to_string()))?;
        map.insert(email.to_lowercase(), user_id.to_string());
    }
    Ok(map)
}

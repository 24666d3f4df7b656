use async_trait::async_trait;
use serde::Deserialize;

use super::google_api::GoogleApi;
use crate::core::grading::SpreadsheetReader;
use crate::core::remote::RemoteError;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Read-only Google Sheets v4 values client.
pub struct SheetsApiClient {
    api: GoogleApi,
}

impl SheetsApiClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Cells come back as strings with FORMATTED_VALUE, but numbers and
    /// booleans are tolerated too.
    fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl SpreadsheetReader for SheetsApiClient {
    async fn read_range(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, RemoteError> {
        let url = format!("{}/{}/values/{}", SHEETS_BASE, sheet_id, range);
        let values: ValueRange = self.api.get_json(&url, &[]).await?;
        Ok(values.into_rows())
    }
}

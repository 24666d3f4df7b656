// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================
//
// Reads a Google Doc through the Docs API and flattens it into paragraphs
// for the slide converter. Documents with several tabs are read in tab
// order, child tabs after their parent. Table cells are flattened into body
// paragraphs.

use serde::Deserialize;

use super::google_api::GoogleApi;
use crate::core::remote::RemoteError;
use crate::core::slides::{kind_from_style, DocParagraph, ParagraphKind};

const DOCS_BASE: &str = "https://docs.googleapis.com/v1/documents";

// =============================================================================
// GOOGLE DOCS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    title: String,
    #[serde(default)]
    tabs: Vec<Tab>,
    /// Present when the document is fetched without tab content.
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tab {
    document_tab: Option<DocumentTab>,
    #[serde(default)]
    child_tabs: Vec<Tab>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentTab {
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    paragraph: Option<Paragraph>,
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
    paragraph_style: Option<ParagraphStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphStyle {
    named_style_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRun {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    #[serde(default)]
    table_rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    #[serde(default)]
    table_cells: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableCell {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

/// A fetched document: its title and flattened paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub title: String,
    pub paragraphs: Vec<DocParagraph>,
}

pub struct DocsApiClient {
    api: GoogleApi,
}

impl DocsApiClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }

    /// Extracts the document ID from a Google Docs URL, or accepts a bare ID.
    pub fn extract_doc_id(url_or_id: &str) -> Option<String> {
        let url_or_id = url_or_id.trim();
        if url_or_id.contains("docs.google.com") {
            let start = url_or_id.find("/document/d/")?;
            let after_d = &url_or_id[start + "/document/d/".len()..];
            let end = after_d.find(['/', '?', '#']).unwrap_or(after_d.len());
            let id = &after_d[..end];
            if !id.is_empty() {
                return Some(id.to_string());
            }
        } else if !url_or_id.is_empty() && !url_or_id.contains('/') && !url_or_id.contains(' ') {
            return Some(url_or_id.to_string());
        }
        None
    }

    pub async fn fetch_document(&self, doc_id_or_url: &str) -> Result<FetchedDocument, RemoteError> {
        let doc_id = Self::extract_doc_id(doc_id_or_url).ok_or_else(|| {
            RemoteError::NotFound(format!("Could not extract document ID from: {}", doc_id_or_url))
        })?;

        let url = format!("{}/{}", DOCS_BASE, doc_id);
        let document: Document = self
            .api
            .get_json(&url, &[("includeTabsContent", "true".to_string())])
            .await?;

        let fetched = flatten_document(document);
        tracing::info!(
            "Fetched Google Doc '{}': {} paragraph(s)",
            fetched.title,
            fetched.paragraphs.len()
        );
        Ok(fetched)
    }
}

fn flatten_document(document: Document) -> FetchedDocument {
    let mut paragraphs = Vec::new();
    if document.tabs.is_empty() {
        if let Some(body) = &document.body {
            extract_body(body, &mut paragraphs);
        }
    } else {
        extract_tabs(&document.tabs, &mut paragraphs);
    }

    FetchedDocument {
        title: document.title,
        paragraphs,
    }
}

fn extract_tabs(tabs: &[Tab], output: &mut Vec<DocParagraph>) {
    for tab in tabs {
        if let Some(body) = tab.document_tab.as_ref().and_then(|t| t.body.as_ref()) {
            extract_body(body, output);
        }
        extract_tabs(&tab.child_tabs, output);
    }
}

fn extract_body(body: &Body, output: &mut Vec<DocParagraph>) {
    for element in &body.content {
        extract_element(element, output);
    }
}

fn extract_element(element: &StructuralElement, output: &mut Vec<DocParagraph>) {
    if let Some(paragraph) = &element.paragraph {
        let text: String = paragraph
            .elements
            .iter()
            .filter_map(|e| e.text_run.as_ref().and_then(|r| r.content.as_deref()))
            .collect();
        let kind = paragraph
            .paragraph_style
            .as_ref()
            .and_then(|s| s.named_style_type.as_deref())
            .map(kind_from_style)
            .unwrap_or(ParagraphKind::Body);

        output.push(DocParagraph::new(kind, text.trim()));
    }

    if let Some(table) = &element.table {
        for row in &table.table_rows {
            for cell in &row.table_cells {
                for cell_element in &cell.content {
                    extract_element(cell_element, output);
                }
            }
        }
    }
}

use std::path::Path;

use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::slide_export::SlidesError;
use crate::core::slides::{kind_from_style, DocParagraph, ParagraphKind};

/// Top-level paragraphs of a `.docx`, in document order.
pub async fn read_docx_paragraphs(path: &Path) -> Result<Vec<DocParagraph>, SlidesError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SlidesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    paragraphs_from_bytes(&bytes).map_err(|message| SlidesError::Docx {
        path: path.to_path_buf(),
        message,
    })
}

pub fn paragraphs_from_bytes(bytes: &[u8]) -> Result<Vec<DocParagraph>, String> {
    let docx = read_docx(bytes).map_err(|e| e.to_string())?;

    Ok(docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(convert_paragraph(paragraph)),
            _ => None,
        })
        .collect())
}

fn convert_paragraph(paragraph: &Paragraph) -> DocParagraph {
    let kind = paragraph
        .property
        .style
        .as_ref()
        .map(|style| kind_from_style(&style.val))
        .unwrap_or(ParagraphKind::Body);

    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push(' '),
                    _ => {}
                }
            }
        }
    }

    DocParagraph::new(kind, text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: Vec<docx_rs::Paragraph>) -> Vec<u8> {
        let mut docx = Docx::new();
        for paragraph in paragraphs {
            docx = docx.add_paragraph(paragraph);
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_reads_headings_and_body() {
        let bytes = build_docx(vec![
            Paragraph::new()
                .add_run(Run::new().add_text("Safety"))
                .style("Heading1"),
            Paragraph::new()
                .add_run(Run::new().add_text("Wear "))
                .add_run(Run::new().add_text("gloves")),
            Paragraph::new()
                .add_run(Run::new().add_text("Equipment"))
                .style("Heading2"),
        ]);

        let paragraphs = paragraphs_from_bytes(&bytes).unwrap();

        assert_eq!(
            paragraphs,
            vec![
                DocParagraph::new(ParagraphKind::Heading1, "Safety"),
                DocParagraph::body("Wear gloves"),
                DocParagraph::new(ParagraphKind::Heading2, "Equipment"),
            ]
        );
    }

    #[test]
    fn test_rejects_non_docx() {
        assert!(paragraphs_from_bytes(b"plain text").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = read_docx_paragraphs(Path::new("/nonexistent/a.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, SlidesError::Io { .. }));
    }
}

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::docx_reader::read_docx_paragraphs;
use super::markdown_deck::render_markdown;
use crate::core::remote::RemoteError;
use crate::core::slides::{default_title_from_stem, plan_deck, DocParagraph, SlideDeck};

/// Name of the folder created next to a converted directory.
pub const OUTPUT_DIR_NAME: &str = "generated_slides";

#[derive(Debug, Error)]
pub enum SlidesError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read {path} as a Word document: {message}")]
    Docx { path: PathBuf, message: String },

    #[error("Invalid search pattern: {0}")]
    Pattern(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// One file handled by a directory conversion.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<usize, SlidesError>,
}

fn title_for(path: &Path, title: Option<&str>) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            default_title_from_stem(&stem)
        }
    }
}

/// Plans the deck and writes it, creating parent directories as needed.
pub async fn write_deck(
    paragraphs: &[DocParagraph],
    title: &str,
    output: &Path,
) -> Result<SlideDeck, SlidesError> {
    let deck = plan_deck(paragraphs, title);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| SlidesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(output, render_markdown(&deck))
        .await
        .map_err(|source| SlidesError::Io {
            path: output.to_path_buf(),
            source,
        })?;

    tracing::info!("Wrote {} slide(s) to {}", deck.slides.len(), output.display());
    Ok(deck)
}

/// `<dir>/<stem>.md` next to the input document.
pub fn default_output_for(input: &Path) -> PathBuf {
    input.with_extension("md")
}

pub async fn convert_docx(
    input: &Path,
    output: &Path,
    title: Option<&str>,
) -> Result<SlideDeck, SlidesError> {
    let paragraphs = read_docx_paragraphs(input).await?;
    write_deck(&paragraphs, &title_for(input, title), output).await
}

/// Every `.docx` below `dir`, skipping Word lock files (`~$name.docx`).
pub fn find_docx_files(dir: &Path) -> Result<Vec<PathBuf>, SlidesError> {
    // Brackets and wildcards in the directory name are literal.
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&base).join("**").join("*.docx");
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern).map_err(|e| SlidesError::Pattern(e.to_string()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| {
            !path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with("~$"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Output location for `input` found under `base`: the same relative path
/// under a `generated_slides` folder beside `base`.
pub fn mirrored_output(base: &Path, input: &Path) -> PathBuf {
    let out_base = base
        .parent()
        .map(|p| p.join(OUTPUT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(OUTPUT_DIR_NAME));
    let relative = input.strip_prefix(base).unwrap_or(input);
    out_base.join(relative).with_extension("md")
}

/// Converts every document below `dir`. One bad file does not stop the rest.
pub async fn convert_directory(
    dir: &Path,
    title: Option<&str>,
) -> Result<Vec<ConversionOutcome>, SlidesError> {
    let files = find_docx_files(dir)?;
    tracing::info!("Found {} .docx file(s) under {}", files.len(), dir.display());

    let mut outcomes = Vec::with_capacity(files.len());
    for input in files {
        let output = mirrored_output(dir, &input);
        let result = convert_docx(&input, &output, title)
            .await
            .map(|deck| deck.slides.len());
        if let Err(e) = &result {
            tracing::warn!("Failed to convert {}: {}", input.display(), e);
        }
        outcomes.push(ConversionOutcome {
            input,
            output,
            result,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slides::ParagraphKind;

    #[test]
    fn test_title_for() {
        assert_eq!(title_for(Path::new("/x/safety_rules.docx"), None), "Safety Rules");
        assert_eq!(title_for(Path::new("/x/a.docx"), Some("  Given ")), "Given");
        assert_eq!(title_for(Path::new("/x/a_b.docx"), Some("")), "A B");
    }

    #[test]
    fn test_mirrored_output() {
        let out = mirrored_output(Path::new("/data/modules"), Path::new("/data/modules/week1/intro.docx"));
        assert_eq!(out, PathBuf::from("/data/generated_slides/week1/intro.md"));
    }

    #[tokio::test]
    async fn test_write_deck_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("deck.md");

        let deck = write_deck(
            &[
                DocParagraph::new(ParagraphKind::Heading1, "One"),
                DocParagraph::body("text"),
            ],
            "Deck",
            &output,
        )
        .await
        .unwrap();

        assert_eq!(deck.slides.len(), 1);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("# One"));
    }

    #[tokio::test]
    async fn test_find_docx_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("week1");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(dir.path().join("a.docx"), b"x").unwrap();
        std::fs::write(sub.join("b.docx"), b"x").unwrap();
        std::fs::write(sub.join("~$b.docx"), b"x").unwrap();
        std::fs::write(sub.join("notes.txt"), b"x").unwrap();

        let files = find_docx_files(dir.path()).unwrap();

        assert_eq!(files, vec![dir.path().join("a.docx"), sub.join("b.docx")]);
    }

    #[tokio::test]
    async fn test_find_docx_files_in_bracketed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let week = dir.path().join("week [1]");
        std::fs::create_dir_all(&week).unwrap();
        std::fs::write(week.join("intro.docx"), b"x").unwrap();

        let files = find_docx_files(&week).unwrap();

        assert_eq!(files, vec![week.join("intro.docx")]);
    }

    #[tokio::test]
    async fn test_bad_file_does_not_stop_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("modules");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("broken.docx"), b"not a zip").unwrap();

        let outcomes = convert_directory(&base, None).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].result, Err(SlidesError::Docx { .. })));
        assert_eq!(
            outcomes[0].output,
            dir.path().join(OUTPUT_DIR_NAME).join("broken.md")
        );
    }
}

// doc-to-slides: local .docx, a directory of them, or a Google Doc.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgGroup, Args};

use crate::infra::google::{DocsApiClient, GoogleApi};
use crate::infra::slides::{convert_directory, convert_docx, default_output_for, write_deck};

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["docx", "dir", "google_doc"]),
))]
pub struct DocToSlidesArgs {
    /// A Word document
    #[arg(long, value_name = "FILE")]
    pub docx: Option<PathBuf>,

    /// Convert every .docx below this directory
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Google Doc id or URL
    #[arg(long, value_name = "ID_OR_URL")]
    pub google_doc: Option<String>,

    /// Output file (single document only)
    #[arg(long, short, value_name = "FILE", conflicts_with = "dir")]
    pub output: Option<PathBuf>,

    /// Title of the first slide (default: derived from the document)
    #[arg(long)]
    pub title: Option<String>,
}

/// File name for a deck named after a document title.
fn file_name_for_title(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if name.trim_matches('_').is_empty() {
        "slides.md".to_string()
    } else {
        format!("{}.md", name)
    }
}

/// `api` is only needed for Google Docs.
pub async fn run(args: DocToSlidesArgs, api: Option<GoogleApi>) -> anyhow::Result<()> {
    let title = args.title.as_deref();

    if let Some(input) = &args.docx {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_for(input));
        let deck = convert_docx(input, &output, title)
            .await
            .with_context(|| format!("Failed to convert {}", input.display()))?;
        println!("{} slide(s) written to {}", deck.slides.len(), output.display());
        return Ok(());
    }

    if let Some(dir) = &args.dir {
        return convert_all(dir, title).await;
    }

    let Some(doc) = &args.google_doc else {
        bail!("Nothing to convert");
    };
    let Some(api) = api else {
        bail!("Google credentials are required to read a Google Doc");
    };

    let fetched = DocsApiClient::new(api)
        .fetch_document(doc)
        .await
        .context("Failed to fetch Google Doc")?;

    let deck_title = match title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => fetched.title.clone(),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(file_name_for_title(&fetched.title)));

    let deck = write_deck(&fetched.paragraphs, &deck_title, &output)
        .await
        .context("Failed to write slide deck")?;
    println!("{} slide(s) written to {}", deck.slides.len(), output.display());
    Ok(())
}

async fn convert_all(dir: &Path, title: Option<&str>) -> anyhow::Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let outcomes = convert_directory(dir, title)
        .await
        .with_context(|| format!("Failed to search {}", dir.display()))?;
    if outcomes.is_empty() {
        println!("No .docx files found under {}", dir.display());
        return Ok(());
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(count) => println!(
                "{} -> {} ({} slide(s))",
                outcome.input.display(),
                outcome.output.display(),
                count
            ),
            Err(e) => {
                failed += 1;
                println!("{}: {}", outcome.input.display(), e);
            }
        }
    }

    println!(
        "Converted {} of {} document(s).",
        outcomes.len() - failed,
        outcomes.len()
    );
    if failed > 0 {
        bail!("{} document(s) could not be converted", failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{Cli, Command};
    use clap::Parser;
    use docx_rs::{Docx, Paragraph, Run};

    fn write_docx(path: &Path, heading: &str, body: &str) {
        let docx = Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(heading))
                    .style("Heading1"),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(body)));
        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }

    fn args(command: &[&str]) -> DocToSlidesArgs {
        let mut argv = vec!["classroom-admin", "doc-to-slides"];
        argv.extend_from_slice(command);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::DocToSlides(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_exactly_one_source() {
        assert!(Cli::try_parse_from(["classroom-admin", "doc-to-slides"]).is_err());
        assert!(Cli::try_parse_from([
            "classroom-admin",
            "doc-to-slides",
            "--docx",
            "a.docx",
            "--dir",
            "lessons",
        ])
        .is_err());
    }

    #[test]
    fn test_file_name_for_title() {
        assert_eq!(file_name_for_title("Week 1: Intro"), "Week_1__Intro.md");
        assert_eq!(file_name_for_title("   "), "slides.md");
    }

    #[tokio::test]
    async fn test_convert_single_docx() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("safety_rules.docx");
        write_docx(&input, "Fire", "Know the exits");

        let input_arg = input.to_string_lossy().into_owned();
        run(args(&["--docx", input_arg.as_str()]), None).await.unwrap();

        let markdown = std::fs::read_to_string(dir.path().join("safety_rules.md")).unwrap();
        assert!(markdown.contains("# Fire"));
        assert!(markdown.contains("- Know the exits"));
    }

    #[tokio::test]
    async fn test_convert_directory_mirrors_tree() {
        let root = tempfile::tempdir().unwrap();
        let lessons = root.path().join("lessons");
        std::fs::create_dir_all(lessons.join("week1")).unwrap();
        write_docx(&lessons.join("week1").join("intro.docx"), "Hello", "World");

        let dir_arg = lessons.to_string_lossy().into_owned();
        run(args(&["--dir", dir_arg.as_str()]), None).await.unwrap();

        assert!(root
            .path()
            .join("generated_slides")
            .join("week1")
            .join("intro.md")
            .exists());
    }

    #[tokio::test]
    async fn test_google_doc_needs_credentials() {
        let err = run(args(&["--google-doc", "abc123"]), None).await.unwrap_err();
        assert!(err.to_string().contains("credentials"));
    }
}

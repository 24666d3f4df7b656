// create-quiz and check-quiz.
// Question text is always parsed before anything is created remotely.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::commands::courses::pick_active_course;
use crate::cli::prompts::Prompter;
use crate::core::courses::CourseService;
use crate::core::quiz::{
    parse_questions_with_warnings, ParsedQuiz, Question, QuizRequest, QuizService,
};
use crate::infra::config::{parse_points, AppConfig};
use crate::infra::google::{ClassroomApiClient, DriveApiClient, FormsApiClient, GoogleApi};

const DEFAULT_TITLE: &str = "Assessment";

const PASTE_INSTRUCTIONS: &str = "\
Paste the questions in this format:

P1: Question statement
A) alternative
B) alternative
G: B
";

#[derive(Args, Debug)]
pub struct CreateQuizArgs {
    /// Course to post the assignment in (prompted when absent)
    #[arg(long)]
    pub course_id: Option<String>,

    /// Topic to file the assignment under
    #[arg(long, conflicts_with = "no_topic")]
    pub topic_id: Option<String>,

    /// Post the assignment without a topic
    #[arg(long)]
    pub no_topic: bool,

    /// Assignment and form title (prompted when absent)
    #[arg(long)]
    pub title: Option<String>,

    /// File with the question text (pasted interactively when absent)
    #[arg(long, value_name = "FILE")]
    pub questions: Option<PathBuf>,

    /// Points of the assignment (default from configuration)
    #[arg(long, value_parser = points_arg)]
    pub max_points: Option<f64>,
}

#[derive(Args, Debug)]
pub struct CheckQuizArgs {
    /// File with the question text
    pub file: PathBuf,
}

fn points_arg(value: &str) -> Result<f64, String> {
    parse_points("--max-points", value).map_err(|e| e.to_string())
}

async fn read_question_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_warnings(parsed: &ParsedQuiz) {
    for warning in &parsed.warnings {
        println!("warning: {}", warning);
    }
}

/// Choices as typed, the graded one starred.
fn option_lines(question: &Question) -> Vec<String> {
    question
        .choice_keys()
        .iter()
        .zip(question.choices())
        .enumerate()
        .map(|(j, (key, choice))| {
            let marker = if j == question.correct_index() { "*" } else { " " };
            format!("   {} {}) {}", marker, key.to_ascii_uppercase(), choice)
        })
        .collect()
}

pub async fn check(args: CheckQuizArgs) -> anyhow::Result<()> {
    let text = read_question_file(&args.file).await?;
    let parsed = parse_questions_with_warnings(&text).context("Question text is invalid")?;

    print_warnings(&parsed);
    println!("{} question(s) parsed:", parsed.questions.len());
    for (i, question) in parsed.questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, question.title());
        for line in option_lines(question) {
            println!("{}", line);
        }
    }
    Ok(())
}

pub async fn create(args: CreateQuizArgs, config: &AppConfig, api: GoogleApi) -> anyhow::Result<()> {
    // Parse a given file up front so a bad batch fails before any selection.
    let from_file = match &args.questions {
        Some(path) => Some(
            parse_questions_with_warnings(&read_question_file(path).await?)
                .context("Question text is invalid")?,
        ),
        None => None,
    };

    let courses = CourseService::new(ClassroomApiClient::new(api.clone()));
    let mut prompter = Prompter::stdio();

    let course_id = match args.course_id {
        Some(id) => id,
        None => pick_active_course(&courses, &mut prompter).await?,
    };

    let topic_id = if args.no_topic {
        None
    } else if let Some(id) = args.topic_id {
        Some(id)
    } else {
        let topics = courses
            .list_topics(&course_id)
            .await
            .context("Failed to list topics")?;
        prompter.select_topic(&topics)?.map(|t| t.topic_id.clone())
    };

    let title = match args.title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => prompter.ask_with_default("Assessment title", DEFAULT_TITLE)?,
    };

    let parsed = match from_file {
        Some(parsed) => parsed,
        None => {
            let text = prompter.read_block(PASTE_INSTRUCTIONS)?;
            parse_questions_with_warnings(&text).context("Question text is invalid")?
        }
    };
    print_warnings(&parsed);
    println!("{} question(s) ready.", parsed.questions.len());

    let service = QuizService::new(
        ClassroomApiClient::new(api.clone()),
        FormsApiClient::new(api.clone()),
        DriveApiClient::new(api),
    );
    let request = QuizRequest {
        course_id,
        topic_id,
        title,
        max_points: args.max_points.unwrap_or(config.quiz_max_points),
    };
    let publication = service
        .publish(&request, &parsed.questions)
        .await
        .context("Failed to publish quiz")?;

    if !publication.shared_publicly {
        println!("warning: the form could not be shared with anyone holding the link");
    }
    println!("Form created: {}", publication.form_id);
    println!("Responder link: {}", publication.responder_uri);
    println!("Assignment created: {}", publication.course_work_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{Cli, Command};
    use clap::Parser;

    #[test]
    fn test_topic_flags_conflict() {
        let result = Cli::try_parse_from([
            "classroom-admin",
            "create-quiz",
            "--topic-id",
            "t1",
            "--no-topic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_points_must_be_positive() {
        assert!(Cli::try_parse_from(["classroom-admin", "create-quiz", "--max-points", "0"]).is_err());

        let cli =
            Cli::try_parse_from(["classroom-admin", "create-quiz", "--max-points", "20"]).unwrap();
        match cli.command {
            Command::CreateQuiz(args) => assert_eq!(args.max_points, Some(20.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_option_lines_use_typed_keys() {
        let parsed = parse_questions_with_warnings("P1: Pick\nA) x\nC) y\nG: C\n").unwrap();
        assert_eq!(
            option_lines(&parsed.questions[0]),
            ["     A) x", "   * C) y"]
        );
    }

    #[tokio::test]
    async fn test_check_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.txt");
        std::fs::write(&path, "P1: Only one\nA) a\nG: A\n").unwrap();

        let err = check(CheckQuizArgs { file: path }).await.unwrap_err();
        assert!(format!("{:#}", err).contains("fewer than 2 alternatives"));
    }

    #[tokio::test]
    async fn test_check_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.txt");
        std::fs::write(&path, "P1: 2+2?\nA) 3\nB) 4\nG: B\n").unwrap();

        check(CheckQuizArgs { file: path }).await.unwrap();
    }
}

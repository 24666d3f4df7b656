// CLI commands module.
// Each administrative task gets its own command file.
pub mod cleanup;
pub mod courses;
pub mod grades;
pub mod quiz;
pub mod slides;
pub mod training;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::infra::config::{AppConfig, ServiceAccountSource};
use crate::infra::google::GoogleApi;

/// Command-line arguments for classroom-admin.
#[derive(Parser, Debug)]
#[command(name = "classroom-admin")]
#[command(author, version, about = "Administrative automation for Google Classroom")]
#[command(long_about = r#"
Automates Google Classroom administration: courses, quiz assignments,
grade synchronization, bulk cleanup, training provisioning and
document-to-slide conversion.

Credentials are read from (in priority order):
1. --service-account-key / GOOGLE_SERVICE_ACCOUNT_KEY / GOOGLE_SERVICE_ACCOUNT_JSON
2. --token-file / CLASSROOM_ADMIN_TOKEN_FILE (default: token.json)

Example:
  classroom-admin list-courses --state ACTIVE
  classroom-admin create-quiz --questions week1.txt
  classroom-admin doc-to-slides --dir ./lessons
"#)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Authorized-user token file
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Service account key file
    #[arg(long, global = true, value_name = "PATH")]
    pub service_account_key: Option<PathBuf>,

    /// User the service account acts for
    #[arg(long, global = true, value_name = "EMAIL")]
    pub impersonate: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a Forms quiz from question text and post it as an assignment
    CreateQuiz(quiz::CreateQuizArgs),
    /// Parse a question file and show the result without contacting Google
    CheckQuiz(quiz::CheckQuizArgs),
    /// Copy quiz scores from a response sheet into Classroom grades
    SyncGrades(grades::SyncGradesArgs),
    /// List courses
    ListCourses(courses::ListCoursesArgs),
    /// Create one course, or several interactively
    CreateCourse(courses::CreateCourseArgs),
    /// Archive and delete courses
    RemoveCourses(courses::RemoveCoursesArgs),
    /// Show the student roster of a course
    ListStudents(courses::ListStudentsArgs),
    /// Delete every coursework and course material
    PurgeCoursework(cleanup::PurgeArgs),
    /// Create training courses, topics and materials from a structure file
    ProvisionTraining(training::ProvisionArgs),
    /// Convert Word or Google documents into Markdown slide decks
    DocToSlides(slides::DocToSlidesArgs),
}

impl Cli {
    /// Flags given on the command line take precedence over the environment.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.token_file {
            config.token_file = path.clone();
        }
        if let Some(path) = &self.service_account_key {
            config.service_account = Some(ServiceAccountSource::KeyFile(path.clone()));
        }
        if let Some(user) = &self.impersonate {
            config.impersonate_user = Some(user.clone());
        }
    }
}

pub async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    match command {
        // Offline commands never touch credentials.
        Command::CheckQuiz(args) => quiz::check(args).await,
        Command::DocToSlides(args) if args.google_doc.is_none() => slides::run(args, None).await,

        Command::CreateQuiz(args) => quiz::create(args, &config, connect(&config).await?).await,
        Command::SyncGrades(args) => grades::run(args, &config, connect(&config).await?).await,
        Command::ListCourses(args) => courses::list(args, connect(&config).await?).await,
        Command::CreateCourse(args) => courses::create(args, connect(&config).await?).await,
        Command::RemoveCourses(args) => courses::remove(args, connect(&config).await?).await,
        Command::ListStudents(args) => courses::students(args, connect(&config).await?).await,
        Command::PurgeCoursework(args) => cleanup::run(args, connect(&config).await?).await,
        Command::ProvisionTraining(args) => {
            training::run(args, &config, connect(&config).await?).await
        }
        Command::DocToSlides(args) => {
            let api = connect(&config).await?;
            slides::run(args, Some(api)).await
        }
    }
}

/// Authenticated transport shared by every client of one run.
async fn connect(config: &AppConfig) -> anyhow::Result<GoogleApi> {
    let auth = config
        .token_provider()
        .await
        .context("Failed to load Google credentials")?;
    GoogleApi::new(auth).context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "classroom-admin",
            "list-courses",
            "--token-file",
            "other.json",
            "--service-account-key",
            "sa.json",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.token_file, PathBuf::from("other.json"));
        assert_eq!(
            config.service_account,
            Some(ServiceAccountSource::KeyFile(PathBuf::from("sa.json")))
        );
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["classroom-admin", "teleport"]).is_err());
    }
}

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::prompts::Prompter;
use crate::core::cleanup::{CleanupService, PurgeReport, CONFIRMATION_PHRASE};
use crate::infra::google::{ClassroomApiClient, GoogleApi};

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Limit the purge to these courses (repeatable); all courses otherwise
    #[arg(long = "course-id", value_name = "ID")]
    pub course_ids: Vec<String>,

    /// Confirmation phrase, skips the prompt
    #[arg(long, value_name = "PHRASE")]
    pub confirm: Option<String>,
}

fn report_line(report: &PurgeReport) -> String {
    let mut line = format!(
        "{} ({}): {} material(s), {} coursework deleted",
        report.course_name, report.course_id, report.materials_deleted, report.work_deleted
    );
    if report.failures > 0 {
        line.push_str(&format!(", {} failure(s)", report.failures));
    }
    if report.aborted {
        line.push_str(", stopped early");
    }
    line
}

pub async fn run(args: PurgeArgs, api: GoogleApi) -> anyhow::Result<()> {
    let service = CleanupService::new(ClassroomApiClient::new(api));

    let targets = service
        .targets(&args.course_ids)
        .await
        .context("Failed to list courses")?;
    if targets.is_empty() {
        println!("No courses to clean.");
        return Ok(());
    }

    println!("Every coursework and course material will be deleted from:");
    for course in &targets {
        println!("  {} (ID {}, {})", course.name, course.id, course.state);
    }

    let confirmed = match &args.confirm {
        Some(phrase) => CleanupService::<ClassroomApiClient>::is_confirmed(phrase),
        None => Prompter::stdio().confirm_phrase(CONFIRMATION_PHRASE)?,
    };
    if !confirmed {
        bail!("Not confirmed; nothing was deleted");
    }

    let reports = service.purge(&targets).await;
    for report in &reports {
        println!("{}", report_line(report));
    }
    let materials: usize = reports.iter().map(|r| r.materials_deleted).sum();
    let work: usize = reports.iter().map(|r| r.work_deleted).sum();
    println!("Done: {} material(s) and {} coursework deleted.", materials, work);
    Ok(())
}

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::commands::courses::pick_active_course;
use crate::cli::prompts::Prompter;
use crate::core::courses::CourseService;
use crate::core::grading::{GradeSyncReport, GradeSyncRequest, GradeSyncService};
use crate::infra::config::AppConfig;
use crate::infra::google::{ClassroomApiClient, GoogleApi, SheetsApiClient};

#[derive(Args, Debug)]
pub struct SyncGradesArgs {
    /// Course whose assignments receive the grades
    #[arg(long)]
    pub course_id: Option<String>,

    /// Response spreadsheet (default: CLASSROOM_ADMIN_SHEET_ID)
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Only grade this coursework
    #[arg(long = "coursework-id")]
    pub course_work_id: Option<String>,

    /// Only grade coursework that links a Google Form
    #[arg(long)]
    pub forms_only: bool,
}

fn report_line(report: &GradeSyncReport) -> String {
    let mut line = format!("{} ({})", report.title, report.course_work_id);
    if let Some(kind) = &report.work_type {
        line.push_str(&format!(" [{}]", kind));
    }
    if !report.form_ids.is_empty() {
        line.push_str(&format!(" forms: {}", report.form_ids.join(", ")));
    }
    line.push_str(&format!(
        ": {} applied, {} without student, {} without submission, {} failed",
        report.applied, report.skipped_no_student, report.skipped_no_submission, report.failed
    ));
    line
}

pub async fn run(args: SyncGradesArgs, config: &AppConfig, api: GoogleApi) -> anyhow::Result<()> {
    let mut prompter = Prompter::stdio();

    let course_id = match args.course_id {
        Some(id) => id,
        None => {
            let courses = CourseService::new(ClassroomApiClient::new(api.clone()));
            pick_active_course(&courses, &mut prompter).await?
        }
    };

    let sheet_id = match args.sheet_id.or_else(|| config.sheet_id.clone()) {
        Some(id) => id,
        None => match prompter.ask("Response spreadsheet id: ")? {
            Some(id) if !id.is_empty() => id,
            _ => bail!("A spreadsheet id is required"),
        },
    };

    let service = GradeSyncService::new(
        ClassroomApiClient::new(api.clone()),
        SheetsApiClient::new(api),
        config.fallback_emails.clone(),
    );
    let request = GradeSyncRequest {
        course_id,
        sheet_id,
        course_work_id: args.course_work_id,
        forms_only: args.forms_only,
    };

    let reports = service
        .sync(&request)
        .await
        .context("Grade synchronization failed")?;

    if reports.is_empty() {
        println!("No coursework to grade.");
    }
    for report in &reports {
        println!("{}", report_line(report));
    }
    let applied: usize = reports.iter().map(|r| r.applied).sum();
    println!("{} grade(s) applied in total.", applied);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{Cli, Command};
    use clap::Parser;

    #[test]
    fn test_report_line() {
        let report = GradeSyncReport {
            course_work_id: "w1".to_string(),
            title: "Quiz 1".to_string(),
            work_type: Some("ASSIGNMENT".to_string()),
            form_ids: vec!["F1".to_string()],
            applied: 3,
            skipped_no_student: 1,
            skipped_no_submission: 0,
            failed: 2,
        };
        assert_eq!(
            report_line(&report),
            "Quiz 1 (w1) [ASSIGNMENT] forms: F1: 3 applied, 1 without student, 0 without submission, 2 failed"
        );

        let bare = GradeSyncReport {
            course_work_id: "w2".to_string(),
            title: "Essay".to_string(),
            ..GradeSyncReport::default()
        };
        assert_eq!(
            report_line(&bare),
            "Essay (w2): 0 applied, 0 without student, 0 without submission, 0 failed"
        );
    }

    #[test]
    fn test_forms_only_flag() {
        let cli = Cli::try_parse_from(["classroom-admin", "sync-grades", "--forms-only"]).unwrap();
        match cli.command {
            Command::SyncGrades(args) => assert!(args.forms_only),
            other => panic!("unexpected command {:?}", other),
        }
    }
}

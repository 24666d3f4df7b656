use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::core::training::{parse_structure, TrainingService};
use crate::infra::config::AppConfig;
use crate::infra::google::{ClassroomApiClient, DriveApiClient, GoogleApi};

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// JSON file describing courses, topics and materials
    pub structure: PathBuf,

    /// Directory holding the material documents
    #[arg(long, default_value = ".")]
    pub docs_dir: PathBuf,

    /// Drive folder for uploads (default: CLASSROOM_ADMIN_DRIVE_FOLDER_ID)
    #[arg(long)]
    pub drive_folder_id: Option<String>,
}

pub async fn run(args: ProvisionArgs, config: &AppConfig, api: GoogleApi) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(&args.structure)
        .await
        .with_context(|| format!("Failed to read {}", args.structure.display()))?;
    let structure = parse_structure(&json)
        .with_context(|| format!("Invalid training structure in {}", args.structure.display()))?;

    let service = TrainingService::new(
        ClassroomApiClient::new(api.clone()),
        DriveApiClient::new(api),
        args.docs_dir,
        args.drive_folder_id.or_else(|| config.drive_folder_id.clone()),
    );

    let report = service
        .provision(&structure)
        .await
        .context("Training provisioning stopped")?;

    println!(
        "Created {} course(s), {} topic(s), {} material(s).",
        report.courses_created, report.topics_created, report.materials_created
    );
    if !report.missing_files.is_empty() {
        println!("Missing documents (skipped):");
        for file in &report.missing_files {
            println!("  {}", file);
        }
    }
    Ok(())
}

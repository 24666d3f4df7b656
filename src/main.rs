// This is the entry point of classroom-admin.
//
// **Architecture Overview:**
// - `core/` = Business logic (no knowledge of HTTP or the terminal)
// - `infra/` = Implementations of core traits (Google APIs, files, config)
// - `cli/` = Command-line adapters (arguments, prompts, reports)
//
// This file's job is to:
// 1. Load configuration
// 2. Parse the command line
// 3. Hand the chosen command its collaborators
// 4. Turn a failure into a message and a non-zero exit

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::commands::{self, Cli};
use crate::core::remote::reports_insufficient_scope;
use crate::infra::config::AppConfig;

/// Printed when Google rejects a token that lacks a required scope.
const SCOPE_HINT: &str = "The stored credentials do not grant every scope this tool needs. \
Delete the token file and authorize again with the Classroom, Forms, Drive, Sheets and Docs scopes.";

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean. RUST_LOG wins over --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================
    // Built once here and passed down; nothing below reads the environment.

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    cli.apply_overrides(&mut config);

    // ========================================================================
    // RUN
    // ========================================================================

    if let Err(err) = commands::run(cli.command, config).await {
        let message = format!("{:#}", err);
        eprintln!("Error: {}", message);
        if reports_insufficient_scope(&message) {
            eprintln!("{}", SCOPE_HINT);
        }
        std::process::exit(1);
    }
}

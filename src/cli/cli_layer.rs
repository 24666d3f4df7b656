// CLI layer - command definitions, prompts and reporting.
#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "prompts.rs"]
pub mod prompts;

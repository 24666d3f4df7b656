// The infra module contains implementations of core traits.
// Each remote service gets its own client; local file formats live beside them.

#[path = "config/app_config.rs"]
pub mod config;

#[path = "google/mod.rs"]
pub mod google;

#[path = "slides/mod.rs"]
pub mod slides;

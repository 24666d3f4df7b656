pub mod grade_sync_service;
pub mod score_sheet;

pub use grade_sync_service::{
    GradeSyncError, GradeSyncReport, GradeSyncRequest, GradeSyncService, SpreadsheetReader,
};

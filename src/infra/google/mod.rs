pub mod classroom_client;
pub mod docs_client;
pub mod drive_client;
pub mod forms_client;
pub mod google_api;
pub mod google_auth;
pub mod sheets_client;

pub use classroom_client::ClassroomApiClient;
pub use docs_client::{DocsApiClient, FetchedDocument};
pub use drive_client::DriveApiClient;
pub use forms_client::FormsApiClient;
pub use google_api::GoogleApi;
pub use google_auth::{AuthorizedUserAuth, ServiceAccountAuth, TokenProvider};
pub use sheets_client::SheetsApiClient;

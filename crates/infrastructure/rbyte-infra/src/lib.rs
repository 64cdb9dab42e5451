pub mod api;
pub mod net;

// Re-exports for convenience
pub use api::{ApiError, ApiErrorKind, BackendClient};
pub use net::{default_http_client, download_to_file};

//! Sync layer: registry client, fetch-then-commit orchestration, report loading.

mod archive;
mod config;
mod error;
mod orchestrator;
mod report;
mod source;

#[cfg(feature = "http")]
pub mod http;

pub use archive::FilingArchive;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RegistryConfig};
pub use error::{RegistryError, SyncError};
pub use orchestrator::{SyncReport, Syncer};
pub use report::{Report, ReportError, load_report};
pub use source::RegistrySource;

#[cfg(feature = "http")]
pub use http::RegistryClient;

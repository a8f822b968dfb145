use std::time::Duration;

use registrar_store::StoreError;
use thiserror::Error;

/// A single registry request failed.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry returned 404: {body}")]
    NotFound { body: String },
    #[error("registry returned 401: {body}")]
    Unauthorized { body: String },
    #[error("registry returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("registry request timed out after {0:?}")]
    Timeout(Duration),
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Classify a non-200 response.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound { body },
            401 => Self::Unauthorized { body },
            _ => Self::Status { status, body },
        }
    }

    /// HTTP status of the failed response, if the registry answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A sync was abandoned. Nothing is written for the failed company unless
/// the error is [`SyncError::Store`], and even then the commit is atomic.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid company number {0:?}")]
    InvalidIdentifier(String),
    #[error("company profile unavailable: {0}")]
    ProfileUnavailable(RegistryError),
    #[error("filing history unavailable: {0}")]
    FilingsUnavailable(RegistryError),
    #[error("officer list unavailable: {0}")]
    OfficersUnavailable(RegistryError),
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
    #[error("store write task failed: {0}")]
    WriteTask(#[from] tokio::task::JoinError),
}

impl SyncError {
    /// The underlying registry failure for fetch-stage errors.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            Self::ProfileUnavailable(e)
            | Self::FilingsUnavailable(e)
            | Self::OfficersUnavailable(e) => Some(e),
            _ => None,
        }
    }

    /// One sentence suitable for showing to the person who asked for the sync.
    pub fn user_message(&self) -> String {
        let resource = match self {
            Self::InvalidIdentifier(id) => {
                return format!("'{id}' is not a valid company number.");
            }
            Self::Store(e) => return format!("Could not save the company data: {e}"),
            Self::WriteTask(e) => return format!("Could not save the company data: {e}"),
            Self::ProfileUnavailable(_) => "company profile",
            Self::FilingsUnavailable(_) => "filing history",
            Self::OfficersUnavailable(_) => "officer list",
        };
        match self.registry_error() {
            Some(RegistryError::NotFound { .. }) => {
                format!("No {resource} was found for that company number.")
            }
            Some(RegistryError::Unauthorized { .. }) => {
                "The registry rejected the API key; check that it is valid.".to_string()
            }
            Some(RegistryError::Timeout(_)) => {
                format!("The registry did not respond in time while fetching the {resource}.")
            }
            Some(other) => format!("Error fetching the {resource}: {other}"),
            None => self.to_string(),
        }
    }
}

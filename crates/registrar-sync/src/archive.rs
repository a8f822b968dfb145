//! Raw JSON dump of each company's filing-history payload. Write-only.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

const FILE_NAME: &str = "filing_history.json";

/// Writes `{root}/{company_number}/filing_history.json`.
#[derive(Debug, Clone)]
pub struct FilingArchive {
    root: PathBuf,
}

impl FilingArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, company_number: &str) -> PathBuf {
        self.root.join(company_number).join(FILE_NAME)
    }

    /// Overwrite the archived filing-history payload for one company.
    pub async fn write(&self, company_number: &str, payload: &Value) -> io::Result<PathBuf> {
        let path = self.path_for(company_number);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(payload)?;
        tokio::fs::write(&path, &json).await?;
        debug!(path = %path.display(), bytes = json.len(), "archived filing history");
        Ok(path)
    }
}

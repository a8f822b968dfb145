//! Fetch-then-commit sync of one company from the registry into the store.
//!
//! All three registry reads must succeed before anything is written; the
//! write itself is a single store transaction. A failed sync therefore leaves
//! the store exactly as it was, and repeating a sync converges on the same
//! state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use registrar_core::{Filing, Officer};
use registrar_store::DuckStore;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::{FilingArchive, RegistrySource, SyncError};

/// What a successful sync committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub company_number: String,
    pub company_name: String,
    pub officers: usize,
    pub filings: usize,
}

/// Runs syncs against one registry source and one store.
///
/// Syncs of the same company number are serialised; different companies run
/// concurrently. The per-company lock table keeps one entry for every company
/// number this `Syncer` has synced and is never pruned, so a long-lived
/// `Syncer` grows with the number of distinct companies it sees.
pub struct Syncer<R> {
    source: R,
    store: Arc<DuckStore>,
    archive: Option<FilingArchive>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<R: RegistrySource> Syncer<R> {
    pub fn new(source: R, store: Arc<DuckStore>) -> Self {
        Self {
            source,
            store,
            archive: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Also dump each committed filing history under `archive`.
    pub fn with_archive(mut self, archive: FilingArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn store(&self) -> &DuckStore {
        &self.store
    }

    /// Fetch profile, filing history, and officers for `company_number`, then
    /// commit company, officers, and filings.
    pub async fn sync(&self, company_number: &str) -> Result<SyncReport, SyncError> {
        validate_company_number(company_number)?;

        let lock = self.lock_for(company_number);
        let _guard = lock.lock().await;

        info!(company_number, "syncing company");
        let result = self.fetch_and_commit(company_number).await;
        match &result {
            Ok(report) => info!(
                company_number,
                officers = report.officers,
                filings = report.filings,
                "sync complete"
            ),
            Err(err) => warn!(company_number, error = %err, "sync failed"),
        }
        result
    }

    async fn fetch_and_commit(&self, company_number: &str) -> Result<SyncReport, SyncError> {
        let (profile, history, officer_records) = tokio::join!(
            self.source.fetch_profile(company_number),
            self.source.fetch_filing_history(company_number),
            self.source.fetch_officers(company_number),
        );
        // Checked in stage order so the reported failure does not depend on
        // which request finished first.
        let profile = profile.map_err(SyncError::ProfileUnavailable)?;
        let history = history.map_err(SyncError::FilingsUnavailable)?;
        let officer_records = officer_records.map_err(SyncError::OfficersUnavailable)?;

        let company = profile.into_company(company_number);
        let officers: Vec<Officer> = officer_records.into_iter().map(Officer::from).collect();
        let filings: Vec<Filing> = history.items.iter().map(Filing::from).collect();

        // DuckDB calls block; keep them off the async workers.
        let store = Arc::clone(&self.store);
        let report = tokio::task::spawn_blocking(move || {
            store.write_sync(&company, &officers, &filings)?;
            Ok::<_, SyncError>(SyncReport {
                company_number: company.company_number,
                company_name: company.company_name,
                officers: officers.len(),
                filings: filings.len(),
            })
        })
        .await??;

        if let Some(archive) = &self.archive
            && let Err(err) = archive.write(company_number, &history.raw).await
        {
            warn!(company_number, error = %err, "could not archive filing history");
        }

        Ok(report)
    }

    fn lock_for(&self, company_number: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(company_number.to_string()).or_default().clone()
    }
}

/// Company numbers are used verbatim in URLs and archive paths.
fn validate_company_number(company_number: &str) -> Result<(), SyncError> {
    if company_number.is_empty() || !company_number.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SyncError::InvalidIdentifier(company_number.to_string()));
    }
    Ok(())
}

use async_trait::async_trait;
use registrar_core::{CompanyProfile, FilingHistory, OfficerRecord};

use crate::RegistryError;

/// The three registry reads a sync needs.
///
/// Implemented over HTTP by [`RegistryClient`](crate::RegistryClient); the
/// [`Syncer`](crate::Syncer) only depends on this trait.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn fetch_profile(&self, company_number: &str) -> Result<CompanyProfile, RegistryError>;

    /// The filing-history items together with the payload as received.
    async fn fetch_filing_history(
        &self,
        company_number: &str,
    ) -> Result<FilingHistory, RegistryError>;

    async fn fetch_officers(
        &self,
        company_number: &str,
    ) -> Result<Vec<OfficerRecord>, RegistryError>;
}

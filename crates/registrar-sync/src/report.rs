//! Read back everything a company report shows.

use registrar_core::{AggregationError, Company, Filing, Officer, YearCount, summarize};
use registrar_store::{DuckStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// No sync has ever committed this company. Distinct from a failed fetch.
    #[error("company {0} has not been synced")]
    CompanyNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// The four values handed to a rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub company: Company,
    pub officers: Vec<Officer>,
    pub filings: Vec<Filing>,
    /// Filings per year, ascending. Empty means "no chart".
    pub summary: Vec<YearCount>,
}

pub fn load_report(store: &DuckStore, company_number: &str) -> Result<Report, ReportError> {
    let company = store
        .get_company(company_number)?
        .ok_or_else(|| ReportError::CompanyNotFound(company_number.to_string()))?;
    let officers = store.get_officers(company_number)?;
    let filings = store.get_filings(company_number)?;
    let summary = summarize(&filings)?;
    Ok(Report {
        company,
        officers,
        filings,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> Company {
        Company {
            company_number: "01234567".into(),
            company_name: "ACME WIDGETS LIMITED".into(),
            company_status: "active".into(),
            incorporation_date: None,
        }
    }

    fn filing(date: &str) -> Filing {
        Filing {
            category: "accounts".into(),
            description: "accounts-with-accounts-type-small".into(),
            date: date.into(),
        }
    }

    #[test]
    fn missing_company_is_not_found() {
        let store = DuckStore::open().unwrap();
        let err = load_report(&store, "01234567").unwrap_err();
        assert!(matches!(err, ReportError::CompanyNotFound(ref id) if id == "01234567"));
    }

    #[test]
    fn report_includes_summary() {
        let store = DuckStore::open().unwrap();
        let filings = vec![filing("2020-03-01"), filing("2020-07-01"), filing("2021-01-01")];
        store.write_sync(&company(), &[], &filings).unwrap();

        let report = load_report(&store, "01234567").unwrap();
        assert_eq!(report.company, company());
        assert!(report.officers.is_empty());
        assert_eq!(report.filings, filings);
        assert_eq!(
            report.summary,
            vec![
                YearCount { year: 2020, count: 2 },
                YearCount { year: 2021, count: 1 },
            ]
        );
    }

    #[test]
    fn company_without_filings_has_empty_summary() {
        let store = DuckStore::open().unwrap();
        store.write_sync(&company(), &[], &[]).unwrap();
        let report = load_report(&store, "01234567").unwrap();
        assert!(report.summary.is_empty());
    }

    #[test]
    fn stored_bad_date_surfaces_as_aggregation_error() {
        let store = DuckStore::open().unwrap();
        store.write_sync(&company(), &[], &[filing("30/09/2021")]).unwrap();
        let err = load_report(&store, "01234567").unwrap_err();
        assert!(matches!(err, ReportError::Aggregation(_)));
    }
}

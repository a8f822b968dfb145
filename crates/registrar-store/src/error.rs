use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A child row was written for a company that has no `companies` row.
    #[error("company {0} is not stored; write the company before its officers or filings")]
    UnknownCompany(String),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("{0}")]
    Other(String),
}

//! DuckDB storage for synced company records.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use duckdb::{Connection, params};
use registrar_core::{Company, Filing, Officer};
use tracing::{debug, info};

use crate::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS companies (
        company_number     VARCHAR PRIMARY KEY,
        company_name       VARCHAR NOT NULL,
        company_status     VARCHAR NOT NULL,
        incorporation_date DATE
    );
    CREATE TABLE IF NOT EXISTS officers (
        company_number VARCHAR NOT NULL,
        position       BIGINT NOT NULL,
        name           VARCHAR NOT NULL,
        role           VARCHAR NOT NULL,
        appointed_on   DATE,
        resigned_on    DATE
    );
    CREATE INDEX IF NOT EXISTS officers_company_idx ON officers (company_number);
    CREATE TABLE IF NOT EXISTS filings (
        company_number VARCHAR NOT NULL,
        position       BIGINT NOT NULL,
        category       VARCHAR NOT NULL,
        description    VARCHAR NOT NULL,
        filing_date    VARCHAR NOT NULL
    );
    CREATE INDEX IF NOT EXISTS filings_company_idx ON filings (company_number);
";

/// DuckDB store for the `companies`, `officers`, and `filings` tables.
///
/// `companies` holds one row per company number. `officers` and `filings`
/// are child tables keyed by company number and are replaced wholesale on
/// every write, so repeating a write never accumulates duplicates. A child
/// write for a company with no `companies` row fails with
/// [`StoreError::UnknownCompany`].
///
/// Every operation runs on its own connection cloned from the root
/// connection, so the store can be shared between tasks that write different
/// companies concurrently.
pub struct DuckStore {
    root: Mutex<Connection>,
}

impl DuckStore {
    /// Open an in-memory DuckDB database with the schema created.
    pub fn open() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    ///
    /// Tables are created on first open and reused afterwards.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let store = Self::bootstrap(Connection::open(path)?)?;
        info!(path = %path.display(), "opened company store");
        Ok(store)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            root: Mutex::new(conn),
        })
    }

    /// A fresh connection to the same database, for ad-hoc SQL.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let root = self
            .root
            .lock()
            .map_err(|_| StoreError::Other("store connection lock poisoned".into()))?;
        Ok(root.try_clone()?)
    }

    // ── Writes ──

    /// Insert the company row, or replace it if the company number is already stored.
    pub fn upsert_company(&self, company: &Company) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        upsert_company_row(&tx, company)?;
        tx.commit()?;
        debug!(company_number = %company.company_number, "upserted company");
        Ok(())
    }

    /// Replace every officer row of `company_number` with `officers`.
    pub fn replace_officers(
        &self,
        company_number: &str,
        officers: &[Officer],
    ) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_company(&tx, company_number)?;
        replace_officer_rows(&tx, company_number, officers)?;
        tx.commit()?;
        debug!(company_number, count = officers.len(), "replaced officers");
        Ok(())
    }

    /// Replace every filing row of `company_number` with `filings`.
    pub fn replace_filings(
        &self,
        company_number: &str,
        filings: &[Filing],
    ) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_company(&tx, company_number)?;
        replace_filing_rows(&tx, company_number, filings)?;
        tx.commit()?;
        debug!(company_number, count = filings.len(), "replaced filings");
        Ok(())
    }

    /// Write the company, then its officers, then its filings, in one transaction.
    ///
    /// Either all three tables reflect the new data or none of them change.
    pub fn write_sync(
        &self,
        company: &Company,
        officers: &[Officer],
        filings: &[Filing],
    ) -> Result<(), StoreError> {
        let id = company.company_number.as_str();
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        upsert_company_row(&tx, company)?;
        replace_officer_rows(&tx, id, officers)?;
        replace_filing_rows(&tx, id, filings)?;
        tx.commit()?;
        info!(
            company_number = id,
            officers = officers.len(),
            filings = filings.len(),
            "committed company sync"
        );
        Ok(())
    }

    // ── Reads ──

    /// Fetch the company row, or `None` if the company has never been stored.
    pub fn get_company(&self, company_number: &str) -> Result<Option<Company>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT company_number, company_name, company_status, incorporation_date
             FROM companies WHERE company_number = ?",
        )?;
        let mut rows = stmt.query_map(params![company_number], |row| {
            Ok(Company {
                company_number: row.get(0)?,
                company_name: row.get(1)?,
                company_status: row.get(2)?,
                incorporation_date: row.get::<_, Option<NaiveDate>>(3)?,
            })
        })?;
        Ok(rows.next().transpose()?)
    }

    /// Officers of the company in the order they were written. Empty if none.
    pub fn get_officers(&self, company_number: &str) -> Result<Vec<Officer>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT name, role, appointed_on, resigned_on
             FROM officers WHERE company_number = ? ORDER BY position",
        )?;
        let rows = stmt.query_map(params![company_number], |row| {
            Ok(Officer {
                name: row.get(0)?,
                role: row.get(1)?,
                appointed_on: row.get::<_, Option<NaiveDate>>(2)?,
                resigned_on: row.get::<_, Option<NaiveDate>>(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Filings of the company in the order they were written. Empty if none.
    pub fn get_filings(&self, company_number: &str) -> Result<Vec<Filing>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT category, description, filing_date
             FROM filings WHERE company_number = ? ORDER BY position",
        )?;
        let rows = stmt.query_map(params![company_number], |row| {
            Ok(Filing {
                category: row.get(0)?,
                description: row.get(1)?,
                date: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Counts ──

    /// Number of rows in the `companies` table.
    pub fn company_count(&self) -> Result<usize, StoreError> {
        self.count_table("companies")
    }

    /// Number of rows in the `officers` table.
    pub fn officer_count(&self) -> Result<usize, StoreError> {
        self.count_table("officers")
    }

    /// Number of rows in the `filings` table.
    pub fn filing_count(&self) -> Result<usize, StoreError> {
        self.count_table("filings")
    }

    fn count_table(&self, table: &str) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let sql = format!("SELECT count(*)::BIGINT AS cnt FROM {table}");
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| StoreError::Other(format!("{table} count {count} out of range")))
    }
}

fn upsert_company_row(conn: &Connection, company: &Company) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO companies (company_number, company_name, company_status, incorporation_date)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (company_number) DO UPDATE SET
             company_name = excluded.company_name,
             company_status = excluded.company_status,
             incorporation_date = excluded.incorporation_date",
        params![
            company.company_number,
            company.company_name,
            company.company_status,
            company.incorporation_date,
        ],
    )?;
    Ok(())
}

fn require_company(conn: &Connection, company_number: &str) -> Result<(), StoreError> {
    let count: i64 = conn.query_row(
        "SELECT count(*)::BIGINT FROM companies WHERE company_number = ?",
        params![company_number],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Err(StoreError::UnknownCompany(company_number.to_string()));
    }
    Ok(())
}

fn replace_officer_rows(
    conn: &Connection,
    company_number: &str,
    officers: &[Officer],
) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM officers WHERE company_number = ?",
        params![company_number],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO officers (company_number, position, name, role, appointed_on, resigned_on)
         VALUES (?, ?, ?, ?, ?, ?)",
    )?;
    for (position, officer) in officers.iter().enumerate() {
        stmt.execute(params![
            company_number,
            position as i64,
            officer.name,
            officer.role,
            officer.appointed_on,
            officer.resigned_on,
        ])?;
    }
    Ok(())
}

fn replace_filing_rows(
    conn: &Connection,
    company_number: &str,
    filings: &[Filing],
) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM filings WHERE company_number = ?",
        params![company_number],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO filings (company_number, position, category, description, filing_date)
         VALUES (?, ?, ?, ?, ?)",
    )?;
    for (position, filing) in filings.iter().enumerate() {
        stmt.execute(params![
            company_number,
            position as i64,
            filing.category,
            filing.description,
            filing.date,
        ])?;
    }
    Ok(())
}

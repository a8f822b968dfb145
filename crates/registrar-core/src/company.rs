//! Relational records persisted for each synced company.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the `companies` table, keyed by `company_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_number: String,
    pub company_name: String,
    /// Registry status (`active`, `dissolved`, `liquidation`, ...), kept opaque.
    pub company_status: String,
    pub incorporation_date: Option<NaiveDate>,
}

/// An officer of a company. Belongs to the company it was stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub role: String,
    pub appointed_on: Option<NaiveDate>,
    /// `None` while the officer is still in post.
    pub resigned_on: Option<NaiveDate>,
}

impl Officer {
    pub fn is_active(&self) -> bool {
        self.resigned_on.is_none()
    }
}

/// A single filing-history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub category: String,
    pub description: String,
    /// Filing date exactly as the registry reported it (normally `YYYY-MM-DD`).
    ///
    /// Validation is deferred to [`summarize`](crate::summarize).
    pub date: String,
}

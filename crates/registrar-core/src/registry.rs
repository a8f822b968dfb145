//! Wire payloads returned by the company registry API, and their
//! normalisation into the stored records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::company::{Company, Filing, Officer};

/// `GET /company/{company_number}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_number: Option<String>,
    pub company_name: String,
    #[serde(default)]
    pub company_status: String,
    #[serde(default)]
    pub date_of_creation: Option<NaiveDate>,
}

impl CompanyProfile {
    /// Build the stored record under the identifier that was requested.
    ///
    /// The registry's echoed `company_number` is ignored: the requested
    /// identifier is the natural key and is never rewritten.
    pub fn into_company(self, company_number: &str) -> Company {
        Company {
            company_number: company_number.to_string(),
            company_name: self.company_name,
            company_status: self.company_status,
            incorporation_date: self.date_of_creation,
        }
    }
}

/// `GET /company/{company_number}/officers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficerList {
    #[serde(default)]
    pub items: Vec<OfficerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerRecord {
    pub name: String,
    #[serde(default)]
    pub officer_role: String,
    #[serde(default)]
    pub appointed_on: Option<NaiveDate>,
    #[serde(default)]
    pub resigned_on: Option<NaiveDate>,
}

impl From<OfficerRecord> for Officer {
    fn from(rec: OfficerRecord) -> Self {
        Officer {
            name: rec.name,
            role: rec.officer_role,
            appointed_on: rec.appointed_on,
            resigned_on: rec.resigned_on,
        }
    }
}

/// `GET /company/{company_number}/filing-history`
///
/// `raw` is the response body exactly as the registry sent it, kept for the
/// archive; `items` is the part the pipeline stores.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilingHistory {
    #[serde(default)]
    pub items: Vec<FilingRecord>,
    #[serde(skip)]
    pub raw: Value,
}

impl FilingHistory {
    /// Parse the items out of a filing-history payload and keep the payload.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let history = FilingHistory::deserialize(&raw)?;
        Ok(Self {
            items: history.items,
            raw,
        })
    }
}

/// One filing-history item. Missing text fields read as empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilingRecord {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

impl From<&FilingRecord> for Filing {
    fn from(rec: &FilingRecord) -> Self {
        Filing {
            category: rec.category.clone(),
            description: rec.description.clone(),
            date: rec.date.clone(),
        }
    }
}

//! Filings-per-year summary for charting.
//!
//! [`summarize`] buckets filings by calendar year; [`summary_batch`] turns the
//! result into a two-column Arrow table (`year`, `count`) that any charting
//! backend can consume.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::debug;

use crate::company::Filing;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("filing {index} has an invalid date: {value:?}")]
    InvalidDate { index: usize, value: String },
}

/// Number of filings made in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Count filings per calendar year, ascending by year.
///
/// Empty input gives an empty summary. Any date that is not exactly
/// `YYYY-MM-DD` (four-digit year, zero-padded month and day, no surrounding
/// whitespace or sign) fails the whole summary; nothing is silently dropped.
pub fn summarize(filings: &[Filing]) -> Result<Vec<YearCount>, AggregationError> {
    let mut buckets: BTreeMap<i32, usize> = BTreeMap::new();
    for (index, filing) in filings.iter().enumerate() {
        let date = parse_filing_date(&filing.date).ok_or_else(|| {
            AggregationError::InvalidDate {
                index,
                value: filing.date.clone(),
            }
        })?;
        *buckets.entry(date.year()).or_default() += 1;
    }

    debug!(filings = filings.len(), years = buckets.len(), "summarised filings");
    Ok(buckets
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect())
}

/// chrono alone accepts unpadded fields and signed years, so the shape is
/// checked first.
fn parse_filing_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn summary_schema() -> Schema {
    Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("count", DataType::Int64, false),
    ])
}

/// The summary as a single Arrow batch with columns `year: Int32, count: Int64`.
pub fn summary_batch(summary: &[YearCount]) -> Result<RecordBatch, ArrowError> {
    let years: ArrayRef = Arc::new(Int32Array::from_iter_values(
        summary.iter().map(|yc| yc.year),
    ));
    let counts: ArrayRef = Arc::new(Int64Array::from_iter_values(
        summary.iter().map(|yc| yc.count as i64),
    ));
    RecordBatch::try_new(Arc::new(summary_schema()), vec![years, counts])
}

//! Terminal rendering of a company report.
//!
//! The filings summary is printed twice: as an Arrow table (the same batch a
//! charting backend would receive) and as a horizontal text bar chart.

use arrow::util::pretty::pretty_format_batches;
use registrar_core::{Company, Officer, YearCount, summary_batch};
use registrar_sync::Report;

const BAR_WIDTH: usize = 40;
const BAR_CHAR: char = '#';

// ── Public API ──

pub fn print_report(report: &Report) -> anyhow::Result<()> {
    print_company_card(&report.company);
    print_officers(&report.officers);
    print_filing_summary(&report.summary, report.filings.len())?;
    Ok(())
}

pub fn print_company_card(company: &Company) {
    println!("=== {} ===", company.company_name);
    println!("  {:<20} {}", "company_number", company.company_number);
    if !company.company_status.is_empty() {
        println!("  {:<20} {}", "status", company.company_status);
    }
    if let Some(date) = company.incorporation_date {
        println!("  {:<20} {}", "incorporated", date);
    }
    println!();
}

pub fn print_officers(officers: &[Officer]) {
    if officers.is_empty() {
        println!("Officers: none recorded");
        println!();
        return;
    }

    let active = officers.iter().filter(|o| o.is_active()).count();
    println!("Officers ({} total, {} active)", officers.len(), active);
    for officer in officers {
        print!("  {:<32} {:<24}", officer.name, officer.role);
        if let Some(date) = officer.appointed_on {
            print!("  appointed {date}");
        }
        match officer.resigned_on {
            Some(date) => print!("  resigned {date}"),
            None => print!("  active"),
        }
        println!();
    }
    println!();
}

pub fn print_filing_summary(summary: &[YearCount], total_filings: usize) -> anyhow::Result<()> {
    if summary.is_empty() {
        println!("Filings: none recorded, no chart");
        return Ok(());
    }

    println!("Filings per year ({total_filings} total)");
    let batch = summary_batch(summary)?;
    println!("{}", pretty_format_batches(&[batch])?);
    println!();
    for line in render_bars(summary, BAR_WIDTH) {
        println!("  {line}");
    }
    Ok(())
}

// ── Chart ──

/// One line per year, bars scaled so the busiest year spans `width` characters.
///
/// Every non-zero year gets at least one bar character.
pub fn render_bars(summary: &[YearCount], width: usize) -> Vec<String> {
    let max = summary.iter().map(|yc| yc.count).max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    summary
        .iter()
        .map(|yc| {
            let len = (yc.count * width).div_ceil(max);
            let bar: String = std::iter::repeat_n(BAR_CHAR, len).collect();
            format!("{} | {bar} {}", yc.year, yc.count)
        })
        .collect()
}

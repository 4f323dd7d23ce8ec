use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::ExpenseTable;

pub const DEFAULT_TREND_MONTHS: usize = 6;

/// Spend summed over one calendar month
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub total_amount: f64,
    /// Short label such as `Jan 2024`
    pub label: String,
}

/// Sum spend per calendar month and keep the most recent `n` months
///
/// Rows without a date are ignored. Months are returned oldest first and
/// months without spend are not padded in.
pub fn last_months(table: &ExpenseTable, n: usize) -> Vec<MonthlyTrendPoint> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in &table.records {
        if let Some(date) = record.date {
            *totals.entry((date.year(), date.month())).or_insert(0.0) += record.amount;
        }
    }

    let skip = totals.len().saturating_sub(n);
    totals
        .into_iter()
        .skip(skip)
        .map(|((year, month), total_amount)| MonthlyTrendPoint {
            year,
            month,
            total_amount,
            label: month_label(year, month),
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02}/{}", month, year))
}

use chrono::Datelike;
use serde::Serialize;

use crate::record::{ExpenseRecord, ExpenseTable};
use crate::trend::last_months;

/// Calendar-month filter for the dashboard (any year)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthFilter(Option<u32>);

impl MonthFilter {
    /// Parse the `month` query value
    ///
    /// `All`, a missing value, anything non-numeric and anything outside
    /// 1..=12 all mean "no filter".
    pub fn parse(raw: Option<&str>) -> Self {
        let month = raw
            .map(str::trim)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m));
        MonthFilter(month)
    }

    pub fn month(&self) -> Option<u32> {
        self.0
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        match self.0 {
            None => true,
            Some(month) => record.date.is_some_and(|d| d.month() == month),
        }
    }
}

/// Rows whose date falls in the filter's calendar month, in table order
///
/// # Arguments
/// * `table` - The unified expense table
/// * `filter` - Month to keep; an empty filter keeps every row
///
/// # Returns
/// References into `table`, so breakdowns can run without cloning rows.
/// Rows without a date only survive an empty filter.
pub fn filter_month<'a>(table: &'a ExpenseTable, filter: MonthFilter) -> Vec<&'a ExpenseRecord> {
    table.records.iter().filter(|r| filter.matches(r)).collect()
}

/// Sum amounts per key, largest first
///
/// Groups keep first-appearance order before the (stable) sort, so equal
/// totals stay in row order. Blank keys are left out.
pub fn breakdown<F>(records: &[&ExpenseRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&ExpenseRecord) -> &str,
{
    let mut groups: Vec<(String, f64)> = Vec::new();
    for record in records {
        let name = key(*record);
        if name.trim().is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(g, _)| g == name) {
            Some((_, total)) => *total += record.amount,
            None => groups.push((name.to_string(), record.amount)),
        }
    }
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
}

/// One row of the vendor breakdown, serialized as `{"tool", "amount"}`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorTotal {
    pub tool: String,
    pub amount: f64,
}

/// One row of the department breakdown
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepartmentTotal {
    pub department: String,
    pub amount: f64,
}

/// Payload of `/api/data`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub total: f64,
    pub vendor: Vec<VendorTotal>,
    pub department: Vec<DepartmentTotal>,
    pub trend_months: Vec<String>,
    pub trend_values: Vec<f64>,
}

impl DashboardData {
    /// Filtered KPIs plus the trend, which always covers the whole table
    pub fn build(table: &ExpenseTable, filter: MonthFilter, trend_months: usize) -> Self {
        let rows = filter_month(table, filter);
        let total = rows.iter().fold(0.0, |acc, r| acc + r.amount);

        let vendor = breakdown(&rows, |r| r.tool.as_str())
            .into_iter()
            .map(|(tool, amount)| VendorTotal { tool, amount })
            .collect();
        let department = breakdown(&rows, |r| r.department.as_str())
            .into_iter()
            .map(|(department, amount)| DepartmentTotal { department, amount })
            .collect();

        let trend = last_months(table, trend_months);

        DashboardData {
            total,
            vendor,
            department,
            trend_months: trend.iter().map(|p| p.label.clone()).collect(),
            trend_values: trend.iter().map(|p| p.total_amount).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::parse_date;

    fn record(date: &str, tool: &str, department: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            date: parse_date(date),
            tool: tool.to_string(),
            department: department.to_string(),
            amount,
            ..ExpenseRecord::default()
        }
    }

    fn sample() -> ExpenseTable {
        ExpenseTable {
            extra_columns: Vec::new(),
            records: vec![
                record("2024-01-05", "Figma", "Design", 10.0),
                record("2024-01-20", "Slack", "Ops", 20.0),
                record("2024-02-02", "Figma", "Design", 5.0),
                record("2023-02-14", "Zoom", "Ops", 7.0),
                record("", "Zoom", "", 3.0),
            ],
        }
    }

    #[test]
    fn month_filter_parsing() {
        assert_eq!(MonthFilter::parse(Some("2")).month(), Some(2));
        assert_eq!(MonthFilter::parse(Some(" 12 ")).month(), Some(12));
        for raw in ["All", "0", "13", "-1", "feb", "", "2.5"] {
            assert_eq!(MonthFilter::parse(Some(raw)), MonthFilter::default(), "{raw}");
        }
        assert_eq!(MonthFilter::parse(None), MonthFilter::default());
    }

    #[test]
    fn month_filter_spans_years() {
        let table = sample();
        let feb = filter_month(&table, MonthFilter::parse(Some("2")));
        assert_eq!(feb.len(), 2);
        assert!(feb.iter().all(|r| r.date.is_some()));
    }

    #[test]
    fn short_year_dates_land_in_their_own_month() {
        let table = ExpenseTable {
            extra_columns: Vec::new(),
            records: vec![
                record("1/5/24", "Figma", "Design", 10.0),
                record("25/12/2024", "Slack", "Ops", 4.0),
            ],
        };
        assert_eq!(filter_month(&table, MonthFilter::parse(Some("1"))).len(), 1);
        assert!(filter_month(&table, MonthFilter::parse(Some("5"))).is_empty());
        assert_eq!(filter_month(&table, MonthFilter::parse(Some("12"))).len(), 1);
    }

    #[test]
    fn invalid_filters_equal_no_filter() {
        let table = sample();
        let unfiltered = DashboardData::build(&table, MonthFilter::default(), 6);
        for raw in ["13", "abc", "All"] {
            assert_eq!(
                DashboardData::build(&table, MonthFilter::parse(Some(raw)), 6),
                unfiltered
            );
        }
    }

    #[test]
    fn breakdown_sorts_descending_and_is_stable() {
        let table = ExpenseTable {
            extra_columns: Vec::new(),
            records: vec![
                record("", "B", "", 5.0),
                record("", "A", "", 5.0),
                record("", "C", "", 9.0),
                record("", "", "", 100.0),
            ],
        };
        let rows: Vec<&ExpenseRecord> = table.records.iter().collect();
        let groups = breakdown(&rows, |r| r.tool.as_str());
        assert_eq!(
            groups,
            vec![
                ("C".to_string(), 9.0),
                ("B".to_string(), 5.0),
                ("A".to_string(), 5.0)
            ]
        );
    }

    #[test]
    fn dashboard_payload() {
        let data = DashboardData::build(&sample(), MonthFilter::parse(Some("1")), 6);
        assert_eq!(data.total, 30.0);
        assert_eq!(
            data.vendor,
            vec![
                VendorTotal { tool: "Slack".into(), amount: 20.0 },
                VendorTotal { tool: "Figma".into(), amount: 10.0 },
            ]
        );
        assert_eq!(data.department[0].department, "Ops");
        // trend ignores the month filter
        assert_eq!(data.trend_months, vec!["Feb 2023", "Jan 2024", "Feb 2024"]);
        assert_eq!(data.trend_values, vec![7.0, 30.0, 5.0]);
    }

    #[test]
    fn empty_table_payload() {
        let data = DashboardData::build(&ExpenseTable::empty(), MonthFilter::default(), 6);
        assert_eq!(data, DashboardData::default());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total": 0.0,
                "vendor": [],
                "department": [],
                "trend_months": [],
                "trend_values": []
            })
        );
    }
}

use chrono::NaiveDate;

use crate::coerce::{parse_amount, parse_date};

/// One typed row of the unified expense table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseRecord {
    pub date: Option<NaiveDate>,
    pub tool: String,
    pub used_by: String,
    pub department: String,
    pub amount: f64,
    pub company: String,
    pub status: String,
    pub cycle: String,
    pub renewal: String,
    pub receipt: String,
    pub desc: String,
    /// Values of the table's extra columns, same order as
    /// `ExpenseTable::extra_columns`
    pub extra: Vec<String>,
}

impl ExpenseRecord {
    /// Build a record from `(canonical column, raw text)` pairs
    ///
    /// Later pairs overwrite earlier ones for the same column. Names that are
    /// not canonical are ignored here; the aggregator routes them to `extra`.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = ExpenseRecord::default();
        for (column, value) in fields {
            record.set_field(column, value);
        }
        record
    }

    /// Coerce and store one canonical field; returns false for unknown names
    pub fn set_field(&mut self, column: &str, value: &str) -> bool {
        match column {
            "date" => self.date = parse_date(value),
            "amount" => self.amount = parse_amount(value),
            _ => match self.text_field_mut(column) {
                Some(slot) => *slot = value.to_string(),
                None => return false,
            },
        }
        true
    }

    fn text_field_mut(&mut self, column: &str) -> Option<&mut String> {
        match column {
            "tool" => Some(&mut self.tool),
            "used_by" => Some(&mut self.used_by),
            "department" => Some(&mut self.department),
            "company" => Some(&mut self.company),
            "status" => Some(&mut self.status),
            "cycle" => Some(&mut self.cycle),
            "renewal" => Some(&mut self.renewal),
            "receipt" => Some(&mut self.receipt),
            "desc" => Some(&mut self.desc),
            _ => None,
        }
    }

    /// Render a canonical field back to text, as the CSV export writes it
    pub fn field_text(&self, column: &str) -> String {
        match column {
            "date" => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "amount" => self.amount.to_string(),
            "tool" => self.tool.clone(),
            "used_by" => self.used_by.clone(),
            "department" => self.department.clone(),
            "company" => self.company.clone(),
            "status" => self.status.clone(),
            "cycle" => self.cycle.clone(),
            "renewal" => self.renewal.clone(),
            "receipt" => self.receipt.clone(),
            "desc" => self.desc.clone(),
            _ => String::new(),
        }
    }
}

/// The normalized table every read path produces
///
/// The canonical columns are the fields of [`ExpenseRecord`], so they exist
/// even when the source had none of them. Columns no header rule recognized
/// are kept in `extra_columns` for the export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseTable {
    pub extra_columns: Vec<String>,
    pub records: Vec<ExpenseRecord>,
}

impl ExpenseTable {
    /// A table with no rows and no extra columns, what a failed read yields
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the table has no rows; extra columns alone do not count
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Sum of every row's amount
    ///
    /// # Returns
    /// `0.0` for an empty table (never `-0.0`)
    pub fn total_amount(&self) -> f64 {
        self.records.iter().fold(0.0, |acc, r| acc + r.amount)
    }

    /// Position of an extra column, appending it (and padding existing rows)
    /// when it is new
    pub fn extra_index(&mut self, column: &str) -> usize {
        if let Some(idx) = self.extra_columns.iter().position(|c| c == column) {
            return idx;
        }
        self.extra_columns.push(column.to_string());
        for record in &mut self.records {
            record.extra.push(String::new());
        }
        self.extra_columns.len() - 1
    }
}

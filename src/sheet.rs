//! Sheet ingestion: fetch one or many remote sheets, normalize their headers,
//! coerce their cells and merge everything into one [`ExpenseTable`].

use serde_json::Value;

use crate::columns::{column_map, is_canonical};
use crate::error::{DashboardError, Result};
use crate::record::{ExpenseRecord, ExpenseTable};

/// Where the read path gets its rows from
#[derive(Clone, Debug, PartialEq)]
pub enum SheetSource {
    /// A single sheet's CSV export
    Csv { url: String },
    /// A scripted endpoint that returns every sheet at once when asked for
    /// `?sheet=all`
    AllSheets { url: String },
}

/// Untyped rows of one sheet, as they came off the wire
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

enum Target {
    Canonical(String),
    Extra(usize),
}

/// Normalize and merge raw sheets into one table
///
/// Canonical columns merge by name across sheets; unrecognized columns are
/// unioned in first-seen order. When several headers of one sheet map to the
/// same canonical column, the rightmost one wins.
pub fn unify(sheets: Vec<RawSheet>) -> ExpenseTable {
    let mut table = ExpenseTable::empty();

    for sheet in sheets {
        let targets: Vec<Target> = column_map(&sheet.headers)
            .into_iter()
            .map(|(_, canonical)| {
                if is_canonical(&canonical) {
                    Target::Canonical(canonical)
                } else {
                    Target::Extra(table.extra_index(&canonical))
                }
            })
            .collect();

        for row in sheet.rows {
            let mut record = ExpenseRecord {
                extra: vec![String::new(); table.extra_columns.len()],
                ..ExpenseRecord::default()
            };
            for (idx, target) in targets.iter().enumerate() {
                let value = row.get(idx).map(String::as_str).unwrap_or("");
                match target {
                    Target::Canonical(column) => {
                        record.set_field(column, value);
                    }
                    Target::Extra(slot) => record.extra[*slot] = value.to_string(),
                }
            }
            table.records.push(record);
        }
    }

    table
}

/// Parse a CSV export; the first row holds the headers
pub fn parse_csv(text: &str) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(RawSheet { headers, rows })
}

/// Parse the combined "all sheets" payload
///
/// Accepted shapes: an array of rows, an object of sheet name to rows, or
/// either of those wrapped in `{"sheets": ...}` / `{"data": ...}`. Rows are
/// objects keyed by header, or arrays whose first entry is the header row.
pub fn parse_all_sheets(body: &str) -> Result<Vec<RawSheet>> {
    let value: Value = serde_json::from_str(body)?;
    sheets_from_value(value)
}

fn sheets_from_value(value: Value) -> Result<Vec<RawSheet>> {
    match value {
        Value::Array(rows) => Ok(vec![sheet_from_rows(rows)?]),
        Value::Object(mut map) => {
            for wrapper in ["sheets", "data"] {
                if matches!(map.get(wrapper), Some(Value::Array(_) | Value::Object(_))) {
                    if let Some(inner) = map.remove(wrapper) {
                        return sheets_from_value(inner);
                    }
                }
            }

            let mut sheets = Vec::new();
            for (_, entry) in map {
                if let Value::Array(rows) = entry {
                    sheets.push(sheet_from_rows(rows)?);
                }
            }
            if sheets.is_empty() {
                return Err(DashboardError::UnexpectedPayload(
                    "object without any sheet arrays".to_string(),
                ));
            }
            Ok(sheets)
        }
        other => Err(DashboardError::UnexpectedPayload(format!(
            "expected an array or object, got {}",
            other
        ))),
    }
}

fn sheet_from_rows(rows: Vec<Value>) -> Result<RawSheet> {
    let mut rows = rows.into_iter();
    let first = match rows.next() {
        Some(first) => first,
        None => return Ok(RawSheet::default()),
    };

    match first {
        Value::Array(header_row) => {
            let headers = header_row.iter().map(cell_text).collect();
            let mut sheet = RawSheet {
                headers,
                rows: Vec::new(),
            };
            for row in rows {
                match row {
                    Value::Array(cells) => sheet.rows.push(cells.iter().map(cell_text).collect()),
                    other => {
                        return Err(DashboardError::UnexpectedPayload(format!(
                            "expected a row array, got {}",
                            other
                        )));
                    }
                }
            }
            Ok(sheet)
        }
        Value::Object(_) => {
            let objects: Vec<serde_json::Map<String, Value>> = std::iter::once(first)
                .chain(rows)
                .map(|row| match row {
                    Value::Object(map) => Ok(map),
                    other => Err(DashboardError::UnexpectedPayload(format!(
                        "expected a row object, got {}",
                        other
                    ))),
                })
                .collect::<Result<_>>()?;

            let mut headers: Vec<String> = Vec::new();
            for object in &objects {
                for key in object.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }

            let rows = objects
                .iter()
                .map(|object| {
                    headers
                        .iter()
                        .map(|h| object.get(h).map(cell_text).unwrap_or_default())
                        .collect()
                })
                .collect();

            Ok(RawSheet { headers, rows })
        }
        other => Err(DashboardError::UnexpectedPayload(format!(
            "expected rows, got {}",
            other
        ))),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(feature = "web")]
pub use remote::SheetAggregator;

#[cfg(feature = "web")]
mod remote {
    use log::{debug, warn};
    use reqwest::Client;
    use std::time::Duration;

    use super::{SheetSource, parse_all_sheets, parse_csv, unify};
    use crate::error::{DashboardError, Result};
    use crate::record::ExpenseTable;

    /// Loads the unified table from the configured source
    #[derive(Clone, Debug)]
    pub struct SheetAggregator {
        client: Client,
        source: Option<SheetSource>,
        timeout: Duration,
    }

    impl SheetAggregator {
        pub fn new(client: Client, source: Option<SheetSource>, timeout: Duration) -> Self {
            Self {
                client,
                source,
                timeout,
            }
        }

        /// Fetch and normalize, degrading every failure to an empty table
        ///
        /// Callers cannot tell "remote is down" from "no rows yet"; the
        /// failure only shows up in the log.
        pub async fn load(&self) -> ExpenseTable {
            match self.try_load().await {
                Ok(table) => table,
                Err(e) => {
                    warn!("Sheet read error: {}", e);
                    ExpenseTable::empty()
                }
            }
        }

        /// Fetch and normalize, reporting why a read failed
        pub async fn try_load(&self) -> Result<ExpenseTable> {
            let source = self.source.as_ref().ok_or(DashboardError::NoSource)?;

            let sheets = match source {
                SheetSource::Csv { url } => {
                    let body = self.fetch_text(self.client.get(url)).await?;
                    vec![parse_csv(&body)?]
                }
                SheetSource::AllSheets { url } => {
                    let request = self.client.get(url).query(&[("sheet", "all")]);
                    let body = self.fetch_text(request).await?;
                    parse_all_sheets(&body)?
                }
            };

            let sheet_count = sheets.len();
            let table = unify(sheets);
            debug!(
                "Loaded {} rows from {} sheet(s)",
                table.len(),
                sheet_count
            );
            Ok(table)
        }

        async fn fetch_text(&self, request: reqwest::RequestBuilder) -> Result<String> {
            let response = request.timeout(self.timeout).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(DashboardError::RemoteStatus(status.as_u16()));
            }
            Ok(response.text().await?)
        }
    }
}

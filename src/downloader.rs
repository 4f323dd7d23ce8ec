use std::path::Path;

use crate::columns::CANONICAL_COLUMNS;
use crate::error::Result;
use crate::record::ExpenseTable;

/// Header row of every export: canonical columns, then extra columns
pub fn export_headers(table: &ExpenseTable) -> Vec<String> {
    CANONICAL_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(table.extra_columns.iter().cloned())
        .collect()
}

fn export_row(table: &ExpenseTable, idx: usize) -> Vec<String> {
    let record = &table.records[idx];
    CANONICAL_COLUMNS
        .iter()
        .map(|c| record.field_text(c))
        .chain(
            (0..table.extra_columns.len())
                .map(|i| record.extra.get(i).cloned().unwrap_or_default()),
        )
        .collect()
}

/// Convert the unified table to CSV
///
/// Dates are written as `YYYY-MM-DD` (empty when unknown) and amounts as
/// plain decimals; quoting is left to the `csv` writer.
///
/// # Examples
/// ```
/// use expense_dashboard::downloader::to_csv;
/// use expense_dashboard::record::ExpenseTable;
///
/// let csv = to_csv(&ExpenseTable::empty()).unwrap();
/// assert!(csv.starts_with("date,tool,used_by"));
/// ```
pub fn to_csv(table: &ExpenseTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(export_headers(table))?;
    for idx in 0..table.records.len() {
        writer.write_record(export_row(table, idx))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the CSV export to a server-local file, creating parent directories
pub fn export_csv(table: &ExpenseTable, path: &Path) -> Result<()> {
    let content = to_csv(table)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Convert the unified table to an XLSX workbook with one `Expenses` sheet
///
/// Amounts are written as numbers, everything else as text.
#[cfg(feature = "web")]
pub fn to_xlsx(table: &ExpenseTable) -> Result<Vec<u8>> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Expenses")?;

    for (col, header) in export_headers(table).iter().enumerate() {
        worksheet.write_string(0, col as u16, header.as_str())?;
    }

    for (idx, record) in table.records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in export_row(table, idx).iter().enumerate() {
            if CANONICAL_COLUMNS.get(col) == Some(&"amount") {
                worksheet.write_number(row, col as u16, record.amount)?;
            } else if !value.is_empty() {
                worksheet.write_string(row, col as u16, value.as_str())?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

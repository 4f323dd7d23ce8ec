/*!
# Expense Dashboard

A small expense-tracking dashboard in front of a spreadsheet backend, built in
Rust.

## Overview

The spreadsheet stays the single source of truth. Every request re-reads it
(either one sheet's CSV export or every sheet at once through a scripted
endpoint), normalizes whatever headers the sheet happens to use, and serves
aggregated views: total spend, spend per vendor, spend per department and a
monthly trend. A form appends new rows, with an optional receipt upload that
is stored on local disk.

## Architecture

### Ingestion
- **Column Normalizer** - Ordered keyword rules map free-text headers
  ("Purchase Date", "Amt (USD)") onto the canonical columns
- **Record Coercer** - Dates and amounts are parsed from loose text; bad
  values fall back to "no date" / zero instead of failing the read
- **Sheet Aggregator** - Single-sheet (CSV) and all-sheets (JSON) modes feed
  the same pipeline and produce one `ExpenseTable`

### Aggregation
- **Trend Reducer** - Spend per calendar month, most recent N months
- **Summary** - Month filter and vendor/department breakdowns

### Web Layer
- **Technologies**: Rust, axum, handlebars, plotters
- Dashboard and form pages, JSON API, CSV/XLSX downloads, SVG trend chart
- Write path forwards new rows to the sheet fire-and-forget

## Failure model

Reads never fail from the browser's point of view: an unreachable or broken
sheet yields an empty table. Writes always redirect back to the dashboard;
a rejected row is only visible in the log.

## Modules

- **columns**: canonical column names and header rules
- **coerce**: date and amount parsing
- **record**: `ExpenseRecord` and `ExpenseTable`
- **sheet**: CSV / all-sheets parsing, merging and remote loading
- **trend**: monthly trend
- **summary**: month filter, breakdowns, `/api/data` payload
- **forwarder**: new-row payload and remote writer
- **receipts**: upload file names and storage
- **downloader**: CSV and XLSX export
- **graph**: trend chart rendering
- **config**: command-line / environment configuration
- **app**: routing and handlers

## REST API Endpoints

- `/` - Dashboard page
- `/add` - Add-expense form (GET) and submission (POST, multipart)
- `/api/data?month=<1-12|All>` - Totals, breakdowns and trend as JSON
- `/download/csv`, `/download/xlsx` - Full table export
- `/chart/trend.svg` - Monthly trend chart
*/

pub mod coerce;
pub mod columns;
pub mod config;
pub mod downloader;
pub mod error;
pub mod forwarder;
pub mod receipts;
pub mod record;
pub mod sheet;
pub mod summary;
pub mod trend;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

/// Re-export the data model to make it easier to use
pub use error::{DashboardError, Result};
pub use record::{ExpenseRecord, ExpenseTable};
pub use trend::MonthlyTrendPoint;

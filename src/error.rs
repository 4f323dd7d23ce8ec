use thiserror::Error;

/// Errors raised while reading, writing or exporting expense data
///
/// Most of these never reach a browser: the read path turns them into an
/// empty table and the write path turns them into a log line. Only the export
/// routes surface them, as an HTTP 500 carrying the display text.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[cfg(feature = "web")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote sheet answered with status {0}")]
    RemoteStatus(u16),

    #[error("No sheet source configured")]
    NoSource,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "web")]
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Chart error: {0}")]
    Chart(String),

    #[cfg(feature = "web")]
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[cfg(feature = "web")]
    #[error("Template syntax error: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

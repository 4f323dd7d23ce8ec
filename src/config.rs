use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::sheet::SheetSource;
use crate::trend::DEFAULT_TREND_MONTHS;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which read mode the dashboard uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SheetMode {
    /// One sheet's CSV export
    Csv,
    /// Every sheet, merged, from the scripted API
    All,
}

/// Command-line / environment options shared by the binaries
#[derive(Parser, Debug, Clone)]
#[command(about = "Expense dashboard over a spreadsheet backend")]
pub struct Args {
    /// Address the web server listens on
    #[arg(long, env = "DASHBOARD_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,

    #[arg(long, env = "SHEET_MODE", value_enum, default_value_t = SheetMode::Csv)]
    pub sheet_mode: SheetMode,

    /// CSV export URL of the expense sheet
    #[arg(long, env = "SHEET_CSV_URL")]
    pub sheet_csv_url: Option<String>,

    /// Scripted endpoint: new rows are POSTed here, `?sheet=all` reads everything
    #[arg(long, env = "SHEET_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "DASHBOARD_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Where uploaded receipts are stored (defaults to <static-dir>/receipts)
    #[arg(long, env = "DASHBOARD_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Server-local file the CSV download is written to (defaults to <static-dir>/export.csv)
    #[arg(long, env = "DASHBOARD_EXPORT_PATH")]
    pub export_path: Option<PathBuf>,

    #[arg(long, default_value_t = 15)]
    pub read_timeout_secs: u64,

    #[arg(long, default_value_t = 8)]
    pub write_timeout_secs: u64,

    /// Number of months shown in the trend
    #[arg(long, default_value_t = DEFAULT_TREND_MONTHS)]
    pub trend_months: usize,
}

/// Process-wide settings handed to the service at startup
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub bind: String,
    pub sheet_mode: SheetMode,
    pub sheet_csv_url: Option<String>,
    pub api_url: Option<String>,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub export_path: PathBuf,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub trend_months: usize,
    pub max_upload_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let static_dir = PathBuf::from("static");
        Self {
            bind: "127.0.0.1:5000".to_string(),
            sheet_mode: SheetMode::Csv,
            sheet_csv_url: None,
            api_url: None,
            upload_dir: static_dir.join("receipts"),
            export_path: static_dir.join("export.csv"),
            static_dir,
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(8),
            trend_months: DEFAULT_TREND_MONTHS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl From<Args> for DashboardConfig {
    fn from(args: Args) -> Self {
        let upload_dir = args
            .upload_dir
            .unwrap_or_else(|| args.static_dir.join("receipts"));
        let export_path = args
            .export_path
            .unwrap_or_else(|| args.static_dir.join("export.csv"));

        Self {
            bind: args.bind,
            sheet_mode: args.sheet_mode,
            sheet_csv_url: args.sheet_csv_url,
            api_url: args.api_url,
            static_dir: args.static_dir,
            upload_dir,
            export_path,
            read_timeout: Duration::from_secs(args.read_timeout_secs),
            write_timeout: Duration::from_secs(args.write_timeout_secs),
            trend_months: args.trend_months,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl DashboardConfig {
    /// The read source for the selected mode, if its URL is configured
    pub fn sheet_source(&self) -> Option<SheetSource> {
        match self.sheet_mode {
            SheetMode::Csv => self
                .sheet_csv_url
                .clone()
                .map(|url| SheetSource::Csv { url }),
            SheetMode::All => self
                .api_url
                .clone()
                .map(|url| SheetSource::AllSheets { url }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_under_the_static_dir() {
        let args = Args::parse_from(["dashboard", "--static-dir", "public"]);
        let config = DashboardConfig::from(args);
        assert_eq!(config.upload_dir, PathBuf::from("public").join("receipts"));
        assert_eq!(config.export_path, PathBuf::from("public").join("export.csv"));
        assert_eq!(config.write_timeout, Duration::from_secs(8));
        assert_eq!(config.trend_months, 6);
    }

    #[test]
    fn sheet_source_follows_the_mode() {
        let mut config = DashboardConfig {
            sheet_csv_url: Some("http://sheet/export".into()),
            api_url: Some("http://script/exec".into()),
            ..DashboardConfig::default()
        };
        assert_eq!(
            config.sheet_source(),
            Some(SheetSource::Csv {
                url: "http://sheet/export".into()
            })
        );

        config.sheet_mode = SheetMode::All;
        assert_eq!(
            config.sheet_source(),
            Some(SheetSource::AllSheets {
                url: "http://script/exec".into()
            })
        );

        config.api_url = None;
        assert_eq!(config.sheet_source(), None);
    }

    #[test]
    fn mode_flag_parses() {
        let args = Args::parse_from(["dashboard", "--sheet-mode", "all"]);
        assert_eq!(args.sheet_mode, SheetMode::All);
    }
}

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.\-]").unwrap();
}

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduce an uploaded file name to something safe to store on disk
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing dots/underscores are stripped. The result may be empty.
///
/// # Examples
/// ```
/// use expense_dashboard::receipts::secure_filename;
///
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// assert_eq!(secure_filename("My receipt (1).pdf"), "My_receipt_1.pdf");
/// ```
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();

    let stem = trimmed.split('.').next().unwrap_or("").to_uppercase();
    if !trimmed.is_empty() && WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        return format!("_{}", trimmed);
    }
    trimmed
}

/// Stored name for an upload: UTC timestamp prefix, then the sanitized name
pub fn receipt_file_name(now: DateTime<Utc>, original: &str) -> String {
    secure_filename(&format!("{}_{}", now.format("%Y%m%d%H%M%S"), original))
}

/// Write an uploaded receipt into `dir`, creating it if needed
///
/// Returns the path of the stored file.
pub fn save_receipt(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// URL under which a stored receipt is served
///
/// Files inside the static directory map onto `/static/...`; anything else
/// falls back to the path itself with forward slashes.
pub fn receipt_url(static_dir: &Path, stored: &Path) -> String {
    match stored.strip_prefix(static_dir) {
        Ok(relative) => format!(
            "/static/{}",
            relative.to_string_lossy().replace('\\', "/")
        ),
        Err(_) => format!(
            "/{}",
            stored
                .to_string_lossy()
                .replace('\\', "/")
                .trim_start_matches('/')
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitizes_like_a_form_upload_should() {
        assert_eq!(secure_filename("invoice.pdf"), "invoice.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\scan 01.png"), "C_Users_me_scan_01.png");
        assert_eq!(secure_filename("  .hidden  "), "hidden");
        assert_eq!(secure_filename("reçu été.jpg"), "reu_t.jpg");
        assert_eq!(secure_filename("???"), "");
    }

    #[test]
    fn device_names_get_prefixed() {
        assert_eq!(secure_filename("con.txt"), "_con.txt");
        assert_eq!(secure_filename("console.txt"), "console.txt");
    }

    #[test]
    fn stored_names_carry_a_utc_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            receipt_file_name(now, "Adobe bill.pdf"),
            "20240309140507_Adobe_bill.pdf"
        );
    }

    #[test]
    fn saves_and_maps_to_a_static_url() {
        let root = tempfile::tempdir().unwrap();
        let static_dir = root.path().join("static");
        let upload_dir = static_dir.join("receipts");

        let stored = save_receipt(&upload_dir, "a.pdf", b"%PDF").unwrap();
        assert_eq!(fs::read(&stored).unwrap(), b"%PDF");
        assert_eq!(receipt_url(&static_dir, &stored), "/static/receipts/a.pdf");
    }

    #[test]
    fn urls_outside_the_static_dir() {
        assert_eq!(
            receipt_url(Path::new("static"), Path::new("uploads/b.png")),
            "/uploads/b.png"
        );
    }
}

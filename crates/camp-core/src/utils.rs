//! Utility helpers — path resolution, timestamps, filename sanitising.

use std::path::PathBuf;

/// Get the Camp data directory (e.g. `~/.camp/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".camp")
}

/// Compact UTC timestamp for filenames, e.g. `20250301T101500Z`.
pub fn compact_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs_next::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(rest)
    } else if path == "~" {
        dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(path)
    }
}

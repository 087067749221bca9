//! Redirect table loading from command-line pairs and redirect files.
//!
//! # Data Flow
//! ```text
//! redirect files (from, to, user, date rows)   --from-to pairs
//!     → read_file per file                     → load_from_to
//!     → merged, explicit pairs overwrite file rows
//!     → clean (reserved keys, header-unsafe destinations)
//!     → RedirectTable
//! ```
//!
//! # Design Decisions
//! - Per-row and per-file problems are logged and skipped, never fatal
//! - Destinations must survive the transport's header encoding; entries that
//!   cannot are dropped here rather than failing at response time

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::http::headers::is_header_safe;
use crate::redirects::entry::RedirectEntry;
use crate::redirects::table::RedirectTable;

/// Lines whose first field starts with this are ignored.
pub const COMMENT_MARKER: &str = "#";

/// Keys that may never be redirected.
pub const RESERVED_PATHS: &[&str] = &["/favicon.ico"];

/// Default field delimiter for redirect files.
pub const DEFAULT_FIELD_DELIMITER: char = '\t';

/// Why a file or row was skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed row: {0}")]
    Row(#[from] csv::Error),

    #[error("expected 4 fields (from, to, user, date), found {0}")]
    FieldCount(usize),

    #[error("bad date {0:?}")]
    Date(String),
}

/// Everything a (re)load reads from.
#[derive(Debug, Clone, Default)]
pub struct RedirectSources {
    /// Explicit `(from, to)` pairs; these override file rows with the same key.
    pub from_to: Vec<(String, String)>,
    /// Delimited redirect files, read in order.
    pub files: Vec<PathBuf>,
    /// Single-byte field delimiter for `files`.
    pub delimiter: u8,
}

impl RedirectSources {
    pub fn new(from_to: Vec<(String, String)>, files: Vec<PathBuf>, delimiter: u8) -> Self {
        Self {
            from_to,
            files,
            delimiter,
        }
    }

    /// Build a fresh, cleaned table from all sources.
    pub fn load(&self) -> RedirectTable {
        let mut table = load_files(&self.files, self.delimiter);
        table.extend(load_from_to(&self.from_to, &current_user(), now()));
        let table = clean(table);
        if table.is_empty() {
            tracing::warn!("There are no redirect entries");
        }
        tracing::info!(entries = table.len(), "Redirect table loaded");
        table
    }
}

/// Entries for explicit `(from, to)` pairs, all recorded with `user` and `at`.
pub fn load_from_to(pairs: &[(String, String)], user: &str, at: NaiveDateTime) -> RedirectTable {
    pairs
        .iter()
        .map(|(from, to)| RedirectEntry::new(from.as_str(), to.as_str(), user, at))
        .collect()
}

/// Entries from every readable file; later files overwrite earlier keys.
pub fn load_files(files: &[PathBuf], delimiter: u8) -> RedirectTable {
    let mut table = RedirectTable::new();
    for path in files {
        match read_file(path, delimiter) {
            Ok(entries) => {
                for entry in entries {
                    table.insert(entry);
                }
            }
            Err(e) => tracing::error!(error = %e, "Skipping redirect file"),
        }
    }
    table
}

/// Read one redirect file, skipping blank, comment and malformed rows.
pub fn read_file(path: &Path, delimiter: u8) -> Result<Vec<RedirectEntry>, LoadError> {
    tracing::info!(file = %path.display(), "Processing redirect file");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::File {
            path: path.to_path_buf(),
            source,
        })?;

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let line = record
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        let parsed = record
            .map_err(LoadError::from)
            .and_then(|r| parse_row(&r));
        match parsed {
            Ok(Some(entry)) => {
                tracing::debug!(
                    file = %path.display(),
                    line,
                    from = %entry.source_path(),
                    to = %entry.destination(),
                    "Redirect row"
                );
                entries.push(entry);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(file = %path.display(), line, error = %e, "Skipping redirect row")
            }
        }
    }
    Ok(entries)
}

/// Parse one delimited row; `Ok(None)` for blank and comment rows.
pub fn parse_row(record: &csv::StringRecord) -> Result<Option<RedirectEntry>, LoadError> {
    if record.iter().all(str::is_empty) {
        return Ok(None);
    }
    if record.get(0).is_some_and(|f| f.starts_with(COMMENT_MARKER)) {
        return Ok(None);
    }
    if record.len() < 4 {
        return Err(LoadError::FieldCount(record.len()));
    }
    let date = &record[3];
    let created_at = parse_created_at(date).ok_or_else(|| LoadError::Date(date.to_string()))?;
    Ok(Some(RedirectEntry::new(
        &record[0], &record[1], &record[2], created_at,
    )))
}

/// Parse an ISO-8601 style `YYYY-MM-DD[( |T)HH:MM:SS[.fff]]` date.
pub fn parse_created_at(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Drop entries that can never be served.
pub fn clean(mut table: RedirectTable) -> RedirectTable {
    for reserved in RESERVED_PATHS {
        if table.remove(reserved).is_some() {
            tracing::warn!(from = %reserved, "Removing reserved redirect path");
        }
    }

    table.retain(|entry| {
        let safe = is_header_safe(entry.destination());
        if !safe {
            tracing::warn!(
                from = %entry.source_path(),
                to = %entry.destination(),
                "Removing redirect: destination cannot be encoded as a Location header"
            );
        }
        safe
    });

    table
}

/// Environment variables consulted for the current user, in order.
const USER_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// The OS user recorded for command-line entries.
pub fn current_user() -> String {
    user_from(|name| std::env::var(name).ok())
}

fn user_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    USER_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Local time, truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn from_to_pairs_record_user_and_time() {
        let at = parse_created_at("2020-01-02 03:04:05").unwrap();
        let table = load_from_to(&[("a".into(), "b".into())], "bob", at);
        let entry = table.get("a").unwrap();
        assert_eq!(entry.destination(), "b");
        assert_eq!(entry.created_by(), "bob");
        assert_eq!(entry.created_at(), at);
    }

    #[test]
    fn reads_rows_and_skips_comments_and_blanks() {
        let file = file_with(concat!(
            "# from\tto\tuser\tdate\n",
            "/hr\thttp://hr.local/login\tbob\t2019-09-07 12:00:00\n",
            "\n",
            "/b\thttp://bt.local/view?id=${query}\talice\t2019-09-07T12:00:00\textra\n",
        ));
        let entries = read_file(file.path(), b'\t').unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source_path(), "/hr");
        assert_eq!(entries[0].created_by(), "bob");
        assert_eq!(entries[1].destination(), "http://bt.local/view?id=${query}");
        assert_eq!(entries[1].created_at_display(), "2019-09-07T12:00:00");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let file = file_with(concat!(
            "/short\thttp://x\n",
            "/baddate\thttp://x\tbob\tyesterday\n",
            "/ok\thttp://ok\tbob\t2019-09-07\n",
        ));
        let entries = read_file(file.path(), b'\t').unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_path(), "/ok");
    }

    #[test]
    fn custom_delimiter() {
        let file = file_with("/c,http://c.local,carol,2021-05-06 07:08:09\n");
        let entries = read_file(file.path(), b',').unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].destination(), "http://c.local");
    }

    #[test]
    fn missing_file_is_an_error_but_load_continues() {
        assert!(matches!(
            read_file(Path::new("/definitely/not/here.csv"), b'\t'),
            Err(LoadError::File { .. })
        ));

        let good = file_with("/g\thttp://g\tu\t2019-01-01 00:00:00\n");
        let table = load_files(
            &[PathBuf::from("/definitely/not/here.csv"), good.path().to_path_buf()],
            b'\t',
        );
        assert!(table.contains_key("/g"));
    }

    #[test]
    fn explicit_pair_overrides_file_entry() {
        let file = file_with("/x\thttp://from-file\tu\t2019-01-01 00:00:00\n");
        let sources = RedirectSources::new(
            vec![("/x".into(), "http://explicit".into())],
            vec![file.path().to_path_buf()],
            b'\t',
        );
        let table = sources.load();
        assert_eq!(table.get("/x").unwrap().destination(), "http://explicit");
    }

    #[test]
    fn clean_drops_reserved_and_unencodable() {
        let at = NaiveDateTime::default();
        let table: RedirectTable = [
            RedirectEntry::new("a", "b", "u", at),
            RedirectEntry::new(RESERVED_PATHS[0], "b", "u", at),
            RedirectEntry::new("c", "\u{6df7}\u{6c8c}", "u", at),
            RedirectEntry::new("\u{6df7}\u{6c8c}", "b", "u", at),
        ]
        .into_iter()
        .collect();

        let cleaned = clean(table);
        let keys: Vec<&str> = cleaned.snapshot().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "\u{6df7}\u{6c8c}"]);
    }

    #[test]
    fn date_formats() {
        assert!(parse_created_at("2019-07-01 01:20:33").is_some());
        assert!(parse_created_at("2019-07-01T01:20:33").is_some());
        assert!(parse_created_at("2019-07-01T01:20:33.250").is_some());
        assert!(parse_created_at("2019-07-01").is_some());
        assert!(parse_created_at("").is_none());
        assert!(parse_created_at("07/01/2019").is_none());
    }

    #[test]
    fn user_lookup_order() {
        let env = |vars: &'static [(&'static str, &'static str)]| {
            move |name: &str| {
                vars.iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.to_string())
            }
        };
        assert_eq!(user_from(env(&[("USER", "u"), ("LOGNAME", "l")])), "l");
        assert_eq!(user_from(env(&[("LOGNAME", ""), ("USER", "u")])), "u");
        assert_eq!(user_from(env(&[("USERNAME", "w")])), "w");
        assert_eq!(user_from(env(&[])), "unknown");
    }
}

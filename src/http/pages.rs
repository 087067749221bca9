//! HTML documents for the administrative and error responses.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::NaiveDateTime;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::redirects::table::RedirectTable;
use crate::routing::cache::CacheStats;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest request path echoed in a not-found page title.
const TITLE_PATH_MAX: usize = 64;

/// Escape text for HTML; newlines become `<br />` and runs of spaces survive.
pub fn escape(text: &str) -> String {
    encode_text(text)
        .replace('\n', "<br />\n")
        .replace("  ", "&nbsp; ")
}

fn link(href: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        encode_double_quoted_attribute(href),
        escape(href)
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n  <meta charset=\"utf-8\"/>\n  <title>{}</title>\n  </head>\n  <body>\n{}\n  </body>\n</html>",
        escape(title),
        body
    )
}

pub fn reload_page(accepted_at: NaiveDateTime) -> String {
    document(
        &format!("{} reload", PROGRAM_NAME),
        &format!(
            "    Reload request accepted at {}.",
            escape(&accepted_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
        ),
    )
}

pub fn not_found_page(path: &str) -> String {
    let short: String = path.chars().take(TITLE_PATH_MAX).collect();
    document(
        &format!("Not Found - '{}'", short),
        &format!(
            "    Redirect Path not found: <code>{}</code>",
            escape(path)
        ),
    )
}

pub fn not_implemented_page(method: &str) -> String {
    document(
        "Not Implemented",
        &format!(
            "    Method <code>{}</code> is not supported; use GET or HEAD.",
            escape(method)
        ),
    )
}

/// Everything shown on the status page.
#[derive(Debug)]
pub struct StatusReport<'a> {
    pub pid: u32,
    pub listen: Option<SocketAddr>,
    pub hostname: &'a str,
    pub started_at: NaiveDateTime,
    pub uptime: Duration,
    pub redirect_code: StatusCode,
    pub counter: BTreeMap<String, u64>,
    pub reloaded_at: NaiveDateTime,
    pub table: &'a RedirectTable,
    pub cache: CacheStats,
    pub files: &'a [PathBuf],
    pub reload_signal: Option<&'a str>,
    pub reload_path: Option<&'a str>,
}

pub fn status_page(report: &StatusReport<'_>) -> String {
    let listen = report
        .listen
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    let overall = format!(
        "Program {} version {}.\nProcess ID {} listening on {} on host {}\nProcess start datetime {} (up time {})\nSuccessful Redirect Status Code is {}",
        PROGRAM_NAME,
        PROGRAM_VERSION,
        report.pid,
        listen,
        report.hostname,
        report.started_at.format("%Y-%m-%d %H:%M:%S"),
        format_uptime(report.uptime),
        report.redirect_code,
    );

    let counter = serde_json::to_string_pretty(&report.counter).unwrap_or_default();
    let files: Vec<String> = report
        .files
        .iter()
        .map(|f| f.display().to_string())
        .collect();
    let files = serde_json::to_string_pretty(&files).unwrap_or_default();

    let cache = &report.cache;
    let cache_line = format!(
        "enabled {}, {} of {} entries, {} hits, {} misses",
        cache.enabled, cache.len, cache.capacity, cache.hits, cache.misses
    );

    let mut triggers = Vec::new();
    if let Some(signal) = report.reload_signal {
        triggers.push(format!("process signal {}", signal));
    }
    if let Some(path) = report.reload_path {
        triggers.push(format!("GET {}", path));
    }
    let reload_info = if triggers.is_empty() {
        String::new()
    } else {
        format!(" ({})", triggers.join(" or "))
    };

    let body = format!(
        r#"    <div>
        <h3>Process Information:</h3>
        <pre>
{overall}
        </pre>
    </div>
    <div>
        <h3>Redirects Counter:</h3>
        Counting of successful redirect responses:
        <pre>
{counter}
        </pre>
        <h3>Currently Loaded Redirects:</h3>
        Last Reload Time {reloaded}
        <pre>
{redirects}
        </pre>
        <h3>Lookup Cache:</h3>
        <pre>
{cache}
        </pre>
    </div>
    <div>
        <h3>Redirect Files Searched During a Reload{reload_info}:</h3>
        <pre>
{files}
        </pre>
    </div>"#,
        overall = escape(&overall),
        counter = escape(&counter),
        reloaded = escape(&report.reloaded_at.format("%Y-%m-%dT%H:%M:%S").to_string()),
        redirects = redirects_html(report.table),
        cache = escape(&cache_line),
        reload_info = escape(&reload_info),
        files = escape(&files),
    );

    document(&format!("{} status", PROGRAM_NAME), &body)
}

fn redirects_html(table: &RedirectTable) -> String {
    let mut out = escape("{\n");
    for (key, entry) in table.snapshot() {
        let _ = write!(
            out,
            "{}{}{}{}{}{}",
            escape("  \""),
            link(key),
            escape("\": [\n    \""),
            link(entry.destination()),
            escape("\",\n"),
            escape(&format!(
                "    \"{}\",\n    \"{}\"\n  ]\n",
                entry.created_by(),
                entry.created_at_display()
            )),
        );
    }
    out.push_str(&escape("}"));
    out
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, rest) = (secs / 86_400, secs % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

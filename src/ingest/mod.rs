// src/ingest/mod.rs
pub mod providers;
pub mod types;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration for provider series.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_headlines_total",
            "Headlines parsed out of provider responses."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch+parse time in milliseconds.");
    });
}

/// Normalize headline text: decode HTML entities, collapse whitespace, trim.
/// This is the display/matching form; dedup identity is derived from it
/// separately (see `crate::dedup::dedup_key`).
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (NewsAPI titles occasionally carry entities)
    let out = html_escape::decode_html_entities(s).to_string();

    // 2) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    let out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

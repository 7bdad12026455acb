//! Strict parser for the three labeled lines a classifier reply must carry
//! (`Direction:` / `Confidence:` / `Explanation:`). Anything outside the
//! documented shape maps to `Malformed`; the adapter turns that into the
//! default neutral verdict instead of propagating a parse error.

use super::{Direction, Verdict, DEFAULT_EXPLANATION};

/// Tagged parse result. `Malformed` carries the reason for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(Verdict),
    Malformed(String),
}

/// Scan lines case-insensitively by label prefix; the first matching line per
/// field wins. Confidence is required: an integer in 0..=100, one trailing
/// `%` stripped. A direction line with an unrecognized token is malformed; a
/// missing direction line defaults to neutral. A missing explanation defaults
/// to `"No explanation."`.
pub fn parse_verdict(raw: &str) -> ParseOutcome {
    let mut direction: Option<Direction> = None;
    let mut confidence: Option<u8> = None;
    let mut explanation: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        let lower = line.to_ascii_lowercase();

        if lower.starts_with("direction") {
            if direction.is_some() {
                continue;
            }
            // A label without a separator is prose, not a field line.
            let Some((_, value)) = line.split_once(':') else {
                continue;
            };
            match value.trim().to_ascii_lowercase().as_str() {
                "up" => direction = Some(Direction::Up),
                "down" => direction = Some(Direction::Down),
                "neutral" => direction = Some(Direction::Neutral),
                other => {
                    return ParseOutcome::Malformed(format!("unrecognized direction `{other}`"))
                }
            }
        } else if lower.starts_with("confidence") {
            if confidence.is_some() {
                continue;
            }
            let Some((_, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let digits = value.strip_suffix('%').unwrap_or(value).trim();
            match digits.parse::<i64>() {
                Ok(n) if (0..=100).contains(&n) => confidence = Some(n as u8),
                Ok(n) => return ParseOutcome::Malformed(format!("confidence {n} out of range")),
                Err(_) => {
                    return ParseOutcome::Malformed(format!("unparseable confidence `{value}`"))
                }
            }
        } else if lower.starts_with("explanation") {
            if explanation.is_some() {
                continue;
            }
            if let Some((_, value)) = line.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    explanation = Some(value.to_string());
                }
            }
        }
    }

    let Some(confidence) = confidence else {
        return ParseOutcome::Malformed("missing confidence line".to_string());
    };

    ParseOutcome::Parsed(Verdict {
        direction: direction.unwrap_or(Direction::Neutral),
        confidence,
        explanation: explanation.unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
    })
}

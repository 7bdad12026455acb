//! Notification boundary: alert formatting + the delivery trait.

pub mod telegram;

use crate::classify::{Direction, Verdict};
use crate::ingest::types::Headline;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. `Ok` means the transport confirmed delivery;
    /// callers treat `Err` as "not delivered". No retry at this boundary.
    async fn send(&self, text: &str) -> anyhow::Result<()>;
    fn name(&self) -> &'static str;
}

fn direction_arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "\u{1F4C8}",      // 📈
        Direction::Down => "\u{1F4C9}",    // 📉
        Direction::Neutral => "\u{2796}",  // ➖
    }
}

/// Render the alert for a dispatched headline.
pub fn format_alert(headline: &Headline, verdict: &Verdict) -> String {
    format!(
        "\u{1F4F0} {}\n\u{1F552} Published: {}\n\u{1F916} AI-based analysis\nDirection: {} {}\nConfidence: {}%\nExplanation: {}",
        headline.text,
        headline.published_display(),
        verdict.direction.as_str().to_uppercase(),
        direction_arrow(verdict.direction),
        verdict.confidence,
        verdict.explanation
    )
}

// src/ingest/types.rs
use anyhow::Result;
use time::OffsetDateTime;

/// A single news headline as delivered by a source provider.
/// `text` is already normalized (entities decoded, whitespace collapsed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub text: String,
    /// Publish time in UTC; `None` when the source gave no parseable timestamp.
    pub published_at: Option<OffsetDateTime>,
}

impl Headline {
    /// Display form of the publish time: `YYYY-MM-DD HH:MM UTC`,
    /// or the literal `Unknown time` when the source timestamp was unusable.
    pub fn published_display(&self) -> String {
        match self.published_at {
            Some(t) => format!(
                "{:04}-{:02}-{:02} {:02}:{:02} UTC",
                t.year(),
                u8::from(t.month()),
                t.day(),
                t.hour(),
                t.minute()
            ),
            None => "Unknown time".to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch one bounded page of recent headlines, newest-first source order.
    async fn fetch_latest(&self) -> Result<Vec<Headline>>;
    fn name(&self) -> &'static str;
}

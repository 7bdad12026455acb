//! Market-impact classification: structured verdicts + the provider boundary.
//! Providers never fail past this boundary; every failure mode collapses to
//! the neutral fallback verdict.

pub mod openai;
pub mod parser;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE: u8 = 50;
pub const DEFAULT_EXPLANATION: &str = "No explanation.";

/// Expected market direction for a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Neutral => "neutral",
        }
    }
}

/// The classifier's structured judgment of one headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub direction: Direction,
    /// Percent, 0..=100.
    pub confidence: u8,
    pub explanation: String,
}

impl Verdict {
    pub fn new(direction: Direction, confidence: u8, explanation: impl Into<String>) -> Self {
        Self {
            direction,
            confidence,
            explanation: explanation.into(),
        }
    }

    /// The degraded verdict every classifier failure collapses to.
    /// `reason` describes the failure for the reader of the alert/log.
    pub fn neutral_fallback(reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Neutral,
            confidence: DEFAULT_CONFIDENCE,
            explanation: reason.into(),
        }
    }

    pub fn is_directional(&self) -> bool {
        self.direction != Direction::Neutral
    }
}

/// Classification boundary. Implementations must not fail: transport or
/// parse problems degrade to `Verdict::neutral_fallback` internally.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, headline: &str) -> Verdict;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Fixed-verdict classifier for tests and local runs.
#[derive(Clone)]
pub struct MockClassifier {
    pub fixed: Verdict,
}

#[async_trait::async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _headline: &str) -> Verdict {
        self.fixed.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

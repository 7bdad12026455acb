// src/gate.rs
//! Keyword relevance pre-filter + confidence gating for classified headlines.
//! Keyword matchers are regex-escaped literals compiled once at construction:
//! case-insensitive substring match, no word boundaries.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::classify::{Direction, Verdict};

// --- env defaults & names ---
pub const DEFAULT_KEYWORDS_CONFIG_PATH: &str = "config/keywords.toml";
pub const ENV_KEYWORDS_CONFIG_PATH: &str = "KEYWORDS_CONFIG_PATH";

pub const DEFAULT_MIN_CONFIDENCE: u8 = 65;
pub const DEFAULT_FORCE_REVIEW_MIN_CONFIDENCE: u8 = 60;

/// Compiled-in fallback, kept in sync with the shipped config file.
const BUILTIN_KEYWORDS_TOML: &str = include_str!("../config/keywords.toml");

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordGateConfig {
    #[serde(default)]
    pub gate: GateSection,
    pub keywords: KeywordSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateSection {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,
    #[serde(default = "default_force_review_min_confidence")]
    pub force_review_min_confidence: u8,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            force_review_min_confidence: DEFAULT_FORCE_REVIEW_MIN_CONFIDENCE,
        }
    }
}

fn default_min_confidence() -> u8 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_force_review_min_confidence() -> u8 {
    DEFAULT_FORCE_REVIEW_MIN_CONFIDENCE
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSection {
    pub relevance: Vec<String>,
    #[serde(default)]
    pub force_review: Vec<String>,
}

/* ----------------------------
Compiled gate
---------------------------- */

#[derive(Debug)]
struct CompiledKeyword {
    term: String,
    re: Regex,
}

fn compile_set(terms: &[String], label: &str) -> Result<Vec<CompiledKeyword>> {
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| {
            let term = t.trim().to_string();
            let re = Regex::new(&format!("(?i){}", regex::escape(&term)))
                .map_err(|e| anyhow!("{label} keyword `{term}` regex error: {e}"))?;
            Ok(CompiledKeyword { term, re })
        })
        .collect()
}

/// Outcome of gating one classified headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Dispatch(DispatchReason),
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchReason {
    /// Directional verdict cleared the main confidence bar.
    Confident,
    /// Force-review keyword lowered the bar for a directional verdict.
    ForceReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NeutralDirection,
    LowConfidence,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NeutralDirection => "neutral direction",
            SkipReason::LowConfidence => "low confidence",
        }
    }
}

#[derive(Debug)]
pub struct KeywordGate {
    min_confidence: u8,
    force_review_min_confidence: u8,
    relevance: Vec<CompiledKeyword>,
    force_review: Vec<CompiledKeyword>,
}

impl KeywordGate {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: KeywordGateConfig = toml::from_str(toml_str)?;
        if cfg.keywords.relevance.iter().all(|t| t.trim().is_empty()) {
            return Err(anyhow!("keyword config has no relevance keywords"));
        }
        Ok(Self {
            min_confidence: cfg.gate.min_confidence,
            force_review_min_confidence: cfg.gate.force_review_min_confidence,
            relevance: compile_set(&cfg.keywords.relevance, "relevance")?,
            force_review: compile_set(&cfg.keywords.force_review, "force-review")?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("reading keyword config at {}: {e}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// The compiled-in defaults (the original keyword lists, 65/60 bars).
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_KEYWORDS_TOML).expect("built-in keyword config")
    }

    /// Resolution order: $KEYWORDS_CONFIG_PATH, then config/keywords.toml,
    /// then the compiled-in defaults. An invalid file falls back too.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_KEYWORDS_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_KEYWORDS_CONFIG_PATH));

        if path.exists() {
            match Self::from_path(&path) {
                Ok(gate) => {
                    info!(path = %path.display(), "loaded keyword config");
                    return gate;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        path = %path.display(),
                        "keyword config invalid; using built-in defaults"
                    );
                }
            }
        }
        Self::builtin()
    }

    /// Relevance pre-filter: classification is only worth a call when at
    /// least one relevance keyword appears in the text.
    pub fn is_relevant(&self, text: &str) -> bool {
        self.relevance.iter().any(|k| k.re.is_match(text))
    }

    /// Relevance keywords present in `text`, for diagnostics.
    pub fn matched_relevance(&self, text: &str) -> Vec<String> {
        self.relevance
            .iter()
            .filter(|k| k.re.is_match(text))
            .map(|k| k.term.clone())
            .collect()
    }

    fn has_force_review(&self, text: &str) -> bool {
        self.force_review.iter().any(|k| k.re.is_match(text))
    }

    /// Two-tier policy, first match wins:
    /// 1. directional + confidence >= min_confidence -> dispatch
    /// 2. force-review keyword + directional + confidence >= lowered bar -> dispatch
    /// 3. skip
    pub fn decide(&self, text: &str, verdict: &Verdict) -> GateDecision {
        if verdict.is_directional() && verdict.confidence >= self.min_confidence {
            return GateDecision::Dispatch(DispatchReason::Confident);
        }
        if verdict.is_directional()
            && verdict.confidence >= self.force_review_min_confidence
            && self.has_force_review(text)
        {
            return GateDecision::Dispatch(DispatchReason::ForceReview);
        }
        if verdict.direction == Direction::Neutral {
            GateDecision::Skip(SkipReason::NeutralDirection)
        } else {
            GateDecision::Skip(SkipReason::LowConfidence)
        }
    }
}

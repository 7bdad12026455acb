// tests/pipeline_scenarios.rs
// Full cycles over mock adapters: dispatch, dedup, gating, and failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crypto_news_alerter::classify::{Classifier, Direction, Verdict};
use crypto_news_alerter::dedup::{dedup_key, DedupStore, MemoryDedupStore};
use crypto_news_alerter::gate::KeywordGate;
use crypto_news_alerter::ingest::types::{Headline, HeadlineSource};
use crypto_news_alerter::notify::Notifier;
use crypto_news_alerter::pipeline::run_cycle;

fn headline(text: &str) -> Headline {
    Headline {
        text: text.to_string(),
        published_at: None,
    }
}

struct FixedSource {
    headlines: Vec<Headline>,
}

#[async_trait]
impl HeadlineSource for FixedSource {
    async fn fetch_latest(&self) -> Result<Vec<Headline>> {
        Ok(self.headlines.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

struct FailingSource;

#[async_trait]
impl HeadlineSource for FailingSource {
    async fn fetch_latest(&self) -> Result<Vec<Headline>> {
        Err(anyhow!("newsapi status `error` (code: apiKeyInvalid, message: -)"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Scripted verdicts keyed by dedup key; counts classify calls.
struct ScriptedClassifier {
    verdicts: HashMap<String, Verdict>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(entries: &[(&str, Verdict)]) -> Self {
        let verdicts = entries
            .iter()
            .map(|(t, v)| (dedup_key(t), v.clone()))
            .collect();
        Self {
            verdicts,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, headline: &str) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdicts
            .get(&dedup_key(headline))
            .cloned()
            .unwrap_or_else(|| Verdict::neutral_fallback("unscripted headline"))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records delivered messages; optionally rejects every send.
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("delivery rejected"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test]
async fn confident_dispatch_sends_and_persists() {
    let text = "SEC sues Binance over ETF rules";
    let source = FixedSource {
        headlines: vec![headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Down, 80, "Regulatory hit."))]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let stats = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();

    assert_eq!(stats.classified, 1);
    assert_eq!(stats.dispatched, 1);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains(text));
    assert!(store.contains(&dedup_key(text)));
}

#[tokio::test]
async fn irrelevant_headline_never_reaches_the_classifier() {
    let source = FixedSource {
        headlines: vec![headline("Local bakery wins award")],
    };
    let classifier = ScriptedClassifier::new(&[]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let stats = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();

    assert_eq!(stats.skipped_irrelevant, 1);
    assert_eq!(stats.classified, 0);
    assert_eq!(classifier.calls(), 0);
    assert!(notifier.sent().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn neutral_verdict_blocks_both_dispatch_paths() {
    // Relevant (and a force-review topic), but the verdict is neutral.
    let text = "Trump announces new tariff plan";
    let source = FixedSource {
        headlines: vec![headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Neutral, 70, "Unclear."))]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let stats = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(stats.dispatched, 0);
    assert!(notifier.sent().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn force_review_keyword_lowers_the_bar() {
    let text = "Musk comments rattle crypto markets";
    let source = FixedSource {
        headlines: vec![headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Down, 62, "Sentiment shock."))]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let stats = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();

    assert_eq!(stats.dispatched, 1);
    assert!(store.contains(&dedup_key(text)));
}

#[tokio::test]
async fn duplicate_within_a_cycle_is_evaluated_once() {
    let text = "Bitcoin crashes after hacked exchange report";
    let source = FixedSource {
        headlines: vec![headline(text), headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Down, 90, "Exchange hack."))]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let stats = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(stats.skipped_evaluated, 1);
    assert_eq!(stats.dispatched, 1);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn replaying_a_cycle_dispatches_nothing_new() {
    let text = "SEC sues Binance over ETF rules";
    let source = FixedSource {
        headlines: vec![headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Down, 80, "Regulatory hit."))]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let first = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();
    assert_eq!(first.dispatched, 1);

    let second = run_cycle(&source, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap();
    assert_eq!(second.dispatched, 0);
    assert_eq!(second.skipped_sent, 1);
    // The second cycle never re-classified the already-sent headline.
    assert_eq!(classifier.calls(), 1);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn delivery_failure_leaves_the_key_retryable() {
    let text = "SEC sues Binance over ETF rules";
    let source = FixedSource {
        headlines: vec![headline(text)],
    };
    let classifier =
        ScriptedClassifier::new(&[(text, Verdict::new(Direction::Down, 80, "Regulatory hit."))]);
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let failing = RecordingNotifier::failing();
    let stats = run_cycle(&source, &classifier, &failing, &mut store, &gate)
        .await
        .unwrap();
    assert_eq!(stats.delivery_failures, 1);
    assert_eq!(stats.dispatched, 0);
    // Not marked as sent: a later cycle may retry it.
    assert!(!store.contains(&dedup_key(text)));

    let working = RecordingNotifier::new();
    let stats = run_cycle(&source, &classifier, &working, &mut store, &gate)
        .await
        .unwrap();
    assert_eq!(stats.dispatched, 1);
    assert!(store.contains(&dedup_key(text)));
}

#[tokio::test]
async fn fetch_failure_aborts_without_touching_state() {
    let classifier = ScriptedClassifier::new(&[]);
    let notifier = RecordingNotifier::new();
    let mut store = MemoryDedupStore::new();
    let gate = KeywordGate::builtin();

    let err = run_cycle(&FailingSource, &classifier, &notifier, &mut store, &gate)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("fetching headlines from failing"));
    assert_eq!(classifier.calls(), 0);
    assert!(notifier.sent().is_empty());
    assert!(store.is_empty());
}

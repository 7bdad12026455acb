//! Per-cycle orchestration: fetch -> dedup -> relevance -> classify -> gate
//! -> dispatch -> persist. All state is passed in explicitly; the evaluated
//! set lives and dies inside one cycle. A dispatched key is persisted only
//! after the notifier confirms delivery.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::dedup::{dedup_key, DedupStore, EvaluatedSet};
use crate::gate::{DispatchReason, GateDecision, KeywordGate};
use crate::ingest::types::HeadlineSource;
use crate::notify::{format_alert, Notifier};

/// One-time metrics registration (so series show up for any wired recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("cycle_runs_total", "Completed polling cycles.");
        describe_counter!(
            "cycle_aborts_total",
            "Cycles aborted on source fetch failure."
        );
        describe_counter!(
            "headlines_fetched_total",
            "Headlines returned by the source."
        );
        describe_counter!(
            "headlines_skipped_evaluated_total",
            "Skipped: already evaluated this cycle."
        );
        describe_counter!(
            "headlines_skipped_sent_total",
            "Skipped: already dispatched in a prior run."
        );
        describe_counter!(
            "headlines_skipped_irrelevant_total",
            "Skipped: no relevance keyword."
        );
        describe_counter!(
            "headlines_classified_total",
            "Headlines sent to the classifier."
        );
        describe_counter!("alerts_dispatched_total", "Alerts confirmed delivered.");
        describe_counter!(
            "alerts_delivery_failed_total",
            "Delivery attempts the notifier rejected."
        );
        describe_counter!(
            "sent_store_write_errors_total",
            "Failed appends to the sent store."
        );
        describe_gauge!("cycle_last_run_ts", "Unix ts when a cycle last completed.");
    });
}

/// Per-cycle counters, logged at cycle end and returned to the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub skipped_evaluated: usize,
    pub skipped_sent: usize,
    pub skipped_irrelevant: usize,
    pub classified: usize,
    pub dispatched: usize,
    pub delivery_failures: usize,
    pub persist_failures: usize,
}

/// Run one polling cycle. A fetch failure aborts the cycle before any state
/// is touched; every later failure degrades and the cycle continues.
pub async fn run_cycle(
    source: &dyn HeadlineSource,
    classifier: &dyn Classifier,
    notifier: &dyn Notifier,
    store: &mut dyn DedupStore,
    gate: &KeywordGate,
) -> Result<CycleStats> {
    ensure_metrics_described();

    let headlines = match source.fetch_latest().await {
        Ok(h) => h,
        Err(e) => {
            counter!("cycle_aborts_total").increment(1);
            return Err(e).with_context(|| format!("fetching headlines from {}", source.name()));
        }
    };
    counter!("headlines_fetched_total").increment(headlines.len() as u64);
    debug!(count = headlines.len(), source = source.name(), "fetched headlines");

    let mut stats = CycleStats {
        fetched: headlines.len(),
        ..Default::default()
    };
    let mut evaluated = EvaluatedSet::new();

    for headline in &headlines {
        let key = dedup_key(&headline.text);

        if evaluated.contains(&key) {
            debug!(title = %headline.text, "skipped: already evaluated this cycle");
            stats.skipped_evaluated += 1;
            counter!("headlines_skipped_evaluated_total").increment(1);
            continue;
        }
        if store.contains(&key) {
            debug!(title = %headline.text, "skipped: already sent in a prior run");
            stats.skipped_sent += 1;
            counter!("headlines_skipped_sent_total").increment(1);
            continue;
        }
        evaluated.insert(&key);

        if !gate.is_relevant(&headline.text) {
            debug!(title = %headline.text, "skipped: no relevance keyword");
            stats.skipped_irrelevant += 1;
            counter!("headlines_skipped_irrelevant_total").increment(1);
            continue;
        }

        let verdict = classifier.classify(&headline.text).await;
        stats.classified += 1;
        counter!("headlines_classified_total").increment(1);

        match gate.decide(&headline.text, &verdict) {
            GateDecision::Dispatch(reason) => {
                let message = format_alert(headline, &verdict);
                match notifier.send(&message).await {
                    Ok(()) => {
                        // Persist only after confirmed delivery.
                        if let Err(e) = store.add(&key) {
                            warn!(
                                error = %e,
                                title = %headline.text,
                                "alert sent but key not persisted; may repeat in a future run"
                            );
                            stats.persist_failures += 1;
                            counter!("sent_store_write_errors_total").increment(1);
                        }
                        stats.dispatched += 1;
                        counter!("alerts_dispatched_total").increment(1);
                        match reason {
                            DispatchReason::Confident => info!(
                                title = %headline.text,
                                direction = verdict.direction.as_str(),
                                confidence = verdict.confidence,
                                "alert sent"
                            ),
                            DispatchReason::ForceReview => info!(
                                title = %headline.text,
                                direction = verdict.direction.as_str(),
                                confidence = verdict.confidence,
                                "forced alert (special topic)"
                            ),
                        }
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            title = %headline.text,
                            "delivery failed; not marking as sent"
                        );
                        stats.delivery_failures += 1;
                        counter!("alerts_delivery_failed_total").increment(1);
                    }
                }
            }
            GateDecision::Skip(reason) => {
                debug!(
                    title = %headline.text,
                    direction = verdict.direction.as_str(),
                    confidence = verdict.confidence,
                    reason = reason.as_str(),
                    "skipped after gating"
                );
            }
        }
    }

    counter!("cycle_runs_total").increment(1);
    gauge!("cycle_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    info!(
        fetched = stats.fetched,
        classified = stats.classified,
        dispatched = stats.dispatched,
        skipped_sent = stats.skipped_sent,
        skipped_irrelevant = stats.skipped_irrelevant,
        delivery_failures = stats.delivery_failures,
        "cycle complete"
    );

    Ok(stats)
}

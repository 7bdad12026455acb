//! Crypto News Alerter binary entrypoint.
//! Polls the headline source on a fixed interval and runs one alert cycle per
//! tick. Cycle failures are logged and never kill the process.

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_alerter::classify::openai::OpenAiClassifier;
use crypto_news_alerter::config::AppConfig;
use crypto_news_alerter::dedup::FileDedupStore;
use crypto_news_alerter::gate::KeywordGate;
use crypto_news_alerter::ingest::providers::newsapi::NewsApiSource;
use crypto_news_alerter::notify::telegram::TelegramNotifier;
use crypto_news_alerter::pipeline::run_cycle;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when vars come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let gate = KeywordGate::load_default();

    let source = NewsApiSource::new(cfg.news_api_key.clone(), cfg.language.clone(), cfg.page_size);
    let classifier = OpenAiClassifier::new(cfg.openai_api_key.clone(), cfg.openai_model.as_deref());
    let notifier = TelegramNotifier::new(cfg.bot_token.clone(), cfg.chat_id.clone());
    let mut store = FileDedupStore::load(&cfg.sent_store_path);

    info!(
        interval_secs = cfg.poll_interval_secs,
        sent_store = %cfg.sent_store_path,
        known_keys = store.len(),
        "alerter started"
    );

    // First tick fires immediately; cycles cannot overlap because each one is
    // awaited to completion before the next tick is honored.
    let mut ticker =
        tokio::time::interval(std::time::Duration::from_secs(cfg.poll_interval_secs));
    loop {
        ticker.tick().await;
        if let Err(e) = run_cycle(&source, &classifier, &notifier, &mut store, &gate).await {
            error!(error = ?e, "cycle aborted");
        }
    }
}

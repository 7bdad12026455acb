//! One-shot manual smoke test for the Telegram notifier.
//! Usage: BOT_TOKEN=... CHAT_ID=... cargo run --bin notify_demo

use anyhow::Result;

use crypto_news_alerter::classify::{Direction, Verdict};
use crypto_news_alerter::ingest::types::Headline;
use crypto_news_alerter::notify::{format_alert, telegram::TelegramNotifier, Notifier};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().compact().init();

    let bot_token = std::env::var("BOT_TOKEN")?;
    let chat_id = std::env::var("CHAT_ID")?;

    let headline = Headline {
        text: "Notifier smoke test headline".into(),
        published_at: None,
    };
    let verdict = Verdict::new(Direction::Up, 99, "Manual delivery check.");
    let message = format_alert(&headline, &verdict);

    let notifier = TelegramNotifier::new(bot_token, chat_id);
    notifier.send(&message).await?;
    println!("sent via {}", notifier.name());
    Ok(())
}

//! OpenAI chat-completions classifier. One request per headline with a fixed
//! instruction template; the reply is run through the strict line parser.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::parser::{parse_verdict, ParseOutcome};
use super::{Classifier, Verdict};

const OPENAI_CHAT_COMPLETIONS: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiClassifier {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    /// `model_override`: pass Some("gpt-4o") to override; defaults to gpt-4o-mini.
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-alerter/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    fn prompt(headline: &str) -> String {
        format!(
            "You are a senior crypto analyst and market trader. Your job is to analyze how global news affects the price of cryptocurrencies.\n\n\
             Headline: \"{headline}\"\n\n\
             Respond in this format:\n\
             Direction: up/down/neutral\n\
             Confidence: <number>%\n\
             Explanation: <short but clear market-based reasoning>"
        )
    }

    async fn request_completion(&self, headline: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let prompt = Self::prompt(headline);
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.3,
        };

        let body: Resp = self
            .http
            .post(OPENAI_CHAT_COMPLETIONS)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat completion request")?
            .error_for_status()
            .context("chat completion status")?
            .json()
            .await
            .context("chat completion body")?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, headline: &str) -> Verdict {
        if self.api_key.is_empty() {
            return Verdict::neutral_fallback("AI analysis failed: missing API key");
        }

        let content = match self.request_completion(headline).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "classifier request failed; degrading to neutral");
                return Verdict::neutral_fallback(format!("AI analysis failed: {e}"));
            }
        };

        match parse_verdict(&content) {
            ParseOutcome::Parsed(v) => v,
            ParseOutcome::Malformed(reason) => {
                warn!(%reason, "classifier reply malformed; degrading to neutral");
                Verdict::neutral_fallback(format!("AI analysis failed: {reason}"))
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// src/ingest/providers/newsapi.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};

use crate::ingest::normalize_text;
use crate::ingest::types::{Headline, HeadlineSource};

pub const NEWS_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

fn parse_rfc3339_utc(ts: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(ts, &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
}

/// Parse a top-headlines response body into ordered headlines.
/// Separated from the HTTP call so fixtures can exercise it directly.
/// A non-"ok" status is an error carrying the upstream code and message.
pub fn parse_top_headlines(body: &str) -> Result<Vec<Headline>> {
    let resp: TopHeadlinesResponse =
        serde_json::from_str(body).context("parsing newsapi response json")?;

    if resp.status != "ok" {
        return Err(anyhow!(
            "newsapi status `{}` (code: {}, message: {})",
            resp.status,
            resp.code.as_deref().unwrap_or("-"),
            resp.message.as_deref().unwrap_or("-")
        ));
    }

    let mut out = Vec::with_capacity(resp.articles.len());
    for a in resp.articles {
        let text = normalize_text(a.title.as_deref().unwrap_or_default());
        if text.is_empty() {
            continue;
        }
        out.push(Headline {
            text,
            published_at: a.published_at.as_deref().and_then(parse_rfc3339_utc),
        });
    }
    Ok(out)
}

/// Paged top-headlines provider backed by the NewsAPI HTTP endpoint.
pub struct NewsApiSource {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
    page_size: u32,
}

impl NewsApiSource {
    pub fn new(api_key: String, language: String, page_size: u32) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-alerter/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            endpoint: NEWS_ENDPOINT.to_string(),
            api_key,
            language,
            page_size,
        }
    }

    /// Override the endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl HeadlineSource for NewsApiSource {
    async fn fetch_latest(&self) -> Result<Vec<Headline>> {
        crate::ingest::ensure_metrics_described();
        let t0 = std::time::Instant::now();

        let page_size = self.page_size.to_string();
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .context("newsapi request")?
            .text()
            .await
            .context("newsapi response body")?;

        let headlines = parse_top_headlines(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_fetch_ms").record(ms);
        counter!("ingest_headlines_total").increment(headlines.len() as u64);

        Ok(headlines)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}

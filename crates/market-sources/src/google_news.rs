use async_trait::async_trait;
use context_core::{ContextError, NewsItem, NewsSource};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, invalid, send};

const BASE_URL: &str = "https://news.google.com";
const PROVIDER: &str = "Google News";

/// Google News RSS search
#[derive(Clone)]
pub struct GoogleNewsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    source: Option<RssSource>,
}

#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(rename = "$text", default)]
    name: String,
}

impl GoogleNewsClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Search headlines, in the feed's relevance order
    pub async fn search(&self, query: &str, max_age_days: u32) -> Result<Vec<NewsItem>, ContextError> {
        let url = format!("{}/rss/search", self.base_url.trim_end_matches('/'));
        let q = search_terms(query, max_age_days);

        tracing::debug!(query = %q, "Fetching Google News RSS");

        let response = send(
            PROVIDER,
            self.client.get(&url).timeout(self.timeout).query(&[
                ("q", q.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ]),
        )
        .await?;

        let body = response.text().await.map_err(|e| invalid(PROVIDER, e))?;
        parse_feed(&body)
    }
}

/// `when:Nd` is Google News' age filter
fn search_terms(query: &str, max_age_days: u32) -> String {
    if max_age_days == 0 {
        query.trim().to_string()
    } else {
        format!("{} when:{}d", query.trim(), max_age_days)
    }
}

fn parse_feed(xml: &str) -> Result<Vec<NewsItem>, ContextError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| invalid(PROVIDER, e))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.filter(|t| !t.trim().is_empty())?;
            let source = item
                .source
                .map(|s| s.name.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| PROVIDER.to_string());
            Some(NewsItem {
                title: title.trim().to_string(),
                source,
                published: item.pub_date.unwrap_or_default(),
                link: item.link.unwrap_or_default(),
            })
        })
        .collect())
}

#[async_trait]
impl NewsSource for GoogleNewsClient {
    async fn fetch(&self, query: &str, max_age_days: u32) -> Result<Vec<NewsItem>, ContextError> {
        self.search(query, max_age_days).await
    }
}

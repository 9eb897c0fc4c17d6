//! fda.gov pages through the Firecrawl search and scrape API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use docket_core::{DocType, Error, RawPayload, Result, ScrapedPage};

use crate::source::RegulatorySource;

/// Search term and document type for a topic.
pub fn search_plan(topic: &str) -> (String, DocType) {
    let doc_type = DocType::for_fda_topic(topic);
    let term = match doc_type {
        DocType::Recall => "active recalls".to_string(),
        DocType::Drug => "drug safety".to_string(),
        DocType::Food => "food safety recalls".to_string(),
        DocType::Clinical => "clinical trials safety".to_string(),
        _ => format!("{} recalls", topic.trim()),
    };
    (format!("site:fda.gov {}", term), doc_type)
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    markdown: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: ScrapeData,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: String,
}

pub struct FirecrawlScraper {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FirecrawlScraper {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let req = self.client.post(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let resp = self
            .post("/v1/search")
            .json(&json!({
                "query": query,
                "limit": limit,
                "scrapeOptions": { "formats": ["markdown"], "onlyMainContent": true },
            }))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "Firecrawl search returned status {}",
                resp.status()
            )));
        }
        let body: SearchResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        Ok(body.data)
    }

    async fn scrape(&self, url: &str) -> Result<String> {
        let resp = self
            .post("/v1/scrape")
            .json(&json!({ "url": url, "formats": ["markdown"], "onlyMainContent": true }))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!(
                "Firecrawl scrape of {} returned status {}",
                url,
                resp.status()
            )));
        }
        let body: ScrapeResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        Ok(body.data.markdown)
    }
}

#[async_trait]
impl RegulatorySource for FirecrawlScraper {
    fn name(&self) -> &'static str {
        "firecrawl"
    }

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<RawPayload>> {
        let (query, doc_type) = search_plan(topic);
        debug!("Firecrawl search {:?}", query);
        let hits = self.search(&query, max_results).await?;

        let mut payloads = Vec::with_capacity(hits.len());
        for (idx, hit) in hits.into_iter().take(max_results).enumerate() {
            if hit.url.is_empty() {
                warn!("Search result {} has no URL, skipping", idx + 1);
                continue;
            }
            let markdown = match hit.markdown.filter(|m| !m.is_empty()) {
                Some(markdown) => markdown,
                None => match self.scrape(&hit.url).await {
                    Ok(markdown) => markdown,
                    Err(e) => {
                        warn!("Skipping {}: {}", hit.url, e);
                        continue;
                    }
                },
            };
            payloads.push(RawPayload::Scraped {
                doc_type,
                page: ScrapedPage {
                    url: hit.url,
                    title: hit.title,
                    snippet: hit.description,
                    markdown,
                },
            });
        }

        info!("Firecrawl produced {} {} pages for {:?}", payloads.len(), doc_type, topic);
        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_plan() {
        assert_eq!(
            search_plan("recalls"),
            ("site:fda.gov active recalls".to_string(), DocType::Recall)
        );
        assert_eq!(
            search_plan("drugs"),
            ("site:fda.gov drug safety".to_string(), DocType::Drug)
        );
        assert_eq!(
            search_plan("peanut allergy"),
            ("site:fda.gov peanut allergy recalls".to_string(), DocType::General)
        );
    }

    #[test]
    fn test_search_response_shape() {
        let body: SearchResponse = serde_json::from_value(json!({
            "success": true,
            "data": [
                { "url": "https://www.fda.gov/a", "title": "A | FDA", "description": "first" },
                { "url": "https://www.fda.gov/b", "title": "B", "markdown": "# B" }
            ]
        }))
        .unwrap();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0].description, "first");
        assert!(body.data[0].markdown.is_none());
        assert_eq!(body.data[1].markdown.as_deref(), Some("# B"));
    }

    #[test]
    fn test_scrape_response_tolerates_missing_data() {
        let body: ScrapeResponse = serde_json::from_value(json!({ "success": false })).unwrap();
        assert!(body.data.markdown.is_empty());
    }
}

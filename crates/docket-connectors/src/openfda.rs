//! openFDA REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use docket_core::{DocType, Error, RawPayload, Result};

use crate::source::RegulatorySource;

pub const DEFAULT_OPENFDA_URL: &str = "https://api.fda.gov";

/// Endpoint and query for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdaQuery {
    pub endpoint: &'static str,
    pub doc_type: DocType,
    pub search: Option<String>,
    pub sort: &'static str,
}

impl FdaQuery {
    pub fn for_topic(topic: &str) -> Self {
        let enforcement = "/food/enforcement.json";
        let events = "/drug/event.json";
        let by_initiation = "recall_initiation_date:desc";
        let by_receipt = "receivedate:desc";

        match DocType::for_fda_topic(topic) {
            DocType::Recall => Self {
                endpoint: enforcement,
                doc_type: DocType::Recall,
                search: Some(r#"status:"Ongoing""#.into()),
                sort: by_initiation,
            },
            DocType::Drug => Self {
                endpoint: events,
                doc_type: DocType::Drug,
                search: None,
                sort: by_receipt,
            },
            DocType::Food => Self {
                endpoint: enforcement,
                doc_type: DocType::Food,
                search: Some(r#"product_type:"food""#.into()),
                sort: by_initiation,
            },
            DocType::Clinical => Self {
                endpoint: events,
                doc_type: DocType::Clinical,
                search: Some("serious:1".into()),
                sort: by_receipt,
            },
            _ => Self {
                endpoint: enforcement,
                doc_type: DocType::General,
                search: Some(format!(
                    r#"reason_for_recall:"{}""#,
                    topic.trim().replace('"', "")
                )),
                sort: by_initiation,
            },
        }
    }

    fn params(&self, limit: usize) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params.push(("limit", limit.to_string()));
        params.push(("sort", self.sort.to_string()));
        params
    }
}

#[derive(Deserialize)]
struct FdaResponse {
    #[serde(default)]
    results: Vec<Value>,
}

pub struct OpenFdaClient {
    client: Client,
    base_url: String,
}

impl OpenFdaClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_OPENFDA_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RegulatorySource for OpenFdaClient {
    fn name(&self) -> &'static str {
        "openfda"
    }

    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<RawPayload>> {
        let query = FdaQuery::for_topic(topic);
        let url = format!("{}{}", self.base_url, query.endpoint);
        debug!("openFDA {} {:?}", url, query.search);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&query.params(max_results))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        // openFDA answers a search with no hits with 404.
        if resp.status() == StatusCode::NOT_FOUND {
            info!("openFDA has no {} records for {:?}", query.doc_type, topic);
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(Error::Upstream(format!("openFDA returned status {}", resp.status())));
        }

        let body: FdaResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        info!("openFDA returned {} {} records", body.results.len(), query.doc_type);
        Ok(body
            .results
            .into_iter()
            .map(|record| RawPayload::FdaRecord {
                doc_type: query.doc_type,
                record,
            })
            .collect())
    }
}

//! Upstream clients against a local mock HTTP server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docket_connectors::{ArxivClient, FirecrawlScraper, OpenFdaClient, PaperIndex, RegulatorySource};
use docket_core::{DocType, Error, RawPayload};

const TIMEOUT: Duration = Duration::from_secs(5);

fn scraped_urls(payloads: &[RawPayload]) -> Vec<(String, String)> {
    payloads
        .iter()
        .map(|payload| match payload {
            RawPayload::Scraped { doc_type, page } => {
                assert_eq!(*doc_type, DocType::Recall);
                (page.url.clone(), page.markdown.clone())
            }
            other => panic!("unexpected payload {:?}", other),
        })
        .collect()
}

#[tokio::test]
async fn test_openfda_records_tagged_with_topic_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/food/enforcement.json"))
        .and(query_param("search", r#"status:"Ongoing""#))
        .and(query_param("limit", "2"))
        .and(query_param("sort", "recall_initiation_date:desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "results": { "total": 2 } },
            "results": [
                { "recall_number": "F-0001-2024", "product_description": "Cookies" },
                { "recall_number": "F-0002-2024", "product_description": "Crackers" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenFdaClient::with_base_url(&server.uri(), TIMEOUT).unwrap();
    let payloads = client.fetch("recalls", 2).await.unwrap();

    assert_eq!(payloads.len(), 2);
    let RawPayload::FdaRecord { doc_type, record } = &payloads[1] else {
        panic!("expected an openFDA record");
    };
    assert_eq!(*doc_type, DocType::Recall);
    assert_eq!(record["recall_number"], "F-0002-2024");
}

#[tokio::test]
async fn test_openfda_not_found_means_no_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/event.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "NOT_FOUND", "message": "No matches found!" }
        })))
        .mount(&server)
        .await;

    let client = OpenFdaClient::with_base_url(&server.uri(), TIMEOUT).unwrap();
    assert!(client.fetch("drugs", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_openfda_server_error_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = OpenFdaClient::with_base_url(&server.uri(), TIMEOUT).unwrap();
    let result = client.fetch("food", 5).await;
    assert!(matches!(result, Err(Error::Upstream(_))));
}

#[tokio::test]
async fn test_firecrawl_scrapes_hits_without_markdown_and_skips_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(header("Authorization", "Bearer fc-test"))
        .and(body_partial_json(json!({ "query": "site:fda.gov active recalls", "limit": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "url": "https://www.fda.gov/a", "title": "A | FDA", "markdown": "# A" },
                { "url": "https://www.fda.gov/b", "title": "B | FDA", "description": "b" },
                { "url": "https://www.fda.gov/c", "title": "C | FDA", "markdown": "" },
                { "url": "", "title": "No URL" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://www.fda.gov/a" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://www.fda.gov/b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "# B scraped" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({ "url": "https://www.fda.gov/c" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = FirecrawlScraper::new(&server.uri(), Some("fc-test".into()), TIMEOUT).unwrap();
    let payloads = scraper.fetch("recalls", 5).await.unwrap();

    assert_eq!(
        scraped_urls(&payloads),
        vec![
            ("https://www.fda.gov/a".to_string(), "# A".to_string()),
            ("https://www.fda.gov/b".to_string(), "# B scraped".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_firecrawl_search_failure_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let scraper = FirecrawlScraper::new(&server.uri(), None, TIMEOUT).unwrap();
    assert!(matches!(
        scraper.fetch("recalls", 5).await,
        Err(Error::Upstream(_))
    ));
}

#[tokio::test]
async fn test_arxiv_search_parses_feed() {
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.01234v1</id>
    <published>2024-01-03T18:59:59Z</published>
    <title>Quantum Widgets</title>
    <summary>We study widgets.</summary>
    <author><name>Ada Lovelace</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.05678v1</id>
    <published>2024-01-04T00:00:00Z</published>
    <title>More Widgets</title>
    <summary>Again.</summary>
    <author><name>Alan Turing</name></author>
  </entry>
</feed>"#;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "all:widgets"))
        .and(query_param("max_results", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        ArxivClient::with_base_url(&format!("{}/api/query", server.uri()), TIMEOUT).unwrap();
    let entries = client.search("widgets", 1).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].short_id, "2401.01234v1");
    assert_eq!(entries[0].pdf_url, "http://arxiv.org/pdf/2401.01234v1");
}

#[tokio::test]
async fn test_arxiv_unavailable_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ArxivClient::with_base_url(&server.uri(), TIMEOUT).unwrap();
    assert!(client.search("widgets", 3).await.is_err());
}

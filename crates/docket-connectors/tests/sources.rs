//! Regulatory source selection from configuration.

use docket_connectors::regulatory_source;
use docket_core::{DocketConfig, StorePaths};

#[test]
fn test_api_source_by_default() {
    let config = DocketConfig::new(StorePaths::under("/tmp/docket"));
    assert_eq!(regulatory_source(&config).unwrap().name(), "openfda");
}

#[test]
fn test_scrape_source_from_env() {
    let config = DocketConfig::from_vars(|key| match key {
        "DOCKET_FDA_SOURCE" => Some("scrape".into()),
        "FIRECRAWL_API_KEY" => Some("fc-test".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(regulatory_source(&config).unwrap().name(), "firecrawl");
}

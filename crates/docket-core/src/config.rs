//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Collection file inside every paper topic directory.
pub const PAPERS_FILE: &str = "papers_info.json";
/// Collection file inside every regulatory topic directory.
pub const FDA_FILE: &str = "fda_info.json";

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";

/// Base directories of the two store families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorePaths {
    /// Paper stores (`papers/<topic>/papers_info.json`).
    pub papers: PathBuf,
    /// Regulatory stores (`fda_data/<topic>/fda_info.json`).
    pub fda: PathBuf,
}

impl StorePaths {
    pub fn new(papers: impl AsRef<Path>, fda: impl AsRef<Path>) -> Self {
        Self {
            papers: papers.as_ref().to_path_buf(),
            fda: fda.as_ref().to_path_buf(),
        }
    }

    /// Both families rooted under one directory (`<root>/papers`, `<root>/fda_data`).
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join("papers"), root.join("fda_data"))
    }

    /// Create both base directories. Existing directories are not an error.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.papers)?;
        std::fs::create_dir_all(&self.fda)?;
        Ok(())
    }
}

/// Which upstream serves regulatory data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulatorySourceKind {
    /// openFDA REST API.
    Api,
    /// Firecrawl search + scrape over fda.gov pages.
    Scrape,
}

impl std::str::FromStr for RegulatorySourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "scrape" | "firecrawl" => Ok(Self::Scrape),
            other => Err(Error::Config(format!("unknown FDA source: {}", other))),
        }
    }
}

/// What a merge does when the existing collection file cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptStorePolicy {
    /// Start from an empty collection; the unreadable content is replaced.
    #[default]
    Reset,
    /// Refuse the merge and leave the file alone.
    Fail,
}

impl std::str::FromStr for CorruptStorePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "fail" => Ok(Self::Fail),
            other => Err(Error::Config(format!("unknown corrupt-store policy: {}", other))),
        }
    }
}

/// Top-level Docket configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocketConfig {
    pub host: String,
    pub port: u16,
    pub paths: StorePaths,
    pub fda_source: RegulatorySourceKind,
    /// Connect/read timeout for openFDA.
    pub fda_timeout: Duration,
    /// Per-request timeout for Firecrawl search and scrape calls.
    pub firecrawl_timeout: Duration,
    pub arxiv_timeout: Duration,
    pub firecrawl_url: String,
    #[serde(skip_serializing)]
    pub firecrawl_api_key: Option<String>,
    pub corrupt_policy: CorruptStorePolicy,
}

impl DocketConfig {
    /// Defaults with the given store paths.
    pub fn new(paths: StorePaths) -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            paths,
            fda_source: RegulatorySourceKind::Api,
            fda_timeout: Duration::from_secs(10),
            firecrawl_timeout: Duration::from_secs(60),
            arxiv_timeout: Duration::from_secs(30),
            firecrawl_url: DEFAULT_FIRECRAWL_URL.into(),
            firecrawl_api_key: None,
            corrupt_policy: CorruptStorePolicy::Reset,
        }
    }

    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let paths = StorePaths::new(
            var("DOCKET_PAPER_DIR").unwrap_or_else(|| "papers".into()),
            var("DOCKET_FDA_DIR").unwrap_or_else(|| "fda_data".into()),
        );
        let mut config = Self::new(paths);

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {}", port)))?;
        }
        if let Some(source) = var("DOCKET_FDA_SOURCE") {
            config.fda_source = source.parse()?;
        }
        if let Some(secs) = var("DOCKET_FDA_TIMEOUT_SECS") {
            config.fda_timeout = parse_secs("DOCKET_FDA_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("DOCKET_FIRECRAWL_TIMEOUT_SECS") {
            config.firecrawl_timeout = parse_secs("DOCKET_FIRECRAWL_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("DOCKET_ARXIV_TIMEOUT_SECS") {
            config.arxiv_timeout = parse_secs("DOCKET_ARXIV_TIMEOUT_SECS", &secs)?;
        }
        if let Some(url) = var("FIRECRAWL_API_URL") {
            config.firecrawl_url = url.trim_end_matches('/').to_string();
        }
        config.firecrawl_api_key = var("FIRECRAWL_API_KEY").filter(|k| !k.is_empty());
        if let Some(policy) = var("DOCKET_CORRUPT_STORE") {
            config.corrupt_policy = policy.parse()?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::Config(format!("invalid {}: {}", name, value)))
}

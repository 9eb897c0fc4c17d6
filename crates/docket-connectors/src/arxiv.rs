//! arXiv paper search over the Atom export API.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, info};

use docket_core::{Error, PaperEntry, Result};

use crate::source::PaperIndex;

pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api/query";

pub struct ArxivClient {
    client: Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_ARXIV_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl PaperIndex for ArxivClient {
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<PaperEntry>> {
        let query = format!("all:{}", topic);
        let max = max_results.to_string();
        debug!("arXiv query {:?} (max {})", query, max_results);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", max.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Upstream(format!("arXiv returned status {}", resp.status())));
        }
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        let mut entries = parse_atom_feed(&body)?;
        entries.truncate(max_results);
        info!("arXiv returned {} papers for {:?}", entries.len(), topic);
        Ok(entries)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Parse an arXiv Atom feed into paper entries, in feed order.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<PaperEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PaperEntry> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"entry" => current = Some(PaperEntry::default()),
                b"author" => in_author = true,
                b"link" => set_pdf_link(&mut current, &e)?,
                name if current.is_some() => {
                    field = match name {
                        b"id" => Some(Field::Id),
                        b"title" => Some(Field::Title),
                        b"summary" => Some(Field::Summary),
                        b"published" => Some(Field::Published),
                        b"name" if in_author => Some(Field::AuthorName),
                        _ => None,
                    };
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    set_pdf_link(&mut current, &e)?;
                }
            }
            Ok(Event::Text(te)) => {
                if field.is_some() {
                    let chunk = te.unescape().map_err(|e| Error::Upstream(e.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(mut entry) = current.take() {
                        if entry.pdf_url.is_empty() {
                            entry.pdf_url = entry.short_id.replace("/abs/", "/pdf/");
                        }
                        entry.short_id = short_id(&entry.short_id);
                        entries.push(entry);
                    }
                }
                b"author" => in_author = false,
                _ => {
                    if let (Some(f), Some(entry)) = (field.take(), current.as_mut()) {
                        let value = collapse_whitespace(&text);
                        match f {
                            Field::Id => entry.short_id = value,
                            Field::Title => entry.title = value,
                            Field::Summary => entry.summary = value,
                            Field::Published => entry.published = value,
                            Field::AuthorName => entry.authors.push(value),
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Upstream(format!("malformed Atom feed: {}", e))),
            _ => {}
        }
    }
    Ok(entries)
}

fn set_pdf_link(current: &mut Option<PaperEntry>, e: &BytesStart<'_>) -> Result<()> {
    let Some(entry) = current.as_mut() else {
        return Ok(());
    };
    let mut href = None;
    let mut is_pdf = false;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Upstream(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Upstream(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value.to_string()),
            b"title" => is_pdf |= value == "pdf",
            b"type" => is_pdf |= value == "application/pdf",
            _ => {}
        }
    }
    if let (true, Some(href)) = (is_pdf, href) {
        entry.pdf_url = href;
    }
    Ok(())
}

/// `http://arxiv.org/abs/2401.01234v1` → `2401.01234v1`.
fn short_id(id: &str) -> String {
    match id.split_once("/abs/") {
        Some((_, short)) => short.to_string(),
        None => id.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

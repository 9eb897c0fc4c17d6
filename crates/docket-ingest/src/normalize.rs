//! Raw payload → canonical [`Document`].
//!
//! Upstream IDs are kept verbatim when the source has one (paper short ID,
//! openFDA `recall_number` / `safetyreportid`, a submitted `id`). Anything
//! else gets a content-derived ID, so re-fetching the same item lands on the
//! same key.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use docket_core::{
    parse_doc_date, ClinicalInfo, DocType, Document, DocumentBody, DrugInfo, Error, PaperEntry,
    ProductInfo, RawPayload, Result, ScrapedPage,
};

use crate::extract::{extract_drug_info, extract_product_info};

type Object = Map<String, Value>;

/// `{doc_type}_{first 16 hex chars of sha256(content)}`.
pub fn synthetic_id(doc_type: DocType, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", doc_type, &digest[..16])
}

/// Converts raw payloads into documents stamped with one retrieval time.
#[derive(Debug, Clone)]
pub struct Normalizer {
    retrieved_at: DateTime<Utc>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Normalizer with a fixed retrieval time.
    pub fn at(retrieved_at: DateTime<Utc>) -> Self {
        Self { retrieved_at }
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    /// Normalize one payload for `topic`.
    pub fn normalize(&self, topic: &str, payload: &RawPayload) -> Result<Document> {
        match payload {
            RawPayload::Paper(entry) => Ok(self.paper(entry)),
            RawPayload::FdaRecord { doc_type, record } => self.fda_record(*doc_type, record),
            RawPayload::Scraped { doc_type, page } => self.scraped(*doc_type, page),
            RawPayload::Submitted(value) => self.submitted(topic, value),
        }
    }

    /// Normalize a batch, skipping items that fail.
    pub fn normalize_batch(&self, topic: &str, payloads: &[RawPayload]) -> Vec<Document> {
        payloads
            .iter()
            .enumerate()
            .filter_map(|(idx, payload)| match self.normalize(topic, payload) {
                Ok(doc) => {
                    debug!("Normalized item {} as {}", idx + 1, doc.id);
                    Some(doc)
                }
                Err(e) => {
                    warn!(
                        "Skipping {:?} item {} for topic {}: {}",
                        payload.source_kind(),
                        idx + 1,
                        topic,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    fn date_or_today(&self, raw: &str) -> NaiveDate {
        parse_doc_date(raw).unwrap_or_else(|| {
            if !raw.is_empty() {
                debug!("Unparsable date {:?}, using retrieval date", raw);
            }
            self.retrieved_at.date_naive()
        })
    }

    fn paper(&self, entry: &PaperEntry) -> Document {
        let id = if entry.short_id.trim().is_empty() {
            synthetic_id(DocType::Paper, &entry.pdf_url)
        } else {
            entry.short_id.trim().to_string()
        };
        Document {
            id,
            title: entry.title.trim().to_string(),
            summary: entry.summary.trim().to_string(),
            date: self.date_or_today(&entry.published),
            retrieved_date: self.retrieved_at,
            url: None,
            key_points: Vec::new(),
            tables: Vec::new(),
            body: DocumentBody::Paper {
                authors: entry.authors.clone(),
                pdf_url: entry.pdf_url.clone(),
            },
        }
    }

    fn fda_record(&self, doc_type: DocType, record: &Value) -> Result<Document> {
        let obj = as_object(record, "record")?;
        match doc_type {
            t if t.is_product() => self.enforcement(t, record, obj),
            DocType::Drug | DocType::Clinical => self.adverse_event(doc_type, record, obj),
            other => Err(Error::Normalize(format!(
                "{} documents cannot come from regulatory records",
                other
            ))),
        }
    }

    fn enforcement(&self, doc_type: DocType, record: &Value, obj: &Object) -> Result<Document> {
        let product_info = ProductInfo {
            product_name: text(obj, "product_description")?,
            company_name: text(obj, "recalling_firm")?,
            recall_number: text(obj, "recall_number")?,
            recall_classification: text(obj, "classification")?,
            recall_status: text(obj, "status")?,
            distribution_pattern: text(obj, "distribution_pattern")?,
            quantity: text(obj, "product_quantity")?,
            city: text(obj, "city")?,
            state: text(obj, "state")?,
        };
        let id = natural_or_synthetic(&product_info.recall_number, doc_type, record);
        let body = DocumentBody::product(doc_type, product_info)
            .ok_or_else(|| Error::Normalize(format!("{} is not a product type", doc_type)))?;

        Ok(Document {
            id,
            title: text(obj, "product_description")?,
            summary: text(obj, "reason_for_recall")?,
            date: self.date_or_today(&text(obj, "recall_initiation_date")?),
            retrieved_date: self.retrieved_at,
            url: None,
            key_points: Vec::new(),
            tables: Vec::new(),
            body,
        })
    }

    fn adverse_event(&self, doc_type: DocType, record: &Value, obj: &Object) -> Result<Document> {
        let patient = optional_object(obj, "patient")?;
        let drugs = match patient {
            Some(p) => objects(p, "drug")?,
            None => Vec::new(),
        };
        let reactions = match patient {
            Some(p) => objects(p, "reaction")?,
            None => Vec::new(),
        };

        // Scalar fields read only the first drug and reaction.
        let first_drug = drugs.first().copied();
        let first_reaction = reactions.first().copied();
        let drug_field = |key: &str| first_drug.map_or(Ok(String::new()), |d| text(d, key));

        let title = drug_field("medicinalproduct")?;
        let summary = first_reaction.map_or(Ok(String::new()), |r| text(r, "reactionmeddrapt"))?;
        let id = natural_or_synthetic(&text(obj, "safetyreportid")?, doc_type, record);

        let body = if doc_type == DocType::Drug {
            DocumentBody::Drug {
                drug_info: DrugInfo {
                    drug_name: title.clone(),
                    manufacturer: drug_field("manufacturername")?,
                    dosage_form: drug_field("drugdosageform")?,
                    route: drug_field("drugadministrationroute")?,
                    indication: drug_field("drugindication")?,
                },
            }
        } else {
            DocumentBody::Clinical {
                clinical_info: ClinicalInfo {
                    study_phase: "N/A".into(),
                    conditions: collect_terms(&reactions, "reactionmeddrapt")?,
                    interventions: collect_terms(&drugs, "medicinalproduct")?,
                    status: text_or(obj, "serious", "Unknown")?,
                    sponsor: text_or(obj, "companynumb", "Unknown")?,
                    locations: vec![text_or(obj, "occurcountry", "Unknown")?],
                    enrollment: 1,
                },
            }
        };

        Ok(Document {
            id,
            title,
            summary,
            date: self.date_or_today(&text(obj, "receiptdate")?),
            retrieved_date: self.retrieved_at,
            url: None,
            key_points: Vec::new(),
            tables: Vec::new(),
            body,
        })
    }

    fn scraped(&self, doc_type: DocType, page: &ScrapedPage) -> Result<Document> {
        if page.url.trim().is_empty() {
            return Err(Error::Normalize("scraped page has no URL".into()));
        }
        let title = page.title.replace(" | FDA", "").trim().to_string();
        let summary = page.snippet.trim().to_string();

        let body = match doc_type {
            t if t.is_product() => {
                let mut info = ProductInfo {
                    product_name: title.clone(),
                    recall_status: "Ongoing".into(),
                    ..Default::default()
                };
                overlay_product(&mut info, extract_product_info(&page.markdown, &title, &summary));
                DocumentBody::product(t, info)
                    .ok_or_else(|| Error::Normalize(format!("{} is not a product type", t)))?
            }
            DocType::Drug => {
                let mut info = DrugInfo {
                    drug_name: title.clone(),
                    ..Default::default()
                };
                overlay_drug(&mut info, extract_drug_info(&page.markdown));
                DocumentBody::Drug { drug_info: info }
            }
            DocType::Clinical => DocumentBody::Clinical {
                clinical_info: ClinicalInfo {
                    study_phase: "N/A".into(),
                    status: "Unknown".into(),
                    sponsor: "Unknown".into(),
                    ..Default::default()
                },
            },
            other => {
                return Err(Error::Normalize(format!(
                    "{} documents cannot come from scraped pages",
                    other
                )))
            }
        };

        Ok(Document {
            id: synthetic_id(doc_type, page.url.trim()),
            title,
            summary,
            date: self.retrieved_at.date_naive(),
            retrieved_date: self.retrieved_at,
            url: Some(page.url.trim().to_string()),
            key_points: Vec::new(),
            tables: Vec::new(),
            body,
        })
    }

    fn submitted(&self, topic: &str, value: &Value) -> Result<Document> {
        let obj = as_object(value, "document")?;
        let doc_type = match optional_text(obj, "type")? {
            Some(t) if !t.trim().is_empty() => t.parse::<DocType>()?,
            _ => DocType::for_fda_topic(topic),
        };

        let body = match doc_type {
            DocType::Paper => DocumentBody::Paper {
                authors: strings(obj, "authors")?,
                pdf_url: text(obj, "pdf_url")?,
            },
            DocType::Drug => {
                let src = nested_or_flat(obj, &["drug_info"])?;
                DocumentBody::Drug {
                    drug_info: DrugInfo {
                        drug_name: first_text(src, &["drug_name"])?,
                        manufacturer: first_text(src, &["manufacturer"])?,
                        dosage_form: first_text(src, &["dosage_form"])?,
                        route: first_text(src, &["route", "administration"])?,
                        indication: first_text(src, &["indication"])?,
                    },
                }
            }
            DocType::Clinical => {
                let src = nested_or_flat(obj, &["clinical_info"])?;
                DocumentBody::Clinical {
                    clinical_info: ClinicalInfo {
                        study_phase: first_text(src, &["study_phase"])?,
                        conditions: strings(src, "conditions")?,
                        interventions: strings(src, "interventions")?,
                        status: first_text(src, &["status"])?,
                        sponsor: first_text(src, &["sponsor"])?,
                        locations: strings(src, "locations")?,
                        enrollment: count(src, "enrollment")?,
                    },
                }
            }
            t => {
                let src = nested_or_flat(obj, &["product_info", "recall_info"])?;
                let info = ProductInfo {
                    product_name: first_text(src, &["product_name"])?,
                    company_name: first_text(src, &["company_name"])?,
                    recall_number: first_text(src, &["recall_number"])?,
                    recall_classification: first_text(
                        src,
                        &["recall_classification", "recall_class"],
                    )?,
                    recall_status: first_text(src, &["recall_status", "status"])?,
                    distribution_pattern: first_text(
                        src,
                        &["distribution_pattern", "distribution"],
                    )?,
                    quantity: first_text(src, &["quantity"])?,
                    city: first_text(src, &["city"])?,
                    state: first_text(src, &["state"])?,
                };
                DocumentBody::product(t, info)
                    .ok_or_else(|| Error::Normalize(format!("{} is not a product type", t)))?
            }
        };

        let id = match optional_text(obj, "id")? {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => synthetic_id(doc_type, &value.to_string()),
        };

        Ok(Document {
            id,
            title: text(obj, "title")?,
            summary: text(obj, "summary")?,
            date: self.date_or_today(&text(obj, "date")?),
            retrieved_date: self.retrieved_at,
            url: optional_text(obj, "url")?.filter(|u| !u.trim().is_empty()),
            key_points: strings(obj, "key_points")?,
            tables: values(obj, "tables")?,
            body,
        })
    }
}

fn natural_or_synthetic(natural: &str, doc_type: DocType, record: &Value) -> String {
    let natural = natural.trim();
    if natural.is_empty() {
        // serde_json maps are sorted, so this serialization is stable.
        synthetic_id(doc_type, &record.to_string())
    } else {
        natural.to_string()
    }
}

fn overlay_product(base: &mut ProductInfo, found: ProductInfo) {
    let pairs = [
        (&mut base.product_name, found.product_name),
        (&mut base.company_name, found.company_name),
        (&mut base.recall_number, found.recall_number),
        (&mut base.recall_classification, found.recall_classification),
        (&mut base.recall_status, found.recall_status),
        (&mut base.distribution_pattern, found.distribution_pattern),
        (&mut base.quantity, found.quantity),
        (&mut base.city, found.city),
        (&mut base.state, found.state),
    ];
    for (slot, value) in pairs {
        if !value.is_empty() {
            *slot = value;
        }
    }
}

fn overlay_drug(base: &mut DrugInfo, found: DrugInfo) {
    let pairs = [
        (&mut base.drug_name, found.drug_name),
        (&mut base.manufacturer, found.manufacturer),
        (&mut base.dosage_form, found.dosage_form),
        (&mut base.route, found.route),
        (&mut base.indication, found.indication),
    ];
    for (slot, value) in pairs {
        if !value.is_empty() {
            *slot = value;
        }
    }
}

// JSON helpers. Absent and null read as empty; a value of the wrong shape is
// an error so the item gets skipped rather than half-filled.

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| Error::Normalize(format!("{} is not a JSON object", what)))
}

fn optional_object<'a>(obj: &'a Object, key: &str) -> Result<Option<&'a Object>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(_) => Err(Error::Normalize(format!("'{}' is not an object", key))),
    }
}

/// Canonical nested object under the first present key, else the flat top level.
fn nested_or_flat<'a>(obj: &'a Object, keys: &[&str]) -> Result<&'a Object> {
    for key in keys {
        if let Some(inner) = optional_object(obj, key)? {
            return Ok(inner);
        }
    }
    Ok(obj)
}

fn objects<'a>(obj: &'a Object, key: &str) -> Result<Vec<&'a Object>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| as_object(item, key))
            .collect(),
        Some(_) => Err(Error::Normalize(format!("'{}' is not a list", key))),
    }
}

fn values(obj: &Object, key: &str) -> Result<Vec<Value>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(Error::Normalize(format!("'{}' is not a list", key))),
    }
}

fn optional_text(obj: &Object, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(Error::Normalize(format!("'{}' is not a scalar", key))),
    }
}

fn text(obj: &Object, key: &str) -> Result<String> {
    Ok(optional_text(obj, key)?.unwrap_or_default())
}

fn text_or(obj: &Object, key: &str, default: &str) -> Result<String> {
    Ok(optional_text(obj, key)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string()))
}

fn first_text(obj: &Object, keys: &[&str]) -> Result<String> {
    for key in keys {
        if let Some(value) = optional_text(obj, key)? {
            return Ok(value);
        }
    }
    Ok(String::new())
}

fn strings(obj: &Object, key: &str) -> Result<Vec<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(Error::Normalize(format!("'{}' holds a non-string", key))),
            })
            .collect(),
        Some(_) => Err(Error::Normalize(format!("'{}' is not a list", key))),
    }
}

fn count(obj: &Object, key: &str) -> Result<u32> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::Normalize(format!("'{}' is not a count", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| Error::Normalize(format!("'{}' is not a count", key))),
        Some(_) => Err(Error::Normalize(format!("'{}' is not a count", key))),
    }
}

/// Non-empty `key` values across `items`, first occurrence kept.
fn collect_terms(items: &[&Object], key: &str) -> Result<Vec<String>> {
    let mut terms: Vec<String> = Vec::new();
    for item in items {
        let term = text(item, key)?;
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    Ok(terms)
}

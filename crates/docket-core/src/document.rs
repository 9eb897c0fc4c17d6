//! Canonical document model shared by every store.
//!
//! A [`Document`] is a common envelope (id, title, summary, dates, url) with
//! a type-tagged [`DocumentBody`] flattened into it, so the persisted JSON
//! carries a `type` discriminator next to the variant payload:
//!
//! ```json
//! { "id": "F-0123-2024", "title": "...", "date": "2024-01-15",
//!   "type": "recall", "retrieved_date": "2024-02-01T10:00:00Z",
//!   "product_info": { "product_name": "...", ... } }
//! ```

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Document kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Paper,
    Recall,
    Food,
    General,
    Drug,
    Clinical,
}

impl DocType {
    pub const ALL: [DocType; 6] = [
        DocType::Paper,
        DocType::Recall,
        DocType::Food,
        DocType::General,
        DocType::Drug,
        DocType::Clinical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Recall => "recall",
            Self::Food => "food",
            Self::General => "general",
            Self::Drug => "drug",
            Self::Clinical => "clinical",
        }
    }

    /// Map a regulatory topic name to the kind of document it produces.
    pub fn for_fda_topic(topic: &str) -> Self {
        match topic.trim().to_lowercase().as_str() {
            "recalls" => Self::Recall,
            "drugs" => Self::Drug,
            "food" => Self::Food,
            "clinical" => Self::Clinical,
            _ => Self::General,
        }
    }

    /// Recall-shaped kinds carry a [`ProductInfo`] payload.
    pub fn is_product(self) -> bool {
        matches!(self, Self::Recall | Self::Food | Self::General)
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let wanted = s.trim().to_lowercase();
        DocType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::Normalize(format!("unknown document type: {}", s)))
    }
}

/// Product details for recall, food and general notices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    pub product_name: String,
    pub company_name: String,
    pub recall_number: String,
    pub recall_classification: String,
    pub recall_status: String,
    pub distribution_pattern: String,
    pub quantity: String,
    pub city: String,
    pub state: String,
}

/// Drug details for adverse-event documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugInfo {
    pub drug_name: String,
    pub manufacturer: String,
    pub dosage_form: String,
    pub route: String,
    pub indication: String,
}

/// Clinical event details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalInfo {
    pub study_phase: String,
    pub conditions: Vec<String>,
    pub interventions: Vec<String>,
    pub status: String,
    pub sponsor: String,
    pub locations: Vec<String>,
    pub enrollment: u32,
}

/// Variant payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentBody {
    Paper {
        #[serde(default)]
        authors: Vec<String>,
        #[serde(default)]
        pdf_url: String,
    },
    Recall {
        #[serde(default)]
        product_info: ProductInfo,
    },
    Food {
        #[serde(default)]
        product_info: ProductInfo,
    },
    General {
        #[serde(default)]
        product_info: ProductInfo,
    },
    Drug {
        #[serde(default)]
        drug_info: DrugInfo,
    },
    Clinical {
        #[serde(default)]
        clinical_info: ClinicalInfo,
    },
}

impl DocumentBody {
    pub fn doc_type(&self) -> DocType {
        match self {
            Self::Paper { .. } => DocType::Paper,
            Self::Recall { .. } => DocType::Recall,
            Self::Food { .. } => DocType::Food,
            Self::General { .. } => DocType::General,
            Self::Drug { .. } => DocType::Drug,
            Self::Clinical { .. } => DocType::Clinical,
        }
    }

    /// Wrap product details in the variant matching `doc_type`.
    ///
    /// Returns `None` when `doc_type` is not recall-shaped.
    pub fn product(doc_type: DocType, product_info: ProductInfo) -> Option<Self> {
        match doc_type {
            DocType::Recall => Some(Self::Recall { product_info }),
            DocType::Food => Some(Self::Food { product_info }),
            DocType::General => Some(Self::General { product_info }),
            _ => None,
        }
    }
}

/// One canonical normalized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(with = "doc_date")]
    pub date: NaiveDate,
    #[serde(with = "retrieved_at")]
    pub retrieved_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Caller-supplied highlights (submitted documents only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    /// Caller-supplied tables, stored as given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Value>,
    #[serde(flatten)]
    pub body: DocumentBody,
}

impl Document {
    pub fn doc_type(&self) -> DocType {
        self.body.doc_type()
    }

    pub fn product_info(&self) -> Option<&ProductInfo> {
        match &self.body {
            DocumentBody::Recall { product_info }
            | DocumentBody::Food { product_info }
            | DocumentBody::General { product_info } => Some(product_info),
            _ => None,
        }
    }

    pub fn drug_info(&self) -> Option<&DrugInfo> {
        match &self.body {
            DocumentBody::Drug { drug_info } => Some(drug_info),
            _ => None,
        }
    }

    pub fn clinical_info(&self) -> Option<&ClinicalInfo> {
        match &self.body {
            DocumentBody::Clinical { clinical_info } => Some(clinical_info),
            _ => None,
        }
    }
}

/// Parse an upstream calendar date.
///
/// Accepts `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYYMMDD` (openFDA) and RFC 3339
/// timestamps (arXiv).
pub fn parse_doc_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[0..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

mod doc_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_doc_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized date: {}", raw)))
    }
}

mod retrieved_at {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::SecondsFormat;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
            return Ok(ts.with_timezone(&Utc));
        }
        // Older stores recorded only the ingestion day.
        super::parse_doc_date(&raw)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp: {}", raw)))
    }
}

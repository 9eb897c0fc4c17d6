//! Markdown views of stored collections.

use std::fmt::Write;

use docket_core::{DocType, Document, DocumentBody};
use serde_json::Value;
use docket_store::LoadOutcome;

const SUMMARY_PREVIEW_CHARS: usize = 500;

pub fn paper_folders(topics: &[String]) -> String {
    folder_list(
        "# Available Topics",
        topics,
        "papers in that topic",
        "No topics found.",
    )
}

pub fn fda_folders(topics: &[String]) -> String {
    folder_list(
        "# Available FDA Topics",
        topics,
        "FDA information in that topic",
        "No FDA topics found. Try searching for FDA information first.",
    )
}

fn folder_list(heading: &str, topics: &[String], hint: &str, empty: &str) -> String {
    let mut out = format!("{}\n\n", heading);
    match topics.last() {
        Some(last) => {
            for topic in topics {
                let _ = writeln!(out, "- {}", topic);
            }
            let _ = writeln!(out, "\nUse @{} to access {}.", last, hint);
        }
        None => {
            let _ = writeln!(out, "{}", empty);
        }
    }
    out
}

/// `peanut_allergy` → `Peanut Allergy`.
pub fn title_case(topic: &str) -> String {
    topic
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn preview(summary: &str) -> String {
    let mut out: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

pub fn paper_topic(topic: &str, outcome: LoadOutcome) -> String {
    let collection = match outcome {
        LoadOutcome::Loaded(collection) => collection,
        LoadOutcome::Missing => {
            return format!(
                "# No papers found for topic: {}\n\nTry searching for papers on this topic first.",
                topic
            )
        }
        LoadOutcome::Corrupt { .. } => {
            return format!(
                "# Error reading papers data for {}\n\nThe papers data file is corrupted.",
                topic
            )
        }
    };

    let mut out = format!("# Papers on {}\n\n", title_case(topic));
    let _ = writeln!(out, "Total papers: {}\n", collection.len());
    for (id, doc) in &collection {
        let (authors, pdf_url) = match &doc.body {
            DocumentBody::Paper { authors, pdf_url } => (authors.join(", "), pdf_url.as_str()),
            _ => (String::new(), ""),
        };
        let _ = writeln!(out, "## {}", doc.title);
        let _ = writeln!(out, "- **Paper ID**: {}", id);
        let _ = writeln!(out, "- **Authors**: {}", authors);
        let _ = writeln!(out, "- **Published**: {}", doc.date);
        let _ = writeln!(out, "- **PDF URL**: [{}]({})\n", pdf_url, pdf_url);
        let _ = writeln!(out, "### Summary\n{}\n", preview(&doc.summary));
        out.push_str("---\n\n");
    }
    out
}

pub fn fda_topic(topic: &str, outcome: LoadOutcome) -> String {
    let collection = match outcome {
        LoadOutcome::Loaded(collection) => collection,
        LoadOutcome::Missing => {
            return format!(
                "# No FDA documents found for {}\n\nTry searching for FDA documents first using search_fda('{}')",
                topic, topic
            )
        }
        LoadOutcome::Corrupt { .. } => {
            return "# Error reading FDA data\n\nThe FDA data file is corrupted.".to_string()
        }
    };

    let mut docs: Vec<&Document> = collection.values().collect();
    docs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    let mut out = format!("# FDA {} Information\n\n", title_case(topic));
    let _ = writeln!(out, "Total entries: {}\n", docs.len());
    for doc in docs {
        fda_section(&mut out, doc);
    }
    out
}

fn fda_section(out: &mut String, doc: &Document) {
    match &doc.body {
        DocumentBody::Recall { product_info }
        | DocumentBody::Food { product_info }
        | DocumentBody::General { product_info } => {
            let _ = writeln!(
                out,
                "## {} by {}",
                or(&product_info.product_name, or(&doc.title, "Unknown Product")),
                or(&product_info.company_name, "Unknown Company")
            );
            let label = if doc.doc_type() == DocType::Recall {
                "Recall Date"
            } else {
                "Date"
            };
            let _ = writeln!(out, "- **{}**: {}", label, doc.date);
            let _ = writeln!(
                out,
                "- **Recall Class**: {}",
                or(&product_info.recall_classification, "Not specified")
            );
            let _ = writeln!(
                out,
                "- **Distribution**: {}",
                or(&product_info.distribution_pattern, "Not specified")
            );
        }
        DocumentBody::Drug { drug_info } => {
            let _ = writeln!(out, "## {}", or(&drug_info.drug_name, &doc.title));
            let _ = writeln!(out, "- **Date**: {}", doc.date);
            let _ = writeln!(
                out,
                "- **Manufacturer**: {}",
                or(&drug_info.manufacturer, "Not specified")
            );
            let _ = writeln!(
                out,
                "- **Dosage Form**: {}",
                or(&drug_info.dosage_form, "Not specified")
            );
            let _ = writeln!(out, "- **Route**: {}", or(&drug_info.route, "Not specified"));
        }
        DocumentBody::Clinical { clinical_info } => {
            let _ = writeln!(out, "## {}", doc.title);
            let _ = writeln!(out, "- **Date**: {}", doc.date);
            let _ = writeln!(
                out,
                "- **Phase**: {}",
                or(&clinical_info.study_phase, "Not specified")
            );
            let _ = writeln!(out, "- **Status**: {}", or(&clinical_info.status, "Not specified"));
            let _ = writeln!(out, "- **Sponsor**: {}", or(&clinical_info.sponsor, "Not specified"));
        }
        DocumentBody::Paper { .. } => {
            let _ = writeln!(out, "## {}", doc.title);
            let _ = writeln!(out, "- **Date**: {}", doc.date);
        }
    }

    if let Some(url) = &doc.url {
        let _ = writeln!(out, "- **URL**: [{}]({})", url, url);
    }
    out.push('\n');

    if !doc.summary.is_empty() {
        let _ = writeln!(out, "### Summary\n{}\n", doc.summary);
    }

    if let Some(info) = doc.clinical_info() {
        bullet_section(out, "Conditions", &info.conditions);
        bullet_section(out, "Interventions", &info.interventions);
    }
    bullet_section(out, "Key Points", &doc.key_points);
    tables_section(out, &doc.tables);
    out.push_str("---\n\n");
}

/// Tables shaped `{"headers": [...], "data": [[...], ...]}`; anything else is skipped.
fn tables_section(out: &mut String, tables: &[Value]) {
    let rendered: Vec<String> = tables.iter().filter_map(markdown_table).collect();
    if rendered.is_empty() {
        return;
    }
    out.push_str("### Additional Information\n");
    for table in rendered {
        let _ = writeln!(out, "{}", table);
    }
}

fn markdown_table(table: &Value) -> Option<String> {
    let headers: Vec<String> = table.get("headers")?.as_array()?.iter().map(cell).collect();
    let rows = table.get("data")?.as_array()?;
    if headers.is_empty() {
        return None;
    }

    let mut md = format!("| {} |\n", headers.join(" | "));
    let _ = writeln!(md, "|{}|", vec!["---"; headers.len()].join("|"));
    for row in rows {
        let cells: Vec<String> = match row.as_array() {
            Some(cells) => cells.iter().map(cell).collect(),
            None => vec![cell(row)],
        };
        let _ = writeln!(md, "| {} |", cells.join(" | "));
    }
    Some(md)
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn bullet_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "### {}", heading);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
    out.push('\n');
}

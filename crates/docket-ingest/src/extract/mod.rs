//! Field extraction from unstructured page text.
//!
//! Each target field has an ordered rule list (see [`rules`]); the first rule
//! that matches supplies the value and the rest are not tried. Labeled rules
//! (`Drug Name: ...`) are case-sensitive, free-text fallbacks are not.
//! Extraction never fails: a field nothing matches is the empty string.

pub mod rules;

use docket_core::{DrugInfo, ProductInfo};

use rules::{first_match, Sources};

/// Which field set to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Drug,
    /// Recall, food and general notices.
    Product,
}

/// Fields recovered from text. Unmatched fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialFields {
    Drug(DrugInfo),
    Product(ProductInfo),
}

/// Run the rule tables for `kind` over `text`, with optional title and summary
/// for the rules that read them.
pub fn extract(
    kind: ExtractKind,
    text: &str,
    title: Option<&str>,
    summary: Option<&str>,
) -> PartialFields {
    match kind {
        ExtractKind::Drug => PartialFields::Drug(extract_drug_info(text)),
        ExtractKind::Product => PartialFields::Product(extract_product_info(
            text,
            title.unwrap_or_default(),
            summary.unwrap_or_default(),
        )),
    }
}

pub fn extract_drug_info(text: &str) -> DrugInfo {
    let sources = Sources {
        body: text,
        ..Default::default()
    };
    DrugInfo {
        drug_name: first_match(&rules::DRUG_NAME, &sources),
        manufacturer: first_match(&rules::MANUFACTURER, &sources),
        dosage_form: first_match(&rules::DOSAGE_FORM, &sources),
        route: first_match(&rules::ROUTE, &sources),
        indication: first_match(&rules::INDICATION, &sources),
    }
}

pub fn extract_product_info(text: &str, title: &str, summary: &str) -> ProductInfo {
    let sources = Sources {
        body: text,
        title,
        summary,
    };
    ProductInfo {
        product_name: first_match(&rules::PRODUCT_NAME, &sources),
        company_name: first_match(&rules::COMPANY_NAME, &sources),
        recall_number: first_match(&rules::RECALL_NUMBER, &sources),
        recall_classification: first_match(&rules::CLASSIFICATION, &sources),
        recall_status: first_match(&rules::RECALL_STATUS, &sources),
        distribution_pattern: first_match(&rules::DISTRIBUTION, &sources),
        quantity: first_match(&rules::QUANTITY, &sources),
        city: first_match(&rules::CITY, &sources),
        state: first_match(&rules::STATE, &sources),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_empty_fields() {
        assert_eq!(
            extract(ExtractKind::Drug, "", None, None),
            PartialFields::Drug(DrugInfo::default())
        );
        assert_eq!(
            extract(ExtractKind::Product, "", None, None),
            PartialFields::Product(ProductInfo::default())
        );
    }

    #[test]
    fn test_labeled_drug_page() {
        let text = "Drug Name: Lisinopril\n\
                    Manufacturer: Acme Pharma Inc\n\
                    Dosage Form: Tablet\n\
                    Route: Oral\n\
                    Indication: Hypertension in adults.";
        let info = extract_drug_info(text);
        assert_eq!(info.drug_name, "Lisinopril");
        assert_eq!(info.manufacturer, "Acme Pharma Inc");
        assert_eq!(info.dosage_form, "Tablet");
        assert_eq!(info.route, "Oral");
        assert_eq!(info.indication, "Hypertension in adults");
    }

    #[test]
    fn test_free_text_drug_page() {
        let text = "Metformin Hydrochloride tablets are indicated for type 2 diabetes. \
                    Take by mouth; oral use only.";
        let info = extract_drug_info(text);
        assert_eq!(info.drug_name, "Metformin Hydrochloride tablets");
        assert_eq!(info.dosage_form, "tablets");
        assert_eq!(info.route, "oral");
        assert_eq!(info.indication, "type 2 diabetes");
        assert_eq!(info.manufacturer, "");
    }

    #[test]
    fn test_product_page() {
        let text = "Sunny Foods Inc. of Dayton announced a Class I Recall.\n\
                    Recall Number: F-0456-2024\n\
                    Status: Ongoing\n\
                    The cookies were distributed to retail stores in OH and PA.\n\
                    Quantity: 3,000 units\n\
                    Manufactured in Dayton, OH";
        let info = extract_product_info(text, "Sunny Foods recalls Oat Cookies", "");
        assert_eq!(info.product_name, "Oat Cookies");
        assert_eq!(info.company_name, "Sunny Foods Inc.");
        assert_eq!(info.recall_number, "F-0456-2024");
        assert_eq!(info.recall_classification, "Class I");
        assert_eq!(info.recall_status, "Ongoing");
        assert_eq!(info.distribution_pattern, "retail stores in OH and PA");
        assert_eq!(info.quantity, "3,000 units");
        assert_eq!(info.city, "Dayton");
        assert_eq!(info.state, "OH");
    }

    #[test]
    fn test_company_falls_back_to_summary() {
        let info =
            extract_product_info("no firm named here", "", "Bright Dairy LLC issued the notice");
        assert_eq!(info.company_name, "Bright Dairy LLC");
    }
}

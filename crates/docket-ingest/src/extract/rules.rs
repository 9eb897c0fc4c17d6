//! Pattern rules and the per-field rule tables.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which piece of the source a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Body,
    Title,
    Summary,
}

/// One pattern tried against one input; `group` is the capture returned.
#[derive(Debug)]
pub struct Rule {
    pub input: Input,
    pub pattern: Regex,
    pub group: usize,
}

/// The text a rule set runs against.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sources<'a> {
    pub body: &'a str,
    pub title: &'a str,
    pub summary: &'a str,
}

impl<'a> Sources<'a> {
    fn get(&self, input: Input) -> &'a str {
        match input {
            Input::Body => self.body,
            Input::Title => self.title,
            Input::Summary => self.summary,
        }
    }
}

impl Rule {
    /// `Label: value` up to the next period or line break. Case-sensitive.
    fn labeled(label: &str) -> Self {
        Self::exact(
            Input::Body,
            &format!(r"\b{}\b\**:?\**[ \t]*([^.\n]+)", regex::escape(label)),
            1,
        )
    }

    /// Case-insensitive free-text pattern.
    fn free_text(input: Input, pattern: &str, group: usize) -> Self {
        Self::exact(input, &format!("(?i){}", pattern), group)
    }

    fn exact(input: Input, pattern: &str, group: usize) -> Self {
        // Patterns are compile-time constants; a bad one is a programming error.
        let pattern =
            Regex::new(pattern).unwrap_or_else(|e| panic!("invalid rule {}: {}", pattern, e));
        Self {
            input,
            pattern,
            group,
        }
    }

    fn apply(&self, sources: &Sources<'_>) -> Option<String> {
        let caps = self.pattern.captures(sources.get(self.input))?;
        let value = clean(caps.get(self.group)?.as_str());
        (!value.is_empty()).then_some(value)
    }
}

/// Markdown emphasis and stray colons around a captured value.
fn clean(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == ':')
        .to_string()
}

/// First rule that yields a non-empty value, or the empty string.
pub fn first_match(rules: &[Rule], sources: &Sources<'_>) -> String {
    rules
        .iter()
        .find_map(|rule| rule.apply(sources))
        .unwrap_or_default()
}

const ORGANISATION: &str = r"([A-Z][A-Za-z ,.&'-]*?(?:Inc\.|LLC|Ltd\.|Corp\.|Corporation|Company))";
const CITY_STATE: &str = r"\b(?:in|from)\s+([A-Z][A-Za-z ]*),\s*([A-Z]{2})\b";

pub static DRUG_NAME: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Drug Name"),
        Rule::exact(
            Input::Body,
            r"([A-Z][A-Za-z0-9 -]+(?:tablets|capsules|injection|solution))",
            1,
        ),
    ]
});

pub static MANUFACTURER: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Manufacturer"),
        Rule::exact(Input::Body, ORGANISATION, 1),
    ]
});

pub static DOSAGE_FORM: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Dosage Form"),
        Rule::free_text(
            Input::Body,
            r"\b(tablets|capsules|injection|solution|suspension)\b",
            1,
        ),
    ]
});

pub static ROUTE: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Route"),
        Rule::free_text(
            Input::Body,
            r"\b(oral|intravenous|topical|subcutaneous|intramuscular)\b",
            1,
        ),
    ]
});

pub static INDICATION: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Indication"),
        Rule::free_text(Input::Body, r"indicated for\s+([^.\n]+)", 1),
    ]
});

pub static PRODUCT_NAME: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Product"),
        Rule::free_text(Input::Title, r"\brecalls\s+([^.\n]+)", 1),
    ]
});

pub static COMPANY_NAME: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::exact(Input::Body, ORGANISATION, 1),
        Rule::exact(Input::Summary, ORGANISATION, 1),
    ]
});

pub static RECALL_NUMBER: Lazy<Vec<Rule>> = Lazy::new(|| vec![Rule::labeled("Recall Number")]);

pub static CLASSIFICATION: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::exact(Input::Body, r"\b(Class (?:III|II|I)) Recall\b", 1),
        Rule::labeled("Classification"),
    ]
});

pub static RECALL_STATUS: Lazy<Vec<Rule>> = Lazy::new(|| vec![Rule::labeled("Status")]);

pub static DISTRIBUTION: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::labeled("Distribution"),
        Rule::free_text(Input::Body, r"\bdistributed (?:to|in)\s+([^.\n]+)", 1),
    ]
});

pub static QUANTITY: Lazy<Vec<Rule>> = Lazy::new(|| vec![Rule::labeled("Quantity")]);

pub static CITY: Lazy<Vec<Rule>> = Lazy::new(|| vec![Rule::exact(Input::Body, CITY_STATE, 1)]);

pub static STATE: Lazy<Vec<Rule>> = Lazy::new(|| vec![Rule::exact(Input::Body, CITY_STATE, 2)]);

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Sources<'_> {
        Sources {
            body: text,
            ..Default::default()
        }
    }

    #[test]
    fn test_label_stops_at_period_and_newline() {
        assert_eq!(
            first_match(&RECALL_NUMBER, &body("Recall Number: F-0123-2024. Issued today")),
            "F-0123-2024"
        );
        assert_eq!(
            first_match(&QUANTITY, &body("Quantity: 1,200 cases\nStatus: Ongoing")),
            "1,200 cases"
        );
    }

    #[test]
    fn test_label_tolerates_markdown_emphasis() {
        assert_eq!(first_match(&RECALL_STATUS, &body("**Status:** Ongoing")), "Ongoing");
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert_eq!(first_match(&RECALL_NUMBER, &body("recall number: F-1")), "");
    }

    #[test]
    fn test_first_rule_wins() {
        let text = "Route: Oral\nAdministered intravenous in hospital settings";
        assert_eq!(first_match(&ROUTE, &body(text)), "Oral");
    }

    #[test]
    fn test_free_text_is_case_insensitive() {
        assert_eq!(first_match(&ROUTE, &body("For INTRAVENOUS use only")), "INTRAVENOUS");
        assert_eq!(
            first_match(&INDICATION, &body("It is Indicated For chronic pain. Ask")),
            "chronic pain"
        );
    }

    #[test]
    fn test_rule_reads_title() {
        let sources = Sources {
            body: "",
            title: "Acme Recalls Peanut Butter Cookies",
            summary: "",
        };
        assert_eq!(first_match(&PRODUCT_NAME, &sources), "Peanut Butter Cookies");
    }

    #[test]
    fn test_city_and_state_share_one_match() {
        let sources = body("Produced in Springfield, IL and shipped nationwide");
        assert_eq!(first_match(&CITY, &sources), "Springfield");
        assert_eq!(first_match(&STATE, &sources), "IL");
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            first_match(&CLASSIFICATION, &body("This is a Class II Recall of")),
            "Class II"
        );
        assert_eq!(
            first_match(&CLASSIFICATION, &body("Classification: Class III")),
            "Class III"
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        assert_eq!(first_match(&MANUFACTURER, &body("nothing to see here")), "");
        assert_eq!(first_match(&MANUFACTURER, &body("")), "");
    }
}

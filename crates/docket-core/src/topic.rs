//! Topic name → filesystem-safe directory slug.

use crate::error::{Error, Result};

/// Slugify a user-chosen topic.
///
/// Case-insensitive and whitespace-normalized: `"  Heart  Disease "` and
/// `"heart disease"` both map to `heart_disease`. Letters and digits of any
/// script are kept; separators, dots and other punctuation become `_`, so the
/// slug can never escape its base directory.
pub fn slugify(topic: &str) -> Result<String> {
    let slug = topic
        .split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || c == '-' || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        return Err(Error::InvalidTopic(topic.to_string()));
    }
    Ok(slug)
}

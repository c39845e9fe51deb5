use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// review_type value → Hugo category label.
pub const REVIEW_TYPE_TO_CATEGORY: [(&str, &str); 4] = [
    ("new-release", "New Releases"),
    ("revisit", "Revisits"),
    ("retrospective", "Retrospectives"),
    ("quick-take", "Quick Takes"),
];

const DEFAULT_CATEGORY: &str = "New Releases";

/// Front matter inferred by the model. Lives for one run and is only ever
/// persisted through the rendered header.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostMetadata {
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub review_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover_alt: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: String,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub refraction_quote: String,
    #[serde(default)]
    pub genre_lineage: Vec<LineageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineageEntry {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub note: String,
}

impl PostMetadata {
    /// Summary, or the description when the model left it out.
    pub fn summary(&self) -> &str {
        match self.summary.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.description,
        }
    }

    pub fn categories(&self) -> Vec<String> {
        vec![category_for(&self.review_type).to_string()]
    }
}

/// Free-text field: numbers and booleans are stringified, null is empty.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

pub fn category_for(review_type: &str) -> &'static str {
    REVIEW_TYPE_TO_CATEGORY
        .iter()
        .find(|(kind, _)| *kind == review_type)
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_CATEGORY)
}

pub mod gdocs;
pub mod oauth;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use url::Url;

static GDOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://docs\.google\.com/document/").unwrap());

/// Where the post body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    Local(PathBuf),
    Remote(String),
}

/// Remote document store: document id in, ordered paragraphs out.
pub trait DocumentFetcher {
    async fn fetch_document(&self, id: &str) -> Result<Vec<String>>;
}

impl BodySource {
    pub fn classify(token: &str) -> Result<Self> {
        if GDOC_RE.is_match(token) {
            Ok(Self::Remote(extract_doc_id(token)?))
        } else {
            Ok(Self::Local(PathBuf::from(token)))
        }
    }
}

/// Document id from a Google Docs URL: the path segment after `d`.
pub fn extract_doc_id(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Not a valid URL: {url}"))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    segments
        .iter()
        .position(|s| *s == "d")
        .and_then(|i| segments.get(i + 1))
        .filter(|id| !id.is_empty())
        .map(|id| (*id).to_string())
        .ok_or_else(|| anyhow!("Could not extract a document ID from URL: {url}"))
}

pub fn read_local(path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!("Body file not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Plain-text paragraphs of a Docs API `documents.get` response.
///
/// Only `paragraph` structural elements count; tables, section breaks and
/// inline objects contribute nothing.
pub fn paragraphs_from_document(doc: &Value) -> Vec<String> {
    let Some(content) = doc.pointer("/body/content").and_then(Value::as_array) else {
        return Vec::new();
    };
    content
        .iter()
        .filter_map(|el| el.get("paragraph"))
        .filter_map(|para| {
            let text: String = para
                .get("elements")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|e| e.pointer("/textRun/content").and_then(Value::as_str))
                .collect();
            let text = text.trim_end_matches('\n');
            if text.trim().is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        })
        .collect()
}

pub fn join_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join("\n\n")
}

/// Fetch a remote document and flatten it to the same shape as a local file.
pub async fn fetch_body<F: DocumentFetcher>(fetcher: &F, id: &str) -> Result<String> {
    let paragraphs = fetcher.fetch_document(id).await?;
    Ok(join_paragraphs(&paragraphs))
}

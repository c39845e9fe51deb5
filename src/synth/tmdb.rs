use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use super::prompt::SIMILAR_HEADER;

const API_BASE: &str = "https://api.themoviedb.org/3";
const TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SIMILAR: usize = 6;
const TITLE_GUESS_CHARS: usize = 80;

/// A catalog entry as returned by the lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarWork {
    pub title: String,
    pub year: u16,
}

#[derive(Deserialize)]
struct ResultPage {
    #[serde(default)]
    results: Vec<Candidate>,
}

/// Movie catalog with search and similar-title endpoints.
pub trait SimilarLookup {
    async fn search(&self, query: &str) -> Result<Option<u64>>;
    async fn similar(&self, id: u64) -> Result<Vec<Candidate>>;
}

pub struct Tmdb {
    client: reqwest::Client,
    api_key: String,
}

impl Tmdb {
    pub fn new(api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("Failed to build TMDB client")?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }

    async fn get_page(&self, path: &str, query: &[(&str, &str)]) -> Result<ResultPage> {
        let resp = self
            .client
            .get(format!("{API_BASE}{path}"))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("TMDB request {path} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("TMDB {path} returned {}", status.as_u16());
        }
        resp.json().await.context("TMDB returned malformed JSON")
    }
}

impl SimilarLookup for Tmdb {
    async fn search(&self, query: &str) -> Result<Option<u64>> {
        let page = self.get_page("/search/movie", &[("query", query)]).await?;
        Ok(page.results.first().map(|c| c.id))
    }

    async fn similar(&self, id: u64) -> Result<Vec<Candidate>> {
        let page = self.get_page(&format!("/movie/{id}/similar"), &[]).await?;
        Ok(page.results)
    }
}

/// First line of the body, the usual place for the film title.
pub fn title_guess(body: &str) -> String {
    body.trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .take(TITLE_GUESS_CHARS)
        .collect()
}

/// Keep titled candidates with a parseable release year, at most six.
pub fn filter_similar(candidates: Vec<Candidate>) -> Vec<SimilarWork> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let title = c.title.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let year = c.release_date.as_deref().and_then(release_year)?;
            Some(SimilarWork { title, year })
        })
        .take(MAX_SIMILAR)
        .collect()
}

fn release_year(date: &str) -> Option<u16> {
    date.get(..4)
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse().ok())
}

pub fn format_hint(works: &[SimilarWork]) -> Option<String> {
    if works.is_empty() {
        return None;
    }
    let lines: Vec<String> = works
        .iter()
        .map(|w| format!("- {} ({})", w.title, w.year))
        .collect();
    Some(format!("{SIMILAR_HEADER}\n{}", lines.join("\n")))
}

/// Resolve the hint block. Lookup failures only cost the hint.
pub async fn similar_hint_block<L: SimilarLookup>(
    lookup: &L,
    body: &str,
    tmdb_id: Option<u64>,
) -> Option<String> {
    match resolve_similar(lookup, body, tmdb_id).await {
        Ok(works) => {
            info!("TMDB returned {} usable similar titles", works.len());
            format_hint(&works)
        }
        Err(e) => {
            warn!("TMDB lookup failed, continuing without hints: {e:#}");
            None
        }
    }
}

async fn resolve_similar<L: SimilarLookup>(
    lookup: &L,
    body: &str,
    tmdb_id: Option<u64>,
) -> Result<Vec<SimilarWork>> {
    let id = match tmdb_id {
        Some(id) => id,
        None => {
            let guess = title_guess(body);
            if guess.is_empty() {
                return Ok(Vec::new());
            }
            match lookup.search(&guess).await? {
                Some(id) => id,
                None => {
                    info!("No TMDB match for {guess:?}");
                    return Ok(Vec::new());
                }
            }
        }
    };
    Ok(filter_similar(lookup.similar(id).await?))
}

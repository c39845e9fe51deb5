use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::info;

use super::oauth::{reauth_hint, GoogleAuth};
use super::{paragraphs_from_document, DocumentFetcher};

const DOCS_API: &str = "https://docs.googleapis.com/v1/documents";

/// Google Docs API client authorized through the token cache.
pub struct GoogleDocs {
    client: reqwest::Client,
    auth: GoogleAuth,
}

impl GoogleDocs {
    pub fn new(auth: GoogleAuth) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
        }
    }
}

impl DocumentFetcher for GoogleDocs {
    async fn fetch_document(&self, id: &str) -> Result<Vec<String>> {
        let token = self.auth.access_token().await?;
        let resp = self
            .client
            .get(format!("{DOCS_API}/{id}"))
            .bearer_auth(token)
            .send()
            .await
            .context("Google Docs request failed")?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            bail!(
                "Google Docs denied access to document {id} ({}). {}",
                status.as_u16(),
                reauth_hint(self.auth.cache_path())
            );
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Google Docs returned {} for {id}: {}", status.as_u16(), text.trim());
        }

        let doc: Value = resp.json().await.context("Google Docs returned malformed JSON")?;
        let paragraphs = paragraphs_from_document(&doc);
        info!("Fetched {} paragraphs from document {id}", paragraphs.len());
        Ok(paragraphs)
    }
}

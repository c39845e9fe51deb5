use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

/// Text-generation service: prompt in, raw reply text out.
pub trait Generator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Anthropic Messages API client.
pub struct Claude {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl Claude {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl Generator for Claude {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .context("Claude API request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read Claude API response")?;
        if !status.is_success() {
            bail!("Claude API error {}: {}", status.as_u16(), text.trim());
        }
        debug!("Claude replied with {} bytes", text.len());
        reply_text(&text)
    }
}

/// First text block of a Messages API response body.
fn reply_text(raw: &str) -> Result<String> {
    let parsed: MessagesResponse =
        serde_json::from_str(raw).context("Claude API returned malformed JSON")?;
    parsed
        .content
        .into_iter()
        .find(|b| b.kind == "text")
        .and_then(|b| b.text)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| anyhow!("Claude response has no text content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_from_fixture() {
        let raw = std::fs::read_to_string("tests/fixtures/claude_messages.json").unwrap();
        let text = reply_text(&raw).unwrap();
        assert!(text.starts_with("```json"));
        assert!(text.contains("\"slug\": \"the-long-night-2025\""));
    }

    #[test]
    fn reply_without_text_block_fails() {
        let raw = r#"{"content":[{"type":"tool_use","id":"x","name":"n","input":{}}]}"#;
        assert!(reply_text(raw).is_err());
    }

    #[test]
    fn reply_not_json_fails() {
        assert!(reply_text("<html>gateway timeout</html>").is_err());
    }
}

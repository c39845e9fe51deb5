pub mod claude;
pub mod prompt;
pub mod tmdb;

use anyhow::{Context, Result};
use tracing::debug;

use crate::meta::PostMetadata;
use claude::Generator;
use prompt::FRONT_MATTER_PROMPT;

/// Characters of body text sent to the model.
pub const BODY_BUDGET: usize = 8000;

/// Fill the instruction template, ask the model once, parse its JSON.
pub async fn synthesize<G: Generator>(
    generator: &G,
    body: &str,
    hint: Option<&str>,
) -> Result<PostMetadata> {
    let prompt = build_prompt(body, hint);
    debug!("Prompt is {} chars", prompt.chars().count());
    let reply = generator.generate(&prompt).await?;
    parse_metadata(&reply)
}

pub fn build_prompt(body: &str, hint: Option<&str>) -> String {
    let truncated: String = body.chars().take(BODY_BUDGET).collect();
    let mut prompt = FRONT_MATTER_PROMPT.replacen("{body}", &truncated, 1);
    if let Some(hint) = hint {
        prompt.push_str("\n\n");
        prompt.push_str(hint);
    }
    prompt
}

/// Drop the first and last line when the reply is a fenced block.
pub fn strip_fences(reply: &str) -> String {
    let reply = reply.trim();
    if !reply.starts_with("```") {
        return reply.to_string();
    }
    let lines: Vec<&str> = reply.split('\n').collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

pub fn parse_metadata(reply: &str) -> Result<PostMetadata> {
    let json = strip_fences(reply);
    serde_json::from_str(&json).context("Model reply is not valid front matter JSON")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;

    use super::*;

    struct Canned {
        reply: Result<String, String>,
        seen: RefCell<Option<String>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: RefCell::new(None),
            }
        }
    }

    impl Generator for Canned {
        async fn generate(&self, prompt: &str) -> Result<String> {
            *self.seen.borrow_mut() = Some(prompt.to_string());
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    const REPLY: &str = r#"{
        "title": "The Long Night (2025)",
        "slug": "the-long-night-2025",
        "description": "A siege thriller that earns its dark.",
        "tags": ["Thriller", "Siege"],
        "review_type": "retrospective",
        "rating": "4 / 5",
        "spoiler": true,
        "genre_lineage": [{"title": "Assault on Precinct 13 (1976)", "note": "same siege; colder heart"}]
    }"#;

    #[test]
    fn body_truncated_to_budget() {
        let body = "é".repeat(BODY_BUDGET + 500);
        let prompt = build_prompt(&body, None);
        assert_eq!(prompt.matches('é').count(), BODY_BUDGET);
        assert!(prompt.starts_with("You are a metadata generator"));
    }

    #[test]
    fn hint_appended_after_body() {
        let prompt = build_prompt("Body text.", Some("HINTS"));
        assert!(prompt.ends_with("Body text.\n\nHINTS"));
        assert!(!build_prompt("Body text.", None).contains("HINTS"));
    }

    #[test]
    fn fences_stripped() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_fences("```"), "");
    }

    #[test]
    fn parse_plain_and_fenced() {
        let plain = parse_metadata(REPLY).unwrap();
        let fenced = parse_metadata(&format!("```json\n{REPLY}\n```")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain.slug, "the-long-night-2025");
        assert!(plain.spoiler);
        assert_eq!(plain.categories(), vec!["Retrospectives".to_string()]);
        assert_eq!(plain.genre_lineage[0].note, "same siege; colder heart");
    }

    #[test]
    fn parse_failure_is_error() {
        let err = parse_metadata("Sure! Here is your front matter:").unwrap_err();
        assert!(format!("{err:#}").contains("not valid front matter JSON"));
    }

    #[test]
    fn numeric_rating_is_stringified() {
        let meta =
            parse_metadata(r#"{"title":"T","slug":"t","description":"d","rating":4}"#).unwrap();
        assert_eq!(meta.rating, "4");
        let meta =
            parse_metadata(r#"{"title":"T","slug":"t","description":"d","rating":3.5}"#).unwrap();
        assert_eq!(meta.rating, "3.5");
    }

    #[test]
    fn null_free_text_fields_default() {
        let meta = parse_metadata(
            r#"{"title":"T","slug":"t","description":"d","cover_alt":null,"summary":null,
                "genre_lineage":[{"title":"Heat (1995)","note":null}]}"#,
        )
        .unwrap();
        assert_eq!(meta.cover_alt, "");
        assert_eq!(meta.summary(), "d");
        assert_eq!(meta.genre_lineage[0].note, "");
    }

    #[test]
    fn parse_fixture_reply() {
        let raw = std::fs::read_to_string("tests/fixtures/claude_messages.json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap();
        let meta = parse_metadata(text).unwrap();
        assert_eq!(meta.title, "The Long Night (2025)");
        assert_eq!(meta.genre_lineage.len(), 3);
        assert_eq!(meta.summary(), meta.description);
    }

    #[tokio::test]
    async fn synthesize_sends_prompt_once() {
        let generator = Canned::ok(REPLY);
        let meta = synthesize(&generator, "Night falls.", Some("- Heat (1995)"))
            .await
            .unwrap();
        assert_eq!(meta.rating, "4 / 5");
        let prompt = generator.seen.borrow().clone().unwrap();
        assert!(prompt.contains("Night falls."));
        assert!(prompt.ends_with("- Heat (1995)"));
    }

    #[tokio::test]
    async fn service_error_is_terminal() {
        let generator = Canned {
            reply: Err("Claude API error 529: overloaded".into()),
            seen: RefCell::new(None),
        };
        let err = synthesize(&generator, "body", None).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
    }
}

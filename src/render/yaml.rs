//! One formatter per value kind in the front matter block.
//!
//! Every field line goes through here. Two quirks are kept on purpose and
//! pinned by tests: `quoted_raw` does not escape (title), and `seq_or_null`
//! leaves a bare key when empty (tags), which YAML reads back as null.

use crate::meta::LineageEntry;

const INDENT: &str = "  ";

pub fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}

pub fn quoted(key: &str, value: &str) -> String {
    format!("{key}: \"{}\"", escape(value))
}

pub fn quoted_raw(key: &str, value: &str) -> String {
    format!("{key}: \"{value}\"")
}

pub fn boolean(key: &str, value: bool) -> String {
    format!("{key}: {value}")
}

pub fn bare(key: &str, value: &str) -> String {
    format!("{key}: {value}")
}

/// Bulleted list, or `key: []` when empty.
pub fn seq_or_empty(key: &str, items: &[String]) -> String {
    if items.is_empty() {
        return format!("{key}: []");
    }
    format!("{key}:\n{}", bullets(items))
}

/// Bulleted list, or a bare `key:` followed by an empty line when empty.
pub fn seq_or_null(key: &str, items: &[String]) -> String {
    format!("{key}:\n{}", bullets(items))
}

pub fn optional_key(key: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| quoted(key, v))
}

pub fn lineage(key: &str, entries: &[LineageEntry]) -> String {
    if entries.is_empty() {
        return format!("{key}: []");
    }
    let body = entries
        .iter()
        .map(|e| {
            format!(
                "{INDENT}- {}\n{INDENT}  {}",
                quoted("title", &e.title),
                quoted("note", &e.note)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{key}:\n{body}")
}

/// Nested mapping under `key`, one indented line per entry.
pub fn block(key: &str, lines: &[String]) -> String {
    let body = lines
        .iter()
        .map(|l| format!("{INDENT}{l}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{key}:\n{body}")
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("{INDENT}- \"{}\"", escape(i)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_inner_quotes() {
        assert_eq!(quoted("k", r#"say "hi""#), r#"k: "say \"hi\"""#);
        assert_eq!(quoted_raw("k", r#"say "hi""#), r#"k: "say "hi"""#);
    }

    #[test]
    fn booleans_are_lowercase() {
        assert_eq!(boolean("spoiler", true), "spoiler: true");
        assert_eq!(boolean("spoiler", false), "spoiler: false");
    }

    #[test]
    fn empty_sequences_differ_by_kind() {
        assert_eq!(seq_or_empty("keywords", &[]), "keywords: []");
        assert_eq!(seq_or_null("tags", &[]), "tags:\n");
        assert_eq!(lineage("genre_lineage", &[]), "genre_lineage: []");
    }

    #[test]
    fn bullets_are_indented_and_quoted() {
        let items = vec!["Crime".to_string(), "Neo-noir".to_string()];
        assert_eq!(
            seq_or_empty("tags", &items),
            "tags:\n  - \"Crime\"\n  - \"Neo-noir\""
        );
    }

    #[test]
    fn optional_key_absent_for_none() {
        assert!(optional_key("singleImage", None).is_none());
        assert_eq!(
            optional_key("singleImage", Some("hero.jpg")).as_deref(),
            Some("singleImage: \"hero.jpg\"")
        );
    }
}

pub mod yaml;

use chrono::NaiveDate;

use crate::config::AUTHOR;
use crate::meta::PostMetadata;

const DELIMITER: &str = "---";

/// Hugo front matter for a post, delimited by `---` lines.
pub fn render_header(
    meta: &PostMetadata,
    cover: &str,
    date: NaiveDate,
    single_image: Option<&str>,
    letterboxd: Option<&str>,
) -> String {
    let mut cover_lines = vec![
        yaml::quoted("image", cover),
        yaml::quoted("alt", &meta.cover_alt),
        yaml::quoted("caption", ""),
        yaml::boolean("relative", true),
    ];
    if let Some(line) = yaml::optional_key("singleImage", single_image) {
        cover_lines.push(line);
        cover_lines.push(yaml::quoted("singleImageAlt", &meta.cover_alt));
    }

    let lines = [
        DELIMITER.to_string(),
        yaml::quoted_raw("title", &meta.title),
        yaml::bare("date", &format!("{}T12:00:00Z", date.format("%Y-%m-%d"))),
        yaml::boolean("draft", false),
        yaml::quoted("slug", &meta.slug),
        yaml::quoted("author", AUTHOR),
        yaml::quoted("description", &meta.description),
        yaml::seq_or_null("tags", &meta.tags),
        yaml::seq_or_empty("categories", &meta.categories()),
        yaml::seq_or_empty("keywords", &meta.keywords),
        yaml::boolean("showToc", false),
        yaml::block("cover", &cover_lines),
        yaml::quoted("letterboxd_url", letterboxd.unwrap_or("")),
        yaml::quoted("summary", meta.summary()),
        yaml::quoted("rating", &meta.rating),
        yaml::boolean("spoiler", meta.spoiler),
        yaml::quoted("review_type", &meta.review_type),
        yaml::quoted("refraction_quote", &meta.refraction_quote),
        yaml::lineage("genre_lineage", &meta.genre_lineage),
        DELIMITER.to_string(),
    ];
    lines.join("\n")
}

pub fn figure(image: &str) -> String {
    format!("{{{{< figure src=\"{image}\" alt=\"\" caption=\"\" >}}}}")
}

/// Split a plain-text body into trimmed, non-empty paragraphs.
pub fn paragraphs(body: &str) -> Vec<&str> {
    body.trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Markdown body with inline images spread evenly between paragraphs.
///
/// Image k goes after paragraph `stride * (k + 1) - 1`. Positions at or past
/// the last paragraph are skipped, so surplus images are dropped.
pub fn render_body(body: &str, images: &[String]) -> String {
    let paras = paragraphs(body);
    if images.is_empty() {
        return paras.join("\n\n");
    }

    let total = paras.len();
    let mut placements: Vec<(usize, &str)> = Vec::new();
    if total > 1 {
        let stride = (total / (images.len() + 1)).max(1);
        for (k, image) in images.iter().enumerate() {
            let pos = stride * (k + 1);
            if pos < total {
                placements.push((pos - 1, image.as_str()));
            }
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(total + placements.len());
    let mut pending = placements.into_iter().peekable();
    for (i, para) in paras.iter().enumerate() {
        out.push((*para).to_string());
        if let Some((_, image)) = pending.next_if(|(after, _)| *after == i) {
            out.push(figure(image));
        }
    }
    out.join("\n\n")
}

/// Header, a blank line, the body and a trailing newline.
pub fn assemble(header: &str, body: &str) -> String {
    format!("{header}\n\n{body}\n")
}

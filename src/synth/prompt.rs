/// Instruction template sent to the model. `{body}` is replaced with the
/// truncated post text; the similar-films hint block is appended after it.
pub const FRONT_MATTER_PROMPT: &str = r#"You are a metadata generator for a film review blog called "Reel Refractions".
Given the blog post text below, generate Hugo front matter as a single JSON object with these fields:

- title: The post title (include the film name and year if mentioned)
- slug: URL-friendly slug derived from the title (lowercase, hyphens only)
- description: One concise sentence for SEO/OpenGraph (max 160 characters)
- summary: One or two sentences capturing the review's verdict, written in the author's voice
- tags: Array of 4 to 10 tags (film title, genre, director, lead actors, themes)
- keywords: Array of 3 to 6 broad SEO keywords
- cover_alt: Alt text describing a likely promotional still for the film (one sentence)
- review_type: Exactly one of "new-release", "revisit", "retrospective", "quick-take"
- rating: The author's rating in the form "X / 5" (half points allowed, e.g. "3.5 / 5"); infer it from the tone if it is not stated
- spoiler: true if the post discusses the ending or major twists, otherwise false
- refraction_quote: One striking sentence from the post, or a close paraphrase, suitable as a pull quote
- genre_lineage: Array of 3 to 5 objects, each {"title": "Film Title (Year)", "note": "..."}

Rules for genre_lineage:
- Avoid the obvious comparisons a casual viewer would make first.
- Mix decades; do not pick more than two films from the same decade.
- Every note is two short clauses: what the films share, then how this film differs.
- Never list the reviewed film itself.

Return ONLY valid JSON, no markdown fences, no explanation.

Post text:
{body}"#;

/// Header line for the TMDB hint block.
pub const SIMILAR_HEADER: &str =
    "Films TMDB lists as similar (treat as loose inspiration for genre_lineage, not a required list):";

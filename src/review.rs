use std::io::{BufRead, Write};

use anyhow::Result;

use crate::meta::PostMetadata;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Confirm,
    Edit,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "c" => Some(Self::Confirm),
            "e" => Some(Self::Edit),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

/// A string field the author may overwrite during review.
pub struct EditableField {
    pub label: &'static str,
    get: fn(&PostMetadata) -> &str,
    set: fn(&mut PostMetadata, String),
}

pub const EDITABLE_FIELDS: &[EditableField] = &[
    EditableField { label: "Title", get: get_title, set: set_title },
    EditableField { label: "Description", get: get_description, set: set_description },
    EditableField { label: "Slug", get: get_slug, set: set_slug },
    EditableField { label: "Rating", get: get_rating, set: set_rating },
    EditableField { label: "Review type", get: get_review_type, set: set_review_type },
];

fn get_title(m: &PostMetadata) -> &str {
    &m.title
}
fn set_title(m: &mut PostMetadata, v: String) {
    m.title = v;
}
fn get_description(m: &PostMetadata) -> &str {
    &m.description
}
fn set_description(m: &mut PostMetadata, v: String) {
    m.description = v;
}
fn get_slug(m: &PostMetadata) -> &str {
    &m.slug
}
fn set_slug(m: &mut PostMetadata, v: String) {
    m.slug = v;
}
fn get_rating(m: &PostMetadata) -> &str {
    &m.rating
}
fn set_rating(m: &mut PostMetadata, v: String) {
    m.rating = v;
}
fn get_review_type(m: &PostMetadata) -> &str {
    &m.review_type
}
fn set_review_type(m: &mut PostMetadata, v: String) {
    m.review_type = v;
}

/// Show the rendered header and loop on confirm / edit / quit.
///
/// EOF on `input` is treated as quit.
pub fn review<R, W, F>(meta: &mut PostMetadata, render: F, input: &mut R, out: &mut W) -> Result<Outcome>
where
    R: BufRead,
    W: Write,
    F: Fn(&PostMetadata) -> String,
{
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\nGENERATED FRONT MATTER\n{rule}\n{}\n{rule}", render(meta))?;

    let labels: Vec<String> = EDITABLE_FIELDS.iter().map(|f| f.label.to_lowercase()).collect();
    loop {
        write!(out, "\n[C]onfirm, [E]dit {}, or [Q]uit? ", labels.join("/"))?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(Outcome::Cancelled);
        };
        match Command::parse(&line) {
            Some(Command::Confirm) => return Ok(Outcome::Confirmed),
            Some(Command::Quit) => return Ok(Outcome::Cancelled),
            Some(Command::Edit) => {
                for field in EDITABLE_FIELDS {
                    write!(out, "  {} [{}]: ", field.label, (field.get)(meta))?;
                    out.flush()?;
                    let Some(answer) = read_line(input)? else {
                        return Ok(Outcome::Cancelled);
                    };
                    let answer = answer.trim();
                    if !answer.is_empty() {
                        (field.set)(meta, answer.to_string());
                    }
                }
                writeln!(out, "\nUpdated front matter:\n{}", render(meta))?;
            }
            None => {}
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

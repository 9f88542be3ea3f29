//! CLI presentation: text and json formatters for heads and threads.

use crate::error::FetchError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::sync::Arc;

const PREVIEW_CHARS: usize = 25;

/// Single-line preview: newlines flattened, truncated with ".."
pub fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let mut out: String = flat.chars().take(PREVIEW_CHARS).collect();
    if flat.chars().count() > PREVIEW_CHARS {
        out.push_str("..");
    }
    out
}

fn placeholder(error: &FetchError) -> String {
    format!("[unavailable: {}]", error)
}

/// One row of the heads listing
#[derive(Debug, Clone, Serialize)]
pub struct HeadRow {
    pub id: String,
    pub role: Option<String>,
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HeadRow {
    pub fn new(id: String, role: Option<String>, content: Result<Arc<str>, FetchError>) -> Self {
        match content {
            Ok(text) => Self {
                id,
                role,
                preview: Some(preview(&text)),
                error: None,
            },
            Err(e) => Self {
                id,
                role,
                preview: None,
                error: Some(placeholder(&e)),
            },
        }
    }
}

/// One frame of a rendered thread
#[derive(Debug, Clone, Serialize)]
pub struct ThreadEntry {
    pub id: String,
    pub role: Option<String>,
    pub hash: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ThreadEntry {
    pub fn new(
        id: String,
        role: Option<String>,
        hash: String,
        content: Result<Arc<str>, FetchError>,
    ) -> Self {
        let (content, error) = match content {
            Ok(text) => (Some(text.to_string()), None),
            Err(e) => (None, Some(placeholder(&e))),
        };
        Self {
            id,
            role,
            hash,
            content,
            error,
        }
    }
}

pub fn format_section_heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

/// Heads as a table, newest identifier first
pub fn format_heads_text(rows: &[HeadRow], color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Heads", color)));
    if rows.is_empty() {
        out.push_str("No threads.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Head", "Role", "Preview"]);
    for row in rows {
        let shown = match (&row.preview, &row.error) {
            (Some(p), _) => p.clone(),
            (None, Some(e)) => e.clone(),
            (None, None) => "Loading...".to_string(),
        };
        table.add_row(vec![
            row.id.clone(),
            row.role.clone().unwrap_or_else(|| "-".to_string()),
            shown,
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Thread frames, newest first, each with its full content
pub fn format_thread_text(head_id: &str, entries: &[ThreadEntry], color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Thread {}", head_id), color)
    ));
    if entries.is_empty() {
        out.push_str("No frames.\n");
        return out;
    }
    for entry in entries {
        let role = entry.role.as_deref().unwrap_or("-");
        if color {
            out.push_str(&format!("{}  {}\n", role.bold(), entry.id.dimmed()));
        } else {
            out.push_str(&format!("{}  {}\n", role, entry.id));
        }
        match (&entry.content, &entry.error) {
            (Some(text), _) => out.push_str(text),
            (None, Some(e)) => out.push_str(e),
            (None, None) => out.push_str("Loading..."),
        }
        out.push_str("\n\n");
    }
    out
}

//! Listing of stored transcripts.

use std::fmt::Write;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use middleman_core::transcript::escape_html;
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

/// One stored transcript document.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptFile {
    pub filename: String,
    pub display_name: String,
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct TranscriptListResponse {
    pub transcripts: Vec<TranscriptFile>,
    pub count: usize,
}

/// Python-style title case: a letter is upper-cased when it follows a non-letter.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Human-readable name for a transcript filename.
pub fn display_name(filename: &str) -> String {
    let stem = filename.strip_suffix(".html").unwrap_or(filename);
    let stem = stem.strip_prefix("transcript-").unwrap_or(stem);
    title_case(&stem.replace('-', " "))
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

/// Stored `*.html` documents, newest filename first.
///
/// A missing directory lists as empty.
pub async fn list_transcript_files(dir: &Path) -> std::io::Result<Vec<TranscriptFile>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };
        if !filename.ends_with(".html") {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();
        files.push(TranscriptFile {
            display_name: display_name(&filename),
            filename,
            modified,
            size_bytes: metadata.len(),
        });
    }

    files.sort_by(|a, b| b.filename.cmp(&a.filename));
    Ok(files)
}

/// Render the index page.
pub fn render_index(files: &[TranscriptFile]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Ticket Transcripts</title>\n</head>\n<body>\n<h1>Ticket Transcripts</h1>\n",
    );

    if files.is_empty() {
        html.push_str("<p>No transcripts yet.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for file in files {
            let _ = writeln!(
                html,
                "<li><a href=\"/transcripts/{}\">{}</a> <small>{} UTC, {}</small></li>",
                urlencoding::encode(&file.filename),
                escape_html(&file.display_name),
                file.modified.format("%Y-%m-%d %H:%M:%S"),
                format_size(file.size_bytes),
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// GET / - HTML index of stored transcripts.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match list_transcript_files(state.transcripts_dir()).await {
        Ok(files) => Html(render_index(&files)).into_response(),
        Err(e) => {
            error!(error = %e, dir = %state.transcripts_dir().display(), "Failed to list transcripts");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list transcripts").into_response()
        }
    }
}

/// GET /api/v1/transcripts - the same listing as JSON.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    match list_transcript_files(state.transcripts_dir()).await {
        Ok(transcripts) => Json(TranscriptListResponse {
            count: transcripts.len(),
            transcripts,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list transcripts");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

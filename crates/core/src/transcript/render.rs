//! Pure HTML rendering of transcript records.

use std::fmt::Write;

use super::TranscriptRecord;

const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STYLE: &str = r#"        body { font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }
        .container { max-width: 1000px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 4px 20px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; border-bottom: 2px solid #eee; padding-bottom: 20px; }
        .message { margin: 15px 0; padding: 15px; border-left: 4px solid #007bff; background: #f8f9fa; border-radius: 4px; }
        .timestamp { color: #6c757d; font-size: 0.9em; margin-bottom: 5px; }
        .author { font-weight: bold; color: #495057; }
        .content { margin: 5px 0; line-height: 1.5; white-space: pre-wrap; }
        .attachments { margin-top: 10px; }
        .attachment { display: block; color: #007bff; text-decoration: none; margin: 5px 0; }
        .attachment:hover { text-decoration: underline; }
        .back-link { display: inline-block; margin-top: 20px; color: #6c757d; text-decoration: none; }
        .back-link:hover { color: #495057; }
"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only http(s) links survive into `href`.
fn safe_href(url: &str) -> String {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        escape_html(url.trim())
    } else {
        "#".to_string()
    }
}

/// Render a record as a self-contained HTML document.
///
/// Output depends only on the record.
pub fn render_html(record: &TranscriptRecord) -> String {
    let title = escape_html(record.channel_name());
    let mut html = String::with_capacity(2048 + record.entries().len() * 256);

    // write! into a String cannot fail
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Transcript #{title}</title>
    <style>
{style}    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Transcript #{title}</h1>
            <p>Generated on {generated} UTC</p>
            <a href="/" class="back-link">&larr; Back to all transcripts</a>
        </div>
        <div class="messages">
"#,
        title = title,
        style = STYLE,
        generated = record.generated_at().format(DISPLAY_TIMESTAMP_FORMAT),
    );

    for entry in record.entries() {
        let _ = write!(
            html,
            r#"            <div class="message">
                <div class="timestamp">{}</div>
                <div class="author">{}</div>
                <div class="content">{}</div>
"#,
            entry.timestamp.format(DISPLAY_TIMESTAMP_FORMAT),
            escape_html(&entry.author),
            escape_html(&entry.content),
        );

        if !entry.attachments.is_empty() {
            html.push_str("                <div class=\"attachments\">\n");
            for attachment in &entry.attachments {
                let _ = writeln!(
                    html,
                    r#"                    <a href="{}" class="attachment" target="_blank" rel="noopener">&#128206; {}</a>"#,
                    safe_href(&attachment.url),
                    escape_html(&attachment.filename),
                );
            }
            html.push_str("                </div>\n");
        }

        html.push_str("            </div>\n");
    }

    html.push_str(
        r#"        </div>
    </div>
</body>
</html>
"#,
    );
    html
}

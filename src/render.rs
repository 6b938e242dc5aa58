//! Turning page markup into text an LLM can read

use serde::{Deserialize, Serialize};

/// Convert HTML to cleaned-up markdown
pub fn render_markdown(html: &str) -> String {
    clean_markdown(&html2md::parse_html(html))
}

/// Tidy converter output: collapse runs of blank lines, use `-` for every bullet, trim
pub fn clean_markdown(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for line in markdown.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push(String::new());
            continue;
        }
        blank_run = 0;

        match line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
            Some(item) => lines.push(format!("- {}", item)),
            None => lines.push(line.to_string()),
        }
    }

    lines.join("\n").trim().to_string()
}

/// Record of a cut applied to over-long content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    /// Characters kept
    pub limit: usize,
    /// Characters in the content before cutting
    pub original_len: usize,
}

impl Truncation {
    /// Human-readable trailer appended after the kept content
    pub fn notice(&self) -> String {
        format!(
            "... (output truncated after {} chars, full content was {} chars)",
            self.limit, self.original_len
        )
    }
}

/// Keep at most `limit` characters of `content`
///
/// Counts `char`s, so a multi-byte character is never split.
pub fn truncate(content: String, limit: usize) -> (String, Option<Truncation>) {
    let original_len = content.chars().count();
    if original_len <= limit {
        return (content, None);
    }

    let cut = content.char_indices().nth(limit).map(|(idx, _)| idx).unwrap_or(content.len());
    let mut kept = content;
    kept.truncate(cut);

    (kept, Some(Truncation { limit, original_len }))
}

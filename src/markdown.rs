// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Pure markdown and HTML formatting helpers exposed to templates.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Glyph rendered for `true` values.
pub const CHECK_MARK: &str = ":white_check_mark:";
/// Glyph rendered for `false` values.
pub const CROSS_MARK: &str = ":x:";

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*\[.*\]\(.*\)").expect("valid markdown link regex"));
static PROFILE_LINK_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*\]\(.*/|\)").expect("valid profile link regex"));

/// Builds a table of contents from the `## ` and `### ` headings of `text`.
///
/// Only single-word headings are listed. Anchors are the lowercased heading.
///
/// # Examples
///
/// ```
/// use yaml_readme::generate_toc;
///
/// let toc = generate_toc("## Good\ncontent\n### Better\n## This is skipped");
/// assert_eq!(toc, "- [Good](#good)\n - [Better](#better)\n");
/// ```
pub fn generate_toc(text: &str) -> String {
    let mut toc = String::new();
    for line in text.lines() {
        let (prefix, heading) = if let Some(heading) = line.strip_prefix("## ") {
            ("- ", heading)
        } else if let Some(heading) = line.strip_prefix("### ") {
            (" - ", heading)
        } else {
            continue;
        };

        let heading = heading.trim();
        if heading.is_empty() || heading.split_whitespace().nth(1).is_some() {
            continue;
        }

        toc.push_str(&format!(
            "{prefix}[{heading}](#{})\n",
            heading.to_lowercase()
        ));
    }
    toc
}

/// Returns a markdown link, or `text` alone when `link` is empty.
pub fn link(text: &str, link: &str) -> String {
    if link.is_empty() {
        text.to_owned()
    } else {
        format!("[{text}]({link})")
    }
}

/// Like [`link`], but empty when no link would be produced.
pub fn link_or_empty(text: &str, target: &str) -> String {
    let output = link(text, target);
    if output == text { String::new() } else { output }
}

/// Renders a table cell value: booleans become check or cross glyphs,
/// strings pass through and anything else is empty.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => CHECK_MARK.to_owned(),
        Value::Bool(false) => CROSS_MARK.to_owned(),
        Value::String(text) => text.clone(),
        _ => String::new()
    }
}

/// Star-history chart for `owner/repo`, linked to its page.
pub fn star_history(owner: &str, repo: &str) -> String {
    format!(
        "[![Star History Chart](https://api.star-history.com/svg?repos={owner}/{repo}&type=Date)](https://star-history.com/#{owner}/{repo}&Date)"
    )
}

/// Visitor counter badge for `id`.
pub fn visitor_count(id: &str) -> String {
    format!("![Visitor Count](https://profile-counter.glitch.me/{id}/count.svg)")
}

/// Octocat emoji linking to the GitHub profile of `user`.
pub fn emoji_link(user: &str) -> String {
    if user.is_empty() {
        return String::new();
    }
    link(":octocat:", &format!("https://github.com/{user}"))
}

/// Returns `true` when `text` contains a markdown-style link.
pub fn has_link(text: &str) -> bool {
    MARKDOWN_LINK.is_match(text)
}

/// Extracts the GitHub id from a markdown profile link such as
/// `[Name](https://github.com/id)`.
pub fn id_from_link(text: &str) -> String {
    PROFILE_LINK_NOISE.replace_all(text, "").into_owned()
}

/// Escapes text for use inside HTML attributes and elements.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

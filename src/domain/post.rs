use chrono::{DateTime, Utc};

use regex::Regex;

use serde::Serialize;

use unicode_segmentation::UnicodeSegmentation;

const EXCERPT_MAX_LEN: usize = 200;
const WORDS_PER_MINUTE: usize = 200;

/// A blog post republished from an external feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPost {
    pub title: String,
    /// Plain-text summary
    pub excerpt: String,
    /// Link to the original post, unique within a single feed fetch
    pub url: String,
    pub published_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Estimated reading time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
}

lazy_static::lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref IMG_SRC_REGEX: Regex = Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap();
}

/// Strip markup from an HTML fragment and decode the common entities
fn html_to_text(html: &str) -> String {
    let text = TAG_REGEX.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text excerpt of an HTML fragment, cut on a grapheme boundary.
///
/// Returns `None` when the fragment has no text at all.
pub fn excerpt_from_html(html: &str) -> Option<String> {
    let text = html_to_text(html);
    if text.is_empty() {
        return None;
    }
    if text.graphemes(true).count() <= EXCERPT_MAX_LEN {
        return Some(text);
    }

    let mut excerpt: String = text.graphemes(true).take(EXCERPT_MAX_LEN).collect();
    excerpt.truncate(excerpt.trim_end().len());
    excerpt.push('…');
    Some(excerpt)
}

/// Reading time in whole minutes, at least one for any non-empty text
pub fn read_time_minutes(html: &str) -> Option<u32> {
    let words = html_to_text(html).split_whitespace().count();
    if words == 0 {
        return None;
    }
    let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
    u32::try_from(minutes).ok()
}

/// The `src` of the first `<img>` in an HTML fragment
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC_REGEX
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|src| src.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
}

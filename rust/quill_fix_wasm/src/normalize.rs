// Corrections applied to the editor's serialized HTML.
//
// The editor writes a blank line as `<p></p>`, which browsers collapse to zero
// height, and it silently swaps typed spaces for non-breaking ones. Both
// rewrites are plain substitutions over the whole string and are idempotent.

use crate::config::FixConfig;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref EMPTY_PARAGRAPH: Regex = Regex::new(r"<p></p>").unwrap();
    static ref NBSP: Regex = Regex::new("&nbsp;|\u{00A0}").unwrap();
}

pub fn fix_empty_paragraphs(html: &str) -> Cow<'_, str> {
    EMPTY_PARAGRAPH.replace_all(html, "<p><br></p>")
}

pub fn convert_nbsp_to_space(html: &str) -> Cow<'_, str> {
    NBSP.replace_all(html, " ")
}

/// Applies every HTML fix.
pub fn normalize_html(html: &str) -> String {
    normalize_html_with(html, &FixConfig::default())
}

pub fn normalize_html_with(html: &str, config: &FixConfig) -> String {
    let mut out = html.to_string();
    if config.empty_paragraphs {
        out = fix_empty_paragraphs(&out).into_owned();
    }
    if config.nbsp {
        out = convert_nbsp_to_space(&out).into_owned();
    }
    out
}

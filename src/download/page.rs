//! Download link scraping for sources that only publish a landing page.
//!
//! The markup is not an API; when the page layout changes this is where runs
//! start failing with "no download link found".

use crate::error::{SetupError, SetupResult};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

struct Patterns {
    anchor_href: Regex,
    comment: Regex,
    raw_text: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Patterns {
            anchor_href: Regex::new(
                r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
            )?,
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            // Elements whose content is text, never markup
            raw_text: Regex::new(
                r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<template\b[^>]*>.*?</template\s*>",
            )?,
        })
    }
}

static PATTERNS: LazyLock<Result<Patterns, regex::Error>> = LazyLock::new(Patterns::compile);

fn patterns() -> SetupResult<&'static Patterns> {
    PATTERNS
        .as_ref()
        .map_err(|e| SetupError::Config(format!("invalid link pattern: {e}")))
}

/// Markup with comments and script, style and template bodies removed
fn visible_markup<'a>(patterns: &Patterns, html: &'a str) -> Cow<'a, str> {
    match patterns.comment.replace_all(html, "") {
        Cow::Borrowed(html) => patterns.raw_text.replace_all(html, ""),
        Cow::Owned(html) => Cow::Owned(patterns.raw_text.replace_all(&html, "").into_owned()),
    }
}

/// `href` values of all rendered anchors in document order, as written in
/// the markup
pub fn anchor_hrefs(html: &str) -> SetupResult<Vec<String>> {
    let patterns = patterns()?;
    let markup = visible_markup(patterns, html);
    Ok(patterns
        .anchor_href
        .captures_iter(&markup)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        })
        .collect())
}

/// Scheme and host of `url`, e.g. `https://example.com` for
/// `https://example.com/files/1/`
pub fn origin_of(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let host_start = scheme_end + 3;
            match url[host_start..].find(['/', '?', '#']) {
                Some(path_start) => &url[..host_start + path_start],
                None => url,
            }
        }
        None => "",
    }
}

/// Locate the download link on a landing page.
///
/// The first anchor whose `href` contains `marker` wins. Its `&amp;` entities
/// are decoded and a relative link is completed with the origin of
/// `page_url`.
pub fn extract_download_link(html: &str, page_url: &str, marker: &str) -> SetupResult<String> {
    let href = anchor_hrefs(html)?
        .into_iter()
        .find(|href| href.contains(marker))
        .ok_or_else(|| SetupError::NoDownloadLink {
            page: page_url.to_string(),
        })?;

    let link = href.trim().replace("&amp;", "&");

    if link.to_lowercase().starts_with("http") {
        return Ok(link);
    }

    let origin = origin_of(page_url);
    if link.starts_with('/') {
        Ok(format!("{origin}{link}"))
    } else {
        Ok(format!("{origin}/{link}"))
    }
}

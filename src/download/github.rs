use crate::download::Transport;
use crate::error::{SetupError, SetupResult};
use crate::models::{GitHubRelease, ReleaseTag};
use crate::vars::TemplateVars;

/// Tag of the newest release in a GitHub "list releases" feed.
///
/// Only the first entry is read; older entries may be in any shape.
pub fn latest_release_tag(transport: &dyn Transport, feed_url: &str) -> SetupResult<ReleaseTag> {
    let body = transport.get_text(feed_url)?;

    let releases: Vec<serde_json::Value> = serde_json::from_str(&body)
        .map_err(|e| SetupError::parse(feed_url, format!("invalid release list JSON: {e}")))?;

    let newest = releases
        .into_iter()
        .next()
        .ok_or_else(|| SetupError::parse(feed_url, "release list is empty"))?;

    let release: GitHubRelease = serde_json::from_value(newest)
        .map_err(|e| SetupError::parse(feed_url, format!("invalid release entry: {e}")))?;

    tracing::debug!("Latest release on {feed_url}: {}", release.tag_name);
    Ok(ReleaseTag::new(release.tag_name))
}

/// Download URL of a release asset, e.g.
/// `https://github.com/owner/repo/releases/download/${tag}/${file}`
pub fn release_asset_url(template: &str, tag: &ReleaseTag, file_name: &str) -> SetupResult<String> {
    TemplateVars::new()
        .with("tag", tag.as_str())
        .with("file", file_name)
        .expand(template)
}

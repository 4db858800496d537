use crate::download::Transport;
use crate::error::{SetupError, SetupResult};
use crate::models::{BuildArtifact, BuildId, BuildList};
use crate::vars::TemplateVars;

/// Id of the newest build in an Azure DevOps builds listing. The feed URL
/// is expected to filter for successful builds already.
pub fn latest_build_id(transport: &dyn Transport, feed_url: &str) -> SetupResult<BuildId> {
    let body = transport.get_text(feed_url)?;
    let builds: BuildList = serde_json::from_str(&body)
        .map_err(|e| SetupError::parse(feed_url, format!("invalid build list: {e}")))?;

    builds
        .value
        .into_iter()
        .next()
        .map(|build| build.id)
        .ok_or_else(|| SetupError::parse(feed_url, "no successful build found"))
}

/// Direct download URL of the named artifact of build `build_id`
pub fn artifact_download_url(
    transport: &dyn Transport,
    artifact_template: &str,
    build_id: &BuildId,
    artifact_name: &str,
) -> SetupResult<String> {
    let url = TemplateVars::new()
        .with("build_id", build_id.to_string())
        .with("artifact", artifact_name)
        .expand(artifact_template)?;

    let body = transport.get_text(&url)?;
    let artifact: BuildArtifact = serde_json::from_str(&body)
        .map_err(|e| SetupError::parse(&url, format!("invalid artifact: {e}")))?;

    Ok(artifact.resource.download_url)
}

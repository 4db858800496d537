use crate::config::SetupConfig;
use crate::download::{Transport, azure, github};
use crate::error::{SetupError, SetupResult};
use crate::models::{BuildId, ReleaseChannel, ReleaseTag};
use std::fmt;

/// Where the plugin bundle of this run comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginRelease {
    /// A tagged release that matches the latest base application release
    Tagged(ReleaseTag),
    /// An artifact of a successful CI build
    CiBuild(BuildId),
}

impl fmt::Display for PluginRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginRelease::Tagged(tag) => write!(f, "release {tag}"),
            PluginRelease::CiBuild(id) => write!(f, "CI build {id}"),
        }
    }
}

/// Result of release resolution: which plugin bundle to get and from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub release: PluginRelease,
    pub plugin_url: String,
}

/// Decide which plugin bundle to install on `channel`.
///
/// Nothing is downloaded here. On Stable the newest plugin and base tags
/// must agree; on BleedingEdge the newest successful CI build is trusted.
pub fn resolve(
    transport: &dyn Transport,
    config: &SetupConfig,
    channel: ReleaseChannel,
) -> SetupResult<Resolution> {
    match channel {
        ReleaseChannel::Stable => resolve_stable(transport, config),
        ReleaseChannel::BleedingEdge => resolve_bleeding_edge(transport, config),
    }
}

fn resolve_stable(transport: &dyn Transport, config: &SetupConfig) -> SetupResult<Resolution> {
    println!("Determining latest plugin release ...");

    let plugin_tag = github::latest_release_tag(transport, &config.plugins.releases_feed)?;
    let base_tag = github::latest_release_tag(transport, &config.base.releases_feed)?;

    if !plugin_tag.is_compatible_with(&base_tag) {
        return Err(SetupError::VersionMismatch {
            plugin: plugin_tag.to_string(),
            base: base_tag.to_string(),
        });
    }

    let plugin_url = github::release_asset_url(
        &config.plugins.download_template,
        &plugin_tag,
        &config.plugins.archive_name,
    )?;

    tracing::info!("Plugin release {plugin_tag} matches base release {base_tag}");
    Ok(Resolution {
        release: PluginRelease::Tagged(plugin_tag),
        plugin_url,
    })
}

fn resolve_bleeding_edge(
    transport: &dyn Transport,
    config: &SetupConfig,
) -> SetupResult<Resolution> {
    println!("Determining latest plugin build ...");

    let builds_feed = crate::vars::TemplateVars::new().expand(&config.plugins.builds_feed)?;
    let build_id = azure::latest_build_id(transport, &builds_feed)?;
    let plugin_url = azure::artifact_download_url(
        transport,
        &config.plugins.artifact_template,
        &build_id,
        &config.plugins.artifact_name,
    )?;

    tracing::info!("Using plugin CI build {build_id}");
    Ok(Resolution {
        release: PluginRelease::CiBuild(build_id),
        plugin_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{FakeTransport, bleeding_edge_feeds, stable_feeds};

    #[test]
    fn test_stable_matching_tags() {
        let config = SetupConfig::default();
        let transport = stable_feeds(FakeTransport::new(), &config, "v1.2.0", "v1.2.0");

        let resolution = resolve(&transport, &config, ReleaseChannel::Stable).unwrap();

        assert_eq!(
            resolution.release,
            PluginRelease::Tagged(ReleaseTag::new("v1.2.0"))
        );
        assert_eq!(
            resolution.plugin_url,
            "https://github.com/santacrab2/PKHeX-Plugins/releases/download/v1.2.0/PKHeX-Plugins.zip"
        );
    }

    #[test]
    fn test_stable_tags_differing_in_case() {
        let config = SetupConfig::default();
        let transport = stable_feeds(FakeTransport::new(), &config, "V1.2.0", "v1.2.0");

        let resolution = resolve(&transport, &config, ReleaseChannel::Stable).unwrap();
        // The plugin's own spelling builds its download URL
        assert!(resolution.plugin_url.contains("/download/V1.2.0/"));
    }

    #[test]
    fn test_stable_mismatch_aborts() {
        let config = SetupConfig::default();
        let transport = stable_feeds(FakeTransport::new(), &config, "v1.2.0", "v1.3.0");

        let err = resolve(&transport, &config, ReleaseChannel::Stable).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(matches!(
            err,
            SetupError::VersionMismatch { ref plugin, ref base } if plugin == "v1.2.0" && base == "v1.3.0"
        ));
        assert!(transport.downloads().is_empty());
    }

    #[test]
    fn test_stable_feed_failure_surfaces_network_error() {
        let config = SetupConfig::default();
        let transport = FakeTransport::new().with_text(
            &config.plugins.releases_feed,
            r#"[{"tag_name": "v1.2.0"}]"#,
        );

        let err = resolve(&transport, &config, ReleaseChannel::Stable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_bleeding_edge_uses_artifact_url_without_tag_check() {
        let config = SetupConfig::default();
        let transport = bleeding_edge_feeds(
            FakeTransport::new(),
            &config,
            "4821",
            "https://dev.azure.com/artifacts/4821/PKHeX-Plugins.zip",
        );

        let resolution = resolve(&transport, &config, ReleaseChannel::BleedingEdge).unwrap();

        assert_eq!(resolution.release.to_string(), "CI build 4821");
        assert_eq!(
            resolution.plugin_url,
            "https://dev.azure.com/artifacts/4821/PKHeX-Plugins.zip"
        );
        assert!(
            !transport
                .requests()
                .iter()
                .any(|url| url.contains("api.github.com"))
        );
    }
}

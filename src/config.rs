use crate::error::{SetupError, SetupResult};
use crate::models::{ReleaseChannel, StalePattern};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one setup run. Every field has a built-in default, so a
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SetupConfig {
    /// User-Agent sent with every request (the GitHub API rejects requests without one)
    pub user_agent: String,
    /// Path fragments of synchronized-storage providers, matched case-insensitively
    pub sync_providers: Vec<String>,
    /// Process name of the base application; running instances are terminated
    pub process_name: Option<String>,
    pub base: BaseSource,
    pub plugins: PluginSource,
    pub install: InstallLayout,
}

/// Where the base application comes from
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BaseSource {
    pub archive_name: String,
    /// Landing page scraped for the stable build
    pub stable_page: String,
    /// Landing page scraped for the development build
    pub dev_page: String,
    /// Substring of the `href` that marks the download anchor
    pub link_marker: String,
    /// Release feed whose newest tag the plugins must match
    pub releases_feed: String,
}

/// Where the plugin bundle comes from
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PluginSource {
    pub archive_name: String,
    pub releases_feed: String,
    /// Release asset URL, expanded with `${tag}` and `${file}`
    pub download_template: String,
    /// Latest successful CI build listing
    pub builds_feed: String,
    /// CI artifact lookup, expanded with `${build_id}` and `${artifact}`
    pub artifact_template: String,
    pub artifact_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InstallLayout {
    pub plugins_dir: String,
    pub stale_patterns: Vec<String>,
    pub flatten: FlattenByChannel,
}

/// Which channels ship the plugin payload wrapped in an extra directory.
///
/// Writing an `[install.flatten]` table replaces the built-in mapping, so a
/// channel left out of it is not flattened.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FlattenByChannel {
    pub stable: Option<FlattenRule>,
    pub bleeding_edge: Option<FlattenRule>,
}

/// `plugins/<nested_dir>/<payload>` is moved up to `plugins/<payload>`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FlattenRule {
    pub nested_dir: String,
    pub payload: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; PKHeXDownloader)".to_string(),
            sync_providers: vec![
                "OneDrive".to_string(),
                "Dropbox".to_string(),
                "Mega".to_string(),
            ],
            process_name: Some("pkhex".to_string()),
            base: BaseSource::default(),
            plugins: PluginSource::default(),
            install: InstallLayout::default(),
        }
    }
}

impl Default for BaseSource {
    fn default() -> Self {
        Self {
            archive_name: "PKHeX.zip".to_string(),
            stable_page: "https://projectpokemon.org/home/files/file/1-pkhex/".to_string(),
            dev_page: "https://projectpokemon.org/home/files/file/2445-pkhex-development-build/"
                .to_string(),
            link_marker: "do=download".to_string(),
            releases_feed: "https://api.github.com/repos/kwsch/PKHeX/releases".to_string(),
        }
    }
}

const AZURE_PROJECT: &str =
    "https://dev.azure.com/santacrab2/6b94199c-1e18-4ecc-9df5-7957a6984c60/_apis/build/builds";

impl Default for PluginSource {
    fn default() -> Self {
        Self {
            archive_name: "PKHeX-Plugins.zip".to_string(),
            releases_feed: "https://api.github.com/repos/santacrab2/PKHeX-Plugins/releases"
                .to_string(),
            download_template:
                "https://github.com/santacrab2/PKHeX-Plugins/releases/download/${tag}/${file}"
                    .to_string(),
            // `$$` keeps the literal `$top` query parameter
            builds_feed: format!(
                "{AZURE_PROJECT}?definitions=1&$$top=1&resultFilter=succeeded&api-version=6.0"
            ),
            artifact_template: format!(
                "{AZURE_PROJECT}/${{build_id}}/artifacts?artifactName=${{artifact}}&api-version=6.0"
            ),
            artifact_name: "PKHeX-Plugins".to_string(),
        }
    }
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self {
            plugins_dir: "plugins".to_string(),
            stale_patterns: [
                "plugins/AutoModPlugins.*",
                "plugins/PKHeX.Core.AutoMod.*",
                "plugins/QRPlugins.*",
                "PKHeX.exe",
                "PKHeX.Core.*",
                "PKHeX.exe.*",
                "PKHeX.pdb",
                "PKHeX.Drawing.*",
                "QRCoder.dll",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            flatten: FlattenByChannel {
                stable: None,
                bleeding_edge: Some(FlattenRule {
                    nested_dir: "PKHeX-Plugins".to_string(),
                    payload: "AutoModPlugins.dll".to_string(),
                }),
            },
        }
    }
}

impl SetupConfig {
    /// Parse a TOML config, filling omitted keys with defaults
    pub fn from_toml(content: &str) -> SetupResult<Self> {
        let config: SetupConfig =
            toml::from_str(content).map_err(|e| SetupError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config from `path`, or from the per-user config file if it
    /// exists, or fall back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> SetupResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        tracing::debug!("Loading config from {}", path.display());
        let content =
            fs::read_to_string(&path).map_err(|e| SetupError::fs("read config", &path, e))?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> SetupResult<()> {
        if self.base.archive_name == self.plugins.archive_name {
            return Err(SetupError::Config(
                "base and plugin archives must have different names".to_string(),
            ));
        }
        if self.base.link_marker.is_empty() {
            return Err(SetupError::Config("base.link_marker is empty".to_string()));
        }
        if self.install.plugins_dir.is_empty() {
            return Err(SetupError::Config("install.plugins_dir is empty".to_string()));
        }
        Ok(())
    }

    /// Landing page for the base application on `channel`
    pub fn base_page(&self, channel: ReleaseChannel) -> &str {
        match channel {
            ReleaseChannel::Stable => &self.base.stable_page,
            ReleaseChannel::BleedingEdge => &self.base.dev_page,
        }
    }

    pub fn flatten_rule(&self, channel: ReleaseChannel) -> Option<&FlattenRule> {
        match channel {
            ReleaseChannel::Stable => self.install.flatten.stable.as_ref(),
            ReleaseChannel::BleedingEdge => self.install.flatten.bleeding_edge.as_ref(),
        }
    }

    pub fn stale_patterns(&self) -> Vec<StalePattern> {
        self.install
            .stale_patterns
            .iter()
            .map(|p| StalePattern::parse(p))
            .collect()
    }
}

/// `<config_dir>/pkhex-setup/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pkhex-setup").join("config.toml"))
}

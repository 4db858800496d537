use clap::{Parser, ValueEnum};
use glob_match::glob_match;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Release channel to install from
    #[arg(short, long, value_enum, default_value_t = ReleaseChannel::Stable)]
    pub channel: ReleaseChannel,
    /// Installation directory (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// TOML file overriding the built-in endpoints and file patterns
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Ask for the channel on stdin and wait for Enter before exiting
    #[arg(short, long)]
    pub interactive: bool,
    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which line of releases to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReleaseChannel {
    /// Tagged releases; plugin and base versions must agree
    #[default]
    Stable,
    /// Latest successful CI build of the plugins and the development build of the base app
    #[value(aliases = ["dev", "bleeding_edge"])]
    BleedingEdge,
}

impl ReleaseChannel {
    /// Interpret an answer typed at the interactive prompt. Anything that is
    /// not a request for the development build selects Stable.
    pub fn from_prompt(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "dev" | "bleeding-edge" | "bleeding_edge" => ReleaseChannel::BleedingEdge,
            _ => ReleaseChannel::Stable,
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseChannel::Stable => f.write_str("stable releases"),
            ReleaseChannel::BleedingEdge => f.write_str("development builds"),
        }
    }
}

/// Version label of a published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    pub fn new(tag: impl Into<String>) -> Self {
        ReleaseTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tags from the two feeds are compatible when they are equal ignoring case.
    pub fn is_compatible_with(&self, other: &ReleaseTag) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved network location paired with where it gets saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub local_path: PathBuf,
}

/// Glob for stale files, relative to the installation directory.
///
/// `plugins/AutoModPlugins.*` searches the `plugins` subdirectory for names
/// matching `AutoModPlugins.*`; a pattern without a separator searches the
/// installation directory itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePattern {
    pub subdir: Option<PathBuf>,
    pub file_pattern: String,
}

impl StalePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.rfind(['/', '\\']) {
            Some(idx) => StalePattern {
                subdir: Some(PathBuf::from(&pattern[..idx])),
                file_pattern: pattern[idx + 1..].to_string(),
            },
            None => StalePattern {
                subdir: None,
                file_pattern: pattern.to_string(),
            },
        }
    }

    /// Directory to list for this pattern under `root`
    pub fn search_dir(&self, root: &Path) -> PathBuf {
        match &self.subdir {
            Some(subdir) => root.join(subdir),
            None => root.to_path_buf(),
        }
    }

    /// Names are compared ignoring case, the way Windows resolves them
    pub fn matches(&self, file_name: &str) -> bool {
        glob_match(
            &self.file_pattern.to_lowercase(),
            &file_name.to_lowercase(),
        )
    }
}

impl fmt::Display for StalePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subdir {
            Some(subdir) => write!(f, "{}/{}", subdir.display(), self.file_pattern),
            None => f.write_str(&self.file_pattern),
        }
    }
}

/// GitHub release information (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
}

/// Azure DevOps `builds` listing
#[derive(Debug, Deserialize)]
pub struct BuildList {
    pub value: Vec<Build>,
}

#[derive(Debug, Deserialize)]
pub struct Build {
    pub id: BuildId,
}

/// CI build identifiers are numeric in the feed but only ever used as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BuildId {
    Number(u64),
    Text(String),
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildId::Number(n) => write!(f, "{n}"),
            BuildId::Text(s) => f.write_str(s),
        }
    }
}

/// Azure DevOps build artifact
#[derive(Debug, Deserialize)]
pub struct BuildArtifact {
    pub resource: ArtifactResource,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactResource {
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

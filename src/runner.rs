use crate::config::SetupConfig;
use crate::download::{Transport, page};
use crate::error::{ErrorKind, SetupError, SetupResult};
use crate::guard;
use crate::install::{self, InstallPlan, InstallReport};
use crate::models::{DownloadTarget, ReleaseChannel};
use crate::resolver::{self, PluginRelease};
use std::path::{Path, PathBuf};

/// Inputs of one run, fixed before any work starts
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub channel: ReleaseChannel,
    pub install_dir: PathBuf,
}

/// What a successful run installed
#[derive(Debug)]
pub struct RunOutcome {
    pub channel: ReleaseChannel,
    pub plugin_release: PluginRelease,
    pub base: DownloadTarget,
    pub plugins: DownloadTarget,
    pub install: InstallReport,
}

/// Download the newest base application and plugin bundle for
/// `options.channel` and install them into `options.install_dir`.
pub fn run_setup(
    transport: &dyn Transport,
    config: &SetupConfig,
    options: &RunOptions,
) -> SetupResult<RunOutcome> {
    // Relative paths hide which folder they point into
    let install_dir = std::path::absolute(&options.install_dir)
        .map_err(|e| SetupError::fs("resolve", &options.install_dir, e))?;
    let install_dir = install_dir.as_path();
    tracing::info!(
        "Installing {} into {}",
        options.channel,
        install_dir.display()
    );

    guard::check_safe_location(install_dir, &config.sync_providers)?;

    if let Some(name) = config.process_name.as_deref()
        && let Err(e) = guard::terminate_conflicting_processes(name)
    {
        tracing::warn!("{e}");
    }

    let resolution = resolver::resolve(transport, config, options.channel)?;

    println!("Fetching the correct download page for PKHeX...");
    let page_url = config.base_page(options.channel);
    let page_body = transport.get_text(page_url)?;
    let base_url = page::extract_download_link(&page_body, page_url, &config.base.link_marker)?;

    let base = DownloadTarget {
        url: base_url,
        local_path: install_dir.join(&config.base.archive_name),
    };
    let plugins = DownloadTarget {
        url: resolution.plugin_url.clone(),
        local_path: install_dir.join(&config.plugins.archive_name),
    };

    println!("Downloading PKHeX...");
    fetch(transport, &base)?;

    println!("Downloading PKHeX-Plugins ({}) ...", resolution.release);
    fetch(transport, &plugins)?;

    let stale_patterns = config.stale_patterns();
    let report = install::install(&InstallPlan {
        install_dir,
        base_archive: &base.local_path,
        plugin_archive: &plugins.local_path,
        plugins_dir: &config.install.plugins_dir,
        stale_patterns: &stale_patterns,
        flatten: config.flatten_rule(options.channel),
    })?;

    if !report.cleanup.is_clean() {
        for failure in &report.cleanup.failures {
            println!("Failed to delete {}: {}", failure.pattern, failure.message);
        }
    }

    Ok(RunOutcome {
        channel: options.channel,
        plugin_release: resolution.release,
        base,
        plugins,
        install: report,
    })
}

/// Stream one download target to disk
pub fn fetch(transport: &dyn Transport, target: &DownloadTarget) -> SetupResult<u64> {
    let size = transport.download_to(&target.url, &target.local_path)?;
    println!(
        "Downloaded {} ({size} bytes)",
        file_name(&target.local_path)
    );
    Ok(size)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Human-readable summary of a failed run for the final status line
pub fn failure_hint(err: &SetupError) -> Option<&'static str> {
    match err {
        SetupError::VersionMismatch { .. } => Some(
            "Please wait for a new PKHeX-Plugins release, or follow the wiki to set up the plugins manually with an older PKHeX build.",
        ),
        SetupError::NoDownloadLink { .. } => {
            Some("The PKHeX download page layout may have changed.")
        }
        _ if err.kind() == ErrorKind::Network => {
            Some("Check your internet connection and try again.")
        }
        _ => None,
    }
}

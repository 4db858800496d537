//! Replacing a previous installation with freshly downloaded archives.
//!
//! The steps run in order and are not undone on failure. An archive whose
//! extraction failed is left on disk so the user can inspect it.

pub mod cleanup;
pub mod unblock;

use crate::archive::{utils as archive_utils, zip};
use crate::config::FlattenRule;
use crate::error::{SetupError, SetupResult};
use crate::models::StalePattern;
use cleanup::{CleanupReport, cleanup_stale_files};
use std::fs;
use std::path::{Path, PathBuf};
use unblock::unblock_file;

/// Everything the transaction needs, resolved before it starts
#[derive(Debug)]
pub struct InstallPlan<'a> {
    pub install_dir: &'a Path,
    pub base_archive: &'a Path,
    pub plugin_archive: &'a Path,
    pub plugins_dir: &'a str,
    pub stale_patterns: &'a [StalePattern],
    pub flatten: Option<&'a FlattenRule>,
}

#[derive(Debug)]
pub struct InstallReport {
    pub cleanup: CleanupReport,
    pub base_files: usize,
    pub plugin_files: usize,
    pub flattened: bool,
    pub plugins_path: PathBuf,
}

/// Run the installation steps against `plan.install_dir`
pub fn install(plan: &InstallPlan<'_>) -> SetupResult<InstallReport> {
    println!("Cleaning up previous releases if they exist ...");
    let cleanup = cleanup_stale_files(plan.install_dir, plan.stale_patterns);

    println!("Extracting {} ...", file_label(plan.base_archive));
    let base_files = zip::extract_zip(plan.base_archive, plan.install_dir)?;

    println!("Deleting {} ...", file_label(plan.base_archive));
    remove_archive(plan.base_archive)?;

    println!("Unblocking and extracting {} ...", file_label(plan.plugin_archive));
    unblock_file(plan.plugin_archive)?;

    let plugins_path = plan.install_dir.join(plan.plugins_dir);
    if !plugins_path.is_dir() {
        fs::create_dir_all(&plugins_path)
            .map_err(|e| SetupError::fs("create directory", &plugins_path, e))?;
    }

    let plugin_files = zip::extract_zip(plan.plugin_archive, &plugins_path)?;

    let flattened = match plan.flatten {
        Some(rule) => archive_utils::flatten_nested_payload(&plugins_path, rule)?,
        None => false,
    };

    println!("Deleting {} ...", file_label(plan.plugin_archive));
    remove_archive(plan.plugin_archive)?;

    Ok(InstallReport {
        cleanup,
        base_files,
        plugin_files,
        flattened,
        plugins_path,
    })
}

fn remove_archive(path: &Path) -> SetupResult<()> {
    fs::remove_file(path).map_err(|e| SetupError::fs("delete", path, e))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

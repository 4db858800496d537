use crate::error::{SetupError, SetupResult};
use std::path::Path;
use std::process::{Command, Stdio};

/// Return the first synchronized-storage provider whose name appears in `path`.
///
/// Sync clients lock and replicate files while we bulk delete and extract,
/// which leaves half-written installs behind.
pub fn find_sync_provider<'a>(path: &Path, providers: &'a [String]) -> Option<&'a str> {
    let path_lower = path.to_string_lossy().to_lowercase();
    providers
        .iter()
        .filter(|p| !p.is_empty())
        .find(|p| path_lower.contains(&p.to_lowercase()))
        .map(String::as_str)
}

/// Fail when `path` lives inside a synchronized-storage folder
pub fn check_safe_location(path: &Path, providers: &[String]) -> SetupResult<()> {
    match find_sync_provider(path, providers) {
        Some(provider) => Err(SetupError::UnsafeLocation {
            provider: provider.to_string(),
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

/// Forcibly terminate every running process called `name`.
///
/// A missing process tool is reported as an error so the caller can decide
/// whether to continue; "no such process" is not an error.
pub fn terminate_conflicting_processes(name: &str) -> SetupResult<()> {
    if name.trim().is_empty() {
        return Ok(());
    }

    #[cfg(windows)]
    let mut command = {
        let image = if name.to_lowercase().ends_with(".exe") {
            name.to_string()
        } else {
            format!("{name}.exe")
        };
        let mut command = Command::new("taskkill");
        command.args(["/F", "/IM", image.as_str()]);
        command
    };

    #[cfg(not(windows))]
    let mut command = {
        let mut command = Command::new("pkill");
        command.args(["-KILL", "-i", "-x", name]);
        command
    };

    let status = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SetupError::Process {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    // pkill exits 1 and taskkill 128 when nothing matched
    if status.success() {
        tracing::info!("Terminated running {name} processes");
    } else {
        tracing::debug!("No running {name} process terminated ({status})");
    }
    Ok(())
}

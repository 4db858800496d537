use crate::error::{SetupError, SetupResult};
use std::fs;
use std::path::Path;

/// Clear the flags a downloaded file picks up so it can be extracted and
/// loaded: read-only everywhere, plus hidden and the "downloaded from the
/// internet" zone marker on Windows. Missing files are ignored.
pub fn unblock_file(path: &Path) -> SetupResult<()> {
    let Ok(metadata) = fs::metadata(path) else {
        return Ok(());
    };

    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            permissions.set_mode(permissions.mode() | 0o200);
        }
        #[cfg(not(unix))]
        permissions.set_readonly(false);

        fs::set_permissions(path, permissions)
            .map_err(|e| SetupError::fs("clear read-only flag on", path, e))?;
        tracing::debug!("Cleared read-only flag on {}", path.display());
    }

    #[cfg(windows)]
    clear_windows_flags(path, &metadata)?;

    Ok(())
}

#[cfg(windows)]
fn clear_windows_flags(path: &Path, metadata: &fs::Metadata) -> SetupResult<()> {
    use std::os::windows::fs::MetadataExt;
    use std::process::{Command, Stdio};

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    if metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0 {
        let status = Command::new("attrib")
            .arg("-H")
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| SetupError::fs("clear hidden flag on", path, e))?;
        if !status.success() {
            tracing::warn!("attrib -H {} exited with {status}", path.display());
        }
    }

    let mut zone = path.as_os_str().to_owned();
    zone.push(":Zone.Identifier");
    match fs::remove_file(&zone) {
        Ok(()) => tracing::debug!("Removed zone marker from {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(SetupError::fs("remove zone marker from", path, e)),
    }
    Ok(())
}

use crate::models::StalePattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of a best-effort cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

#[derive(Debug)]
pub struct CleanupFailure {
    pub pattern: String,
    pub message: String,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete every file under `root` that matches one of `patterns`.
///
/// Failures are recorded per pattern and never stop the pass; a file that
/// could not be removed shows up in the report and the log.
pub fn cleanup_stale_files(root: &Path, patterns: &[StalePattern]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for pattern in patterns {
        if let Err(e) = remove_matches(root, pattern, &mut report) {
            tracing::warn!("Failed to delete {pattern}: {e}");
            report.failures.push(CleanupFailure {
                pattern: pattern.to_string(),
                message: e.to_string(),
            });
        }
    }

    tracing::debug!(
        "Cleanup removed {} files, {} patterns failed",
        report.removed.len(),
        report.failures.len()
    );
    report
}

fn remove_matches(
    root: &Path,
    pattern: &StalePattern,
    report: &mut CleanupReport,
) -> io::Result<()> {
    let dir = pattern.search_dir(root);
    if !dir.exists() {
        return Ok(());
    }

    let mut first_error = None;

    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                report.removed.push(path);
            }
            Err(e) => {
                // Keep going so one locked file doesn't shield its siblings
                first_error.get_or_insert(io::Error::new(
                    e.kind(),
                    format!("{}: {e}", path.display()),
                ));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> Vec<StalePattern> {
        list.iter().map(|p| StalePattern::parse(p)).collect()
    }

    #[test]
    fn test_removes_matches_and_keeps_others() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("plugins")).unwrap();
        for name in [
            "PKHeX.exe",
            "PKHeX.exe.config",
            "PKHeX.Core.dll",
            "PKHeX.Core.xml",
            "savefile.sav",
            "plugins/AutoModPlugins.dll",
            "plugins/AutoModPlugins.pdb",
            "plugins/ThirdParty.dll",
        ] {
            fs::write(root.join(name), name).unwrap();
        }

        let report = cleanup_stale_files(
            root,
            &patterns(&[
                "plugins/AutoModPlugins.*",
                "PKHeX.exe",
                "PKHeX.Core.*",
                "PKHeX.exe.*",
            ]),
        );

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 6);
        assert!(root.join("savefile.sav").exists());
        assert!(root.join("plugins/ThirdParty.dll").exists());
        assert!(!root.join("PKHeX.exe").exists());
        assert!(!root.join("PKHeX.exe.config").exists());
        assert!(!root.join("plugins/AutoModPlugins.pdb").exists());
    }

    #[test]
    fn test_missing_subdirectory_is_not_a_failure() {
        let temp = TempDir::new().unwrap();
        let report = cleanup_stale_files(temp.path(), &patterns(&["plugins/QRPlugins.*"]));
        assert!(report.is_clean());
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_directories_are_never_deleted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("PKHeX.Core.data")).unwrap();

        let report = cleanup_stale_files(temp.path(), &patterns(&["PKHeX.Core.*"]));
        assert!(report.is_clean());
        assert!(temp.path().join("PKHeX.Core.data").is_dir());
    }

    #[test]
    fn test_failing_pattern_does_not_stop_others() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        // A file where the pattern expects a directory makes listing fail
        fs::write(root.join("plugins"), "not a directory").unwrap();
        fs::write(root.join("QRCoder.dll"), "qr").unwrap();
        fs::write(root.join("PKHeX.pdb"), "pdb").unwrap();

        let report = cleanup_stale_files(
            root,
            &patterns(&["plugins/AutoModPlugins.*", "QRCoder.dll", "PKHeX.pdb"]),
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].pattern, "plugins/AutoModPlugins.*");
        assert!(!root.join("QRCoder.dll").exists());
        assert!(!root.join("PKHeX.pdb").exists());
    }
}

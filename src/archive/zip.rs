use crate::error::{SetupError, SetupResult};
use std::fs;
use std::path::Path;
use zip::ZipArchive;

/// Extract a ZIP archive into `extract_to`, overwriting existing files.
/// Returns the number of files written.
pub fn extract_zip(zip_path: &Path, extract_to: &Path) -> SetupResult<usize> {
    let file = fs::File::open(zip_path).map_err(|e| SetupError::fs("open", zip_path, e))?;

    let mut archive = ZipArchive::new(file).map_err(|e| extraction_error(zip_path, e))?;

    fs::create_dir_all(extract_to)
        .map_err(|e| SetupError::fs("create directory", extract_to, e))?;

    let mut extracted_count = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| extraction_error(zip_path, e))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(SetupError::Extraction {
                archive: zip_path.to_path_buf(),
                message: format!("entry '{}' escapes the target directory", entry.name()),
            });
        };
        let outpath = extract_to.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .map_err(|e| SetupError::fs("create directory", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| SetupError::fs("create directory", parent, e))?;
        }

        let mut outfile =
            fs::File::create(&outpath).map_err(|e| SetupError::fs("create", &outpath, e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| SetupError::fs("extract", &outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                    .map_err(|e| SetupError::fs("set permissions on", &outpath, e))?;
            }
        }

        extracted_count += 1;
    }

    tracing::debug!(
        "Extracted {extracted_count} files from {} into {}",
        zip_path.display(),
        extract_to.display()
    );
    Ok(extracted_count)
}

fn extraction_error(zip_path: &Path, err: zip::result::ZipError) -> SetupError {
    SetupError::Extraction {
        archive: zip_path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_zip;
    use tempfile::TempDir;

    #[test]
    fn test_extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("PKHeX.zip");
        write_zip(
            &archive,
            &[
                ("PKHeX.exe", "exe"),
                ("PKHeX.Core.dll", "core"),
                ("lang/en.txt", "hello"),
            ],
        );

        let out = temp.path().join("out");
        let count = extract_zip(&archive, &out).unwrap();

        assert_eq!(count, 3);
        assert_eq!(fs::read_to_string(out.join("PKHeX.exe")).unwrap(), "exe");
        assert_eq!(fs::read_to_string(out.join("lang/en.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_overwrites_existing_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("PKHeX.zip");
        write_zip(&archive, &[("PKHeX.exe", "new")]);
        fs::write(temp.path().join("PKHeX.exe"), "old and longer").unwrap();

        extract_zip(&archive, temp.path()).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("PKHeX.exe")).unwrap(), "new");
    }

    #[test]
    fn test_corrupt_archive_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("PKHeX.zip");
        fs::write(&archive, "<html>not a zip</html>").unwrap();

        let err = extract_zip(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, SetupError::Extraction { .. }));
        assert!(archive.exists());
    }

    #[test]
    fn test_missing_archive_is_filesystem_error() {
        let temp = TempDir::new().unwrap();
        let err = extract_zip(&temp.path().join("absent.zip"), temp.path()).unwrap_err();
        assert!(matches!(err, SetupError::Filesystem { .. }));
    }
}

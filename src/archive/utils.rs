use crate::config::FlattenRule;
use crate::error::{SetupError, SetupResult};
use std::fs;
use std::io;
use std::path::Path;

/// Move `<extract_to>/<nested_dir>/<payload>` up one level and remove the
/// then empty nested directory.
///
/// CI artifacts wrap the plugin payload in a directory named after the
/// artifact. Only the payload file moves; an existing file of the same name
/// is replaced. Anything else left in the nested directory makes its removal
/// fail rather than being discarded. Returns `false` when the nested
/// directory does not exist and there is nothing to flatten.
pub fn flatten_nested_payload(extract_to: &Path, rule: &FlattenRule) -> SetupResult<bool> {
    let nested = extract_to.join(&rule.nested_dir);
    if !nested.is_dir() {
        tracing::warn!(
            "Expected nested directory {} is missing, leaving layout as is",
            nested.display()
        );
        return Ok(false);
    }

    let payload = nested.join(&rule.payload);
    if !payload.is_file() {
        return Err(SetupError::fs(
            "find payload",
            &payload,
            io::Error::new(io::ErrorKind::NotFound, "not present in the nested directory"),
        ));
    }

    let dest = extract_to.join(&rule.payload);
    if dest.is_file() {
        fs::remove_file(&dest).map_err(|e| SetupError::fs("replace", &dest, e))?;
    }
    fs::rename(&payload, &dest).map_err(|e| SetupError::fs("move", &payload, e))?;

    fs::remove_dir(&nested).map_err(|e| SetupError::fs("remove directory", &nested, e))?;

    tracing::info!(
        "Flattened {}: moved {} up one level",
        rule.nested_dir,
        rule.payload
    );
    Ok(true)
}

use crate::download::Transport;
use crate::error::{SetupError, SetupResult};
use std::fs;
use std::io::Read;
use std::path::Path;

/// ureq-backed transport. The agent keeps cookies between requests, which the
/// landing page needs before it hands out the download redirect.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        Self { agent }
    }

    fn call(&self, url: &str) -> SetupResult<ureq::Response> {
        tracing::debug!("GET {url}");
        match self.agent.get(url).call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, _)) => Err(SetupError::Network {
                url: url.to_string(),
                message: format!("server responded with status {code}"),
            }),
            Err(e) => Err(SetupError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> SetupResult<String> {
        self.call(url)?
            .into_string()
            .map_err(|e| SetupError::Network {
                url: url.to_string(),
                message: format!("failed to read response body: {e}"),
            })
    }

    fn download_to(&self, url: &str, path: &Path) -> SetupResult<u64> {
        let response = self.call(url)?;
        save_to_file(&mut response.into_reader(), path)
    }
}

/// Stream `reader` into `path` without buffering the whole body.
///
/// The data lands in a temporary sibling first and is renamed over `path`
/// once complete, so an interrupted download never leaves a truncated archive
/// under the final name.
pub fn save_to_file(reader: &mut dyn Read, path: &Path) -> SetupResult<u64> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SetupError::fs("create directory", parent, e))?;
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("download")
    ));

    let result = write_temp(reader, &temp_path).and_then(|size| {
        fs::rename(&temp_path, path)
            .map_err(|e| SetupError::fs("move download into place at", path, e))?;
        Ok(size)
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(reader: &mut dyn Read, temp_path: &Path) -> SetupResult<u64> {
    let mut temp_file = fs::File::create(temp_path)
        .map_err(|e| SetupError::fs("create temporary file", temp_path, e))?;

    let size = std::io::copy(reader, &mut temp_file)
        .map_err(|e| SetupError::fs("write", temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| SetupError::fs("sync", temp_path, e))?;
    Ok(size)
}

//! Fixtures shared by unit tests: an in-memory transport and zip builders.

use crate::config::SetupConfig;
use crate::download::{Transport, http};
use crate::error::{SetupError, SetupResult};
use crate::vars::TemplateVars;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;

/// Transport answering from fixed URL → body maps. Unknown URLs fail like an
/// unreachable host would.
#[derive(Default)]
pub struct FakeTransport {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, url: &str, body: &str) -> Self {
        self.texts.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_file(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }

    /// Every URL requested so far, text and downloads
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    fn not_found(url: &str) -> SetupError {
        SetupError::Network {
            url: url.to_string(),
            message: "server responded with status 404".to_string(),
        }
    }
}

impl Transport for FakeTransport {
    fn get_text(&self, url: &str) -> SetupResult<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    fn download_to(&self, url: &str, path: &Path) -> SetupResult<u64> {
        self.requests.borrow_mut().push(url.to_string());
        self.downloads.borrow_mut().push(url.to_string());
        let bytes = self.files.get(url).ok_or_else(|| Self::not_found(url))?;
        http::save_to_file(&mut Cursor::new(bytes.clone()), path)
    }
}

/// Zip archive bytes holding `entries` as (name, contents)
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    fs::write(path, zip_bytes(entries)).unwrap();
}

/// Register both GitHub release feeds answering with the given newest tags
pub fn stable_feeds(
    transport: FakeTransport,
    config: &SetupConfig,
    plugin_tag: &str,
    base_tag: &str,
) -> FakeTransport {
    transport
        .with_text(
            &config.plugins.releases_feed,
            &format!(r#"[{{"tag_name": "{plugin_tag}"}}, {{"tag_name": "old"}}]"#),
        )
        .with_text(
            &config.base.releases_feed,
            &format!(r#"[{{"tag_name": "{base_tag}"}}]"#),
        )
}

/// Register the CI build listing and artifact lookup for `build_id`
pub fn bleeding_edge_feeds(
    transport: FakeTransport,
    config: &SetupConfig,
    build_id: &str,
    artifact_url: &str,
) -> FakeTransport {
    let builds = TemplateVars::new()
        .expand(&config.plugins.builds_feed)
        .unwrap();
    let artifact = TemplateVars::new()
        .with("build_id", build_id)
        .with("artifact", config.plugins.artifact_name.as_str())
        .expand(&config.plugins.artifact_template)
        .unwrap();

    transport
        .with_text(
            &builds,
            &format!(r#"{{"count": 1, "value": [{{"id": {build_id}}}]}}"#),
        )
        .with_text(
            &artifact,
            &format!(r#"{{"name": "PKHeX-Plugins", "resource": {{"downloadUrl": "{artifact_url}"}}}}"#),
        )
}

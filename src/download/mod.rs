//! Network side of a run: the transport seam, the release feeds and the
//! landing page scraper.

pub mod azure;
pub mod github;
pub mod http;
pub mod page;

use crate::error::SetupResult;
use std::path::Path;

/// Blocking HTTP GET as used by the resolver and the fetcher.
pub trait Transport {
    /// Fetch a response body as text
    fn get_text(&self, url: &str) -> SetupResult<String>;

    /// Stream a response body into `path`, replacing any existing file.
    /// Returns the number of bytes written.
    fn download_to(&self, url: &str, path: &Path) -> SetupResult<u64>;
}

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpFeedSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

use crate::auth::Credentials;
use crate::builds::BuildRecord;
use crate::descriptor::CiSourceDescriptor;
use crate::error::Result;

/// Supplies the build history of one CI source.
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// Builds started at or after `since`, in any order.
    async fn builds_since(&self, since: DateTime<Utc>) -> Result<Vec<BuildRecord>>;
}

/// Picks a build source able to read the descriptor's URL.
///
/// `http`/`https` URLs are fetched as a JSON build feed, `file` URLs and
/// plain paths are read from disk. Returns `Ok(None)` when the URL is empty
/// or uses any other scheme.
pub fn source_for(
    descriptor: &CiSourceDescriptor,
    credentials: Option<&Credentials>,
) -> Result<Option<Box<dyn BuildSource>>> {
    let raw = descriptor.url.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let Ok(url) = Url::parse(raw) else {
        return Ok(Some(Box::new(FileSource::new(PathBuf::from(raw)))));
    };

    match url.scheme() {
        "http" | "https" => {
            let source = HttpFeedSource::new(url, credentials.cloned())?;
            Ok(Some(Box::new(source)))
        }
        "file" => Ok(url
            .to_file_path()
            .ok()
            .map(|path| Box::new(FileSource::new(path)) as Box<dyn BuildSource>)),
        _ => Ok(None),
    }
}

fn retain_since(mut builds: Vec<BuildRecord>, since: DateTime<Utc>) -> Vec<BuildRecord> {
    builds.retain(|build| build.started_since(since));
    builds
}

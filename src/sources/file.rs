use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::path::PathBuf;

use super::{retain_since, BuildSource};
use crate::builds::BuildRecord;
use crate::error::{CistabError, Result};

/// Reads a JSON array of build records from a local file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn read_all(&self) -> Result<Vec<BuildRecord>> {
        debug!("Reading builds from {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CistabError::Source(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl BuildSource for FileSource {
    async fn builds_since(&self, since: DateTime<Utc>) -> Result<Vec<BuildRecord>> {
        let builds = self.read_all().await?;
        Ok(retain_since(builds, since))
    }
}

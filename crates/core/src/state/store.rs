//! # Dataset and Artifact Stores
//!
//! Persistence collaborators for what outlives a run: the analyst's full
//! dataset (`data.json`) and the developer's component (`chart.tsx`), both
//! addressed by `owner/repo`.

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::outputs::Record;
use crate::error::{ChartError, Result};

/// Validated `owner/repo` pair usable as a storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoKey {
    owner: String,
    repo: String,
}

impl RepoKey {
    /// Reject empty segments and anything that could escape the store root
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();
        for (label, segment) in [("owner", &owner), ("repo", &repo)] {
            if segment.trim().is_empty() {
                return Err(ChartError::invalid_request(format!("{} is empty", label)));
            }
            if segment == "." || segment == ".." || segment.contains(['/', '\\']) {
                return Err(ChartError::invalid_request(format!(
                    "{} '{}' is not a valid path segment",
                    label, segment
                )));
            }
        }
        Ok(Self { owner, repo })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Relative path `owner/repo`
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(&self.owner).join(&self.repo)
    }
}

impl std::fmt::Display for RepoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Stores the full dataset and hands back a route the chart can load it from
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn write(&self, key: &RepoKey, records: &[Record]) -> Result<String>;
}

/// Stores the generated chart component
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn write(&self, key: &RepoKey, code: &str) -> Result<()>;
}

/// Writes datasets under a statically served directory
#[derive(Debug, Clone)]
pub struct FsDatasetStore {
    public_dir: PathBuf,
}

impl FsDatasetStore {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    /// File path of the dataset for `key`
    pub fn dataset_path(&self, key: &RepoKey) -> PathBuf {
        self.public_dir
            .join("charts")
            .join(key.relative_dir())
            .join("data.json")
    }

    /// Static route the frontend loads the dataset from
    pub fn route(key: &RepoKey) -> String {
        format!("/charts/{}/{}/data.json", key.owner(), key.repo())
    }
}

#[async_trait]
impl DatasetStore for FsDatasetStore {
    async fn write(&self, key: &RepoKey, records: &[Record]) -> Result<String> {
        let path = self.dataset_path(key);
        let content = serde_json::to_string(records)?;
        write_file(&path, &content)
            .await
            .map_err(|e| ChartError::storage(format!("{:#}", e)))?;

        tracing::debug!(path = %path.display(), records = records.len(), "dataset written");
        Ok(Self::route(key))
    }
}

/// Writes chart components into the frontend source tree
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    charts_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            charts_dir: charts_dir.into(),
        }
    }

    /// File path of the component for `key`
    pub fn artifact_path(&self, key: &RepoKey) -> PathBuf {
        self.charts_dir.join(key.relative_dir()).join("chart.tsx")
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write(&self, key: &RepoKey, code: &str) -> Result<()> {
        let path = self.artifact_path(key);
        write_file(&path, code)
            .await
            .map_err(|e| ChartError::storage(format!("{:#}", e)))?;

        tracing::debug!(path = %path.display(), bytes = code.len(), "chart written");
        Ok(())
    }
}

/// Write a file, creating parent directories first
async fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repo_key_rejects_traversal() {
        assert!(RepoKey::new("acme", "widgets").is_ok());
        assert!(RepoKey::new("..", "widgets").is_err());
        assert!(RepoKey::new("acme", "a/b").is_err());
        assert!(RepoKey::new("acme", "a\\b").is_err());
        assert!(RepoKey::new(" ", "widgets").is_err());
    }

    #[tokio::test]
    async fn test_dataset_store_writes_and_routes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDatasetStore::new(dir.path());
        let key = RepoKey::new("acme", "widgets").unwrap();
        let records: Vec<Record> = vec![json!({"week": "2024-W01", "count": 4})
            .as_object()
            .cloned()
            .unwrap()];

        let route = store.write(&key, &records).await.unwrap();
        assert_eq!(route, "/charts/acme/widgets/data.json");

        let written = std::fs::read_to_string(store.dataset_path(&key)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["count"], 4);
    }

    #[tokio::test]
    async fn test_artifact_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let key = RepoKey::new("acme", "widgets").unwrap();

        store.write(&key, "first").await.unwrap();
        store.write(&key, "second").await.unwrap();

        let written = std::fs::read_to_string(store.artifact_path(&key)).unwrap();
        assert_eq!(written, "second");
    }
}

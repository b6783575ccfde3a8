use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};
use log;

/// Cache directory used when no other location is given, relative to the
/// current working directory.
pub const DEFAULT_MODELS_DIR: &str = "tmp/models";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Download of {url} failed with HTTP status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// A remote weights file and the name it is cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub name: String,
    pub url: String,
    pub file_name: String,
    /// Optional sha256 (lowercase hex) checked on download only. Files
    /// already in the cache are never re-verified.
    pub sha256: Option<String>,
}

impl ModelArtifact {
    pub fn new(name: impl Into<String>, url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            file_name: file_name.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// The pretrained roof shape weights published on Zenodo.
    pub fn roof_shape_v1() -> Self {
        Self::new(
            "roof shape classifier",
            "https://zenodo.org/record/7271554/files/trained_model_rooftype.pth",
            "roofTypeClassifier_v1.pth",
        )
    }
}

#[derive(Clone, Debug)]
pub struct ModelManager {
    models_dir: PathBuf,
    client: reqwest::Client,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager rooted at [`DEFAULT_MODELS_DIR`]
    pub fn new_default() -> io::Result<Self> {
        Self::new(DEFAULT_MODELS_DIR)
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            client: reqwest::Client::new(),
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Replaces the HTTP client used for downloads
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, artifact: &ModelArtifact) -> PathBuf {
        self.models_dir.join(&artifact.file_name)
    }

    pub fn is_model_downloaded(&self, artifact: &ModelArtifact) -> bool {
        let model_path = self.get_model_path(artifact);
        log::debug!("Checking {:?} (exists: {})", model_path, model_path.is_file());
        model_path.is_file()
    }

    /// Downloads the artifact into the cache, replacing any existing file.
    ///
    /// The body is streamed to a `.part` file and only renamed into place once
    /// it is complete, so a failed transfer never leaves a file at the cache path.
    pub async fn download_model(&self, artifact: &ModelArtifact) -> Result<PathBuf, ModelError> {
        let _lock = self.download_lock.lock().await;
        self.fetch_locked(artifact).await
    }

    // Caller must hold `download_lock`.
    async fn fetch_locked(&self, artifact: &ModelArtifact) -> Result<PathBuf, ModelError> {
        let model_path = self.get_model_path(artifact);
        let part_path = model_path.with_extension("part");

        let result = match self.download_to(artifact, &part_path).await {
            Ok(()) => commit_part(&part_path, &model_path),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                log::info!("{} downloaded to {:?}", artifact.name, model_path);
                Ok(model_path)
            }
            Err(e) => {
                log::error!("Failed to download {}: {}", artifact.name, e);
                let _ = fs::remove_file(&part_path);
                Err(e)
            }
        }
    }

    async fn download_to(&self, artifact: &ModelArtifact, part_path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = part_path.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!("Downloading {} from {} to {:?}", artifact.name, artifact.url, part_path);
        let mut response = self.client.get(&artifact.url).send().await?;
        let status = response.status();
        log::info!("Download response status: {}", status);
        if !status.is_success() {
            return Err(ModelError::Status {
                url: artifact.url.clone(),
                status,
            });
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(part_path).await?;
        let mut hasher = Sha256::new();
        let mut received: u64 = 0;
        let mut last_reported = 0u64;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
            received += chunk.len() as u64;

            match total {
                Some(total) if total > 0 => {
                    let percent = received * 100 / total;
                    if percent >= last_reported + 10 || received == total {
                        log::info!("{}: {}% ({}/{} bytes)", artifact.name, percent, received, total);
                        last_reported = percent;
                    }
                }
                _ => {
                    // report roughly every MiB when the length is unknown
                    if received - last_reported >= 1 << 20 {
                        log::info!("{}: {} bytes", artifact.name, received);
                        last_reported = received;
                    }
                }
            }
        }
        file.flush().await?;
        log::info!("Downloaded {} bytes", received);

        if let Some(expected) = &artifact.sha256 {
            let actual = format!("{:x}", hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ModelError::HashMismatch {
                    file_type: artifact.name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
            log::info!("{} hash verified", artifact.name);
        }

        Ok(())
    }

    /// Returns the cached file, downloading it first if it is missing.
    ///
    /// An existing file is trusted as-is: no network call, no checksum.
    pub async fn ensure_model_downloaded(&self, artifact: &ModelArtifact) -> Result<PathBuf, ModelError> {
        // checked under the lock so overlapping callers share one download
        let _lock = self.download_lock.lock().await;
        if self.is_model_downloaded(artifact) {
            let model_path = self.get_model_path(artifact);
            log::info!("Using cached {} at {:?}", artifact.name, model_path);
            return Ok(model_path);
        }
        log::info!("Loading default {} into {:?}...", artifact.name, self.models_dir);
        self.fetch_locked(artifact).await
    }

    pub fn remove_download(&self, artifact: &ModelArtifact) -> Result<(), ModelError> {
        let model_path = self.get_model_path(artifact);
        if model_path.is_file() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }
}

/// Moves a finished `.part` file into place, removing it if the move fails.
fn commit_part(part_path: &Path, model_path: &Path) -> Result<(), ModelError> {
    if let Err(e) = fs::rename(part_path, model_path) {
        let _ = fs::remove_file(part_path);
        return Err(e.into());
    }
    Ok(())
}

/// Picks the weights file for a classifier.
///
/// A configured path wins and is returned verbatim without touching the
/// filesystem. Otherwise the artifact is resolved through the manager's cache.
pub async fn resolve_model_path(
    configured: Option<&Path>,
    manager: &ModelManager,
    artifact: &ModelArtifact,
) -> Result<PathBuf, ModelError> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => manager.ensure_model_downloaded(artifact).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("roofshape-unit").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_default_artifact() {
        let artifact = ModelArtifact::roof_shape_v1();
        assert_eq!(artifact.url, "https://zenodo.org/record/7271554/files/trained_model_rooftype.pth");
        assert_eq!(artifact.file_name, "roofTypeClassifier_v1.pth");
        assert!(artifact.sha256.is_none());
    }

    #[test]
    fn test_model_path_layout() {
        let dir = fresh_dir("layout");
        let manager = ModelManager::new(&dir).unwrap();
        assert!(dir.is_dir());
        let path = manager.get_model_path(&ModelArtifact::roof_shape_v1());
        assert_eq!(path, dir.join("roofTypeClassifier_v1.pth"));
        // a second manager on the same directory is fine
        assert!(ModelManager::new(&dir).is_ok());
    }

    #[test]
    fn test_configured_path_is_verbatim() {
        let dir = fresh_dir("verbatim");
        let manager = ModelManager::new(&dir).unwrap();
        let artifact = ModelArtifact::new("unreachable", "http://127.0.0.1:9/none", "none.pth");
        let configured = Path::new("/custom/model.pth");
        let resolved = tokio_test::block_on(resolve_model_path(Some(configured), &manager, &artifact)).unwrap();
        assert_eq!(resolved, PathBuf::from("/custom/model.pth"));
        assert!(!manager.is_model_downloaded(&artifact));
    }

    #[test]
    fn test_remove_missing_download_is_ok() {
        let dir = fresh_dir("remove");
        let manager = ModelManager::new(&dir).unwrap();
        let artifact = ModelArtifact::new("absent", "http://127.0.0.1:9/none", "absent.pth");
        assert!(manager.remove_download(&artifact).is_ok());
    }

    #[test]
    fn test_remove_download_skips_directories() {
        let dir = fresh_dir("remove-dir");
        let manager = ModelManager::new(&dir).unwrap();
        let artifact = ModelArtifact::new("odd", "http://127.0.0.1:9/none", "odd.pth");
        fs::create_dir_all(manager.get_model_path(&artifact)).unwrap();

        assert!(!manager.is_model_downloaded(&artifact));
        assert!(manager.remove_download(&artifact).is_ok());
        assert!(manager.get_model_path(&artifact).is_dir());
    }

    #[test]
    fn test_commit_part_moves_file() {
        let dir = fresh_dir("rename-ok");
        let manager = ModelManager::new(&dir).unwrap();
        let artifact = ModelArtifact::new("ok", "http://127.0.0.1:9/none", "ok.pth");
        let model_path = manager.get_model_path(&artifact);
        let part_path = model_path.with_extension("part");
        fs::write(&part_path, b"weights").unwrap();

        commit_part(&part_path, &model_path).unwrap();
        assert!(manager.is_model_downloaded(&artifact));
        assert!(!part_path.exists());
    }

    #[test]
    fn test_failed_rename_cleans_up_part_file() {
        let dir = fresh_dir("rename-fails");
        let manager = ModelManager::new(&dir).unwrap();
        let artifact = ModelArtifact::new("blocked", "http://127.0.0.1:9/none", "blocked.pth");
        let model_path = manager.get_model_path(&artifact);
        let part_path = model_path.with_extension("part");

        // a non-empty directory at the target makes the rename fail
        fs::create_dir_all(model_path.join("inner")).unwrap();
        fs::write(&part_path, b"weights").unwrap();

        let result = commit_part(&part_path, &model_path);
        assert!(matches!(result, Err(ModelError::Io(_))));
        assert!(!part_path.exists());
    }
}

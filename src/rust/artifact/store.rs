use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::manifest::{sha256_file, sha256_hex, ArtifactBundle, Manifest, MANIFEST_FILE};
use super::ArtifactError;

/// Environment variable overriding the store root
pub const STORE_ENV: &str = "ATTRITION_HOME";

/// Bundle name used when none is given
pub const DEFAULT_BUNDLE: &str = "attrition";

/// Where to download a bundle from and what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSource {
    /// Directory name inside the store
    pub name: String,
    pub manifest_url: String,
    pub model_url: String,
    pub model_sha256: String,
    pub manifest_sha256: Option<String>,
}

/// A directory of named artifact bundles.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ArtifactStore {
    /// Creates a store at the default location
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_root())
    }

    /// Resolves the default store root.
    ///
    /// Order: `ATTRITION_HOME`, the platform cache dir, `~/.cache`, the
    /// system temp dir.
    pub fn default_root() -> PathBuf {
        if let Ok(path) = env::var(STORE_ENV) {
            return PathBuf::from(path).join("artifacts");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("attrition").join("artifacts");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("attrition").join("artifacts");
        }
        env::temp_dir().join("attrition").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bundle_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.bundle_dir(name).join(MANIFEST_FILE)
    }

    /// True when the bundle's manifest and the model it names are both on disk
    pub fn is_downloaded(&self, name: &str) -> bool {
        let manifest_path = self.manifest_path(name);
        log::debug!("Checking bundle '{}' at {:?}", name, manifest_path);
        match Manifest::from_file(&manifest_path) {
            Ok(manifest) => {
                manifest.validate().is_ok() && self.bundle_dir(name).join(&manifest.model_file).exists()
            }
            Err(_) => false,
        }
    }

    /// Loads a bundle from the store
    pub fn load(&self, name: &str) -> Result<ArtifactBundle, ArtifactError> {
        ArtifactBundle::load(self.bundle_dir(name))
    }

    /// Checks the stored bundle against the hash its manifest declares.
    ///
    /// Returns `Ok(false)` when files are missing or the hash differs.
    pub fn verify(&self, name: &str) -> Result<bool, ArtifactError> {
        if !self.is_downloaded(name) {
            log::info!("Bundle '{}' is not in the store", name);
            return Ok(false);
        }
        let manifest = Manifest::from_file(&self.manifest_path(name))?;
        let Some(expected) = manifest.model_sha256.as_deref() else {
            log::info!("Bundle '{}' declares no model hash; presence check only", name);
            return Ok(true);
        };
        let actual = sha256_file(&self.bundle_dir(name).join(&manifest.model_file))?;
        log::info!("Model hash verification for '{}': {}", name, actual.eq_ignore_ascii_case(expected));
        Ok(actual.eq_ignore_ascii_case(expected))
    }

    /// Downloads a bundle, verifying both files before they are written.
    ///
    /// Concurrent downloads through clones of the same store are serialized.
    /// Partial bundles are removed on failure.
    pub async fn download(&self, source: &ArtifactSource) -> Result<(), ArtifactError> {
        let _lock = self.download_lock.lock().await;

        let dir = self.bundle_dir(&source.name);
        log::info!("Creating bundle directory at {:?}", dir);
        fs::create_dir_all(&dir)?;

        let result = self.download_files(source, &dir).await;
        if let Err(e) = &result {
            log::error!("Failed to download bundle '{}': {}", source.name, e);
            let _ = self.remove(&source.name);
        } else {
            log::info!("Bundle '{}' ready to use", source.name);
        }
        result
    }

    async fn download_files(&self, source: &ArtifactSource, dir: &Path) -> Result<(), ArtifactError> {
        let manifest_bytes = fetch(&source.manifest_url, source.manifest_sha256.as_deref(), "manifest").await?;
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)?;
        manifest.validate()?;

        if let Some(declared) = &manifest.model_sha256 {
            if !declared.eq_ignore_ascii_case(&source.model_sha256) {
                return Err(ArtifactError::Invalid(format!(
                    "manifest declares model hash {} but source expects {}",
                    declared, source.model_sha256
                )));
            }
        }

        let model_bytes = fetch(&source.model_url, Some(source.model_sha256.as_str()), "model").await?;
        let model_path = dir.join(&manifest.model_file);
        log::info!("Writing {} bytes to {:?}", model_bytes.len(), model_path);
        fs::write(&model_path, &model_bytes)?;
        fs::write(dir.join(MANIFEST_FILE), &manifest_bytes)?;

        if !sha256_file(&model_path)?.eq_ignore_ascii_case(&source.model_sha256) {
            return Err(ArtifactError::VerificationFailed);
        }
        Ok(())
    }

    /// Deletes a bundle directory if present
    pub fn remove(&self, name: &str) -> Result<(), ArtifactError> {
        let dir = self.bundle_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Downloads the bundle if missing, re-downloads it if verification fails.
    pub async fn ensure_downloaded(&self, source: &ArtifactSource) -> Result<(), ArtifactError> {
        log::info!("Checking if bundle '{}' is downloaded...", source.name);
        if !self.is_downloaded(&source.name) {
            log::info!("Bundle not found, downloading...");
            self.download(source).await?;
        } else if !self.verify(&source.name)? {
            log::warn!("Bundle verification failed, re-downloading...");
            self.remove(&source.name)?;
            self.download(source).await?;
        } else {
            log::info!("Bundle verification successful");
        }
        Ok(())
    }
}

async fn fetch(url: &str, expected_hash: Option<&str>, file_type: &str) -> Result<Vec<u8>, ArtifactError> {
    log::info!("Downloading {} file from {}", file_type, url);
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    log::info!("Downloaded {} bytes", bytes.len());

    if let Some(expected) = expected_hash {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
            return Err(ArtifactError::HashMismatch {
                file_type: file_type.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
    }
    Ok(bytes.to_vec())
}

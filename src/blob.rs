//! Photo upload boundary. Issues never hold binary content, only reference
//! strings handed back by the blob store. The local implementation copies
//! uploads into the data directory; a real deployment would point this trait
//! at object storage.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::error::{CoreError, FieldError};
use crate::lifecycle::MAX_PHOTOS;

/// Size ceiling per uploaded photo.
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

pub trait BlobStore {
    /// Persists the file and returns a stable reference string.
    fn store(&self, source: &Path) -> Result<String>;
}

/// Checks the upload batch before anything is handed to the store, so a
/// failing create leaves no blobs behind.
pub fn check_uploads(paths: &[PathBuf]) -> Result<(), CoreError> {
    let mut errors = Vec::new();

    if paths.len() > MAX_PHOTOS {
        errors.push(FieldError::new(
            "photos",
            format!("at most {} photos are allowed", MAX_PHOTOS),
        ));
    }

    for path in paths.iter().take(MAX_PHOTOS) {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_PHOTO_BYTES => {
                errors.push(FieldError::new(
                    "photos",
                    format!(
                        "{} exceeds the {} MiB limit",
                        path.display(),
                        MAX_PHOTO_BYTES / (1024 * 1024)
                    ),
                ));
            }
            Ok(_) => {}
            Err(_) => {
                errors.push(FieldError::new(
                    "photos",
                    format!("{} is not readable", path.display()),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

/// Blob store backed by an uploads directory next to the database.
pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create uploads directory {}", dir.display()))?;
        Ok(LocalBlobStore { dir })
    }
}

impl BlobStore for LocalBlobStore {
    fn store(&self, source: &Path) -> Result<String> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .context("Photo path has no usable file name")?;
        let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), file_name);

        fs::copy(source, self.dir.join(&stored_name))
            .with_context(|| format!("Failed to store photo {}", source.display()))?;

        Ok(format!("/uploads/{}", stored_name))
    }
}

use crate::error::AppError;
use crate::models::StoredObject;
use crate::utils::{naming, validation};
use async_recursion::async_recursion;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// Reserved original filename whose upload only realizes a folder. The
/// written file is removed immediately after the rename.
pub const TEMP_MARKER: &str = "temp.txt";

/// How many fresh names to try when the generated one already exists.
/// Collisions are effectively impossible at 64 bits of entropy; this is
/// defense in depth, not a contract.
const NAME_RETRIES: usize = 3;

/// Characters percent-encoded in retrieval URL path segments
const URL_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// Filesystem-backed object store. The directory tree under `root` is the
/// only source of truth: no index, no sidecar metadata.
pub struct StorageService {
    root: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl StorageService {
    pub fn new(root: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            root,
            base_url,
            max_file_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a sanitized folder path to its directory under the root,
    /// creating it and missing ancestors on demand. Idempotent; a creation
    /// race with a concurrent request is not an error.
    pub async fn resolve_folder(&self, folder: &str) -> Result<PathBuf, AppError> {
        let mut dir = self.root.clone();
        for segment in folder.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Stores one validated upload.
    ///
    /// Pipeline: content-type gate, folder placement, name generation,
    /// temp-name write, rename. A reader never observes a partial file
    /// under its final name, and every failure path removes the staging
    /// file before the error surfaces. Nothing is persisted — and no
    /// folder is created — when validation fails.
    pub async fn put<R>(
        &self,
        reader: R,
        original_name: &str,
        declared_type: &str,
        folder: &str,
    ) -> Result<StoredObject, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        validation::validate_mime_type(declared_type)?;
        let folder = validation::sanitize_folder(folder)?;
        let dir = self.resolve_folder(&folder).await?;

        let extension = naming::extension_of(original_name);
        let mut filename = naming::random_name(extension);
        for _ in 0..NAME_RETRIES {
            if !fs::try_exists(dir.join(&filename)).await.unwrap_or(false) {
                break;
            }
            tracing::warn!("Name collision on {}, regenerating", filename);
            filename = naming::random_name(extension);
        }

        // Staging name is dot-prefixed so a crash mid-write leaves nothing
        // the lister reports.
        let staging = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let size = match self.write_bounded(&staging, reader).await {
            Ok(size) => size,
            Err(e) => {
                remove_quietly(&staging).await;
                return Err(e);
            }
        };

        let final_path = dir.join(&filename);
        if let Err(e) = fs::rename(&staging, &final_path).await {
            remove_quietly(&staging).await;
            return Err(e.into());
        }

        // Folder-creation-only upload: the caller wanted the folder, not
        // the file.
        if original_name == TEMP_MARKER {
            remove_quietly(&final_path).await;
        }

        tracing::info!(
            "Stored {} ({} bytes) in folder '{}'",
            filename,
            size,
            folder
        );

        Ok(StoredObject {
            url: self.object_url(&folder, &filename),
            filename,
            folder,
            size,
            uploaded_at: Utc::now(),
        })
    }

    /// Streams `reader` into a freshly created file at `path`, enforcing
    /// the size ceiling as bytes arrive rather than after buffering the
    /// whole body.
    async fn write_bounded<R>(&self, path: &Path, mut reader: R) -> Result<u64, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut file = fs::File::create(path).await?;
        let mut buffer = vec![0u8; 64 * 1024];
        let mut total: u64 = 0;

        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            total += n as u64;
            if total > self.max_file_size as u64 {
                return Err(AppError::TooLarge(self.max_file_size));
            }
            file.write_all(&buffer[..n]).await?;
        }

        file.flush().await?;
        Ok(total)
    }

    /// Walks the whole storage tree and returns a flat inventory, newest
    /// first. Unreadable entries are logged and skipped; the listing as a
    /// whole never fails.
    pub async fn list(&self) -> Vec<StoredObject> {
        let mut objects = Vec::new();
        self.walk(self.root.clone(), String::new(), &mut objects)
            .await;

        objects.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| (&a.folder, &a.filename).cmp(&(&b.folder, &b.filename)))
        });
        objects
    }

    #[async_recursion]
    async fn walk(&self, dir: PathBuf, folder: String, out: &mut Vec<StoredObject>) {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory {:?}: {}", dir, e);
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Stopped reading directory {:?}: {}", dir, e);
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            if metadata.is_dir() {
                let subfolder = if folder.is_empty() {
                    name
                } else {
                    format!("{}/{}", folder, name)
                };
                self.walk(entry.path(), subfolder, out).await;
                continue;
            }

            if is_hidden_from_listing(&name) {
                continue;
            }

            let uploaded_at: DateTime<Utc> = match metadata.modified() {
                Ok(mtime) => mtime.into(),
                Err(e) => {
                    tracing::warn!("Skipping entry without mtime {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            out.push(StoredObject {
                url: self.object_url(&folder, &name),
                filename: name,
                folder: folder.clone(),
                size: metadata.len(),
                uploaded_at,
            });
        }
    }

    /// Deletes a root-level object by its bare filename. Files inside
    /// folders are intentionally unreachable here: delete addressing is
    /// root-only by contract.
    pub async fn delete_root_object(&self, filename: &str) -> Result<(), AppError> {
        validation::validate_bare_filename(filename)?;

        let path = self.root.join(filename);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {
                fs::remove_file(&path).await?;
                tracing::info!("Deleted {}", filename);
                Ok(())
            }
            _ => Err(AppError::NotFound("File not found".to_string())),
        }
    }

    /// Fully-qualified retrieval URL for an object
    pub fn object_url(&self, folder: &str, filename: &str) -> String {
        let mut url = format!("{}/uploads", self.base_url);
        for segment in folder.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(&utf8_percent_encode(segment, URL_SEGMENT).to_string());
        }
        url.push('/');
        url.push_str(&utf8_percent_encode(filename, URL_SEGMENT).to_string());
        url
    }
}

/// Names the lister never reports: the reserved temp marker (normally
/// already deleted, but a crash between write and cleanup could leave one)
/// and in-flight staging files.
fn is_hidden_from_listing(name: &str) -> bool {
    name == TEMP_MARKER || (name.starts_with('.') && name.ends_with(".tmp"))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!("Failed to remove {:?}: {}", path, e);
    }
}

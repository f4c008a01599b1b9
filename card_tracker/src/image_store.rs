//! On-disk store for uploaded card photos
//!
//! Files live under `<data_dir>/card_images/<owner>/<key>` and are served
//! back at `/images/<owner>/<key>`.

use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};

/// URL prefix images are served under
pub const IMAGE_URL_PREFIX: &str = "/images";

/// Which face of a card an image shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardSide::Front => "front",
            CardSide::Back => "back",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Some(CardSide::Front),
            "back" => Some(CardSide::Back),
            _ => None,
        }
    }
}

/// File extension for an image content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Content type to serve a stored file with, from its extension
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Storage key for a card photo, e.g. `"<card_id>-front.jpg"`
pub fn image_key(card_id: &str, side: CardSide, content_type: &str) -> Result<String> {
    let ext = extension_for(content_type).ok_or_else(|| {
        TrackerError::validation(format!("unsupported image type: {}", content_type))
    })?;
    let key = format!("{}-{}.{}", card_id, side.as_str(), ext);
    check_component(&key)?;
    Ok(key)
}

/// Owner ids and keys become path components; only a safe subset is allowed
fn check_component(value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && !value.starts_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(TrackerError::validation(format!(
            "invalid image path component: {:?}",
            value
        )))
    }
}

pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create the store below `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        let root = data_dir.join("card_images");

        if let Err(e) = std::fs::create_dir_all(&root) {
            log::warn!("Failed to create image directory: {}", e);
        } else {
            log::info!("Image directory: {:?}", root);
        }

        Self { root }
    }

    fn image_path(&self, owner: &str, key: &str) -> Result<PathBuf> {
        check_component(owner)?;
        check_component(key)?;
        Ok(self.root.join(owner).join(key))
    }

    /// Public URL for a stored image
    pub fn image_url(owner: &str, key: &str) -> String {
        format!("{}/{}/{}", IMAGE_URL_PREFIX, owner, key)
    }

    /// Write (or overwrite) an image and return its URL
    pub fn upload_image(&self, owner: &str, key: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(TrackerError::validation("image body is empty"));
        }
        let path = self.image_path(owner, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;

        log::info!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::image_url(owner, key))
    }

    /// Read an image; `None` if it does not exist
    pub fn read_image(&self, owner: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.image_path(owner, key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the image behind a URL returned by `upload_image`
    ///
    /// URLs that do not point into this store are ignored, as are files
    /// that are already gone.
    pub fn delete_image(&self, url: &str) -> Result<()> {
        let Some(rest) = url
            .strip_prefix(IMAGE_URL_PREFIX)
            .and_then(|r| r.strip_prefix('/'))
        else {
            log::debug!("Not deleting foreign image URL {}", url);
            return Ok(());
        };
        let Some((owner, key)) = rest.split_once('/') else {
            return Err(TrackerError::validation(format!("malformed image URL: {}", url)));
        };

        let path = self.image_path(owner, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Image already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

//! Local resource directory conventions.
//!
//! Banner images live next to the featured posts markdown in one directory.
//! An image file is named after its stylesheet name plus the extension of
//! the URL it was downloaded from, so `header-img-banner` served from
//! `.../abc.png` becomes `header-img-banner.png`, and uploading that file
//! again targets `header-img-banner`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::SyncError;

pub const DEFAULT_RESOURCES_DIR: &str = "./resources";
pub const DEFAULT_IMAGE_PREFIX: &str = "header-img-";
pub const FEATURED_POSTS_FILE: &str = "featured_posts.md";

/// Extension used when an image URL carries none.
const FALLBACK_EXTENSION: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    pub dir: PathBuf,
    /// Only stylesheet images (and local files) starting with this are banner images.
    pub image_prefix: String,
    pub featured_posts_file: String,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            featured_posts_file: FEATURED_POSTS_FILE.to_string(),
        }
    }
}

impl ResourceLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn featured_posts_path(&self) -> PathBuf {
        self.dir.join(&self.featured_posts_file)
    }

    /// Create the resource directory if it is missing. Calling this when the
    /// directory already exists is a no-op.
    pub fn ensure_dir(&self) -> Result<(), SyncError> {
        if self.dir.is_dir() {
            debug!(path = %self.dir.display(), "Resource directory already exists");
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| {
            error!(error = ?e, path = %self.dir.display(), "Failed to create resource directory");
            SyncError::Io(e)
        })?;
        info!(path = %self.dir.display(), "Created resource directory");
        Ok(())
    }

    pub fn is_banner_image(&self, name: &str) -> bool {
        name.starts_with(&self.image_prefix)
    }

    /// Stylesheet name a local file is uploaded under, or `None` when the
    /// file is not a banner image.
    pub fn remote_name(&self, file: &Path) -> Option<String> {
        let stem = file.file_stem()?.to_str()?;
        self.is_banner_image(stem).then(|| stem.to_string())
    }

    /// Banner images present in the directory, sorted by file name. Each
    /// remote name must come from exactly one file.
    pub fn local_images(&self) -> Result<Vec<(String, PathBuf)>, SyncError> {
        let mut images = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match self.remote_name(&path) {
                Some(name) => images.push((name, path)),
                None => debug!(path = %path.display(), "Skipping non-banner file"),
            }
        }
        images.sort_by(|a, b| a.1.cmp(&b.1));

        let mut by_name: BTreeMap<&str, Vec<&PathBuf>> = BTreeMap::new();
        for (name, path) in &images {
            by_name.entry(name.as_str()).or_default().push(path);
        }
        if let Some((name, paths)) = by_name.into_iter().find(|(_, paths)| paths.len() > 1) {
            error!(name, count = paths.len(), "Several local files share one image name");
            return Err(SyncError::DuplicateImage {
                name: name.to_string(),
                paths: paths.into_iter().cloned().collect(),
            });
        }
        Ok(images)
    }

    /// [`Self::local_images`] with every file's type checked, so nothing is
    /// uploaded when any banner file would be rejected.
    pub fn uploadable_images(&self) -> Result<Vec<(String, PathBuf)>, SyncError> {
        let images = self.local_images()?;
        for (_, path) in &images {
            image_type(path).map_err(|e| {
                error!(path = %path.display(), "Unsupported banner image type");
                e
            })?;
        }
        Ok(images)
    }
}

/// Local file name for a downloaded stylesheet image.
pub fn image_file_name(name: &str, url: &str) -> String {
    format!("{name}.{}", url_extension(url).unwrap_or(FALLBACK_EXTENSION))
}

fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// Image type the stylesheet upload expects for a local file.
pub fn image_type(path: &Path) -> Result<&'static str, SyncError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => Ok("png"),
        Some("jpg") | Some("jpeg") => Ok("jpg"),
        _ => Err(SyncError::UnsupportedImage(path.to_path_buf())),
    }
}

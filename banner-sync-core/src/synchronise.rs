//! High-level modes: download the banner, or upload the edited banner.
//!
//! Each mode runs its steps strictly in order against a [`Platform`]:
//!   - download: ensure the resource directory, fetch banner images, fetch
//!     the featured posts widget text
//!   - upload: widget text, sidebar region, banner images followed by a
//!     stylesheet refresh
//!
//! # Error Handling
//! The first failing step aborts the mode and is returned as a
//! [`SyncError`]. Nothing is retried or rolled back.
//!
//! # Navigation
//! - Entrypoints: [`run_download`], [`run_upload`]
//! - Settings: [`BannerSettings`]

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info};

use crate::contract::Platform;
use crate::download::{download_featured_posts, download_images};
use crate::error::SyncError;
use crate::resources::ResourceLayout;
use crate::sidebar::SidebarMarkers;
use crate::upload::{upload_images, upload_sidebar, upload_widget_text};
use crate::widget::DEFAULT_WIDGET_NAME;

pub const DEFAULT_WIKI_PAGE: &str = "config/sidebar";
/// Stylesheet uploads in quick succession are rejected by the platform.
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_EDIT_REASON: &str = "Update featured posts";

/// Remote names and timing shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSettings {
    pub widget_name: String,
    pub wiki_page: String,
    pub markers: SidebarMarkers,
    pub upload_delay: Duration,
    pub edit_reason: String,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            widget_name: DEFAULT_WIDGET_NAME.to_string(),
            wiki_page: DEFAULT_WIKI_PAGE.to_string(),
            markers: SidebarMarkers::default(),
            upload_delay: DEFAULT_UPLOAD_DELAY,
            edit_reason: DEFAULT_EDIT_REASON.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct DownloadReport {
    pub images: Vec<PathBuf>,
    pub featured_posts: PathBuf,
}

#[derive(Debug)]
pub struct UploadReport {
    pub widget: String,
    pub wiki_page: String,
    pub images: Vec<String>,
}

pub async fn run_download<P>(
    platform: &P,
    layout: &ResourceLayout,
    settings: &BannerSettings,
) -> Result<DownloadReport, SyncError>
where
    P: Platform + ?Sized,
{
    info!(dir = %layout.dir.display(), "[DOWNLOAD] Starting banner download");
    layout.ensure_dir()?;

    let images = download_images(platform, layout).await.map_err(|e| {
        error!(error = %e, "[DOWNLOAD][ERROR] Image download failed");
        e
    })?;
    let featured_posts = download_featured_posts(platform, layout, &settings.widget_name)
        .await
        .map_err(|e| {
            error!(error = %e, "[DOWNLOAD][ERROR] Featured posts download failed");
            e
        })?;

    info!(images = images.len(), "[DOWNLOAD] Banner download complete");
    Ok(DownloadReport {
        images,
        featured_posts,
    })
}

pub async fn run_upload<P>(
    platform: &P,
    layout: &ResourceLayout,
    settings: &BannerSettings,
) -> Result<UploadReport, SyncError>
where
    P: Platform + ?Sized,
{
    info!(dir = %layout.dir.display(), "[UPLOAD] Starting banner upload");

    // Local image problems must surface before the first remote write.
    let checked = layout.uploadable_images().map_err(|e| {
        error!(error = %e, "[UPLOAD][ERROR] Local banner images are not uploadable");
        e
    })?;
    info!(images = checked.len(), "[UPLOAD] Local banner images checked");

    upload_widget_text(platform, layout, &settings.widget_name)
        .await
        .map_err(|e| {
            error!(error = %e, "[UPLOAD][ERROR] Widget upload failed");
            e
        })?;
    upload_sidebar(
        platform,
        layout,
        &settings.wiki_page,
        &settings.markers,
        &settings.edit_reason,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "[UPLOAD][ERROR] Sidebar upload failed");
        e
    })?;
    let images = upload_images(platform, layout, settings.upload_delay)
        .await
        .map_err(|e| {
            error!(error = %e, "[UPLOAD][ERROR] Image upload failed");
            e
        })?;

    info!(images = images.len(), "[UPLOAD] Banner upload complete");
    Ok(UploadReport {
        widget: settings.widget_name.clone(),
        wiki_page: settings.wiki_page.clone(),
        images,
    })
}

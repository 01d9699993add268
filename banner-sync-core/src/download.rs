//! Pull the current banner from the subreddit into the resource directory.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, error, info};

use crate::contract::Platform;
use crate::error::SyncError;
use crate::resources::{image_file_name, ResourceLayout};
use crate::widget::find_widget;

/// Download every stylesheet image whose name carries the banner prefix.
///
/// Images are written as `<name>.<ext>` into the resource directory,
/// overwriting existing files. The first failure aborts; files written
/// before it are kept.
pub async fn download_images<P>(
    platform: &P,
    layout: &ResourceLayout,
) -> Result<Vec<PathBuf>, SyncError>
where
    P: Platform + ?Sized,
{
    info!("Retrieving previous banner images");
    let stylesheet = platform.stylesheet().await.map_err(|e| {
        error!(error = ?e, "Failed to fetch stylesheet");
        SyncError::Platform(e)
    })?;

    let mut written = Vec::new();
    for image in &stylesheet.images {
        if !layout.is_banner_image(&image.name) {
            debug!(name = %image.name, "Skipping non-banner stylesheet image");
            continue;
        }

        let bytes = platform.fetch_image(&image.url).await.map_err(|e| {
            error!(error = ?e, name = %image.name, url = %image.url, "Failed to fetch image");
            SyncError::Platform(e)
        })?;

        let path = layout.dir.join(image_file_name(&image.name, &image.url));
        fs::write(&path, &bytes).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to write image");
            SyncError::Io(e)
        })?;
        info!(name = %image.name, path = %path.display(), size = bytes.len(), "Downloaded banner image");
        written.push(path);
    }

    info!(count = written.len(), "Banner images downloaded");
    Ok(written)
}

/// Write the featured posts widget text to the local markdown file.
pub async fn download_featured_posts<P>(
    platform: &P,
    layout: &ResourceLayout,
    widget_name: &str,
) -> Result<PathBuf, SyncError>
where
    P: Platform + ?Sized,
{
    info!(widget = widget_name, "Retrieving featured posts");
    let widgets = platform.sidebar_widgets().await.map_err(|e| {
        error!(error = ?e, "Failed to list sidebar widgets");
        SyncError::Platform(e)
    })?;
    let widget = find_widget(&widgets, widget_name).map_err(|e| {
        error!(error = %e, "Featured posts widget lookup failed");
        SyncError::Widget(e)
    })?;

    let path = layout.featured_posts_path();
    fs::write(&path, widget.text.as_bytes()).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to write featured posts");
        SyncError::Io(e)
    })?;
    info!(path = %path.display(), widget_id = %widget.id, "Featured posts written to file");
    Ok(path)
}

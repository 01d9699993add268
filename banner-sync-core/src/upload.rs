//! Push the locally edited banner back to the subreddit.
//!
//! Uploads overwrite the remote side unconditionally and are not verified
//! afterwards.

use std::time::Duration;

use tokio::fs;
use tracing::{error, info};

use crate::contract::Platform;
use crate::error::SyncError;
use crate::resources::ResourceLayout;
use crate::sidebar::{replace_region, SidebarMarkers};
use crate::widget::find_widget;

async fn read_featured_posts(layout: &ResourceLayout) -> Result<String, SyncError> {
    let path = layout.featured_posts_path();
    info!(path = %path.display(), "Reading featured posts markdown");
    fs::read_to_string(&path).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read featured posts markdown");
        SyncError::Io(e)
    })
}

/// Overwrite the featured posts widget with the local markdown.
pub async fn upload_widget_text<P>(
    platform: &P,
    layout: &ResourceLayout,
    widget_name: &str,
) -> Result<(), SyncError>
where
    P: Platform + ?Sized,
{
    let markdown = read_featured_posts(layout).await?;

    info!(widget = widget_name, "Uploading featured posts to widget");
    let widgets = platform.sidebar_widgets().await.map_err(|e| {
        error!(error = ?e, "Failed to list sidebar widgets");
        SyncError::Platform(e)
    })?;
    let widget = find_widget(&widgets, widget_name)?;
    platform
        .update_widget_text(widget, &markdown)
        .await
        .map_err(|e| {
            error!(error = ?e, widget_id = %widget.id, "Failed to update widget text");
            SyncError::Platform(e)
        })?;
    info!(widget_id = %widget.id, "Widget text updated");
    Ok(())
}

/// Replace the featured posts region of the sidebar wiki page with the
/// local markdown lines.
pub async fn upload_sidebar<P>(
    platform: &P,
    layout: &ResourceLayout,
    page: &str,
    markers: &SidebarMarkers,
    reason: &str,
) -> Result<(), SyncError>
where
    P: Platform + ?Sized,
{
    let markdown = read_featured_posts(layout).await?;
    let new_lines: Vec<&str> = markdown.split_inclusive('\n').collect();

    info!(page, "Retrieving current sidebar");
    let sidebar = platform.wiki_page(page).await.map_err(|e| {
        error!(error = ?e, page, "Failed to read sidebar wiki page");
        SyncError::Platform(e)
    })?;

    let updated = replace_region(&sidebar.content_md, &new_lines, markers)?;

    info!(page, entries = new_lines.len(), "Uploading new sidebar");
    platform
        .edit_wiki_page(page, &updated, reason)
        .await
        .map_err(|e| {
            error!(error = ?e, page, "Failed to edit sidebar wiki page");
            SyncError::Platform(e)
        })?;
    info!(page, "Sidebar updated");
    Ok(())
}

/// Upload every local banner image, waiting `delay` after each upload, then
/// re-save the stylesheet so the new images are served. Every file is
/// checked before the first upload. Returns the uploaded remote names in
/// upload order.
pub async fn upload_images<P>(
    platform: &P,
    layout: &ResourceLayout,
    delay: Duration,
) -> Result<Vec<String>, SyncError>
where
    P: Platform + ?Sized,
{
    info!(dir = %layout.dir.display(), "Uploading banner images");
    let images = layout.uploadable_images()?;

    let mut uploaded = Vec::with_capacity(images.len());
    for (name, path) in &images {
        info!(name = %name, path = %path.display(), "Uploading image");
        platform
            .upload_stylesheet_image(name, path)
            .await
            .map_err(|e| {
                error!(error = ?e, name = %name, path = %path.display(), "Image upload failed");
                SyncError::Platform(e)
            })?;
        uploaded.push(name.clone());
        // The stylesheet save after the last image is rate limited too.
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    refresh_stylesheet(platform).await?;
    Ok(uploaded)
}

/// Save the current stylesheet text unchanged.
pub async fn refresh_stylesheet<P>(platform: &P) -> Result<(), SyncError>
where
    P: Platform + ?Sized,
{
    info!("Refreshing stylesheet");
    let stylesheet = platform.stylesheet().await.map_err(|e| {
        error!(error = ?e, "Failed to fetch stylesheet for refresh");
        SyncError::Platform(e)
    })?;
    platform
        .update_stylesheet(&stylesheet.stylesheet)
        .await
        .map_err(|e| {
            error!(error = ?e, "Failed to save stylesheet");
            SyncError::Platform(e)
        })?;
    info!("Stylesheet refreshed");
    Ok(())
}

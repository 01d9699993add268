use std::fmt;
use std::path::PathBuf;

use crate::contract::PlatformError;
use crate::sidebar::SidebarError;
use crate::widget::WidgetError;

/// Failure of a download or upload step. The first failure aborts the run.
#[derive(Debug)]
pub enum SyncError {
    Io(std::io::Error),
    Platform(PlatformError),
    Sidebar(SidebarError),
    Widget(WidgetError),
    /// A local image whose extension the stylesheet does not accept.
    UnsupportedImage(PathBuf),
    /// Several local files would upload to the same stylesheet name.
    DuplicateImage { name: String, paths: Vec<PathBuf> },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Io(e) => write!(f, "local file error: {e}"),
            SyncError::Platform(e) => write!(f, "platform request failed: {e}"),
            SyncError::Sidebar(e) => write!(f, "sidebar edit failed: {e}"),
            SyncError::Widget(e) => write!(f, "widget lookup failed: {e}"),
            SyncError::UnsupportedImage(path) => write!(
                f,
                "unsupported image type for {} (expected .png, .jpg or .jpeg)",
                path.display()
            ),
            SyncError::DuplicateImage { name, paths } => {
                let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "{} local files map to image name {name:?}: {}", paths.len(), files.join(", "))
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Io(e) => Some(e),
            SyncError::Platform(e) => Some(e.as_ref()),
            SyncError::Sidebar(e) => Some(e),
            SyncError::Widget(e) => Some(e),
            SyncError::UnsupportedImage(_) | SyncError::DuplicateImage { .. } => None,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e)
    }
}

impl From<PlatformError> for SyncError {
    fn from(e: PlatformError) -> Self {
        SyncError::Platform(e)
    }
}

impl From<SidebarError> for SyncError {
    fn from(e: SidebarError) -> Self {
        SyncError::Sidebar(e)
    }
}

impl From<WidgetError> for SyncError {
    fn from(e: WidgetError) -> Self {
        SyncError::Widget(e)
    }
}

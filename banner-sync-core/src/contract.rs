//! # contract: the remote platform seen by the banner workflows
//!
//! This module defines a single trait ([`Platform`]) and the plain data types
//! it exchanges. The workflows in [`crate::download`] and [`crate::upload`]
//! only ever reach the subreddit through this trait.
//!
//! ## Interface
//! - All methods are async and return boxed errors, so that HTTP, JSON and
//!   API-level failures from any implementation fit the same shape.
//! - Authentication is not part of the trait: a concrete client is expected
//!   to be authenticated when it is constructed.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockPlatform` is exported under
//!   `test` and the default `test-export-mocks` feature so integration tests
//!   in dependent crates can script the remote side.

use std::path::Path;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Error type returned by every [`Platform`] call.
pub type PlatformError = Box<dyn std::error::Error + Send + Sync>;

/// A named image attached to the subreddit stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetImage {
    pub name: String,
    pub url: String,
}

/// The subreddit stylesheet: its CSS text and the images it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub images: Vec<StylesheetImage>,
    pub stylesheet: String,
}

/// A wiki page and its markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub name: String,
    pub content_md: String,
}

/// A sidebar textarea widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAreaWidget {
    #[serde(default)]
    pub id: String,
    /// Display name shown above the widget.
    #[serde(rename = "shortName")]
    pub short_name: String,
    #[serde(default)]
    pub text: String,
    /// Colour settings; sent back untouched when the text is updated.
    #[serde(default)]
    pub styles: Option<serde_json::Value>,
}

/// Operations the banner workflows need from the subreddit.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Platform: Send + Sync {
    /// Fetch the stylesheet text and its image list.
    async fn stylesheet(&self) -> Result<Stylesheet, PlatformError>;

    /// Fetch the raw bytes behind an image URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, PlatformError>;

    /// Upload a local image to the stylesheet under `name`, replacing any
    /// image already stored with that name.
    async fn upload_stylesheet_image(&self, name: &str, path: &Path) -> Result<(), PlatformError>;

    /// Save the stylesheet text. Saving the current text unchanged is how
    /// freshly uploaded images get picked up.
    async fn update_stylesheet(&self, contents: &str) -> Result<(), PlatformError>;

    /// Read a wiki page, e.g. `config/sidebar`.
    async fn wiki_page(&self, page: &str) -> Result<WikiPage, PlatformError>;

    /// Overwrite a wiki page.
    async fn edit_wiki_page(&self, page: &str, content: &str, reason: &str) -> Result<(), PlatformError>;

    /// List the textarea widgets of the sidebar, in display order.
    async fn sidebar_widgets(&self) -> Result<Vec<TextAreaWidget>, PlatformError>;

    /// Replace the text of an existing textarea widget.
    async fn update_widget_text(&self, widget: &TextAreaWidget, text: &str) -> Result<(), PlatformError>;
}

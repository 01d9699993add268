#![doc = "Reddit implementation of the core `Platform` trait over the OAuth HTTP API."]
//
//! # Reddit client
//!
//! [`RedditClient`] authenticates a script app with the OAuth2 password grant
//! and then talks to `https://oauth.reddit.com` for one subreddit.
//!
//! - Construct it with [`RedditClient::authenticate`]; there is no token
//!   refresh, a run is expected to finish well within the token lifetime.
//! - Every non-success status, and every Reddit `errors` array in a 2xx
//!   body, becomes an error carrying the endpoint, status and body text.
//! - JSON listings are requested with `raw_json=1` so markdown comes back
//!   without HTML entity escaping.
//!
//! For the trait contract see [`banner_sync_core::contract`].

use std::path::Path;

use async_trait::async_trait;
use banner_sync_core::contract::{
    Platform, PlatformError, Stylesheet, StylesheetImage, TextAreaWidget, WikiPage,
};
use banner_sync_core::resources::image_type;
use reqwest::{multipart, Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::load_config::Credentials;

pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const API_BASE: &str = "https://oauth.reddit.com";

pub struct RedditClient {
    http: Client,
    api_base: String,
    subreddit: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct StylesheetData {
    #[serde(default)]
    images: Vec<StylesheetImage>,
    #[serde(default)]
    stylesheet: String,
}

#[derive(Debug, Deserialize)]
struct WikiPageData {
    content_md: String,
}

/// Extract the access token from a token endpoint body. Reddit answers bad
/// credentials with a 200 and an `error` field.
fn parse_token(body: &str) -> Result<String, PlatformError> {
    let resp: TokenResponse = serde_json::from_str(body)
        .map_err(|e| format!("Unreadable token response: {e}"))?;
    match (resp.access_token, resp.error) {
        (Some(token), None) => Ok(token),
        (_, Some(error)) => Err(format!("Reddit rejected the credentials: {error}").into()),
        (None, None) => Err("Token response carried no access_token".into()),
    }
}

/// Sidebar textarea widgets from a `/api/widgets` body, in sidebar order.
fn parse_sidebar_widgets(body: &Value) -> Result<Vec<TextAreaWidget>, PlatformError> {
    let order = body
        .pointer("/layout/sidebar/order")
        .and_then(Value::as_array)
        .ok_or("Widgets response has no sidebar order")?;
    let items = body
        .get("items")
        .and_then(Value::as_object)
        .ok_or("Widgets response has no items")?;

    let mut widgets = Vec::new();
    for id in order.iter().filter_map(Value::as_str) {
        let Some(item) = items.get(id) else {
            tracing::warn!(widget_id = id, "Sidebar order references unknown widget");
            continue;
        };
        if item.get("kind").and_then(Value::as_str) != Some("textarea") {
            continue;
        }
        let mut widget: TextAreaWidget = serde_json::from_value(item.clone())
            .map_err(|e| format!("Malformed textarea widget {id}: {e}"))?;
        if widget.id.is_empty() {
            widget.id = id.to_string();
        }
        widgets.push(widget);
    }
    Ok(widgets)
}

/// Reddit reports many failures as a 2xx body with a non-empty `errors`
/// array, either at the top level or under `json`.
fn check_api_errors(endpoint: &str, body: &Value) -> Result<(), PlatformError> {
    let errors = body
        .get("errors")
        .or_else(|| body.pointer("/json/errors"))
        .and_then(Value::as_array);
    match errors {
        Some(errors) if !errors.is_empty() => {
            Err(format!("{endpoint} returned errors: {}", Value::Array(errors.clone())).into())
        }
        _ => Ok(()),
    }
}

/// Decode the body of a 2xx response. An unreadable body is an error, an
/// empty one is `null`.
fn decode_success_body<E: std::fmt::Display>(
    endpoint: &str,
    text: Result<String, E>,
) -> Result<Value, PlatformError> {
    let text = text.map_err(|e| format!("{endpoint} response body could not be read: {e}"))?;
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)
            .map_err(|e| format!("{endpoint} returned unreadable JSON: {e}"))?
    };
    check_api_errors(endpoint, &body)?;
    Ok(body)
}

impl RedditClient {
    /// Log in with the password grant and bind the client to `subreddit`.
    pub async fn authenticate(
        credentials: &Credentials,
        subreddit: &str,
    ) -> Result<Self, PlatformError> {
        tracing::info!(username = %credentials.username, subreddit, "Logging in to Reddit");
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .build()?;

        let resp = http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!(status = %status, "Token request failed");
            return Err(format!("Token request failed: {status} - {body}").into());
        }
        let token = parse_token(&body).map_err(|e| {
            tracing::error!(error = %e, "Login failed");
            e
        })?;
        tracing::info!(username = %credentials.username, "Login successful");

        Ok(RedditClient {
            http,
            api_base: API_BASE.to_string(),
            subreddit: subreddit.to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/r/{}/{}", self.api_base, self.subreddit, path)
    }

    /// Send an authorised request and decode the JSON body.
    async fn send_json(&self, endpoint: &str, req: RequestBuilder) -> Result<Value, PlatformError> {
        let resp = req.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(endpoint, status = %status, "Reddit API returned error");
            return Err(format!("{endpoint} failed: {status} - {text}").into());
        }
        let body = decode_success_body(endpoint, resp.text().await).map_err(|e| {
            tracing::error!(endpoint, status = %status, error = %e, "Reddit API response rejected");
            e
        })?;
        tracing::debug!(endpoint, status = %status, "Reddit API call succeeded");
        Ok(body)
    }
}

#[async_trait]
impl Platform for RedditClient {
    async fn stylesheet(&self) -> Result<Stylesheet, PlatformError> {
        let req = self
            .http
            .get(self.url("about/stylesheet"))
            .query(&[("raw_json", "1")]);
        let body = self.send_json("about/stylesheet", req).await?;
        let thing: Thing<StylesheetData> = serde_json::from_value(body)?;
        tracing::info!(images = thing.data.images.len(), "Fetched stylesheet");
        Ok(Stylesheet {
            images: thing.data.images,
            stylesheet: thing.data.stylesheet,
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, PlatformError> {
        // Image hosts are outside the OAuth domain: no bearer token here.
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("Image download failed: {status} - {url}").into());
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn upload_stylesheet_image(&self, name: &str, path: &Path) -> Result<(), PlatformError> {
        let img_type = image_type(path)?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_string();
        let mime = if img_type == "png" { "image/png" } else { "image/jpeg" };
        tracing::info!(name, size = bytes.len(), img_type, "Uploading stylesheet image");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = multipart::Form::new()
            .text("name", name.to_string())
            .text("upload_type", "img")
            .text("img_type", img_type)
            .text("api_type", "json")
            .part("file", part);

        let req = self.http.post(self.url("api/upload_sr_img")).multipart(form);
        self.send_json("api/upload_sr_img", req).await?;
        Ok(())
    }

    async fn update_stylesheet(&self, contents: &str) -> Result<(), PlatformError> {
        let req = self.http.post(self.url("api/subreddit_stylesheet")).form(&[
            ("op", "save"),
            ("stylesheet_contents", contents),
            ("reason", "Refresh banner images"),
            ("api_type", "json"),
        ]);
        self.send_json("api/subreddit_stylesheet", req).await?;
        Ok(())
    }

    async fn wiki_page(&self, page: &str) -> Result<WikiPage, PlatformError> {
        let endpoint = format!("wiki/{page}");
        let req = self
            .http
            .get(self.url(&endpoint))
            .query(&[("raw_json", "1")]);
        let body = self.send_json(&endpoint, req).await?;
        let thing: Thing<WikiPageData> = serde_json::from_value(body)?;
        Ok(WikiPage {
            name: page.to_string(),
            content_md: thing.data.content_md,
        })
    }

    async fn edit_wiki_page(&self, page: &str, content: &str, reason: &str) -> Result<(), PlatformError> {
        let req = self.http.post(self.url("api/wiki/edit")).form(&[
            ("page", page),
            ("content", content),
            ("reason", reason),
        ]);
        self.send_json("api/wiki/edit", req).await?;
        Ok(())
    }

    async fn sidebar_widgets(&self) -> Result<Vec<TextAreaWidget>, PlatformError> {
        let req = self
            .http
            .get(self.url("api/widgets"))
            .query(&[("raw_json", "1")]);
        let body = self.send_json("api/widgets", req).await?;
        let widgets = parse_sidebar_widgets(&body)?;
        tracing::info!(count = widgets.len(), "Fetched sidebar text widgets");
        Ok(widgets)
    }

    async fn update_widget_text(&self, widget: &TextAreaWidget, text: &str) -> Result<(), PlatformError> {
        let mut payload = json!({
            "kind": "textarea",
            "shortName": widget.short_name,
            "text": text,
        });
        if let Some(styles) = &widget.styles {
            payload["styles"] = styles.clone();
        }
        let endpoint = format!("api/widget/{}", widget.id);
        let req = self.http.put(self.url(&endpoint)).json(&payload);
        self.send_json(&endpoint, req).await?;
        Ok(())
    }
}

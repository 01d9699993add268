/// `load_config` module: reads the `key=value` credentials file and turns it
/// into strongly typed [`Credentials`] plus the banner settings.
///
/// # Responsibilities
/// - Parse `key=value` lines (split on the first `=`, blank lines and `#`
///   comments skipped)
/// - Inject secrets from the environment: `REDDIT_CLIENT_ID`,
///   `REDDIT_CLIENT_SECRET`, `REDDIT_USERNAME`, `REDDIT_PASSWORD` and
///   `REDDIT_USER_AGENT` override the file
/// - Map optional keys onto [`ResourceLayout`] and [`BannerSettings`]
///
/// # Errors
/// All errors use `anyhow::Error` and name the offending line or key; they
/// are surfaced at the CLI boundary.
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use banner_sync_core::resources::ResourceLayout;
use banner_sync_core::synchronise::BannerSettings;
use tracing::{error, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.txt";
pub const DEFAULT_SUBREDDIT: &str = "Neoliberaltest";

/// Script-app credentials for the Reddit OAuth password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub credentials: Credentials,
    pub subreddit: String,
    pub layout: ResourceLayout,
    pub settings: BannerSettings,
}

/// Required keys with the environment variable that may supply each one.
const CREDENTIAL_KEYS: [(&str, &str); 5] = [
    ("client_id", "REDDIT_CLIENT_ID"),
    ("client_secret", "REDDIT_CLIENT_SECRET"),
    ("username", "REDDIT_USERNAME"),
    ("password", "REDDIT_PASSWORD"),
    ("user_agent", "REDDIT_USER_AGENT"),
];

const SETTING_KEYS: [&str; 8] = [
    "subreddit",
    "resources_dir",
    "image_prefix",
    "widget_name",
    "wiki_page",
    "start_marker",
    "end_marker",
    "upload_delay_secs",
];

/// Parse `key=value` lines. Later duplicates win.
pub fn parse_key_values(content: &str) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: expected key=value, got {:?}", idx + 1, line);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("line {}: empty key", idx + 1);
        }
        values.insert(key.to_string(), value.trim().to_string());
    }
    Ok(values)
}

/// Loads the config file at `path` and merges environment secrets into it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let values = parse_key_values(&content)
        .with_context(|| format!("Failed to parse config file {:?}", path_ref))?;
    let config = config_from_values(values, |key| std::env::var(key).ok())?;
    info!(
        subreddit = %config.subreddit,
        username = %config.credentials.username,
        resources_dir = %config.layout.dir.display(),
        "Config loaded and merged successfully"
    );
    Ok(config)
}

/// Build the config from parsed values; `env` looks up secret overrides.
pub fn config_from_values<F>(mut values: HashMap<String, String>, env: F) -> Result<CliConfig>
where
    F: Fn(&str) -> Option<String>,
{
    for key in values.keys() {
        let known = CREDENTIAL_KEYS.iter().any(|(k, _)| *k == key.as_str())
            || SETTING_KEYS.contains(&key.as_str());
        if !known {
            warn!(key = %key, "Ignoring unknown config key");
        }
    }

    let mut credential = |key: &str, var: &str| -> Result<String> {
        if let Some(value) = env(var).filter(|v| !v.is_empty()) {
            info!(key, var, "Credential taken from environment");
            return Ok(value);
        }
        match values.remove(key).filter(|v| !v.is_empty()) {
            Some(value) => Ok(value),
            None => {
                error!(key, var, "Missing required credential");
                bail!("missing required config key `{key}` (or environment variable {var})")
            }
        }
    };
    let [client_id, client_secret, username, password, user_agent] = CREDENTIAL_KEYS;
    let credentials = Credentials {
        client_id: credential(client_id.0, client_id.1)?,
        client_secret: credential(client_secret.0, client_secret.1)?,
        username: credential(username.0, username.1)?,
        password: credential(password.0, password.1)?,
        user_agent: credential(user_agent.0, user_agent.1)?,
    };

    let mut layout = ResourceLayout::default();
    if let Some(dir) = values.remove("resources_dir") {
        layout.dir = PathBuf::from(dir);
    }
    if let Some(prefix) = values.remove("image_prefix") {
        layout.image_prefix = prefix;
    }

    let mut settings = BannerSettings::default();
    if let Some(name) = values.remove("widget_name") {
        settings.widget_name = name;
    }
    if let Some(page) = values.remove("wiki_page") {
        settings.wiki_page = page;
    }
    if let Some(marker) = values.remove("start_marker") {
        settings.markers.start = marker;
    }
    if let Some(marker) = values.remove("end_marker") {
        settings.markers.end = marker;
    }
    if let Some(raw) = values.remove("upload_delay_secs") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("upload_delay_secs must be a whole number of seconds, got {raw:?}"))?;
        settings.upload_delay = Duration::from_secs(secs);
    }

    let subreddit = values
        .remove("subreddit")
        .unwrap_or_else(|| DEFAULT_SUBREDDIT.to_string());

    Ok(CliConfig {
        credentials,
        subreddit,
        layout,
        settings,
    })
}

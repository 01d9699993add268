///
/// This module implements the CLI for banner-sync: argument parsing, config
/// loading, login, and dispatch to the download and upload modes.
///
/// All workflow logic (resource conventions, sidebar editing, uploads) lives
/// in [`banner-sync-core`]. This module is strictly CLI glue.
///
/// ## How To Use
/// - Command line: `banner-sync --download`, `banner-sync --upload`, or both
///   (download runs first).
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`], or
///   [`execute`] with any [`Platform`] to skip the Reddit login.
///
/// [`banner-sync-core`]: ../../banner-sync-core/
use std::path::PathBuf;

use anyhow::{Context, Result};
use banner_sync_core::contract::Platform;
use banner_sync_core::synchronise::{run_download, run_upload};
use clap::{ArgGroup, Parser};

use crate::load_config::{load_config, CliConfig, DEFAULT_CONFIG_PATH};
use crate::reddit::RedditClient;

/// CLI for banner-sync: modify a subreddit's featured posts banner.
#[derive(Debug, Parser)]
#[clap(
    name = "banner-sync",
    version,
    about = "Download and re-upload a subreddit's featured posts banner images and markdown text"
)]
#[clap(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["download", "upload"])
))]
pub struct Cli {
    /// Download previous banner images and markdown text
    #[clap(short, long)]
    pub download: bool,

    /// Upload new banner images and markdown text
    #[clap(short, long)]
    pub upload: bool,

    /// Path to the key=value credentials file
    #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Subreddit to operate on (overrides the config file)
    #[clap(long)]
    pub subreddit: Option<String>,

    /// Local resource directory (overrides the config file)
    #[clap(long)]
    pub resources: Option<PathBuf>,
}

/// Async CLI entrypoint for main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let mut config = load_config(&cli.config)?;
    if let Some(subreddit) = cli.subreddit {
        config.subreddit = subreddit;
    }
    if let Some(dir) = cli.resources {
        config.layout.dir = dir;
    }

    println!("logging in...");
    let client = RedditClient::authenticate(&config.credentials, &config.subreddit)
        .await
        .map_err(|e| anyhow::anyhow!("Login to r/{} failed: {e}", config.subreddit))?;
    println!("successful");

    execute(&client, &config, cli.download, cli.upload).await
}

/// Run the selected modes against `platform`; download first when both are set.
pub async fn execute<P>(platform: &P, config: &CliConfig, download: bool, upload: bool) -> Result<()>
where
    P: Platform + ?Sized,
{
    if download {
        tracing::info!(command = "download", subreddit = %config.subreddit, "Starting download");
        let report = run_download(platform, &config.layout, &config.settings)
            .await
            .context("Download failed")?;
        println!(
            "Downloaded {} banner image(s) and {} to {}",
            report.images.len(),
            report.featured_posts.display(),
            config.layout.dir.display()
        );
        tracing::info!(command = "download", ?report, "Download complete");
    }

    if upload {
        tracing::info!(command = "upload", subreddit = %config.subreddit, "Starting upload");
        let report = run_upload(platform, &config.layout, &config.settings)
            .await
            .context("Upload failed")?;
        println!(
            "Updated widget {:?}, wiki page {} and {} banner image(s)",
            report.widget,
            report.wiki_page,
            report.images.len()
        );
        tracing::info!(command = "upload", ?report, "Upload complete");
    }

    Ok(())
}

mod app;
mod error;
mod github;
mod instagram;
mod logger;
mod model;
mod utils;
mod workflow;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::app::{AppConfig, Credentials};
use crate::github::GithubClient;
use crate::instagram::StoryPublisher;
use crate::model::{ContainerId, MediaType};

#[derive(Parser)]
#[command(
    name = "story_pipeline",
    version,
    about = "Upload media to GitHub and post it to Instagram Stories"
)]
struct Cli {
    /// Non-secret settings (API bases, media dir, timeout)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file to the media repository and print its raw URL
    Upload {
        file: PathBuf,
        /// Path inside the repository (defaults to <media_dir>/<file name>)
        #[arg(long)]
        dest: Option<String>,
    },
    /// Post an already public URL as a Story
    Post {
        media_url: String,
        /// IMAGE or VIDEO
        media_type: MediaType,
    },
    /// Upload a local file, then post it as a Story
    Run {
        file: PathBuf,
        /// IMAGE or VIDEO
        media_type: MediaType,
    },
    /// Show the processing status of a Story container
    Status { container_id: String },
    /// Exchange a short-lived token for a ~60 day one
    ExchangeToken {
        #[arg(long)]
        app_id: Option<String>,
        #[arg(long)]
        app_secret: Option<String>,
        /// Short-lived token from the Graph API Explorer
        #[arg(long)]
        token: Option<String>,
    },
}

fn load_credentials() -> Result<Credentials> {
    Credentials::from_env().context("Create a .env file in the project root with these values")
}

/// Ask on stderr, read one line from stdin
fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logger::init();
    if let Ok(path) = dotenvy::dotenv() {
        debug!("loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let app_config = AppConfig::load(Some(&cli.config))?;
    let client = app_config.http_client().context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Upload { file, dest } => {
            let credentials = load_credentials()?;
            let uploader = GithubClient::new(&app_config, &credentials, client);
            let hosted = uploader.upload(&file, dest.as_deref()).await?;
            if let Some(sha) = &hosted.commit_sha {
                info!("📝 Committed {} as {}", hosted.path, sha);
            }
            // Only the URL on stdout, for piping
            println!("{}", hosted.url);
        }
        Commands::Post {
            media_url,
            media_type,
        } => {
            let credentials = load_credentials()?;
            let publisher = StoryPublisher::new(&app_config, &credentials, client);
            let story = publisher.post_story(&media_url, media_type).await?;
            debug!("published from container {}", story.container_id);
            println!("{}", story.media_id);
            info!("💡 Stories expire after 24 hours.");
        }
        Commands::Run { file, media_type } => {
            let outcome =
                match workflow::run(&app_config, |key| std::env::var(key).ok(), &file, media_type)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        if matches!(e.source.status(), Some(401) | Some(403)) {
                            warn!("💡 Check that GITHUB_TOKEN and INSTAGRAM_ACCESS_TOKEN are valid and not expired");
                        }
                        return Err(e.into());
                    }
                };
            debug!(
                "container {} committed as {:?} at {}",
                outcome.story.container_id, outcome.hosted.commit_sha, outcome.hosted.path
            );
            println!("📱 Story ID: {}", outcome.story.media_id);
            println!("🔗 Media hosted at: {}", outcome.hosted.url);
            info!("💡 Stories expire after 24 hours.");
        }
        Commands::Status { container_id } => {
            let credentials = load_credentials()?;
            let publisher = StoryPublisher::new(&app_config, &credentials, client);
            let status = publisher.container_status(&ContainerId(container_id)).await?;
            println!("{}", status);
        }
        Commands::ExchangeToken {
            app_id,
            app_secret,
            token,
        } => {
            let app_id = match app_id {
                Some(v) => v,
                None => prompt("Enter your Facebook App ID")?,
            };
            let app_secret = match app_secret {
                Some(v) => v,
                None => prompt("Enter your Facebook App Secret")?,
            };
            let token = match token {
                Some(v) => v,
                None => prompt("Enter your short-lived token")?,
            };
            if app_id.is_empty() || app_secret.is_empty() || token.is_empty() {
                anyhow::bail!("App ID, App Secret and short-lived token are all required");
            }

            let long_lived = instagram::exchange_token(
                &client,
                &app_config.graph_api_base,
                &app_id,
                &app_secret,
                &token,
            )
            .await?;
            println!("{}", long_lived.access_token);
            if let (Some(days), Some(at)) = (long_lived.expires_in_days(), long_lived.expires_at(Utc::now())) {
                info!("⏰ Expires in {} days ({})", days, at.format("%Y-%m-%d %H:%M UTC"));
            }
            info!("💡 Add this to your .env file as INSTAGRAM_ACCESS_TOKEN");
        }
    }

    Ok(())
}

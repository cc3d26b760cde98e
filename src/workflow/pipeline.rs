use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

use crate::app::{AppConfig, Credentials};
use crate::error::Error;
use crate::github::GithubClient;
use crate::instagram::{StoryPhase, StoryPublisher};
use crate::model::{HostedMedia, MediaType, PublishedStory};

/// Step of the upload-then-post run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Upload,
    CreateContainer,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Config => f.write_str("loading configuration"),
            Stage::Upload => f.write_str("uploading to GitHub"),
            Stage::CreateContainer => f.write_str("creating the Story container"),
            Stage::Publish => f.write_str("publishing the Story"),
        }
    }
}

impl From<StoryPhase> for Stage {
    fn from(phase: StoryPhase) -> Self {
        match phase {
            StoryPhase::CreateContainer => Stage::CreateContainer,
            StoryPhase::Publish => Stage::Publish,
        }
    }
}

#[derive(Debug, Error)]
#[error("failed while {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(Error) -> Self {
        move |source| PipelineError { stage, source }
    }
}

#[derive(Debug, Clone)]
pub struct StoryOutcome {
    pub hosted: HostedMedia,
    pub story: PublishedStory,
}

/// Upload `local_file_path` and post it as a Story.
///
/// Credentials come from `lookup` and are checked before any request. An
/// upload failure stops the run; the publisher is never contacted.
pub async fn run<F>(
    app_config: &AppConfig,
    lookup: F,
    local_file_path: &Path,
    media_type: MediaType,
) -> Result<StoryOutcome, PipelineError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup).map_err(PipelineError::at(Stage::Config))?;
    let client = app_config
        .http_client()
        .map_err(|e| Error::InvalidConfig {
            key: "http_timeout_secs",
            reason: e.to_string(),
        })
        .map_err(PipelineError::at(Stage::Config))?;
    run_with(app_config, &credentials, client, local_file_path, media_type).await
}

/// Same as [`run`] with credentials already resolved
pub async fn run_with(
    app_config: &AppConfig,
    credentials: &Credentials,
    client: reqwest::Client,
    local_file_path: &Path,
    media_type: MediaType,
) -> Result<StoryOutcome, PipelineError> {
    info!("🚀 Uploading and posting {} to Instagram Story...", media_type);
    info!("📁 Local file: {}", local_file_path.display());

    let uploader = GithubClient::new(app_config, credentials, client.clone());
    let publisher = StoryPublisher::new(app_config, credentials, client);

    info!("Step 1: Uploading to GitHub...");
    let hosted = uploader
        .upload(local_file_path, None)
        .await
        .map_err(PipelineError::at(Stage::Upload))
        .inspect_err(|e| error!("❌ {}. Aborting.", e))?;

    info!("Step 2: Posting to Instagram Story...");
    let story = publisher
        .post_story_phased(&hosted.url, media_type)
        .await
        .map_err(|(phase, source)| PipelineError {
            stage: phase.into(),
            source,
        })
        .inspect_err(|e| error!("❌ {}. Aborting.", e))?;

    info!("🎉 Success! Your Instagram Story has been published.");
    Ok(StoryOutcome { hosted, story })
}

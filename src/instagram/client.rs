use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::app::{AppConfig, Credentials};
use crate::error::{Error, Result, Service};
use crate::instagram::models::{IdResponse, StatusResponse};
use crate::model::{ContainerId, ContainerStatus, MediaId, MediaType, PublishedStory};

/// Which half of the two-phase post failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryPhase {
    CreateContainer,
    Publish,
}

/// Graph API client for the account's Stories
pub struct StoryPublisher<'a> {
    config: &'a AppConfig,
    credentials: &'a Credentials,
    client: reqwest::Client,
}

impl<'a> StoryPublisher<'a> {
    pub fn new(config: &'a AppConfig, credentials: &'a Credentials, client: reqwest::Client) -> Self {
        Self {
            config,
            credentials,
            client,
        }
    }

    /// Create a container for `media_url`, then publish it.
    ///
    /// Exactly two requests; a failed create never reaches publish.
    pub async fn post_story(&self, media_url: &str, media_type: MediaType) -> Result<PublishedStory> {
        self.post_story_phased(media_url, media_type)
            .await
            .map_err(|(_, e)| e)
    }

    /// [`post_story`](Self::post_story), tagging an error with the phase that produced it
    pub async fn post_story_phased(
        &self,
        media_url: &str,
        media_type: MediaType,
    ) -> std::result::Result<PublishedStory, (StoryPhase, Error)> {
        info!("📱 Posting {} to Instagram Story...", media_type);
        info!("🔗 Media URL: {}", media_url);

        let container_id = self
            .create_container(media_url, media_type)
            .await
            .map_err(|e| (StoryPhase::CreateContainer, e))?;
        let media_id = match self.publish(&container_id).await {
            Ok(id) => id,
            Err(e) => {
                warn!("⚠️ Container {} left unpublished, it expires on its own", container_id);
                return Err((StoryPhase::Publish, e));
            }
        };

        info!("🎉 Story published! Media ID: {}", media_id);
        Ok(PublishedStory {
            container_id,
            media_id,
        })
    }

    /// Phase one: the platform fetches `media_url` itself and stages it
    pub async fn create_container(&self, media_url: &str, media_type: MediaType) -> Result<ContainerId> {
        info!("--- Creating Story container ---");
        let url = self.account_url("media");
        let form = [
            ("media_type", "STORIES"),
            (media_type.url_field(), media_url),
        ];

        let id = self.post_for_id(&url, &form).await.map_err(|e| {
            error!("❌ Container creation failed: {}", e);
            e
        })?;
        let container_id = ContainerId(id);
        info!("✅ Container created. Container ID: {}", container_id);
        Ok(container_id)
    }

    /// Phase two: turn a staged container into a live Story
    pub async fn publish(&self, container_id: &ContainerId) -> Result<MediaId> {
        info!("--- Publishing container {} ---", container_id);
        let url = self.account_url("media_publish");
        let form = [("creation_id", container_id.0.as_str())];

        let id = self.post_for_id(&url, &form).await.map_err(|e| {
            error!("❌ Publishing failed: {}", e);
            e
        })?;
        Ok(MediaId(id))
    }

    /// One-shot status query; never polls
    pub async fn container_status(&self, container_id: &ContainerId) -> Result<ContainerStatus> {
        let url = format!("{}/{}", self.graph_base(), container_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_token", self.credentials.instagram_token.as_str()),
                ("fields", "id,status_code,status"),
            ])
            .send()
            .await
            .map_err(Error::network(Service::Instagram))?;

        let body: StatusResponse = read_json(response).await?;
        if let Some(detail) = &body.status {
            debug!("container status detail: {}", detail);
        }
        let status = ContainerStatus::from_code(body.status_code.as_deref());
        if !status.is_ready() {
            warn!("⏳ Container {} is {}", container_id, status);
        }
        Ok(status)
    }

    async fn post_for_id(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        debug!("POST {} {:?}", url, form);
        let response = self
            .client
            .post(url)
            .query(&[("access_token", self.credentials.instagram_token.as_str())])
            .form(form)
            .send()
            .await
            .map_err(Error::network(Service::Instagram))?;

        let body: IdResponse = read_json(response).await?;
        body.id.filter(|id| !id.is_empty()).ok_or_else(|| Error::UnexpectedResponse {
            service: Service::Instagram,
            detail: "response has no id".to_string(),
        })
    }

    fn graph_base(&self) -> &str {
        self.config.graph_api_base.trim_end_matches('/')
    }

    fn account_url(&self, edge: &str) -> String {
        format!(
            "{}/{}/{}",
            self.graph_base(),
            self.credentials.instagram_account_id,
            edge
        )
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(Error::from_response(Service::Instagram, response).await);
    }
    response.json().await.map_err(|e| Error::UnexpectedResponse {
        service: Service::Instagram,
        detail: e.to_string(),
    })
}

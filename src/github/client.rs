use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use std::io;
use std::path::Path;
use tracing::{debug, error, info};

use crate::app::{AppConfig, Credentials};
use crate::error::{Error, Result, Service};
use crate::github::models::{ContentEntry, PutContentRequest, PutContentResponse};
use crate::model::HostedMedia;
use crate::utils::text::{clean_repo_path, default_destination, encode_path, file_name_of};

const ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub contents client, commits media files and hands back raw URLs
pub struct GithubClient<'a> {
    config: &'a AppConfig,
    credentials: &'a Credentials,
    client: reqwest::Client,
}

impl<'a> GithubClient<'a> {
    pub fn new(config: &'a AppConfig, credentials: &'a Credentials, client: reqwest::Client) -> Self {
        Self {
            config,
            credentials,
            client,
        }
    }

    /// Upload `local_file_path` to `destination` (or `<media_dir>/<file name>`) and return its public URL.
    ///
    /// Local checks run before any request is made.
    pub async fn upload(&self, local_file_path: &Path, destination: Option<&str>) -> Result<HostedMedia> {
        let metadata = tokio::fs::metadata(local_file_path)
            .await
            .map_err(|e| Error::io(local_file_path, e))?;
        if !metadata.is_file() {
            return Err(Error::io(
                local_file_path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        if metadata.len() > self.config.max_file_bytes {
            return Err(Error::FileTooLarge {
                path: local_file_path.to_path_buf(),
                size: metadata.len(),
                limit: self.config.max_file_bytes,
            });
        }

        let repo_path = match destination {
            Some(dest) => clean_repo_path(dest).ok_or_else(|| Error::InvalidConfig {
                key: "destination",
                reason: format!("`{}` must be a non-empty path without `..` segments", dest),
            })?,
            None => default_destination(&self.config.media_dir, local_file_path).ok_or_else(|| {
                Error::InvalidConfig {
                    key: "media_dir",
                    reason: format!(
                        "cannot derive a destination for {} under `{}`",
                        local_file_path.display(),
                        self.config.media_dir
                    ),
                }
            })?,
        };

        let file_content = tokio::fs::read(local_file_path)
            .await
            .map_err(|e| Error::io(local_file_path, e))?;
        let file_name = file_name_of(&repo_path);
        info!(
            "📤 Uploading '{}' ({:.1}MB) to GitHub...",
            file_name,
            metadata.len() as f64 / 1024.0 / 1024.0
        );

        let api_url = self.contents_url(&repo_path);
        debug!("contents endpoint: {}", api_url);

        let existing = self.existing_file(&api_url).await?;
        let verb = if existing.is_some() { "Update" } else { "Upload" };
        let body = PutContentRequest {
            message: format!("{} {} {}", verb, file_name, self.config.commit_message_suffix),
            content: STANDARD.encode(&file_content),
            branch: &self.credentials.branch,
            sha: existing.map(|entry| entry.sha),
        };

        let response = self
            .client
            .put(&api_url)
            .header("Authorization", format!("token {}", self.credentials.github_token))
            .header("Accept", ACCEPT)
            .json(&body)
            .send()
            .await
            .map_err(Error::network(Service::GitHub))?;

        if !matches!(response.status(), StatusCode::OK | StatusCode::CREATED) {
            let err = Error::from_response(Service::GitHub, response).await;
            error!("❌ GitHub upload failed: {}", err);
            return Err(err);
        }

        let result: PutContentResponse = response
            .json()
            .await
            .map_err(|e| Error::UnexpectedResponse {
                service: Service::GitHub,
                detail: e.to_string(),
            })?;
        if let Some(download_url) = result.content.as_ref().and_then(|c| c.download_url.as_deref()) {
            debug!("GitHub download_url: {}", download_url);
        }

        let hosted = HostedMedia {
            url: self.raw_url(&repo_path),
            path: repo_path,
            commit_sha: result.commit.map(|c| c.sha),
        };
        info!("✅ File uploaded to GitHub");
        info!("🔗 Public URL: {}", hosted.url);
        Ok(hosted)
    }

    /// Public raw-content URL for a path on the configured branch
    pub fn raw_url(&self, repo_path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.config.raw_content_base.trim_end_matches('/'),
            self.credentials.repo.owner,
            self.credentials.repo.name,
            self.credentials.branch,
            encode_path(repo_path)
        )
    }

    fn contents_url(&self, repo_path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.github_api_base.trim_end_matches('/'),
            self.credentials.repo.owner,
            self.credentials.repo.name,
            encode_path(repo_path)
        )
    }

    /// Look up the current blob so a re-upload overwrites instead of conflicting
    async fn existing_file(&self, api_url: &str) -> Result<Option<ContentEntry>> {
        let response = self
            .client
            .get(api_url)
            .query(&[("ref", self.credentials.branch.as_str())])
            .header("Authorization", format!("token {}", self.credentials.github_token))
            .header("Accept", ACCEPT)
            .send()
            .await
            .map_err(Error::network(Service::GitHub))?;

        match response.status() {
            StatusCode::OK => {
                let entry: ContentEntry =
                    response
                        .json()
                        .await
                        .map_err(|e| Error::UnexpectedResponse {
                            service: Service::GitHub,
                            detail: e.to_string(),
                        })?;
                debug!("existing blob sha: {}", entry.sha);
                Ok(Some(entry))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Error::from_response(Service::GitHub, response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::RepoId;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            github_token: "ghp_test".to_string(),
            repo: RepoId {
                owner: "octo".to_string(),
                name: "album".to_string(),
            },
            branch: "master".to_string(),
            instagram_token: "ig_test".to_string(),
            instagram_account_id: "1784".to_string(),
        }
    }

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            github_api_base: server.uri(),
            ..AppConfig::default()
        }
    }

    fn media_file(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sunset.jpg");
        std::fs::write(&file, bytes).unwrap();
        (dir, file)
    }

    #[tokio::test]
    async fn test_upload_new_file_returns_raw_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/album/contents/media/sunset.jpg"))
            .and(query_param("ref", "master"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/album/contents/media/sunset.jpg"))
            .and(header("Authorization", "token ghp_test"))
            .and(body_partial_json(json!({
                "message": "Upload sunset.jpg via story pipeline",
                "content": "aGVsbG8=",
                "branch": "master"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": {"sha": "blob1", "download_url": "https://raw.githubusercontent.com/octo/album/master/media/sunset.jpg"},
                "commit": {"sha": "c0ffee"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, file) = media_file(b"hello");
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let hosted = client.upload(&file, None).await.unwrap();
        assert_eq!(
            hosted.url,
            "https://raw.githubusercontent.com/octo/album/master/media/sunset.jpg"
        );
        assert_eq!(hosted.path, "media/sunset.jpg");
        assert_eq!(hosted.commit_sha.as_deref(), Some("c0ffee"));
    }

    #[tokio::test]
    async fn test_upload_existing_file_sends_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/album/contents/stories/today.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "abc123"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/album/contents/stories/today.jpg"))
            .and(body_partial_json(json!({
                "message": "Update today.jpg via story pipeline",
                "sha": "abc123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"commit": {"sha": "d00d"}})))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, file) = media_file(b"again");
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let hosted = client.upload(&file, Some("/stories/today.jpg")).await.unwrap();
        assert_eq!(
            hosted.url,
            "https://raw.githubusercontent.com/octo/album/master/stories/today.jpg"
        );
    }

    #[tokio::test]
    async fn test_missing_file_makes_no_request() {
        let server = MockServer::start().await;
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let err = client
            .upload(Path::new("/no/such/dir/sunset.jpg"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("sunset.jpg")));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_makes_no_request() {
        let server = MockServer::start().await;
        let config = AppConfig {
            max_file_bytes: 4,
            ..config_for(&server)
        };
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let (_dir, file) = media_file(b"too big");
        let err = client.upload(&file, None).await.unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { size: 7, limit: 4, .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_upload_surfaces_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, file) = media_file(b"hello");
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        match client.upload(&file, None).await {
            Err(Error::Api {
                service: Service::GitHub,
                status: 401,
                message,
            }) => assert_eq!(message, "Bad credentials"),
            other => panic!("expected 401 API error, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_url_encodes_path() {
        let config = AppConfig::default();
        let creds = Credentials {
            branch: "main".to_string(),
            ..credentials()
        };
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());
        assert_eq!(
            client.raw_url("media/my story.png"),
            "https://raw.githubusercontent.com/octo/album/main/media/my%20story.png"
        );
    }

    #[tokio::test]
    async fn test_parent_segments_in_destination_make_no_request() {
        let server = MockServer::start().await;
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let (_dir, file) = media_file(b"hello");
        for dest in ["../../../user/repos", "media/../../other/repo"] {
            let err = client.upload(&file, Some(dest)).await.unwrap_err();
            assert!(
                matches!(err, Error::InvalidConfig { key: "destination", .. }),
                "{} gave {:?}",
                dest,
                err
            );
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_directory_is_rejected_without_request() {
        let server = MockServer::start().await;
        let config = config_for(&server);
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let dir = tempfile::tempdir().unwrap();
        let err = client.upload(dir.path(), None).await.unwrap_err();
        match err {
            Error::Io { path, source } => {
                assert_eq!(path, dir.path());
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("expected Io error, got {:?}", other),
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Bind then release a port so nothing is listening on it
        let closed_uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let config = AppConfig {
            github_api_base: closed_uri,
            ..AppConfig::default()
        };
        let creds = credentials();
        let client = GithubClient::new(&config, &creds, reqwest::Client::new());

        let (_dir, file) = media_file(b"hello");
        let err = client.upload(&file, None).await.unwrap_err();
        assert!(
            matches!(err, Error::Network { service: Service::GitHub, .. }),
            "expected network error, got {:?}",
            err
        );
        assert_eq!(err.status(), None);
    }
}

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_REPO: &str = "GITHUB_REPO";
pub const GITHUB_BRANCH: &str = "GITHUB_BRANCH";
pub const INSTAGRAM_ACCESS_TOKEN: &str = "INSTAGRAM_ACCESS_TOKEN";
pub const INSTAGRAM_ACCOUNT_ID: &str = "INSTAGRAM_ACCOUNT_ID";

/// Non-secret settings, read from `config.toml` when present
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
    #[serde(default = "default_raw_content_base")]
    pub raw_content_base: String,
    #[serde(default = "default_graph_api_base")]
    pub graph_api_base: String,
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default = "default_commit_message_suffix")]
    pub commit_message_suffix: String,
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new("config.toml"));
        if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let cfg: AppConfig = toml::from_str(&raw).map_err(|e| Error::InvalidConfig {
                key: "config.toml",
                reason: format!("{}: {}", path.display(), e),
            })?;
            return Ok(cfg);
        }
        Ok(AppConfig::default())
    }

    /// Shared HTTP client honouring the optional timeout override
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = self.http_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        builder.build()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_api_base: default_github_api_base(),
            raw_content_base: default_raw_content_base(),
            graph_api_base: default_graph_api_base(),
            media_dir: default_media_dir(),
            max_file_bytes: default_max_file_bytes(),
            http_timeout_secs: None,
            commit_message_suffix: default_commit_message_suffix(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_content_base() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

fn default_max_file_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_commit_message_suffix() -> String {
    "via story pipeline".to_string()
}

/// Repository coordinates parsed from `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidConfig {
            key: GITHUB_REPO,
            reason: format!("{} (got `{}`)", reason, raw),
        };
        let (owner, name) = raw
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid("expected owner/repo"))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid("expected owner/repo"));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// The four required secrets plus the target branch.
///
/// Built once at process entry and handed to both clients by reference.
#[derive(Clone)]
pub struct Credentials {
    pub github_token: String,
    pub repo: RepoId,
    pub branch: String,
    pub instagram_token: String,
    pub instagram_account_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"***")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("instagram_token", &"***")
            .field("instagram_account_id", &self.instagram_account_id)
            .finish()
    }
}

impl Credentials {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as missing and
    /// every missing key is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let github_token = fetch(GITHUB_TOKEN);
        let repo = fetch(GITHUB_REPO);
        let instagram_token = fetch(INSTAGRAM_ACCESS_TOKEN);
        let instagram_account_id = fetch(INSTAGRAM_ACCOUNT_ID);

        match (github_token, repo, instagram_token, instagram_account_id) {
            (Some(github_token), Some(repo), Some(instagram_token), Some(instagram_account_id)) => {
                Ok(Self {
                    github_token,
                    repo: RepoId::parse(&repo)?,
                    branch: fetch(GITHUB_BRANCH).unwrap_or_else(|| "master".to_string()),
                    instagram_token,
                    instagram_account_id,
                })
            }
            (github_token, repo, instagram_token, instagram_account_id) => {
                let missing = [
                    (GITHUB_TOKEN, github_token.is_none()),
                    (GITHUB_REPO, repo.is_none()),
                    (INSTAGRAM_ACCESS_TOKEN, instagram_token.is_none()),
                    (INSTAGRAM_ACCOUNT_ID, instagram_account_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                Err(Error::MissingConfig(missing))
            }
        }
    }
}

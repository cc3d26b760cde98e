use serde::{Deserialize, Serialize};

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
pub struct PutContentRequest<'a> {
    pub message: String,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Subset of a contents entry; only the blob sha matters for overwrites
#[derive(Debug, Deserialize)]
pub struct ContentEntry {
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
}

/// Response of a successful create/update
#[derive(Debug, Deserialize)]
pub struct PutContentResponse {
    #[serde(default)]
    pub content: Option<ContentEntry>,
    #[serde(default)]
    pub commit: Option<CommitInfo>,
}

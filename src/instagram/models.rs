use serde::Deserialize;

/// `{"id": "..."}` returned by both `/media` and `/media_publish`
#[derive(Debug, Deserialize)]
pub struct IdResponse {
    pub id: Option<String>,
}

/// `GET /{container_id}?fields=id,status_code`
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /oauth/access_token` with `grant_type=fb_exchange_token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

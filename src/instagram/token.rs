use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::{Error, Result, Service};
use crate::instagram::client::read_json;
use crate::instagram::models::TokenResponse;

/// Long-lived user token (~60 days) obtained from a short-lived one
#[derive(Debug, Clone)]
pub struct LongLivedToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

impl LongLivedToken {
    pub fn expires_in_days(&self) -> Option<u64> {
        self.expires_in.map(|secs| secs.saturating_add(43_200) / 86_400)
    }

    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        now.checked_add_signed(Duration::seconds(secs))
    }
}

/// Trade a Graph API Explorer token for a long-lived one.
///
/// Needs no account credentials, only the app id/secret pair.
pub async fn exchange_token(
    client: &reqwest::Client,
    graph_api_base: &str,
    app_id: &str,
    app_secret: &str,
    short_lived_token: &str,
) -> Result<LongLivedToken> {
    info!("🔄 Exchanging token...");
    let url = format!("{}/oauth/access_token", graph_api_base.trim_end_matches('/'));
    let response = client
        .get(&url)
        .query(&[
            ("grant_type", "fb_exchange_token"),
            ("client_id", app_id),
            ("client_secret", app_secret),
            ("fb_exchange_token", short_lived_token),
        ])
        .send()
        .await
        .map_err(Error::network(Service::Instagram))?;

    let body: TokenResponse = read_json(response).await?;
    let access_token = body
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::UnexpectedResponse {
            service: Service::Instagram,
            detail: "response has no access_token".to_string(),
        })?;
    info!("✅ Successfully exchanged token!");
    Ok(LongLivedToken {
        access_token,
        expires_in: body.expires_in,
    })
}

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Media kinds the Stories endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
        }
    }

    /// Form field the Graph API expects the media URL under
    pub fn url_field(&self) -> &'static str {
        match self {
            MediaType::Image => "image_url",
            MediaType::Video => "video_url",
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => Ok(MediaType::Image),
            "VIDEO" => Ok(MediaType::Video),
            _ => Err(Error::InvalidMediaType(s.to_string())),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staging container id returned by the create phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerId(pub String);

/// Id of a published Story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file committed to the media repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedMedia {
    pub url: String,
    pub path: String,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStory {
    pub container_id: ContainerId,
    pub media_id: MediaId,
}

/// Processing state of a container as reported by `status_code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Finished,
    InProgress,
    Error,
    Expired,
    Published,
    Unknown(Option<String>),
}

impl ContainerStatus {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("FINISHED") => ContainerStatus::Finished,
            Some("IN_PROGRESS") => ContainerStatus::InProgress,
            Some("ERROR") | Some("FAILED") => ContainerStatus::Error,
            Some("EXPIRED") => ContainerStatus::Expired,
            Some("PUBLISHED") => ContainerStatus::Published,
            other => ContainerStatus::Unknown(other.map(str::to_string)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ContainerStatus::Finished)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::Finished => f.write_str("FINISHED"),
            ContainerStatus::InProgress => f.write_str("IN_PROGRESS"),
            ContainerStatus::Error => f.write_str("ERROR"),
            ContainerStatus::Expired => f.write_str("EXPIRED"),
            ContainerStatus::Published => f.write_str("PUBLISHED"),
            ContainerStatus::Unknown(Some(code)) => write!(f, "UNKNOWN ({})", code),
            ContainerStatus::Unknown(None) => f.write_str("UNKNOWN"),
        }
    }
}

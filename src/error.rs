use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Remote collaborator that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    GitHub,
    Instagram,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::GitHub => f.write_str("GitHub"),
            Service::Instagram => f.write_str("Instagram"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, over the {limit} byte upload limit", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{service} API returned {status}: {message}")]
    Api {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("{service} request failed: {source}")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected {service} response: {detail}")]
    UnexpectedResponse { service: Service, detail: String },

    #[error("unsupported media type `{0}`, expected IMAGE or VIDEO")]
    InvalidMediaType(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(service: Service) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Error::Network { service, source }
    }

    /// Turn a non-2xx response into `Error::Api`, preferring the upstream message field.
    ///
    /// GitHub answers `{"message": ..}`, the Graph API `{"error": {"message": ..}}`.
    pub(crate) async fn from_response(service: Service, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "no response body".to_string()
                } else {
                    body
                }
            });
        Error::Api {
            service,
            status,
            message,
        }
    }

    /// HTTP status of an upstream rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

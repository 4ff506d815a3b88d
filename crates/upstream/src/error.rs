use std::fmt;

use thiserror::Error;

/// The collaborating service a call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Authentication,
    Conversion,
    Storage,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Authentication => "authentication",
            Service::Conversion => "conversion",
            Service::Storage => "storage",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the service clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("{service} request failed: {reason}")]
    Transport { service: Service, reason: String },

    /// The service answered with a status other than the expected one.
    #[error("{service} responded {status}: {body}")]
    Status {
        service: Service,
        status: u16,
        body: String,
    },

    /// The response body could not be read.
    #[error("{service} response body unreadable: {reason}")]
    ReadBody { service: Service, reason: String },

    /// The response body was read but is not the expected JSON.
    #[error("{service} response is not valid JSON: {reason}")]
    Decode { service: Service, reason: String },

    /// Client construction or configuration problem.
    #[error("upstream configuration error: {0}")]
    Config(String),
}

impl UpstreamError {
    pub fn service(&self) -> Option<Service> {
        match self {
            UpstreamError::Transport { service, .. }
            | UpstreamError::Status { service, .. }
            | UpstreamError::ReadBody { service, .. }
            | UpstreamError::Decode { service, .. } => Some(*service),
            UpstreamError::Config(_) => None,
        }
    }

    /// Status code reported by the service, when it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(service: Service, err: reqwest::Error) -> Self {
        UpstreamError::Transport {
            service,
            reason: err.to_string(),
        }
    }

    pub(crate) fn read_body(service: Service, err: reqwest::Error) -> Self {
        UpstreamError::ReadBody {
            service,
            reason: err.to_string(),
        }
    }
}

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed, or came back with a non-2xx status we
    /// have no specific handling for.
    #[error("{endpoint}: network failure: {reason}")]
    NetworkFailure {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    /// HTTP 401. The backend usually includes the authorization URL.
    #[error("{endpoint}: authentication required")]
    AuthRequired {
        endpoint: String,
        auth_url: Option<String>,
    },

    /// HTTP 5xx.
    #[error("{endpoint}: server error {status}")]
    ServerError { endpoint: String, status: u16 },

    /// 2xx, but the body did not decode into the expected shape.
    #[error("{endpoint}: malformed response: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl ApiError {
    pub fn network(endpoint: &str, reason: impl Into<String>) -> Self {
        ApiError::NetworkFailure {
            endpoint: endpoint.to_string(),
            status: None,
            reason: reason.into(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// Map a non-2xx status to its error class.
    pub fn from_status(endpoint: &str, status: u16, auth_url: Option<String>) -> Self {
        match status {
            401 => ApiError::AuthRequired {
                endpoint: endpoint.to_string(),
                auth_url,
            },
            500..=599 => ApiError::ServerError {
                endpoint: endpoint.to_string(),
                status,
            },
            _ => ApiError::NetworkFailure {
                endpoint: endpoint.to_string(),
                status: Some(status),
                reason: format!("unexpected status {status}"),
            },
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::NetworkFailure { endpoint, .. }
            | ApiError::AuthRequired { endpoint, .. }
            | ApiError::ServerError { endpoint, .. }
            | ApiError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }
}

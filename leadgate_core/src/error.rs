use std::error::Error as StdError;

/// Common error type for `leadgate_core`.
///
/// Remote CRM failures keep the underlying error chain where possible via
/// `Error::remote_api`; HTTP-level rejections from the CRM carry the status
/// and response body so a failed sync can be diagnosed without replaying the
/// webhook.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No email candidate resolved to a non-empty string across the source's
    /// fallback paths. Client input defect, not retryable.
    #[error("missing contact identity: no email found in payload")]
    MissingIdentity,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("payload too large")]
    PayloadTooLarge,

    /// Transport-level CRM failure (connect, timeout, body decode).
    #[error("remote api error during {operation}")]
    RemoteApi {
        operation: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    /// The CRM answered with a non-success status.
    #[error("remote api returned {status} during {operation}: {body}")]
    RemoteApiStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("telemetry init: {0}")]
    TelemetryInit(String),
}

impl Error {
    pub fn remote_api(
        operation: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::RemoteApi {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// True for failures the webhook sender should retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteApi { .. } | Self::RemoteApiStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

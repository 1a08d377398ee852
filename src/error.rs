use thiserror::Error;

/// Failures the relay itself knows how to classify.
///
/// `MissingCredential`, `DuplicateWebhookPath` and `InvalidConfig` stop the
/// process at startup. The rest are logged and stay local to one identity or
/// one request.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("webhook path {path} is used by both {first} and {second}")]
    DuplicateWebhookPath {
        path: String,
        first: String,
        second: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed update: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed {kind} in update {update_id}")]
    MalformedUpdate { update_id: String, kind: String },

    #[error("webhook registration failed for {identity}: {reason}")]
    Registration { identity: String, reason: String },

    #[error("reply delivery failed for {identity}: {reason}")]
    ReplyDelivery { identity: String, reason: String },

    #[error("could not schedule deferred reply: {0}")]
    Scheduling(String),
}

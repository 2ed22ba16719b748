use thiserror::Error;

/// Failure raised by the downstream ingestion pipeline.
///
/// Hooks catch these at their boundary; they never reach the host agent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForwardingError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("downstream unavailable: {0}")]
    Unavailable(String),

    #[error("record rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum IntegrationError {
    /// The host agent does not expose a capability the wiring requires.
    #[error("host agent is missing required collaborator `{0}`")]
    MissingCollaborator(&'static str),

    #[error("invalid payload for hook `{hook}`: {source}")]
    InvalidPayload {
        hook: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no hook registered under `{0}`")]
    UnknownHook(String),

    #[error("failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error(transparent)]
    Forwarding(#[from] ForwardingError),
}

/// Error taxonomy for the pricing-desk client.
/// Callers branch on kind, never on message text:
/// - Validation never reaches the network layer
/// - Auth during the startup probe is absorbed (fail-closed to Anonymous)
/// - Server/Network during submission surface one user-visible message
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("server error: {status} {detail}")]
    Server { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("a calculation is already in flight")]
    Busy,

    #[error("token storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// User-visible message with the display fallback chain:
    /// server-provided detail, else the transport/validation text,
    /// else a generic fallback. Taxonomy prefixes belong in logs, never
    /// in what the user reads.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Auth(msg) | Self::Network(msg) => msg.clone(),
            Self::Server { detail, .. } if !detail.is_empty() => detail.clone(),
            Self::Busy => self.to_string(),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_wins_fallback_chain() {
        let e = ClientError::Server { status: 400, detail: "Invalid input: bad vol".into() };
        assert_eq!(e.user_message(), "Invalid input: bad vol");
    }

    #[test]
    fn empty_detail_falls_back_to_generic() {
        let e = ClientError::Server { status: 502, detail: String::new() };
        assert_eq!(e.user_message(), "An unexpected error occurred. Please try again.");
    }

    #[test]
    fn network_error_uses_bare_transport_text() {
        let e = ClientError::Network("connection refused".into());
        assert_eq!(e.user_message(), "connection refused");
    }

    #[test]
    fn auth_detail_is_shown_without_taxonomy_prefix() {
        let e = ClientError::Auth("Could not validate user.".into());
        assert_eq!(e.user_message(), "Could not validate user.");
    }

    #[test]
    fn storage_failure_falls_back_to_generic() {
        let e = ClientError::Storage("permission denied".into());
        assert_eq!(e.user_message(), "An unexpected error occurred. Please try again.");
    }
}

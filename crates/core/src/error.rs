use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search request failed with status {status}: {details}")]
    Transport { status: u16, details: String },

    #[error("malformed response envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend reported failure: {0}")]
    Application(String),

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("invalid query parameter: {0}")]
    Validation(String),

    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    /// Network failures, non-success statuses and unreadable bodies.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Transport { .. } | Self::Envelope(_) | Self::Url(_)
        )
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::SearchError;

    #[test]
    fn classification_is_exclusive() {
        let transport = SearchError::Transport {
            status: 502,
            details: "bad gateway".to_string(),
        };
        assert!(transport.is_transport());
        assert!(!transport.is_application());
        assert!(!transport.is_cancelled());

        let application = SearchError::Application("bad request".to_string());
        assert!(application.is_application());
        assert!(!application.is_transport());

        assert!(SearchError::Cancelled.is_cancelled());
        assert!(!SearchError::Cancelled.is_transport());
    }

    #[test]
    fn malformed_body_counts_as_transport() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(SearchError::from(parse_error).is_transport());
    }
}

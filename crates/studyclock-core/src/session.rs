//! Completed study sessions and the backend submission surface.
//!
//! The engine produces a [`StudySession`] when the user ends a run; the
//! record is handed to the backend and never kept locally. Submission is
//! the one side effect whose failure changes engine behavior -- a rejected
//! session leaves the clock untouched so the save can be retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::SubmitError;

/// A finished study run, in the shape the backend records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    /// Whole seconds of study time; always > 0.
    pub duration_secs: u64,
    pub completed_at: DateTime<Utc>,
}

/// Backend submission surface, consumed only by the save path.
#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn submit(&self, session: &StudySession) -> Result<(), SubmitError>;
}

/// Submits sessions to the study-sessions REST endpoint.
pub struct HttpSessionSink {
    client: Client,
    endpoint: Url,
    auth_token: Option<String>,
}

impl HttpSessionSink {
    /// Build a sink for the given backend base URL
    /// (e.g. `https://api.example.com`).
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, SubmitError> {
        let endpoint = format!("{}/api/study-sessions", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|err| SubmitError::InvalidUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            auth_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SessionSink for HttpSessionSink {
    async fn submit(&self, session: &StudySession) -> Result<(), SubmitError> {
        // The route expects the duration in seconds under `duration`.
        let body = json!({ "duration": session.duration_secs });
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Stand-in sink for setups without a backend. Every submit fails with
/// [`SubmitError::NotConfigured`], so unsaved time is never silently
/// dropped.
#[derive(Debug, Default)]
pub struct UnconfiguredSink;

#[async_trait]
impl SessionSink for UnconfiguredSink {
    async fn submit(&self, _session: &StudySession) -> Result<(), SubmitError> {
        Err(SubmitError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_rooted_at_the_base_url() {
        let sink = HttpSessionSink::new("https://api.example.com", None).unwrap();
        assert_eq!(
            sink.endpoint().as_str(),
            "https://api.example.com/api/study-sessions"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let sink = HttpSessionSink::new("https://api.example.com/", None).unwrap();
        assert_eq!(
            sink.endpoint().as_str(),
            "https://api.example.com/api/study-sessions"
        );
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        assert!(matches!(
            HttpSessionSink::new("not a url", None),
            Err(SubmitError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn session_serde_roundtrip() {
        let session = StudySession {
            duration_secs: 45,
            completed_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: StudySession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[tokio::test]
    async fn unconfigured_sink_always_fails() {
        let session = StudySession {
            duration_secs: 1,
            completed_at: Utc::now(),
        };
        assert!(matches!(
            UnconfiguredSink.submit(&session).await,
            Err(SubmitError::NotConfigured)
        ));
    }
}

//! Where Thing Descriptions come from.
//!
//! The environment server notifies the middleware when an artifact changes;
//! the middleware then re-fetches the artifact's description. A description
//! that is gone (404/410) removes the artifact from the index.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::IndexError;

/// Result type for description fetches and indexing.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Outcome of fetching one artifact description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The description as Turtle.
    Found(String),
    /// The artifact no longer exists.
    Gone,
}

/// A provider of Thing Descriptions keyed by artifact URI.
pub trait DescriptionSource: Send + Sync {
    fn fetch(&self, artifact_uri: &str) -> IndexResult<FetchOutcome>;
}

/// Fetches descriptions over HTTP, asking for Turtle.
pub struct HttpDescriptionSource {
    agent: ureq::Agent,
    agent_webid: Option<String>,
}

impl HttpDescriptionSource {
    pub fn new(timeout: Duration, agent_webid: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, agent_webid }
    }
}

impl DescriptionSource for HttpDescriptionSource {
    fn fetch(&self, artifact_uri: &str) -> IndexResult<FetchOutcome> {
        let mut request = self.agent.get(artifact_uri).set("Accept", "text/turtle");
        if let Some(webid) = &self.agent_webid {
            request = request.set("X-Agent-WebID", webid);
        }

        match request.call() {
            Ok(response) => {
                let body = response.into_string().map_err(|e| IndexError::Fetch {
                    uri: artifact_uri.to_string(),
                    message: format!("failed to read body: {e}"),
                })?;
                Ok(FetchOutcome::Found(body))
            }
            Err(ureq::Error::Status(404 | 410, _)) => Ok(FetchOutcome::Gone),
            Err(e) => Err(IndexError::Fetch {
                uri: artifact_uri.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for HttpDescriptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDescriptionSource")
            .field("agent_webid", &self.agent_webid)
            .finish()
    }
}

/// In-memory descriptions; a missing key reads as [`FetchOutcome::Gone`].
impl DescriptionSource for HashMap<String, String> {
    fn fetch(&self, artifact_uri: &str) -> IndexResult<FetchOutcome> {
        Ok(self
            .get(artifact_uri)
            .cloned()
            .map_or(FetchOutcome::Gone, FetchOutcome::Found))
    }
}

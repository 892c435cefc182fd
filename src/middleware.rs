//! Middleware facade: top-level API of the cashmere core.
//!
//! The `Middleware` owns the action index and the signifier store and is the
//! surface the HTTP layer and the CLI talk to. Read-only endpoints answer with
//! Turtle; failures that happen while serializing come back as a Turtle comment
//! instead of an error.

use std::sync::Arc;

use crate::affordance::source::{DescriptionSource, FetchOutcome, HttpDescriptionSource, IndexResult};
use crate::affordance::{ActionIndex, IndexedAction};
use crate::config::CashmereConfig;
use crate::error::CashmereResult;
use crate::plan;
use crate::rdf;
use crate::signifier::{Signifier, SignifierStore};

/// What a refresh did to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The description was re-indexed with this many actions.
    Indexed(usize),
    /// The artifact is gone and was removed from the index.
    Removed,
}

/// The signifier middleware.
pub struct Middleware {
    config: CashmereConfig,
    actions: Arc<ActionIndex>,
    signifiers: Arc<SignifierStore>,
}

impl Middleware {
    /// Create a middleware with empty index and store.
    pub fn new(config: CashmereConfig) -> Self {
        tracing::info!(
            signifier_base = %config.signifier_base,
            extra_infrastructure = config.extra_infrastructure_actions.len(),
            "initializing cashmere middleware"
        );
        let actions = ActionIndex::with_extra_infrastructure(
            config.extra_infrastructure_actions.iter().cloned(),
        );
        let signifiers = SignifierStore::new(config.signifier_base.clone());
        Self {
            config,
            actions: Arc::new(actions),
            signifiers: Arc::new(signifiers),
        }
    }

    pub fn config(&self) -> &CashmereConfig {
        &self.config
    }

    /// Shared handle to the action index.
    pub fn actions(&self) -> Arc<ActionIndex> {
        Arc::clone(&self.actions)
    }

    /// Shared handle to the signifier store.
    pub fn signifiers(&self) -> Arc<SignifierStore> {
        Arc::clone(&self.signifiers)
    }

    /// A description source configured from this middleware's settings.
    pub fn http_source(&self) -> HttpDescriptionSource {
        HttpDescriptionSource::new(self.config.fetch_timeout(), self.config.agent_webid.clone())
    }

    // -----------------------------------------------------------------------
    // Action affordances
    // -----------------------------------------------------------------------

    /// Parse a Thing Description and (re)index its actions.
    ///
    /// Relative IRIs in the description resolve against `artifact_uri`.
    pub fn index_description(&self, artifact_uri: &str, turtle: &str) -> IndexResult<usize> {
        let model = rdf::parse_turtle(turtle, Some(artifact_uri))?;
        Ok(self.actions.index_actions_from_model(artifact_uri, &model))
    }

    /// Index many descriptions in parallel.
    ///
    /// Results are returned in input order; one bad description does not stop
    /// the others.
    pub fn index_descriptions(&self, descriptions: &[(String, String)]) -> Vec<IndexResult<usize>> {
        use rayon::prelude::*;

        let results: Vec<_> = descriptions
            .par_iter()
            .map(|(uri, turtle)| {
                self.index_description(uri, turtle).inspect_err(|e| {
                    tracing::warn!(artifact = %uri, error = %e, "skipping unparseable description");
                })
            })
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(descriptions = descriptions.len(), failed, "batch indexing finished");
        results
    }

    /// Re-fetch an artifact's description after a change notification.
    pub fn refresh_artifact(
        &self,
        artifact_uri: &str,
        source: &dyn DescriptionSource,
    ) -> IndexResult<RefreshOutcome> {
        match source.fetch(artifact_uri)? {
            FetchOutcome::Found(turtle) => {
                let count = self.index_description(artifact_uri, &turtle)?;
                tracing::debug!(artifact = artifact_uri, actions = count, "artifact refreshed");
                Ok(RefreshOutcome::Indexed(count))
            }
            FetchOutcome::Gone => {
                self.forget_artifact(artifact_uri);
                Ok(RefreshOutcome::Removed)
            }
        }
    }

    /// Drop an artifact from the index. Returns whether it was known.
    pub fn forget_artifact(&self, artifact_uri: &str) -> bool {
        self.actions.remove_actions_for_artifact(artifact_uri)
    }

    /// Action affordances of one artifact as Turtle.
    pub fn action_affordances(&self, artifact_uri: &str) -> Option<String> {
        self.actions.action_affordances_turtle(artifact_uri)
    }

    /// Structured action listing of one artifact.
    pub fn actions_for(&self, artifact_uri: &str) -> Option<Vec<IndexedAction>> {
        self.actions.actions_for(artifact_uri)
    }

    pub fn known_artifact_uris(&self) -> Vec<String> {
        self.actions.known_artifact_uris()
    }

    // -----------------------------------------------------------------------
    // Signifiers
    // -----------------------------------------------------------------------

    /// Ingest an execution plan, returning the IRIs of touched signifiers.
    pub fn ingest_plan(&self, plan_json: &str) -> CashmereResult<Vec<String>> {
        Ok(plan::ingest_plan_json(&self.signifiers, plan_json)?)
    }

    /// Every signifier as Turtle.
    pub fn signifiers_turtle(&self) -> String {
        self.signifiers.to_turtle()
    }

    /// Every signifier as Turtle for persistence; serialization errors propagate.
    pub fn try_signifiers_turtle(&self) -> CashmereResult<String> {
        Ok(self.signifiers.try_to_turtle()?)
    }

    /// One signifier as Turtle, or `None` when unknown.
    pub fn signifier_turtle(&self, iri: &str) -> Option<String> {
        self.signifiers.signifier_turtle(iri)
    }

    pub fn signifier(&self, iri: &str) -> Option<Signifier> {
        self.signifiers.signifier(iri)
    }

    /// Load a Turtle snapshot of signifiers into the store.
    pub fn load_signifiers(&self, turtle: &str) -> CashmereResult<usize> {
        Ok(self.signifiers.load_turtle(turtle)?)
    }

    /// Clear the action index and the signifier store.
    pub fn reset(&self) {
        self.actions.clear();
        self.signifiers.reset();
        tracing::info!("middleware state reset");
    }
}

impl Default for Middleware {
    fn default() -> Self {
        Self::new(CashmereConfig::default())
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware")
            .field("artifacts", &self.actions.len())
            .field("signifiers", &self.signifiers.len())
            .finish()
    }
}

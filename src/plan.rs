//! Execution-plan ingestion: turn generated plans into signifiers.
//!
//! A plan is an ordered list of steps. Each step binds an intent to one action
//! on one artifact and justifies it with reasons whose evidence entries become
//! constraints. Steps are merged into the [`SignifierStore`] one by one, under a
//! signifier identity derived from the action name and the artifact:
//! `<action>-<last artifact path segment>-signifier`.
//!
//! The whole plan is validated before the first merge, so a bad step never
//! leaves earlier steps half-ingested.

use oxigraph::model::NamedNode;
use serde::Deserialize;

use crate::constraint::context::Context;
use crate::constraint::{Constraint, ConstraintResult, Threshold};
use crate::error::{ConstraintError, PlanError};
use crate::rdf;
use crate::signifier::{MergeOutcome, SignifierStore};

/// Result type for plan ingestion.
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Intent used when a step states none and its first reason cannot supply one.
pub const DEFAULT_INTENT: &str = "perform action";

// ---------------------------------------------------------------------------
// Plan document
// ---------------------------------------------------------------------------

/// A generated execution plan. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub plan_version: Option<serde_json::Value>,
    pub steps: Vec<Step>,
}

/// One action invocation with its justification.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub step_id: Option<serde_json::Value>,
    #[serde(default)]
    pub intent: Option<String>,
    pub artifact_uri: String,
    pub affordance_uri: String,
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub reasons: Vec<Reason>,
}

/// Why a step was chosen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reason {
    #[serde(default)]
    pub property: Option<String>,
    /// e.g. `increase` or `decrease`.
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub why: Option<String>,
}

/// One observed fact backing a reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub artifact: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub threshold: Option<serde_json::Value>,
    /// The value observed when the plan was made. Informational only.
    #[serde(default)]
    pub reading: Option<serde_json::Value>,
}

impl Plan {
    /// Parse a plan document. Malformed JSON rejects the whole plan.
    pub fn from_json(text: &str) -> PlanResult<Self> {
        serde_json::from_str(text).map_err(|source| PlanError::Malformed { source })
    }
}

impl Evidence {
    /// The constraint this evidence states, if all four parts are present.
    pub fn to_constraint(&self) -> ConstraintResult<Constraint> {
        let artifact = non_empty(&self.artifact).ok_or(ConstraintError::MissingField { field: "artifact" })?;
        let property = non_empty(&self.property).ok_or(ConstraintError::MissingField { field: "property" })?;
        let operator = non_empty(&self.operator).ok_or(ConstraintError::MissingField { field: "operator" })?;
        let threshold = self
            .threshold
            .as_ref()
            .and_then(Threshold::from_json)
            .ok_or(ConstraintError::MissingField { field: "threshold" })?;
        Constraint::from_parts(artifact, property, operator, threshold)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Step {
    /// Human-readable step id for diagnostics.
    pub fn label(&self, position: usize) -> String {
        match &self.step_id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => format!("#{}", position + 1),
            Some(other) => other.to_string(),
        }
    }

    /// Explicit action name, else the last segment of the affordance URI.
    pub fn action(&self) -> Option<String> {
        non_empty(&self.action_name)
            .or_else(|| Some(rdf::local_name(self.affordance_uri.trim())).filter(|s| !s.is_empty()))
            .map(str::to_string)
    }

    /// Explicit intent, else `"<direction> <property> in a room"` from the first
    /// reason, else [`DEFAULT_INTENT`].
    pub fn intent(&self) -> String {
        if let Some(intent) = non_empty(&self.intent) {
            return intent.to_string();
        }
        self.reasons
            .first()
            .and_then(|reason| {
                let direction = non_empty(&reason.direction)?;
                let property = non_empty(&reason.property)?;
                Some(format!("{direction} {property} in a room"))
            })
            .unwrap_or_else(|| DEFAULT_INTENT.to_string())
    }

    /// Constraints from every complete evidence entry of every reason.
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        for evidence in self.reasons.iter().flat_map(|r| r.evidence.iter()) {
            match evidence.to_constraint() {
                Ok(constraint) => {
                    if let Err(e) = rdf::property_path(&constraint.artifact, &constraint.property) {
                        tracing::warn!(artifact = %constraint.artifact, error = %e, "skipping evidence with an invalid artifact IRI");
                        continue;
                    }
                    context.insert(constraint);
                }
                Err(e) => tracing::debug!(error = %e, "skipping incomplete evidence"),
            }
        }
        context
    }
}

/// Signifier identity for an action on an artifact.
pub fn signifier_identity(action_name: &str, artifact_uri: &str) -> String {
    let without_fragment = artifact_uri
        .split(['#', '?'])
        .next()
        .unwrap_or(artifact_uri)
        .trim_end_matches('/');
    let segment = without_fragment.rsplit('/').next().unwrap_or(without_fragment);
    format!("{}-{}-signifier", sanitize(action_name), sanitize(segment))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// A step resolved to everything a merge needs.
struct PreparedStep {
    signifier: NamedNode,
    signifies: NamedNode,
    intent: String,
    context: Context,
}

fn prepare(store: &SignifierStore, step: &Step, position: usize) -> PlanResult<PreparedStep> {
    let action = step.action().ok_or_else(|| PlanError::NoActionName {
        step_id: step.label(position),
    })?;
    let identity = signifier_identity(&action, &step.artifact_uri);
    let signifier = store.iri_for(&identity)?;
    let signifies = rdf::named_node(step.affordance_uri.trim()).map_err(crate::error::SignifierError::from)?;
    Ok(PreparedStep {
        signifier,
        signifies,
        intent: step.intent(),
        context: step.context(),
    })
}

/// Merge every step of `plan` into `store`.
///
/// Returns the IRIs of the touched signifiers in first-touch order, without
/// duplicates.
pub fn ingest_plan(store: &SignifierStore, plan: &Plan) -> PlanResult<Vec<String>> {
    let prepared = plan
        .steps
        .iter()
        .enumerate()
        .map(|(position, step)| prepare(store, step, position))
        .collect::<PlanResult<Vec<_>>>()?;

    let mut touched: Vec<String> = Vec::new();
    for step in prepared {
        let outcome = store.merge(&step.signifier, &step.signifies, &step.intent, step.context)?;
        if matches!(outcome, MergeOutcome::Created) {
            tracing::debug!(signifier = %step.signifier, "new signifier from plan step");
        }
        let iri = step.signifier.into_string();
        if !touched.contains(&iri) {
            touched.push(iri);
        }
    }

    tracing::info!(steps = plan.steps.len(), signifiers = touched.len(), "plan ingested");
    Ok(touched)
}

/// Parse and ingest a plan document.
pub fn ingest_plan_json(store: &SignifierStore, text: &str) -> PlanResult<Vec<String>> {
    let plan = Plan::from_json(text)?;
    ingest_plan(store, &plan)
}

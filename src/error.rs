//! Rich diagnostic error types for the cashmere middleware core.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly what
//! went wrong and how to fix it.
//!
//! Most per-item problems (a malformed affordance, a broken SHACL shape, an
//! incomplete evidence entry) never reach these types: they are logged and
//! skipped. What remains are boundary failures: unparseable input documents,
//! invalid IRIs, and transport errors.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for the cashmere core.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum CashmereError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Signifier(#[from] SignifierError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Constraint errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConstraintError {
    #[error("unknown comparison operator: \"{operator}\"")]
    #[diagnostic(
        code(cashmere::constraint::unknown_operator),
        help(
            "Supported spellings are <, <=, >, >=, = and their word forms \
             (lessThan, lessEqual, greaterThan, greaterEqual, equals)."
        )
    )]
    UnknownOperator { operator: String },

    #[error("evidence is missing its {field} field")]
    #[diagnostic(
        code(cashmere::constraint::missing_field),
        help(
            "A constraint needs artifact, property, operator and threshold. \
             Incomplete evidence entries are skipped during plan ingestion."
        )
    )]
    MissingField { field: &'static str },
}

// ---------------------------------------------------------------------------
// RDF errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RdfError {
    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(
        code(cashmere::rdf::invalid_iri),
        help("IRIs must be absolute (scheme included) and must not contain spaces or angle brackets.")
    )]
    InvalidIri { iri: String, message: String },

    #[error("Turtle parse error: {message}")]
    #[diagnostic(
        code(cashmere::rdf::parse),
        help("The document is not valid Turtle. Check prefixes, terminating dots, and IRI syntax.")
    )]
    Parse { message: String },

    #[error("RDF serialization error: {message}")]
    #[diagnostic(
        code(cashmere::rdf::serialize),
        help("Writing the graph as Turtle failed. This usually points to an invalid prefix declaration.")
    )]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Action index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rdf(#[from] RdfError),

    #[error("failed to fetch Thing Description for {uri}: {message}")]
    #[diagnostic(
        code(cashmere::index::fetch),
        help(
            "The artifact could not be retrieved. Check that the environment server \
             is running and that the artifact URI is reachable."
        )
    )]
    Fetch { uri: String, message: String },
}

// ---------------------------------------------------------------------------
// Signifier store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SignifierError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rdf(#[from] RdfError),

    #[error("invalid signifier identity: \"{identity}\"")]
    #[diagnostic(
        code(cashmere::signifier::invalid_identity),
        help("Signifier identities are derived from an action name and an artifact URI; neither may be empty.")
    )]
    InvalidIdentity { identity: String },
}

// ---------------------------------------------------------------------------
// Plan ingestion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PlanError {
    #[error("malformed execution plan: {source}")]
    #[diagnostic(
        code(cashmere::plan::malformed),
        help(
            "The plan must be a JSON object with a `steps` array; every step needs \
             `artifact_uri` and `affordance_uri`. Nothing was ingested."
        )
    )]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    #[error("step {step_id} has no derivable action name")]
    #[diagnostic(
        code(cashmere::plan::no_action),
        help(
            "Provide `action_name`, or an `affordance_uri` whose last segment names the action. \
             Nothing was ingested."
        )
    )]
    NoActionName { step_id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Signifier(#[from] SignifierError),
}

/// Convenience alias for functions returning cashmere results.
pub type CashmereResult<T> = std::result::Result<T, CashmereError>;

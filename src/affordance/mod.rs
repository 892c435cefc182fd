//! Action affordance index: artifact URI → compact model of its actions.
//!
//! Indexing takes a full Thing Description graph, keeps only the action
//! affordances that describe environment capabilities, and rewrites each into a
//! small model under predictable IRIs:
//!
//! - `artifact#action`: the affordance (`td:name`, `td:title`, form, schemas)
//! - `artifact#action-form`: method, target, content type
//! - `artifact#action-input` and `artifact#action-output`: JSON schemas
//!
//! Per-artifact entries are replaced wholesale on re-index and never patched.
//! An artifact with no remaining actions is absent from the index.

pub mod source;

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use oxigraph::model::vocab::rdf as rdf_vocab;
use oxigraph::model::{
    Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNodeRef, TermRef, TripleRef,
};
use serde::{Deserialize, Serialize};

use crate::rdf::{self, RdfResult};
use crate::vocab::{hctl, htv, js, td};

/// Action names that manage the artifact runtime rather than the environment.
pub const INFRASTRUCTURE_ACTIONS: &[&str] = &[
    "getStatus",
    "getArtifactRepresentation",
    "updateArtifactRepresentation",
    "deleteArtifactRepresentation",
    "getRepresentation",
    "focus",
    "focusArtifact",
    "focusWhenAvailable",
    "stopFocus",
    "subscribe",
    "subscribeToArtifact",
    "unsubscribe",
    "unsubscribeFromArtifact",
];

/// Nested schemas deeper than this are not copied.
const MAX_SCHEMA_DEPTH: usize = 8;

/// Summary of a JSON schema attached to an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    /// Local names of the schema's `rdf:type`s, e.g. `ObjectSchema`.
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SchemaProperty>,
}

/// A named property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,
    #[serde(flatten)]
    pub schema: DataSchema,
}

/// One indexed action of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedAction {
    pub artifact_uri: String,
    pub action_name: String,
    pub title: Option<String>,
    pub form_target: String,
    pub form_method: String,
    pub content_type: Option<String>,
    pub input_schema: Option<DataSchema>,
    pub output_schema: Option<DataSchema>,
}

/// The immutable per-artifact entry.
#[derive(Debug)]
struct ArtifactActions {
    model: Graph,
    actions: Vec<IndexedAction>,
}

/// Concurrent index of action affordances keyed by artifact URI.
pub struct ActionIndex {
    entries: DashMap<String, Arc<ArtifactActions>>,
    infrastructure: HashSet<String>,
}

impl ActionIndex {
    /// Create an index filtering the built-in infrastructure actions.
    pub fn new() -> Self {
        Self::with_extra_infrastructure(std::iter::empty::<String>())
    }

    /// Create an index that also filters the given action names.
    pub fn with_extra_infrastructure<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let infrastructure = INFRASTRUCTURE_ACTIONS
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self {
            entries: DashMap::new(),
            infrastructure,
        }
    }

    pub fn is_infrastructure(&self, action_name: &str) -> bool {
        self.infrastructure.contains(action_name)
    }

    /// Index the action affordances of `artifact_uri` found in `model`.
    ///
    /// Replaces any previous entry. Returns the number of actions kept; when that
    /// is zero the artifact is removed from the index.
    pub fn index_actions_from_model(&self, artifact_uri: &str, model: &Graph) -> usize {
        let base = artifact_uri.split('#').next().unwrap_or(artifact_uri);
        let mut compact = Graph::new();
        let mut actions = Vec::new();

        for affordance in affordance_nodes(model, artifact_uri) {
            let Some(name) = rdf::object_text(model, affordance, td::NAME)
                .or_else(|| rdf::object_text(model, affordance, td::TITLE))
            else {
                tracing::warn!(artifact = %artifact_uri, affordance = %affordance, "skipping action without a name");
                continue;
            };
            if self.is_infrastructure(name) {
                tracing::debug!(artifact = %artifact_uri, action = name, "filtered infrastructure action");
                continue;
            }
            match compact_action(model, affordance, base, artifact_uri, name, &mut compact) {
                Ok(Some(action)) => actions.push(action),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(artifact = %artifact_uri, action = name, error = %e, "skipping action");
                }
            }
        }

        if actions.is_empty() {
            if self.entries.remove(artifact_uri).is_some() {
                tracing::info!(artifact = %artifact_uri, "artifact has no actions left, removed from index");
            } else {
                tracing::debug!(artifact = %artifact_uri, "no environment actions to index");
            }
            return 0;
        }

        actions.sort_by(|a, b| a.action_name.cmp(&b.action_name));
        actions.dedup_by(|a, b| a.action_name == b.action_name);
        let count = actions.len();
        self.entries.insert(
            artifact_uri.to_string(),
            Arc::new(ArtifactActions {
                model: compact,
                actions,
            }),
        );
        tracing::info!(artifact = %artifact_uri, count, "indexed action affordances");
        count
    }

    /// Drop an artifact's entry. Returns whether it was present.
    pub fn remove_actions_for_artifact(&self, artifact_uri: &str) -> bool {
        let removed = self.entries.remove(artifact_uri).is_some();
        if removed {
            tracing::info!(artifact = %artifact_uri, "removed artifact from action index");
        }
        removed
    }

    /// The artifact's compact action model as Turtle, or `None` when unknown.
    pub fn action_affordances_turtle(&self, artifact_uri: &str) -> Option<String> {
        let entry = self.entry(artifact_uri)?;
        Some(rdf::turtle_or_comment(&entry.model))
    }

    /// The artifact's indexed actions, or `None` when unknown.
    pub fn actions_for(&self, artifact_uri: &str) -> Option<Vec<IndexedAction>> {
        self.entry(artifact_uri).map(|entry| entry.actions.clone())
    }

    /// One indexed action by name.
    pub fn action(&self, artifact_uri: &str, action_name: &str) -> Option<IndexedAction> {
        self.entry(artifact_uri)?
            .actions
            .iter()
            .find(|a| a.action_name == action_name)
            .cloned()
    }

    /// All indexed artifact URIs, sorted.
    pub fn known_artifact_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        uris.sort();
        uris
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let artifacts = self.entries.len();
        self.entries.clear();
        tracing::info!(artifacts, "action index cleared");
    }

    fn entry(&self, artifact_uri: &str) -> Option<Arc<ArtifactActions>> {
        self.entries.get(artifact_uri).map(|e| Arc::clone(e.value()))
    }
}

impl Default for ActionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionIndex")
            .field("artifacts", &self.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Action affordance nodes of the Thing describing `artifact_uri`.
///
/// Prefers a `td:Thing` whose IRI is (or extends) the artifact URI, then any
/// Thing; without a Thing, falls back to every node typed `td:ActionAffordance`.
fn affordance_nodes<'a>(model: &'a Graph, artifact_uri: &str) -> Vec<NamedOrBlankNodeRef<'a>> {
    let things = rdf::subjects(model, rdf_vocab::TYPE, td::THING);
    let thing = things
        .iter()
        .find(|t| matches!(t, NamedOrBlankNodeRef::NamedNode(n) if n.as_str() == artifact_uri))
        .or_else(|| {
            things.iter().find(|t| {
                matches!(t, NamedOrBlankNodeRef::NamedNode(n) if n.as_str().starts_with(artifact_uri))
            })
        })
        .or_else(|| things.first())
        .copied();

    let linked: Vec<NamedOrBlankNodeRef<'a>> = match thing {
        Some(thing) => rdf::objects(model, thing, td::HAS_ACTION_AFFORDANCE)
            .into_iter()
            .filter_map(rdf::as_node)
            .collect(),
        None => Vec::new(),
    };
    if !linked.is_empty() {
        return linked;
    }
    rdf::subjects(model, rdf_vocab::TYPE, td::ACTION_AFFORDANCE)
}

/// Rewrite one affordance into `compact`. `Ok(None)` means a mandatory form field is missing.
fn compact_action(
    model: &Graph,
    affordance: NamedOrBlankNodeRef<'_>,
    base: &str,
    artifact_uri: &str,
    name: &str,
    compact: &mut Graph,
) -> RdfResult<Option<IndexedAction>> {
    let forms = rdf::objects(model, affordance, td::HAS_FORM);
    let form = forms.into_iter().filter_map(rdf::as_node).find_map(|form| {
        let target = rdf::object(model, form, hctl::HAS_TARGET)?;
        let method = rdf::object_text(model, form, htv::METHOD_NAME)?;
        Some((form, target, method))
    });
    let Some((form, target, method)) = form else {
        tracing::warn!(artifact = %artifact_uri, action = name, "skipping action without form target and method");
        return Ok(None);
    };
    let Some(target_text) = rdf::term_text(target) else {
        tracing::warn!(artifact = %artifact_uri, action = name, "skipping action with a blank form target");
        return Ok(None);
    };

    let action_iri = rdf::fragment_iri(base, name)?;
    let form_iri = rdf::named_node(format!("{}-form", action_iri.as_str()))?;
    let action = action_iri.as_ref();

    let mut scratch = Graph::new();
    scratch.insert(TripleRef::new(action, rdf_vocab::TYPE, td::ACTION_AFFORDANCE));
    let name_literal = Literal::new_simple_literal(name);
    scratch.insert(TripleRef::new(action, td::NAME, name_literal.as_ref()));
    let title = rdf::object_text(model, affordance, td::TITLE).map(str::to_string);
    if let Some(title) = &title {
        let title_literal = Literal::new_simple_literal(title.as_str());
        scratch.insert(TripleRef::new(action, td::TITLE, title_literal.as_ref()));
    }

    scratch.insert(TripleRef::new(action, td::HAS_FORM, form_iri.as_ref()));
    let method_literal = Literal::new_simple_literal(method);
    scratch.insert(TripleRef::new(form_iri.as_ref(), htv::METHOD_NAME, method_literal.as_ref()));
    scratch.insert(TripleRef::new(form_iri.as_ref(), hctl::HAS_TARGET, target));
    let content_type = rdf::object(model, form, hctl::FOR_CONTENT_TYPE);
    if let Some(content_type) = content_type {
        scratch.insert(TripleRef::new(form_iri.as_ref(), hctl::FOR_CONTENT_TYPE, content_type));
    }

    let input_schema = copy_schema_link(model, affordance, td::HAS_INPUT_SCHEMA, action, &format!("{}-input", action_iri.as_str()), &mut scratch)?;
    let output_schema = copy_schema_link(model, affordance, td::HAS_OUTPUT_SCHEMA, action, &format!("{}-output", action_iri.as_str()), &mut scratch)?;

    for triple in scratch.iter() {
        compact.insert(triple);
    }

    Ok(Some(IndexedAction {
        artifact_uri: artifact_uri.to_string(),
        action_name: name.to_string(),
        title,
        form_target: target_text.to_string(),
        form_method: method.to_string(),
        content_type: content_type.and_then(rdf::term_text).map(str::to_string),
        input_schema,
        output_schema,
    }))
}

fn copy_schema_link(
    model: &Graph,
    affordance: NamedOrBlankNodeRef<'_>,
    link: NamedNodeRef<'_>,
    action: NamedNodeRef<'_>,
    schema_iri: &str,
    scratch: &mut Graph,
) -> RdfResult<Option<DataSchema>> {
    let Some(source) = rdf::object_node(model, affordance, link) else {
        return Ok(None);
    };
    let target = rdf::named_node(schema_iri)?;
    scratch.insert(TripleRef::new(action, link, target.as_ref()));
    copy_schema(model, source, &target, scratch, 0).map(Some)
}

/// Copy a schema node's types, required names, enum values and properties onto `target`.
fn copy_schema(
    model: &Graph,
    source: NamedOrBlankNodeRef<'_>,
    target: &NamedNode,
    scratch: &mut Graph,
    depth: usize,
) -> RdfResult<DataSchema> {
    let mut schema = DataSchema::default();
    let subject = target.as_ref();

    for term in rdf::objects(model, source, rdf_vocab::TYPE) {
        if let TermRef::NamedNode(ty) = term {
            scratch.insert(TripleRef::new(subject, rdf_vocab::TYPE, ty));
            schema.types.push(rdf::local_name(ty.as_str()).to_string());
        }
    }
    for term in rdf::objects(model, source, js::REQUIRED) {
        scratch.insert(TripleRef::new(subject, js::REQUIRED, term));
        if let Some(text) = rdf::term_text(term) {
            schema.required.push(text.to_string());
        }
    }
    for term in rdf::objects(model, source, js::ENUM) {
        scratch.insert(TripleRef::new(subject, js::ENUM, term));
        if let Some(text) = rdf::term_text(term) {
            schema.enum_values.push(text.to_string());
        }
    }

    if depth < MAX_SCHEMA_DEPTH {
        for property in rdf::objects(model, source, js::PROPERTIES)
            .into_iter()
            .filter_map(rdf::as_node)
        {
            let Some(name) = rdf::object_text(model, property, js::PROPERTY_NAME) else {
                tracing::debug!(schema = %target, "skipping schema property without js:propertyName");
                continue;
            };
            let property_iri = rdf::named_node(format!("{}-{}", target.as_str(), urlencoding::encode(name)))?;
            let name_literal = Literal::new_simple_literal(name);
            scratch.insert(TripleRef::new(subject, js::PROPERTIES, property_iri.as_ref()));
            scratch.insert(TripleRef::new(property_iri.as_ref(), js::PROPERTY_NAME, name_literal.as_ref()));
            let nested = copy_schema(model, property, &property_iri, scratch, depth + 1)?;
            schema.properties.push(SchemaProperty {
                name: name.to_string(),
                schema: nested,
            });
        }
    }

    schema.types.sort();
    schema.required.sort();
    schema.enum_values.sort();
    schema.properties.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(schema)
}

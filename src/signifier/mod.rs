//! Signifier store: one shared RDF graph of intent → action recommendations.
//!
//! A signifier recommends its action under one or more alternative contexts.
//! New contexts arrive through [`SignifierStore::merge`], which keeps the
//! context set of each signifier an antichain under subsumption:
//!
//! 1. an absent signifier is created with the new context;
//! 2. a context equivalent to an existing one is a no-op;
//! 3. existing contexts strictly more general or strictly more specific than
//!    the new one are removed together with their blank-node subgraph;
//! 4. a new context still subsumed by a survivor is discarded;
//! 5. otherwise the new context is attached.
//!
//! All graph mutation happens under one write lock, and serialization takes the
//! read lock, so readers never observe a half-merged context.

mod shacl;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use oxigraph::model::vocab::rdf as rdf_vocab;
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef,
    TripleRef,
};
use serde::Serialize;

use crate::constraint::context::Context;
use crate::error::SignifierError;
use crate::rdf;
use crate::vocab::cashmere;

/// Result type for signifier store operations.
pub type SignifierResult<T> = std::result::Result<T, SignifierError>;

/// Which merge step decided the fate of a new context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The signifier did not exist and was created.
    Created,
    /// An equivalent context was already attached.
    Duplicate,
    /// The context was attached after pruning `pruned` dominated contexts.
    Attached { pruned: usize },
    /// A surviving context already subsumes the new one.
    Rejected,
    /// The new context was empty; the signifier exists and was left as is.
    Touched,
}

/// Typed view of one stored signifier.
#[derive(Debug, Clone, Serialize)]
pub struct Signifier {
    pub iri: String,
    /// Affordance the signifier recommends.
    pub signifies: Option<String>,
    pub intent: Option<String>,
    pub contexts: Vec<Context>,
}

/// Thread-safe store owning the signifier graph.
pub struct SignifierStore {
    graph: RwLock<Graph>,
    base: String,
}

impl SignifierStore {
    /// Create an empty store minting signifier IRIs under `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            graph: RwLock::new(Graph::new()),
            base: base.into(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// IRI prefix for derived identities.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Mint the IRI for a derived signifier identity.
    pub fn iri_for(&self, identity: &str) -> SignifierResult<NamedNode> {
        if identity.is_empty() {
            return Err(SignifierError::InvalidIdentity {
                identity: identity.to_string(),
            });
        }
        Ok(rdf::named_node(format!("{}{identity}", self.base))?)
    }

    /// Merge a new context into the signifier `iri`, creating it if absent.
    ///
    /// `signifies` and `intent` are only written when the signifier is created.
    pub fn merge(
        &self,
        iri: &NamedNode,
        signifies: &NamedNode,
        intent: &str,
        context: Context,
    ) -> SignifierResult<MergeOutcome> {
        let mut graph = self.write();
        let subject = iri.as_ref();

        if !is_signifier(&graph, subject) {
            insert_signifier(&mut graph, subject, signifies.as_ref(), intent);
            if !context.is_empty() {
                attach_context(&mut graph, subject, &context)?;
            }
            tracing::info!(signifier = %iri, constraints = context.len(), "signifier created");
            return Ok(MergeOutcome::Created);
        }

        if context.is_empty() {
            tracing::debug!(signifier = %iri, "empty context leaves signifier untouched");
            return Ok(MergeOutcome::Touched);
        }

        let existing = read_contexts(&graph, subject);
        if existing.iter().any(|(_, old)| old.equivalent(&context)) {
            tracing::debug!(signifier = %iri, "context already present");
            return Ok(MergeOutcome::Duplicate);
        }

        let mut pruned = 0;
        let mut survivors = Vec::with_capacity(existing.len());
        for (node, old) in existing {
            let new_covers_old = context.subsumes(&old);
            let old_covers_new = old.subsumes(&context);
            if new_covers_old != old_covers_new {
                let removed = remove_context(&mut graph, subject, node);
                tracing::debug!(
                    signifier = %iri,
                    removed,
                    more_specific = new_covers_old,
                    "pruned dominated context"
                );
                pruned += 1;
            } else {
                survivors.push(old);
            }
        }

        // Unreachable while step 2 filters equivalents: no survivor subsumes the new context.
        if survivors.iter().any(|old| old.subsumes(&context)) {
            tracing::debug!(signifier = %iri, "context implied by a surviving context");
            return Ok(MergeOutcome::Rejected);
        }

        attach_context(&mut graph, subject, &context)?;
        tracing::debug!(signifier = %iri, pruned, "context attached");
        Ok(MergeOutcome::Attached { pruned })
    }

    /// Contexts currently attached to a signifier.
    pub fn contexts_of(&self, iri: &str) -> Vec<Context> {
        let Ok(node) = NamedNode::new(iri) else {
            return Vec::new();
        };
        let graph = self.read();
        read_contexts(&graph, node.as_ref())
            .into_iter()
            .map(|(_, context)| context)
            .collect()
    }

    /// IRIs of all stored signifiers, sorted.
    pub fn signifier_iris(&self) -> Vec<String> {
        let graph = self.read();
        signifier_nodes(&graph)
            .into_iter()
            .map(|node| node.as_str().to_string())
            .collect()
    }

    /// Typed view of one signifier.
    pub fn signifier(&self, iri: &str) -> Option<Signifier> {
        let node = NamedNode::new(iri).ok()?;
        let graph = self.read();
        if !is_signifier(&graph, node.as_ref()) {
            return None;
        }
        Some(view(&graph, node.as_ref()))
    }

    /// Typed views of all signifiers, sorted by IRI.
    pub fn signifiers(&self) -> Vec<Signifier> {
        let graph = self.read();
        signifier_nodes(&graph)
            .into_iter()
            .map(|node| view(&graph, node))
            .collect()
    }

    /// Number of stored signifiers.
    pub fn len(&self) -> usize {
        signifier_nodes(&self.read()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All signifiers as Turtle.
    pub fn to_turtle(&self) -> String {
        rdf::turtle_or_comment(&self.read())
    }

    /// All signifiers as Turtle, failing instead of degrading to a comment.
    pub fn try_to_turtle(&self) -> SignifierResult<String> {
        Ok(rdf::to_turtle(&self.read())?)
    }

    /// One signifier with its contexts as Turtle, or `None` when unknown.
    pub fn signifier_turtle(&self, iri: &str) -> Option<String> {
        let node = NamedNode::new(iri).ok()?;
        let graph = self.read();
        if !is_signifier(&graph, node.as_ref()) {
            return None;
        }
        let mut subgraph = Graph::new();
        rdf::copy_owned_subgraph(&graph, node.as_ref().into(), &mut subgraph);
        Some(rdf::turtle_or_comment(&subgraph))
    }

    /// Import signifiers from Turtle (as produced by [`Self::to_turtle`]).
    ///
    /// Returns the number of signifiers in the store afterwards.
    pub fn load_turtle(&self, text: &str) -> SignifierResult<usize> {
        let parsed = rdf::parse_turtle(text, None)?;
        let mut graph = self.write();
        for triple in parsed.iter() {
            graph.insert(triple);
        }
        let count = signifier_nodes(&graph).len();
        tracing::info!(triples = parsed.len(), signifiers = count, "signifiers loaded");
        Ok(count)
    }

    /// Drop every signifier.
    pub fn reset(&self) {
        let mut graph = self.write();
        let triples = graph.len();
        graph.clear();
        tracing::info!(triples, "signifier store cleared");
    }
}

impl std::fmt::Debug for SignifierStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignifierStore")
            .field("base", &self.base)
            .field("triples", &self.read().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Graph access
// ---------------------------------------------------------------------------

fn is_signifier(graph: &Graph, subject: NamedNodeRef<'_>) -> bool {
    graph.contains(TripleRef::new(subject, rdf_vocab::TYPE, cashmere::SIGNIFIER))
}

fn signifier_nodes(graph: &Graph) -> Vec<NamedNodeRef<'_>> {
    let mut nodes: Vec<NamedNodeRef<'_>> = rdf::subjects(graph, rdf_vocab::TYPE, cashmere::SIGNIFIER)
        .into_iter()
        .filter_map(|node| match node {
            NamedOrBlankNodeRef::NamedNode(n) => Some(n),
            _ => None,
        })
        .collect();
    nodes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    nodes
}

fn insert_signifier(
    graph: &mut Graph,
    subject: NamedNodeRef<'_>,
    signifies: NamedNodeRef<'_>,
    intent: &str,
) {
    let intent = Literal::new_simple_literal(intent);
    graph.insert(TripleRef::new(subject, rdf_vocab::TYPE, cashmere::SIGNIFIER));
    graph.insert(TripleRef::new(subject, cashmere::SIGNIFIES, signifies));
    graph.insert(TripleRef::new(
        subject,
        cashmere::RECOMMENDS_ABILITY,
        cashmere::LLM_REASONING_ABILITY,
    ));
    graph.insert(TripleRef::new(
        subject,
        cashmere::HAS_INTENTION_DESCRIPTION,
        intent.as_ref(),
    ));
}

fn attach_context(
    graph: &mut Graph,
    subject: NamedNodeRef<'_>,
    context: &Context,
) -> SignifierResult<()> {
    // Materialize into a scratch graph first so an invalid IRI leaves no partial context.
    let mut scratch = Graph::new();
    let node = BlankNode::default();
    for constraint in context.constraints() {
        shacl::insert_condition(&mut scratch, &node, constraint)?;
    }
    graph.insert(TripleRef::new(subject, cashmere::RECOMMENDS_CONTEXT, node.as_ref()));
    for triple in scratch.iter() {
        graph.insert(triple);
    }
    Ok(())
}

fn remove_context(graph: &mut Graph, subject: NamedNodeRef<'_>, node: NamedOrBlankNode) -> usize {
    let link = graph.remove(TripleRef::new(subject, cashmere::RECOMMENDS_CONTEXT, node.as_ref()));
    usize::from(link) + rdf::remove_owned_subgraph(graph, node)
}

fn read_contexts(graph: &Graph, subject: NamedNodeRef<'_>) -> Vec<(NamedOrBlankNode, Context)> {
    rdf::objects(graph, subject, cashmere::RECOMMENDS_CONTEXT)
        .into_iter()
        .filter_map(rdf::as_node)
        .map(|node| {
            let context = rdf::objects(graph, node, cashmere::HAS_SHACL_CONDITION)
                .into_iter()
                .filter_map(rdf::as_node)
                .filter_map(|shape| shacl::read_condition(graph, shape))
                .collect();
            (node.into_owned(), context)
        })
        .collect()
}

fn view(graph: &Graph, subject: NamedNodeRef<'_>) -> Signifier {
    Signifier {
        iri: subject.as_str().to_string(),
        signifies: rdf::object_text(graph, subject, cashmere::SIGNIFIES).map(str::to_string),
        intent: rdf::object_text(graph, subject, cashmere::HAS_INTENTION_DESCRIPTION)
            .map(str::to_string),
        contexts: read_contexts(graph, subject)
            .into_iter()
            .map(|(_, context)| context)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, Operator, Threshold};

    const BASE: &str = "http://localhost:8080/signifiers/";
    const LAMP: &str = "http://localhost:8080/workspaces/lab308/artifacts/lamp1";
    const BLINDS: &str = "http://localhost:8080/workspaces/lab308/artifacts/blinds1";

    fn lux(op: Operator, n: f64) -> Constraint {
        Constraint::new(LAMP, "luminosity", op, Threshold::Number(n))
    }

    fn closed(op: Operator, n: f64) -> Constraint {
        Constraint::new(BLINDS, "closedPercentage", op, Threshold::Number(n))
    }

    fn ctx(constraints: impl IntoIterator<Item = Constraint>) -> Context {
        constraints.into_iter().collect()
    }

    fn fixture() -> (SignifierStore, NamedNode, NamedNode) {
        let store = SignifierStore::new(BASE);
        let iri = store.iri_for("setLightIntensity-lamp1-signifier").unwrap();
        let affordance = NamedNode::new(format!("{LAMP}#setLightIntensity")).unwrap();
        (store, iri, affordance)
    }

    fn assert_antichain(contexts: &[Context]) {
        for (i, a) in contexts.iter().enumerate() {
            for (j, b) in contexts.iter().enumerate() {
                if i != j {
                    assert!(!a.subsumes(b), "context {i} subsumes context {j}");
                }
            }
        }
    }

    #[test]
    fn create_if_absent() {
        let (store, iri, aff) = fixture();
        let outcome = store
            .merge(&iri, &aff, "increase luminosity in a room", ctx([lux(Operator::LessThan, 300.0)]))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Created);

        let sig = store.signifier(iri.as_str()).unwrap();
        assert_eq!(sig.signifies.as_deref(), Some(aff.as_str()));
        assert_eq!(sig.intent.as_deref(), Some("increase luminosity in a room"));
        assert_eq!(sig.contexts, vec![ctx([lux(Operator::LessThan, 300.0)])]);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let (store, iri, aff) = fixture();
        let context = ctx([lux(Operator::LessThan, 300.0), closed(Operator::GreaterThan, 50.0)]);
        store.merge(&iri, &aff, "i", context.clone()).unwrap();
        let before = store.to_turtle().len();
        let outcome = store.merge(&iri, &aff, "i", context.clone()).unwrap();
        assert_eq!(outcome, MergeOutcome::Duplicate);
        assert_eq!(store.contexts_of(iri.as_str()), vec![context]);
        assert_eq!(store.to_turtle().len(), before);
    }

    #[test]
    fn more_specific_context_replaces_existing() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 500.0)])).unwrap();
        let outcome = store
            .merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)]))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Attached { pruned: 1 });
        assert_eq!(
            store.contexts_of(iri.as_str()),
            vec![ctx([lux(Operator::LessThan, 300.0)])]
        );
    }

    #[test]
    fn more_general_context_replaces_existing() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        let outcome = store
            .merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 500.0)]))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Attached { pruned: 1 });
        assert_eq!(
            store.contexts_of(iri.as_str()),
            vec![ctx([lux(Operator::LessThan, 500.0)])]
        );
    }

    #[test]
    fn incomparable_contexts_coexist() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        let outcome = store
            .merge(&iri, &aff, "i", ctx([closed(Operator::GreaterThan, 50.0)]))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Attached { pruned: 0 });
        let contexts = store.contexts_of(iri.as_str());
        assert_eq!(contexts.len(), 2);
        assert_antichain(&contexts);
    }

    #[test]
    fn pruning_leaves_no_orphaned_triples() {
        let (store, iri, aff) = fixture();
        store
            .merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 500.0), closed(Operator::GreaterThan, 10.0)]))
            .unwrap();
        let single_context_triples = store.read().len();

        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 500.0)])).unwrap();
        // 4 signifier triples, the context link, 7 triples for the one remaining condition.
        assert_eq!(store.read().len(), 4 + 1 + 7);
        assert!(store.read().len() < single_context_triples);
    }

    #[test]
    fn empty_context_creates_bare_signifier_and_never_prunes() {
        let (store, iri, aff) = fixture();
        assert_eq!(store.merge(&iri, &aff, "i", Context::new()).unwrap(), MergeOutcome::Created);
        assert!(store.contexts_of(iri.as_str()).is_empty());

        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        assert_eq!(store.merge(&iri, &aff, "i", Context::new()).unwrap(), MergeOutcome::Touched);
        assert_eq!(store.contexts_of(iri.as_str()).len(), 1);
    }

    #[test]
    fn intent_is_kept_from_creation() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "first", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        store.merge(&iri, &aff, "second", ctx([closed(Operator::LessThan, 30.0)])).unwrap();
        assert_eq!(store.signifier(iri.as_str()).unwrap().intent.as_deref(), Some("first"));
    }

    #[test]
    fn antichain_holds_after_many_merges() {
        let (store, iri, aff) = fixture();
        let sequence = [
            ctx([lux(Operator::LessThan, 500.0)]),
            ctx([closed(Operator::GreaterThan, 50.0)]),
            ctx([lux(Operator::LessThan, 300.0), closed(Operator::GreaterThan, 50.0)]),
            ctx([lux(Operator::Equal, 100.0)]),
            ctx([closed(Operator::GreaterOrEqual, 80.0)]),
            ctx([lux(Operator::GreaterThan, 900.0)]),
            ctx([lux(Operator::LessThan, 500.0)]),
        ];
        for context in sequence {
            store.merge(&iri, &aff, "i", context).unwrap();
            assert_antichain(&store.contexts_of(iri.as_str()));
        }
    }

    #[test]
    fn signifier_turtle_is_scoped() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        let other = store.iri_for("toggle-lamp1-signifier").unwrap();
        store.merge(&other, &aff, "j", ctx([closed(Operator::LessThan, 10.0)])).unwrap();

        let text = store.signifier_turtle(iri.as_str()).unwrap();
        assert!(text.contains("setLightIntensity-lamp1-signifier"));
        assert!(!text.contains("toggle-lamp1-signifier"));
        assert!(store.signifier_turtle(&format!("{BASE}missing")).is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        assert_eq!(store.len(), 1);
        store.reset();
        assert!(store.is_empty());
        assert!(store.signifier_iris().is_empty());
    }

    #[test]
    fn empty_identity_is_rejected() {
        let store = SignifierStore::new(BASE);
        assert!(matches!(
            store.iri_for(""),
            Err(SignifierError::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn fallible_turtle_reloads_into_a_fresh_store() {
        let (store, iri, aff) = fixture();
        store.merge(&iri, &aff, "i", ctx([lux(Operator::LessThan, 300.0)])).unwrap();
        let text = store.try_to_turtle().unwrap();
        assert!(!text.starts_with("# error"));

        let reloaded = SignifierStore::new(BASE);
        assert_eq!(reloaded.load_turtle(&text).unwrap(), 1);
        assert_eq!(reloaded.contexts_of(iri.as_str()), store.contexts_of(iri.as_str()));
    }
}

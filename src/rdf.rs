//! Shared RDF helpers built on oxigraph's in-memory `Graph`.
//!
//! The rest of the crate never matches raw triple patterns; it goes through the
//! typed accessors here, the Turtle reader/writer, and the cascading removal of
//! blank-node subgraphs.

use std::collections::HashSet;

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{
    Graph, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef, Triple,
    TripleRef,
};

use crate::error::RdfError;
use crate::vocab::PREFIXES;

/// Result type for RDF helpers.
pub type RdfResult<T> = std::result::Result<T, RdfError>;

/// Build a named node, reporting the offending IRI on failure.
pub fn named_node(iri: impl Into<String>) -> RdfResult<NamedNode> {
    let iri = iri.into();
    NamedNode::new(iri.clone()).map_err(|e| RdfError::InvalidIri {
        iri,
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Typed accessors
// ---------------------------------------------------------------------------

/// First object of `(subject, predicate, ?)`.
pub fn object<'a, 'b>(
    graph: &'a Graph,
    subject: impl Into<NamedOrBlankNodeRef<'b>>,
    predicate: NamedNodeRef<'b>,
) -> Option<TermRef<'a>> {
    graph.object_for_subject_predicate(subject, predicate)
}

/// All objects of `(subject, predicate, ?)`.
pub fn objects<'a, 'b>(
    graph: &'a Graph,
    subject: impl Into<NamedOrBlankNodeRef<'b>>,
    predicate: NamedNodeRef<'b>,
) -> Vec<TermRef<'a>> {
    graph
        .objects_for_subject_predicate(subject, predicate)
        .collect()
}

/// All subjects of `(?, predicate, object)`.
pub fn subjects<'a, 'b>(
    graph: &'a Graph,
    predicate: NamedNodeRef<'b>,
    object: impl Into<TermRef<'b>>,
) -> Vec<NamedOrBlankNodeRef<'a>> {
    graph
        .subjects_for_predicate_object(predicate, object)
        .collect()
}

/// The object of `(subject, predicate, ?)` when it is a node (IRI or blank).
pub fn object_node<'a, 'b>(
    graph: &'a Graph,
    subject: impl Into<NamedOrBlankNodeRef<'b>>,
    predicate: NamedNodeRef<'b>,
) -> Option<NamedOrBlankNodeRef<'a>> {
    object(graph, subject, predicate).and_then(as_node)
}

/// Text of the object of `(subject, predicate, ?)`: a literal's lexical form or an IRI.
pub fn object_text<'a, 'b>(
    graph: &'a Graph,
    subject: impl Into<NamedOrBlankNodeRef<'b>>,
    predicate: NamedNodeRef<'b>,
) -> Option<&'a str> {
    object(graph, subject, predicate).and_then(term_text)
}

/// All texts of `(subject, predicate, ?)`, in graph order.
pub fn object_texts<'a, 'b>(
    graph: &'a Graph,
    subject: impl Into<NamedOrBlankNodeRef<'b>>,
    predicate: NamedNodeRef<'b>,
) -> Vec<&'a str> {
    objects(graph, subject, predicate)
        .into_iter()
        .filter_map(term_text)
        .collect()
}

/// View a term as a subject-capable node.
pub fn as_node(term: TermRef<'_>) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        TermRef::NamedNode(n) => Some(n.into()),
        TermRef::BlankNode(b) => Some(b.into()),
        _ => None,
    }
}

/// Lexical text of a literal or the IRI of a named node.
pub fn term_text(term: TermRef<'_>) -> Option<&str> {
    match term {
        TermRef::NamedNode(n) => Some(n.as_str()),
        TermRef::Literal(l) => Some(l.value()),
        _ => None,
    }
}

/// An IRI without its fragment.
pub fn strip_fragment(iri: &str) -> &str {
    iri.split('#').next().unwrap_or(iri)
}

/// `{base}#{name}` with `name` percent-encoded, for minting IRIs from labels.
pub fn fragment_iri(base: &str, name: &str) -> RdfResult<NamedNode> {
    named_node(format!("{}#{}", strip_fragment(base), urlencoding::encode(name)))
}

/// Property path IRI of an artifact property: `<artifact-without-fragment>#<encoded name>`.
pub fn property_path(artifact: &str, property: &str) -> RdfResult<NamedNode> {
    fragment_iri(artifact, property)
}

/// Property name of a path minted by [`property_path`] for `artifact`.
///
/// Paths under another base fall back to their decoded local name.
pub fn property_name(path: &str, artifact: &str) -> String {
    let encoded = path
        .strip_prefix(strip_fragment(artifact))
        .and_then(|rest| rest.strip_prefix('#'))
        .unwrap_or_else(|| local_name(path));
    match urlencoding::decode(encoded) {
        Ok(name) => name.into_owned(),
        Err(_) => encoded.to_string(),
    }
}

/// The part of an IRI after its last `#`, or after its last `/` when there is no fragment.
pub fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches('/');
    match trimmed.rfind('#') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed.rsplit('/').next().unwrap_or(trimmed),
    }
}

// ---------------------------------------------------------------------------
// Graph surgery
// ---------------------------------------------------------------------------

/// Remove `root`'s outgoing triples and, recursively, every blank node it owns.
///
/// Blank nodes are exclusively owned substructure; IRIs are shared references and
/// are never descended into. Returns the number of triples removed.
pub fn remove_owned_subgraph(graph: &mut Graph, root: NamedOrBlankNode) -> usize {
    let mut removed = 0;
    let mut pending = vec![root];
    let mut seen = HashSet::new();

    while let Some(current) = pending.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let owned: Vec<Triple> = graph
            .triples_for_subject(current.as_ref())
            .map(TripleRef::into_owned)
            .collect();
        for triple in &owned {
            if let Term::BlankNode(blank) = &triple.object {
                pending.push(blank.clone().into());
            }
            if graph.remove(triple) {
                removed += 1;
            }
        }
    }

    removed
}

/// Copy `root`'s outgoing triples and every blank node it owns into `into`.
pub fn copy_owned_subgraph(graph: &Graph, root: NamedOrBlankNodeRef<'_>, into: &mut Graph) {
    let mut pending = vec![root];
    let mut seen = HashSet::new();

    while let Some(current) = pending.pop() {
        if !seen.insert(current) {
            continue;
        }
        for triple in graph.triples_for_subject(current) {
            if let TermRef::BlankNode(blank) = triple.object {
                pending.push(blank.into());
            }
            into.insert(triple);
        }
    }
}

// ---------------------------------------------------------------------------
// Turtle I/O
// ---------------------------------------------------------------------------

/// Parse a Turtle document into a graph, resolving relative IRIs against `base`.
pub fn parse_turtle(text: &str, base: Option<&str>) -> RdfResult<Graph> {
    let mut parser = RdfParser::from_format(RdfFormat::Turtle);
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| RdfError::InvalidIri {
                iri: base.to_string(),
                message: e.to_string(),
            })?;
    }

    let mut graph = Graph::new();
    for quad in parser.for_reader(text.as_bytes()) {
        let quad = quad.map_err(|e| RdfError::Parse {
            message: e.to_string(),
        })?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// Serialize a graph as Turtle with the crate's prefix table.
pub fn to_turtle(graph: &Graph) -> RdfResult<String> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
    for (prefix, namespace) in PREFIXES {
        serializer = serializer
            .with_prefix(*prefix, *namespace)
            .map_err(|e| RdfError::Serialize {
                message: format!("bad prefix {prefix}: {e}"),
            })?;
    }

    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph.iter() {
        writer
            .serialize_triple(triple)
            .map_err(|e| RdfError::Serialize {
                message: e.to_string(),
            })?;
    }
    let bytes = writer.finish().map_err(|e| RdfError::Serialize {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| RdfError::Serialize {
        message: e.to_string(),
    })
}

/// Serialize a graph as Turtle, degrading to an inline error comment.
///
/// Agents consuming this text always get a string back; a failed serialization
/// shows up as a `#` comment instead of an error.
pub fn turtle_or_comment(graph: &Graph) -> String {
    match to_turtle(graph) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, triples = graph.len(), "turtle serialization failed");
            format!("# error: {e}\n")
        }
    }
}

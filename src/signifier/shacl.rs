//! SHACL encoding of constraints.
//!
//! One constraint becomes one `sh:NodeShape`:
//!
//! ```text
//! _:context cashmere:hasShaclCondition _:shape .
//! _:shape a sh:NodeShape ;
//!     sh:targetNode <artifact> ;
//!     sh:property [ sh:path <artifact#property> ;
//!                   sh:datatype xsd:double ;
//!                   sh:maxExclusive 300 ] .
//! ```

use oxigraph::model::vocab::{rdf as rdf_vocab, xsd};
use oxigraph::model::{BlankNode, Graph, Literal, NamedNodeRef, NamedOrBlankNodeRef, TermRef, TripleRef};

use crate::constraint::{Constraint, Operator, Threshold};
use crate::rdf::{self, RdfResult};
use crate::vocab::{cashmere, sh};

/// SHACL bound predicate for an operator.
fn bound_predicate(operator: Operator) -> NamedNodeRef<'static> {
    match operator {
        Operator::LessThan => sh::MAX_EXCLUSIVE,
        Operator::LessOrEqual => sh::MAX_INCLUSIVE,
        Operator::GreaterThan => sh::MIN_EXCLUSIVE,
        Operator::GreaterOrEqual => sh::MIN_INCLUSIVE,
        Operator::Equal => sh::HAS_VALUE,
    }
}

const BOUNDS: [(NamedNodeRef<'static>, Operator); 5] = [
    (sh::MAX_EXCLUSIVE, Operator::LessThan),
    (sh::MAX_INCLUSIVE, Operator::LessOrEqual),
    (sh::MIN_EXCLUSIVE, Operator::GreaterThan),
    (sh::MIN_INCLUSIVE, Operator::GreaterOrEqual),
    (sh::HAS_VALUE, Operator::Equal),
];

fn threshold_literal(threshold: &Threshold) -> Literal {
    match threshold {
        Threshold::Number(n) => Literal::new_typed_literal(n.to_string(), xsd::DOUBLE),
        Threshold::Text(s) => Literal::new_simple_literal(s.as_str()),
    }
}

/// Attach one constraint to `context` as a SHACL node shape.
pub(crate) fn insert_condition(
    graph: &mut Graph,
    context: &BlankNode,
    constraint: &Constraint,
) -> RdfResult<()> {
    let target = rdf::named_node(constraint.artifact.as_str())?;
    let path = rdf::property_path(&constraint.artifact, &constraint.property)?;
    let shape = BlankNode::default();
    let property = BlankNode::default();
    let datatype = match constraint.threshold {
        Threshold::Number(_) => xsd::DOUBLE,
        Threshold::Text(_) => xsd::STRING,
    };
    let value = threshold_literal(&constraint.threshold);

    let (shape, property) = (shape.as_ref(), property.as_ref());

    graph.insert(TripleRef::new(context.as_ref(), cashmere::HAS_SHACL_CONDITION, shape));
    graph.insert(TripleRef::new(shape, rdf_vocab::TYPE, sh::NODE_SHAPE));
    graph.insert(TripleRef::new(shape, sh::TARGET_NODE, target.as_ref()));
    graph.insert(TripleRef::new(shape, sh::PROPERTY, property));
    graph.insert(TripleRef::new(property, sh::PATH, path.as_ref()));
    graph.insert(TripleRef::new(property, sh::DATATYPE, datatype));
    graph.insert(TripleRef::new(
        property,
        bound_predicate(constraint.operator),
        value.as_ref(),
    ));
    Ok(())
}

/// Read a constraint back out of a node shape.
///
/// Shapes missing their target node, property path, or bound are dropped with a
/// warning; the caller keeps whatever other conditions parse.
pub(crate) fn read_condition(graph: &Graph, shape: NamedOrBlankNodeRef<'_>) -> Option<Constraint> {
    let Some(artifact) = rdf::object_text(graph, shape, sh::TARGET_NODE) else {
        tracing::warn!(shape = %shape, "dropping condition without sh:targetNode");
        return None;
    };
    let Some(property) = rdf::object_node(graph, shape, sh::PROPERTY) else {
        tracing::warn!(shape = %shape, "dropping condition without sh:property");
        return None;
    };
    let Some(path) = rdf::object_text(graph, property, sh::PATH) else {
        tracing::warn!(shape = %shape, "dropping condition without sh:path");
        return None;
    };

    let name = rdf::property_name(path, artifact);

    let bound = BOUNDS.iter().find_map(|(predicate, operator)| {
        rdf::object(graph, property, *predicate).map(|term| (*operator, term))
    });
    let Some((operator, term)) = bound else {
        tracing::warn!(shape = %shape, path, "dropping condition without a bound");
        return None;
    };

    let threshold = match term {
        TermRef::Literal(literal) if literal.datatype() == xsd::STRING => {
            Threshold::Text(literal.value().to_string())
        }
        TermRef::Literal(literal) => Threshold::parse(literal.value()),
        TermRef::NamedNode(node) => Threshold::Text(node.as_str().to_string()),
        _ => {
            tracing::warn!(shape = %shape, path, "dropping condition with a non-literal bound");
            return None;
        }
    };

    Some(Constraint::new(artifact, name, operator, threshold))
}

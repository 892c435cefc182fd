//! Vocabulary terms consumed from Thing Descriptions and produced for signifiers.
//!
//! Every IRI the crate reads or writes lives here as a `NamedNodeRef` constant so
//! call sites name terms instead of spelling IRIs.

use oxigraph::model::NamedNodeRef;

/// Prefix table used when serializing Turtle.
pub const PREFIXES: &[(&str, &str)] = &[
    ("td", td::NS),
    ("hctl", hctl::NS),
    ("htv", htv::NS),
    ("js", js::NS),
    ("sh", sh::NS),
    ("cashmere", cashmere::NS),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// W3C Web of Things Thing Description vocabulary.
pub mod td {
    use super::NamedNodeRef;

    pub const NS: &str = "https://www.w3.org/2019/wot/td#";

    pub const THING: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#Thing");
    pub const ACTION_AFFORDANCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#ActionAffordance");
    pub const HAS_ACTION_AFFORDANCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#hasActionAffordance");
    pub const NAME: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#name");
    pub const TITLE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#title");
    pub const HAS_FORM: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#hasForm");
    pub const HAS_INPUT_SCHEMA: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#hasInputSchema");
    pub const HAS_OUTPUT_SCHEMA: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/td#hasOutputSchema");
}

/// Hypermedia controls.
pub mod hctl {
    use super::NamedNodeRef;

    pub const NS: &str = "https://www.w3.org/2019/wot/hypermedia#";

    pub const HAS_TARGET: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/hypermedia#hasTarget");
    pub const FOR_CONTENT_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/hypermedia#forContentType");
}

/// HTTP vocabulary.
pub mod htv {
    use super::NamedNodeRef;

    pub const NS: &str = "http://www.w3.org/2011/http#";

    pub const METHOD_NAME: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/2011/http#methodName");
}

/// JSON Schema in RDF.
pub mod js {
    use super::NamedNodeRef;

    pub const NS: &str = "https://www.w3.org/2019/wot/json-schema#";

    pub const PROPERTIES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/json-schema#properties");
    pub const PROPERTY_NAME: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/json-schema#propertyName");
    pub const REQUIRED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/json-schema#required");
    pub const ENUM: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://www.w3.org/2019/wot/json-schema#enum");
}

/// SHACL shapes.
pub mod sh {
    use super::NamedNodeRef;

    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    pub const NODE_SHAPE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape");
    pub const TARGET_NODE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetNode");
    pub const PROPERTY: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#property");
    pub const PATH: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path");
    pub const DATATYPE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#datatype");
    pub const MAX_EXCLUSIVE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxExclusive");
    pub const MAX_INCLUSIVE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxInclusive");
    pub const MIN_EXCLUSIVE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minExclusive");
    pub const MIN_INCLUSIVE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minInclusive");
    pub const HAS_VALUE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#hasValue");
}

/// Signifier vocabulary.
pub mod cashmere {
    use super::NamedNodeRef;

    pub const NS: &str = "https://purl.org/cashmere#";

    pub const SIGNIFIER: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://purl.org/cashmere#Signifier");
    pub const SIGNIFIES: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://purl.org/cashmere#signifies");
    pub const RECOMMENDS_ABILITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.org/cashmere#recommendsAbility");
    pub const HAS_INTENTION_DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.org/cashmere#hasIntentionDescription");
    pub const RECOMMENDS_CONTEXT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.org/cashmere#recommendsContext");
    pub const HAS_SHACL_CONDITION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.org/cashmere#hasShaclCondition");
    /// The single ability every signifier recommends.
    pub const LLM_REASONING_ABILITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.org/cashmere#LLMReasoningAbility");
}

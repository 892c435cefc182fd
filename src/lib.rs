// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # cashmere
//!
//! Signifier middleware for hypermedia multi-agent systems. Artifacts in a
//! Web-of-Things environment publish Thing Descriptions; agents generate plans
//! that invoke their actions. The middleware keeps two views of that world:
//!
//! - **Action index** (`affordance`): per artifact, the environment-relevant
//!   action affordances, with infrastructure actions filtered out
//! - **Signifier store** (`signifier`): one RDF graph of recommendations, each
//!   binding an intent to an action under alternative SHACL-encoded contexts
//! - **Subsumption** (`constraint`): the implication order over constraints
//!   and contexts that keeps every signifier's context set minimal
//! - **Plan ingestion** (`plan`): execution plans become signifier merges
//!
//! ## Library usage
//!
//! ```no_run
//! use cashmere::config::CashmereConfig;
//! use cashmere::middleware::Middleware;
//!
//! let mw = Middleware::new(CashmereConfig::default());
//! let plan = r#"{"steps": [{
//!     "action_name": "setLightIntensity",
//!     "artifact_uri": "http://localhost:8080/workspaces/lab308/artifacts/lamp1",
//!     "affordance_uri": "http://localhost:8080/workspaces/lab308/artifacts/lamp1#setLightIntensity",
//!     "reasons": [{"evidence": [{
//!         "artifact": "http://localhost:8080/workspaces/lab308/artifacts/sensor1",
//!         "property": "luminosity", "operator": "<", "threshold": 300
//!     }]}]
//! }]}"#;
//! let touched = mw.ingest_plan(plan).unwrap();
//! println!("{}", mw.signifier_turtle(&touched[0]).unwrap());
//! ```

pub mod affordance;
pub mod config;
pub mod constraint;
pub mod error;
pub mod middleware;
pub mod plan;
pub mod rdf;
pub mod signifier;
pub mod vocab;

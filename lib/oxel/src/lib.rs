#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

mod axiom;
mod entity;
mod error;
mod hierarchy;
mod node;
mod ontology;
mod processor;
mod properties;
mod rules;
mod status;

pub use axiom::NormalizedAxiom;
pub use entity::{ClassId, EntitySpace, IdGenerator, IndividualId, ObjectPropertyId};
pub use error::{ClassifierError, InvariantViolation};
pub use hierarchy::ClassHierarchy;
pub use node::{NodeTable, Obligation, VNode};
pub use ontology::{Chain, Existential, ExtendedOntology, Gci3};
pub use processor::{
    CancellationToken, ClassificationOutcome, ClassifierConfig, RuleProcessor, Statistics,
};
pub use properties::PropertyHierarchy;
pub use rules::{CompletionRule, Trigger};
pub use status::{ClassifierStatus, Entry};

//! Error types for classification.

use crate::entity::{ClassId, IndividualId, ObjectPropertyId};

/// Main error type of the classifier.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClassifierError {
    /// The axioms or the identifiers handed to the classifier are inconsistent.
    ///
    /// This is a bug of the component that produced the normalized axioms.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// A result was requested before the fixpoint was reached.
    ///
    /// Calling [`RuleProcessor::process`](crate::RuleProcessor::process)
    /// until it returns `false` resolves it.
    #[error("The ontology is not classified yet")]
    NotClassified,

    /// The completion graph grew beyond the configured number of nodes.
    #[error("The completion graph exceeded the limit of {limit} nodes")]
    NodeLimitExceeded { limit: usize },
}

impl ClassifierError {
    /// Returns `true` if the error is cured by running more fixpoint steps.
    pub fn is_not_classified(&self) -> bool {
        matches!(self, Self::NotClassified)
    }
}

/// A broken invariant of the classifier input or state.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InvariantViolation {
    /// A class identifier unknown to the identifier space.
    #[error("Unknown class identifier {0}")]
    UnknownClass(ClassId),

    /// An object property identifier unknown to the identifier space.
    #[error("Unknown object property identifier {0}")]
    UnknownObjectProperty(ObjectPropertyId),

    /// An individual identifier unknown to the identifier space.
    #[error("Unknown individual identifier {0}")]
    UnknownIndividual(IndividualId),

    /// Two inverse declarations that would make the inverse map non involutive.
    #[error("{property} is declared inverse of both {first} and {second}")]
    ConflictingInverse {
        property: ObjectPropertyId,
        first: ObjectPropertyId,
        second: ObjectPropertyId,
    },

    /// A node identifier that is not registered in the completion graph.
    #[error("{0} is not a node of the completion graph")]
    UnknownNode(ClassId),

    /// Every `u32` identifier is already in use.
    #[error("No identifier is left to allocate")]
    IdentifiersExhausted,
}

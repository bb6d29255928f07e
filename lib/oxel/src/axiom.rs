//! Normalized axioms.
//!
//! The classifier only consumes axioms in normal form: every component is
//! an identifier, never a nested expression.

use crate::entity::{ClassId, IndividualId, ObjectPropertyId};
use std::fmt;

/// An axiom in normal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedAxiom {
    /// GCI0: `sub ⊑ super`
    Gci0 { sub: ClassId, sup: ClassId },

    /// GCI1: `left ⊓ right ⊑ super`
    Gci1 {
        left: ClassId,
        right: ClassId,
        sup: ClassId,
    },

    /// GCI2: `sub ⊑ ∃property.filler`
    Gci2 {
        sub: ClassId,
        property: ObjectPropertyId,
        filler: ClassId,
    },

    /// GCI3: `∃property.filler ⊑ super`
    Gci3 {
        property: ObjectPropertyId,
        filler: ClassId,
        sup: ClassId,
    },

    /// RI1: `ε ⊑ property`, i.e. the property is reflexive
    Ri1 { property: ObjectPropertyId },

    /// RI2: `sub ⊑ super`
    Ri2 {
        sub: ObjectPropertyId,
        sup: ObjectPropertyId,
    },

    /// RI3: `left ∘ right ⊑ super`
    Ri3 {
        left: ObjectPropertyId,
        right: ObjectPropertyId,
        sup: ObjectPropertyId,
    },

    /// `range(property) ⊑ range`
    Range {
        property: ObjectPropertyId,
        range: ClassId,
    },

    /// `class ≡ {individual}`
    Nominal {
        class: ClassId,
        individual: IndividualId,
    },

    /// The property has at most one filler per subject.
    Functional { property: ObjectPropertyId },

    /// `first ≡ second⁻`
    Inverse {
        first: ObjectPropertyId,
        second: ObjectPropertyId,
    },
}

impl NormalizedAxiom {
    /// The classes the axiom mentions.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> {
        let classes: [Option<ClassId>; 3] = match *self {
            Self::Gci0 { sub, sup } => [Some(sub), Some(sup), None],
            Self::Gci1 { left, right, sup } => [Some(left), Some(right), Some(sup)],
            Self::Gci2 { sub, filler, .. } => [Some(sub), Some(filler), None],
            Self::Gci3 { filler, sup, .. } => [Some(filler), Some(sup), None],
            Self::Range { range, .. } => [Some(range), None, None],
            Self::Nominal { class, .. } => [Some(class), None, None],
            Self::Ri1 { .. }
            | Self::Ri2 { .. }
            | Self::Ri3 { .. }
            | Self::Functional { .. }
            | Self::Inverse { .. } => [None, None, None],
        };
        classes.into_iter().flatten()
    }

    /// The object properties the axiom mentions.
    pub fn object_properties(&self) -> impl Iterator<Item = ObjectPropertyId> {
        let properties: [Option<ObjectPropertyId>; 3] = match *self {
            Self::Gci2 { property, .. }
            | Self::Gci3 { property, .. }
            | Self::Ri1 { property }
            | Self::Range { property, .. }
            | Self::Functional { property } => [Some(property), None, None],
            Self::Ri2 { sub, sup } => [Some(sub), Some(sup), None],
            Self::Ri3 { left, right, sup } => [Some(left), Some(right), Some(sup)],
            Self::Inverse { first, second } => [Some(first), Some(second), None],
            Self::Gci0 { .. } | Self::Gci1 { .. } | Self::Nominal { .. } => [None, None, None],
        };
        properties.into_iter().flatten()
    }
}

impl fmt::Display for NormalizedAxiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gci0 { sub, sup } => write!(f, "{sub} ⊑ {sup}"),
            Self::Gci1 { left, right, sup } => write!(f, "{left} ⊓ {right} ⊑ {sup}"),
            Self::Gci2 {
                sub,
                property,
                filler,
            } => write!(f, "{sub} ⊑ ∃{property}.{filler}"),
            Self::Gci3 {
                property,
                filler,
                sup,
            } => write!(f, "∃{property}.{filler} ⊑ {sup}"),
            Self::Ri1 { property } => write!(f, "ε ⊑ {property}"),
            Self::Ri2 { sub, sup } => write!(f, "{sub} ⊑ {sup}"),
            Self::Ri3 { left, right, sup } => write!(f, "{left} ∘ {right} ⊑ {sup}"),
            Self::Range { property, range } => write!(f, "range({property}) ⊑ {range}"),
            Self::Nominal { class, individual } => write!(f, "{class} ≡ {{{individual}}}"),
            Self::Functional { property } => write!(f, "functional({property})"),
            Self::Inverse { first, second } => write!(f, "{first} ≡ {second}⁻"),
        }
    }
}

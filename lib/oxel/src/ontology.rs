//! Read-only index of the normalized axioms.
//!
//! Each completion rule looks axioms up by the identifiers of the fact that
//! triggered it, so the axioms are grouped by those keys once and for all.

use crate::axiom::NormalizedAxiom;
use crate::entity::{ClassId, EntitySpace, IndividualId, ObjectPropertyId};
use crate::error::{ClassifierError, InvariantViolation};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Right-hand side of a GCI2 axiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Existential {
    pub property: ObjectPropertyId,
    pub filler: ClassId,
}

/// A GCI3 axiom `∃property.filler ⊑ sup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gci3 {
    pub property: ObjectPropertyId,
    pub filler: ClassId,
    pub sup: ClassId,
}

/// A RI3 axiom `left ∘ right ⊑ sup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chain {
    pub left: ObjectPropertyId,
    pub right: ObjectPropertyId,
    pub sup: ObjectPropertyId,
}

/// The normalized axioms indexed by the keys the completion rules use.
#[derive(Debug, Clone, Default)]
pub struct ExtendedOntology {
    classes: Vec<ClassId>,
    object_properties: Vec<ObjectPropertyId>,
    gci0_by_sub: FxHashMap<ClassId, Vec<ClassId>>,
    /// `left -> [(right, sup)]`, registered under both operands.
    gci1_by_operand: FxHashMap<ClassId, Vec<(ClassId, ClassId)>>,
    gci2_by_sub: FxHashMap<ClassId, Vec<Existential>>,
    gci3_by_property_filler: FxHashMap<(ObjectPropertyId, ClassId), Vec<ClassId>>,
    gci3_by_filler: FxHashMap<ClassId, Vec<Gci3>>,
    gci3_by_property: FxHashMap<ObjectPropertyId, Vec<Gci3>>,
    ri2_by_sub: FxHashMap<ObjectPropertyId, Vec<ObjectPropertyId>>,
    ri3_by_left: FxHashMap<ObjectPropertyId, Vec<Chain>>,
    ri3_by_right: FxHashMap<ObjectPropertyId, Vec<Chain>>,
    reflexive: FxHashSet<ObjectPropertyId>,
    functional: FxHashSet<ObjectPropertyId>,
    ranges: FxHashMap<ObjectPropertyId, Vec<ClassId>>,
    inverses: FxHashMap<ObjectPropertyId, ObjectPropertyId>,
    nominals: FxHashMap<IndividualId, ClassId>,
    axiom_count: usize,
}

impl ExtendedOntology {
    /// Indexes the given axioms.
    ///
    /// Fails if an axiom mentions an identifier unknown to `entities` or if
    /// the inverse declarations are not involutive.
    pub fn new(
        entities: &EntitySpace,
        axioms: impl IntoIterator<Item = NormalizedAxiom>,
    ) -> Result<Self, ClassifierError> {
        if entities.generator().is_exhausted() {
            return Err(InvariantViolation::IdentifiersExhausted.into());
        }
        let mut ontology = Self {
            classes: entities.classes().collect(),
            object_properties: entities.object_properties().collect(),
            ..Self::default()
        };
        for axiom in axioms {
            ontology.add(entities, axiom)?;
        }
        for list in ontology.gci1_by_operand.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        debug!(
            axioms = ontology.axiom_count,
            classes = ontology.classes.len(),
            object_properties = ontology.object_properties.len(),
            "extended ontology built"
        );
        Ok(ontology)
    }

    fn add(&mut self, entities: &EntitySpace, axiom: NormalizedAxiom) -> Result<(), ClassifierError> {
        for class in axiom.classes() {
            if !entities.contains_class(class) {
                return Err(InvariantViolation::UnknownClass(class).into());
            }
        }
        for property in axiom.object_properties() {
            if !entities.contains_object_property(property) {
                return Err(InvariantViolation::UnknownObjectProperty(property).into());
            }
        }
        self.axiom_count += 1;
        match axiom {
            NormalizedAxiom::Gci0 { sub, sup } => {
                self.gci0_by_sub.entry(sub).or_default().push(sup);
            }
            NormalizedAxiom::Gci1 { left, right, sup } => {
                self.gci1_by_operand
                    .entry(left)
                    .or_default()
                    .push((right, sup));
                if left != right {
                    self.gci1_by_operand
                        .entry(right)
                        .or_default()
                        .push((left, sup));
                }
            }
            NormalizedAxiom::Gci2 {
                sub,
                property,
                filler,
            } => {
                self.gci2_by_sub
                    .entry(sub)
                    .or_default()
                    .push(Existential { property, filler });
            }
            NormalizedAxiom::Gci3 {
                property,
                filler,
                sup,
            } => {
                let gci3 = Gci3 {
                    property,
                    filler,
                    sup,
                };
                self.gci3_by_property_filler
                    .entry((property, filler))
                    .or_default()
                    .push(sup);
                self.gci3_by_filler.entry(filler).or_default().push(gci3);
                self.gci3_by_property.entry(property).or_default().push(gci3);
            }
            NormalizedAxiom::Ri1 { property } => {
                self.reflexive.insert(property);
            }
            NormalizedAxiom::Ri2 { sub, sup } => {
                self.ri2_by_sub.entry(sub).or_default().push(sup);
            }
            NormalizedAxiom::Ri3 { left, right, sup } => {
                let chain = Chain { left, right, sup };
                self.ri3_by_left.entry(left).or_default().push(chain);
                self.ri3_by_right.entry(right).or_default().push(chain);
            }
            NormalizedAxiom::Range { property, range } => {
                self.ranges.entry(property).or_default().push(range);
            }
            NormalizedAxiom::Nominal { class, individual } => {
                if !entities.contains_individual(individual) {
                    return Err(InvariantViolation::UnknownIndividual(individual).into());
                }
                self.nominals.insert(individual, class);
            }
            NormalizedAxiom::Functional { property } => {
                self.functional.insert(property);
            }
            NormalizedAxiom::Inverse { first, second } => {
                self.add_inverse(first, second)?;
                self.add_inverse(second, first)?;
            }
        }
        Ok(())
    }

    fn add_inverse(
        &mut self,
        property: ObjectPropertyId,
        inverse: ObjectPropertyId,
    ) -> Result<(), InvariantViolation> {
        match self.inverses.get(&property) {
            Some(existing) if *existing != inverse => Err(InvariantViolation::ConflictingInverse {
                property,
                first: *existing,
                second: inverse,
            }),
            _ => {
                self.inverses.insert(property, inverse);
                Ok(())
            }
        }
    }

    /// The number of indexed axioms.
    pub fn axiom_count(&self) -> usize {
        self.axiom_count
    }

    /// Every class of the identifier space at construction time.
    pub fn classes(&self) -> &[ClassId] {
        &self.classes
    }

    /// Every object property of the identifier space at construction time.
    pub fn object_properties(&self) -> &[ObjectPropertyId] {
        &self.object_properties
    }

    /// `B` such that `sub ⊑ B`.
    pub fn gci0_by_sub(&self, sub: ClassId) -> &[ClassId] {
        self.gci0_by_sub.get(&sub).map_or(&[], Vec::as_slice)
    }

    /// `(A', B)` such that `operand ⊓ A' ⊑ B`.
    pub fn gci1_by_operand(&self, operand: ClassId) -> &[(ClassId, ClassId)] {
        self.gci1_by_operand.get(&operand).map_or(&[], Vec::as_slice)
    }

    /// `∃r.B` such that `sub ⊑ ∃r.B`.
    pub fn gci2_by_sub(&self, sub: ClassId) -> &[Existential] {
        self.gci2_by_sub.get(&sub).map_or(&[], Vec::as_slice)
    }

    /// `B` such that `∃property.filler ⊑ B`.
    pub fn gci3_by_property_filler(
        &self,
        property: ObjectPropertyId,
        filler: ClassId,
    ) -> &[ClassId] {
        self.gci3_by_property_filler
            .get(&(property, filler))
            .map_or(&[], Vec::as_slice)
    }

    /// GCI3 axioms whose existential has the given filler.
    pub fn gci3_by_filler(&self, filler: ClassId) -> &[Gci3] {
        self.gci3_by_filler.get(&filler).map_or(&[], Vec::as_slice)
    }

    /// GCI3 axioms whose existential uses the given property.
    pub fn gci3_by_property(&self, property: ObjectPropertyId) -> &[Gci3] {
        self.gci3_by_property
            .get(&property)
            .map_or(&[], Vec::as_slice)
    }

    /// Told super properties of `sub`.
    pub fn ri2_by_sub(&self, sub: ObjectPropertyId) -> &[ObjectPropertyId] {
        self.ri2_by_sub.get(&sub).map_or(&[], Vec::as_slice)
    }

    /// Chains `left ∘ s ⊑ t`.
    pub fn ri3_by_left(&self, left: ObjectPropertyId) -> &[Chain] {
        self.ri3_by_left.get(&left).map_or(&[], Vec::as_slice)
    }

    /// Chains `r ∘ right ⊑ t`.
    pub fn ri3_by_right(&self, right: ObjectPropertyId) -> &[Chain] {
        self.ri3_by_right.get(&right).map_or(&[], Vec::as_slice)
    }

    /// All chain axioms.
    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.ri3_by_left.values().flatten()
    }

    /// Properties declared reflexive.
    pub fn reflexive_object_properties(&self) -> &FxHashSet<ObjectPropertyId> {
        &self.reflexive
    }

    /// Properties declared functional.
    pub fn functional_object_properties(&self) -> &FxHashSet<ObjectPropertyId> {
        &self.functional
    }

    /// Declared range classes of the property.
    pub fn ranges(&self, property: ObjectPropertyId) -> &[ClassId] {
        self.ranges.get(&property).map_or(&[], Vec::as_slice)
    }

    /// Declared inverse of the property.
    pub fn inverse_of(&self, property: ObjectPropertyId) -> Option<ObjectPropertyId> {
        self.inverses.get(&property).copied()
    }

    /// The auxiliary class bridging the individual.
    pub fn nominal_class(&self, individual: IndividualId) -> Option<ClassId> {
        self.nominals.get(&individual).copied()
    }

    /// `(individual, class)` pairs of the nominal axioms.
    pub fn nominals(&self) -> impl Iterator<Item = (IndividualId, ClassId)> + '_ {
        self.nominals.iter().map(|(i, c)| (*i, *c))
    }
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use oxrdf::NamedNodeRef;

    fn entities() -> Result<(EntitySpace, [ClassId; 3], [ObjectPropertyId; 2]), Box<dyn std::error::Error>>
    {
        let mut entities = EntitySpace::new();
        let a = entities.class(NamedNodeRef::new("http://example.org/A")?);
        let b = entities.class(NamedNodeRef::new("http://example.org/B")?);
        let c = entities.class(NamedNodeRef::new("http://example.org/C")?);
        let r = entities.object_property(NamedNodeRef::new("http://example.org/r")?);
        let s = entities.object_property(NamedNodeRef::new("http://example.org/s")?);
        Ok((entities, [a, b, c], [r, s]))
    }

    #[test]
    fn indexes_by_trigger() -> Result<(), Box<dyn std::error::Error>> {
        let (entities, [a, b, c], [r, s]) = entities()?;
        let ontology = ExtendedOntology::new(
            &entities,
            [
                NormalizedAxiom::Gci0 { sub: a, sup: b },
                NormalizedAxiom::Gci1 {
                    left: a,
                    right: b,
                    sup: c,
                },
                NormalizedAxiom::Gci2 {
                    sub: a,
                    property: r,
                    filler: b,
                },
                NormalizedAxiom::Gci3 {
                    property: r,
                    filler: b,
                    sup: c,
                },
                NormalizedAxiom::Ri3 {
                    left: r,
                    right: s,
                    sup: s,
                },
                NormalizedAxiom::Functional { property: s },
            ],
        )?;
        assert_eq!(ontology.gci0_by_sub(a), [b]);
        assert_eq!(ontology.gci1_by_operand(a), [(b, c)]);
        assert_eq!(ontology.gci1_by_operand(b), [(a, c)]);
        assert_eq!(
            ontology.gci2_by_sub(a),
            [Existential {
                property: r,
                filler: b
            }]
        );
        assert_eq!(ontology.gci3_by_property_filler(r, b), [c]);
        assert_eq!(ontology.gci3_by_filler(b).len(), 1);
        assert_eq!(ontology.gci3_by_property(r).len(), 1);
        assert!(ontology.gci3_by_property_filler(s, b).is_empty());
        assert_eq!(ontology.ri3_by_left(r).len(), 1);
        assert_eq!(ontology.ri3_by_right(s).len(), 1);
        assert!(ontology.functional_object_properties().contains(&s));
        assert!(!ontology.functional_object_properties().contains(&r));
        assert_eq!(ontology.axiom_count(), 6);
        Ok(())
    }

    #[test]
    fn rejects_unknown_identifiers() -> Result<(), Box<dyn std::error::Error>> {
        let (entities, [a, ..], _) = entities()?;
        let result = ExtendedOntology::new(
            &entities,
            [NormalizedAxiom::Gci0 {
                sub: a,
                sup: ClassId::new(9999),
            }],
        );
        assert!(matches!(
            result,
            Err(ClassifierError::Invariant(InvariantViolation::UnknownClass(_)))
        ));
        let result = ExtendedOntology::new(
            &entities,
            [NormalizedAxiom::Functional {
                property: ObjectPropertyId::new(9999),
            }],
        );
        assert!(matches!(
            result,
            Err(ClassifierError::Invariant(
                InvariantViolation::UnknownObjectProperty(_)
            ))
        ));
        Ok(())
    }

    #[test]
    fn inverse_map_is_involutive() -> Result<(), Box<dyn std::error::Error>> {
        let (entities, _, [r, s]) = entities()?;
        let ontology =
            ExtendedOntology::new(&entities, [NormalizedAxiom::Inverse { first: r, second: s }])?;
        assert_eq!(ontology.inverse_of(r), Some(s));
        assert_eq!(ontology.inverse_of(s), Some(r));

        let result = ExtendedOntology::new(
            &entities,
            [
                NormalizedAxiom::Inverse { first: r, second: s },
                NormalizedAxiom::Inverse { first: r, second: r },
            ],
        );
        assert!(matches!(
            result,
            Err(ClassifierError::Invariant(
                InvariantViolation::ConflictingInverse { .. }
            ))
        ));
        Ok(())
    }
}

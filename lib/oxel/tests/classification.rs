#![expect(clippy::panic_in_result_fn)]

use oxel::{
    CancellationToken, ClassId, ClassificationOutcome, ClassifierConfig, ClassifierError,
    EntitySpace, ExtendedOntology, IndividualId, NormalizedAxiom, ObjectPropertyId,
    RuleProcessor,
};
use oxrdf::NamedNode;

type Result<T = ()> = std::result::Result<T, ClassifierError>;

#[derive(Default)]
struct Vocabulary {
    entities: EntitySpace,
}

impl Vocabulary {
    fn classes<const N: usize>(&mut self, names: [&str; N]) -> [ClassId; N] {
        names.map(|name| self.entities.class(iri(name).as_ref()))
    }

    fn properties<const N: usize>(&mut self, names: [&str; N]) -> [ObjectPropertyId; N] {
        names.map(|name| self.entities.object_property(iri(name).as_ref()))
    }

    /// The individual and its nominal class.
    fn individual(&mut self, name: &str) -> (IndividualId, ClassId) {
        let individual = self.entities.individual(iri(name).as_ref());
        (individual, self.entities.nominal_class(individual))
    }

    fn classify(
        &self,
        axioms: impl IntoIterator<Item = NormalizedAxiom>,
    ) -> Result<RuleProcessor> {
        let ontology = ExtendedOntology::new(&self.entities, axioms)?;
        let mut processor =
            RuleProcessor::new(ontology, &self.entities, ClassifierConfig::default());
        assert_eq!(
            processor.classify(&CancellationToken::new())?,
            ClassificationOutcome::Complete
        );
        Ok(processor)
    }
}

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.org/{name}"))
}

#[test]
fn inverse_existential_reaches_back() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d] = vocabulary.classes(["A", "B", "C", "D"]);
    let [r, r_inverse] = vocabulary.properties(["r", "rInverse"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Inverse {
            first: r_inverse,
            second: r,
        },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Gci3 {
            property: r_inverse,
            filler: a,
            sup: c,
        },
        NormalizedAxiom::Gci3 {
            property: r,
            filler: c,
            sup: d,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&d));
    // B is only a C when it is reached from an A
    assert!(!processor.subsumers(b)?.contains(&c));
    Ok(())
}

#[test]
fn disjoint_super_classes_make_unsatisfiable() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [x, y, z] = vocabulary.classes(["X", "Y", "Z"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Gci1 {
            left: x,
            right: y,
            sup: ClassId::BOTTOM,
        },
        NormalizedAxiom::Gci0 { sub: z, sup: x },
        NormalizedAxiom::Gci0 { sub: z, sup: y },
    ])?;
    assert!(processor.subsumers(z)?.contains(&ClassId::BOTTOM));
    assert!(!processor.is_satisfiable(z)?);
    assert!(processor.is_satisfiable(x)?);
    assert!(processor.is_consistent()?);
    let hierarchy = processor.hierarchy()?;
    assert_eq!(hierarchy.unsatisfiable_classes(), [z]);
    assert_eq!(hierarchy.equivalent_classes(z)?, [ClassId::BOTTOM]);
    Ok(())
}

#[test]
fn told_subsumers_are_derived() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d, e] = vocabulary.classes(["A", "B", "C", "D", "E"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Gci0 { sub: a, sup: b },
        NormalizedAxiom::Gci0 { sub: b, sup: c },
        NormalizedAxiom::Gci0 { sub: a, sup: d },
        NormalizedAxiom::Gci1 {
            left: c,
            right: d,
            sup: e,
        },
    ])?;
    assert_eq!(
        processor.subsumers(a)?,
        [ClassId::TOP, a, b, c, d, e]
    );
    assert_eq!(processor.subsumers(b)?, [ClassId::TOP, b, c]);
    let hierarchy = processor.hierarchy()?;
    assert_eq!(hierarchy.super_classes(a, true)?, [b, d, e]);
    assert_eq!(hierarchy.sub_classes(c, true)?, [b]);
    Ok(())
}

#[test]
fn unsatisfiability_propagates_to_predecessors() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c] = vocabulary.classes(["A", "B", "C"]);
    let [r, s] = vocabulary.properties(["r", "s"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Gci0 {
            sub: b,
            sup: ClassId::BOTTOM,
        },
        NormalizedAxiom::Gci2 {
            sub: c,
            property: s,
            filler: a,
        },
    ])?;
    for class in [a, b, c] {
        assert!(!processor.is_satisfiable(class)?, "{class} is satisfiable");
    }
    assert!(processor.is_consistent()?);
    Ok(())
}

#[test]
fn sub_property_edges_feed_super_property_restrictions() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c] = vocabulary.classes(["A", "B", "C"]);
    let [r, s] = vocabulary.properties(["r", "s"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Ri2 { sub: r, sup: s },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Gci3 {
            property: s,
            filler: b,
            sup: c,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&c));
    assert_eq!(
        processor.object_property_subsumers(r)?,
        [ObjectPropertyId::TOP, r, s]
    );
    assert_eq!(
        processor.object_property_subsumers(s)?,
        [ObjectPropertyId::TOP, s]
    );
    Ok(())
}

#[test]
fn transitive_property_chains() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d] = vocabulary.classes(["A", "B", "C", "D"]);
    let [part_of] = vocabulary.properties(["partOf"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Ri3 {
            left: part_of,
            right: part_of,
            sup: part_of,
        },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: part_of,
            filler: b,
        },
        NormalizedAxiom::Gci2 {
            sub: b,
            property: part_of,
            filler: c,
        },
        NormalizedAxiom::Gci3 {
            property: part_of,
            filler: c,
            sup: d,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&d));
    assert!(processor.subsumers(b)?.contains(&d));
    assert!(!processor.subsumers(c)?.contains(&d));
    Ok(())
}

#[test]
fn range_applies_to_successors_only() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d] = vocabulary.classes(["A", "B", "C", "D"]);
    let [r] = vocabulary.properties(["r"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Range {
            property: r,
            range: c,
        },
        NormalizedAxiom::Gci3 {
            property: r,
            filler: c,
            sup: d,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&d));
    assert!(!processor.subsumers(b)?.contains(&c));
    Ok(())
}

#[test]
fn functional_property_merges_successors() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, e, f] = vocabulary.classes(["A", "B", "C", "E", "F"]);
    let [r] = vocabulary.properties(["r"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Functional { property: r },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: c,
        },
        NormalizedAxiom::Gci1 {
            left: b,
            right: c,
            sup: e,
        },
        NormalizedAxiom::Gci3 {
            property: r,
            filler: e,
            sup: f,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&f));
    assert!(!processor.subsumers(b)?.contains(&e));
    Ok(())
}

#[test]
fn functional_super_property_merges_sub_property_successors() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d, e] = vocabulary.classes(["A", "B", "C", "D", "E"]);
    let [f, r1, r2] = vocabulary.properties(["f", "r1", "r2"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Functional { property: f },
        NormalizedAxiom::Ri2 { sub: r1, sup: f },
        NormalizedAxiom::Ri2 { sub: r2, sup: f },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r1,
            filler: b,
        },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r2,
            filler: c,
        },
        NormalizedAxiom::Gci1 {
            left: b,
            right: c,
            sup: d,
        },
        NormalizedAxiom::Gci3 {
            property: r1,
            filler: d,
            sup: e,
        },
    ])?;
    // the single f-successor of an A is both an r1 and an r2-successor
    assert!(processor.subsumers(a)?.contains(&e));
    assert!(!processor.subsumers(b)?.contains(&d));
    assert!(!processor.subsumers(c)?.contains(&d));
    Ok(())
}

#[test]
fn range_of_the_inverse_applies_to_the_predecessor() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, d, e] = vocabulary.classes(["A", "B", "C", "D", "E"]);
    let [r, r_inverse, s, s_inverse] = vocabulary.properties(["r", "rInverse", "s", "sInverse"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Inverse {
            first: r_inverse,
            second: r,
        },
        NormalizedAxiom::Range {
            property: r_inverse,
            range: c,
        },
        NormalizedAxiom::Gci2 {
            sub: a,
            property: r,
            filler: b,
        },
        // the range of the inverse of a super property is inherited
        NormalizedAxiom::Inverse {
            first: s,
            second: s_inverse,
        },
        NormalizedAxiom::Ri2 { sub: r, sup: s },
        NormalizedAxiom::Range {
            property: s_inverse,
            range: e,
        },
        NormalizedAxiom::Gci2 {
            sub: d,
            property: r,
            filler: b,
        },
    ])?;
    let subsumers = processor.subsumers(a)?;
    assert!(subsumers.contains(&c));
    assert!(subsumers.contains(&e));
    assert!(processor.subsumers(d)?.contains(&c));
    assert!(!processor.subsumers(b)?.contains(&c));
    assert!(!processor.subsumers(b)?.contains(&e));
    Ok(())
}

#[test]
fn reflexive_property_applies_to_the_node_itself() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a, b, c, e] = vocabulary.classes(["A", "B", "C", "E"]);
    let [r, s, t] = vocabulary.properties(["r", "s", "t"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Ri1 { property: r },
        NormalizedAxiom::Gci3 {
            property: r,
            filler: a,
            sup: b,
        },
        NormalizedAxiom::Ri3 {
            left: r,
            right: s,
            sup: t,
        },
        NormalizedAxiom::Gci2 {
            sub: c,
            property: s,
            filler: a,
        },
        NormalizedAxiom::Gci3 {
            property: t,
            filler: a,
            sup: e,
        },
    ])?;
    assert!(processor.subsumers(a)?.contains(&b));
    assert!(processor.subsumers(c)?.contains(&e));
    Ok(())
}

#[test]
fn nominal_reached_from_an_individual_shares_its_subsumers() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [b, d] = vocabulary.classes(["B", "D"]);
    let [r] = vocabulary.properties(["r"]);
    let (a, a_nominal) = vocabulary.individual("a");
    let (other, other_nominal) = vocabulary.individual("b");
    let processor = vocabulary.classify([
        NormalizedAxiom::Nominal {
            class: a_nominal,
            individual: a,
        },
        NormalizedAxiom::Nominal {
            class: other_nominal,
            individual: other,
        },
        NormalizedAxiom::Gci2 {
            sub: a_nominal,
            property: r,
            filler: b,
        },
        NormalizedAxiom::Gci0 {
            sub: b,
            sup: other_nominal,
        },
        NormalizedAxiom::Gci0 { sub: b, sup: d },
    ])?;
    assert_eq!(processor.types(other)?, [ClassId::TOP, b, d]);
    assert_eq!(processor.direct_types(other)?, [b]);
    assert_eq!(processor.types(a)?, [ClassId::TOP]);
    assert!(processor.is_consistent()?);
    Ok(())
}

#[test]
fn unsatisfiable_nominal_makes_the_ontology_inconsistent() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [x, y] = vocabulary.classes(["X", "Y"]);
    let (a, nominal) = vocabulary.individual("a");
    let processor = vocabulary.classify([
        NormalizedAxiom::Nominal {
            class: nominal,
            individual: a,
        },
        NormalizedAxiom::Gci0 {
            sub: nominal,
            sup: x,
        },
        NormalizedAxiom::Gci0 {
            sub: nominal,
            sup: y,
        },
        NormalizedAxiom::Gci1 {
            left: x,
            right: y,
            sup: ClassId::BOTTOM,
        },
    ])?;
    assert!(!processor.is_consistent()?);
    assert!(!processor.is_satisfiable(x)?);
    Ok(())
}

#[test]
fn unknown_identifiers_are_invariant_violations() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [a] = vocabulary.classes(["A"]);
    let processor = vocabulary.classify([])?;
    assert!(matches!(
        processor.subsumers(ClassId::new(9999)),
        Err(ClassifierError::Invariant(_))
    ));
    assert!(matches!(
        processor.types(IndividualId::new(9999)),
        Err(ClassifierError::Invariant(_))
    ));
    assert!(matches!(
        processor.object_property_subsumers(ObjectPropertyId::new(9999)),
        Err(ClassifierError::Invariant(_))
    ));
    assert!(
        ExtendedOntology::new(
            &vocabulary.entities,
            [NormalizedAxiom::Gci0 {
                sub: a,
                sup: ClassId::new(9999)
            }]
        )
        .is_err()
    );
    Ok(())
}

#[test]
fn inverse_is_involutive() -> Result {
    let mut vocabulary = Vocabulary::default();
    let [r, s, t] = vocabulary.properties(["r", "s", "t"]);
    let processor = vocabulary.classify([
        NormalizedAxiom::Inverse { first: r, second: s },
        NormalizedAxiom::Ri2 { sub: t, sup: r },
    ])?;
    let status = processor.status();
    for &property in status.properties().object_properties() {
        let inverse = status.inverse_object_property_of(property)?;
        assert_eq!(status.inverse_object_property_of(inverse)?, property);
    }
    assert_eq!(status.inverse_object_property_of(r)?, s);
    let t_inverse = status.inverse_object_property_of(t)?;
    assert!(status.super_object_properties(t_inverse).contains(&s));
    Ok(())
}

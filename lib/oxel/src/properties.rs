//! Closure of the object property hierarchy.

use crate::entity::{ClassId, IdGenerator, ObjectPropertyId};
use crate::error::{ClassifierError, InvariantViolation};
use crate::ontology::ExtendedOntology;
use rustc_hash::{FxHashMap, FxHashSet};

/// Sub/super property closure, inverses, reflexivity and ranges.
///
/// Every property has an inverse: the ones without a declared inverse get an
/// auxiliary one, so that `inverse(inverse(r)) == r` holds for all `r`.
#[derive(Debug, Clone, Default)]
pub struct PropertyHierarchy {
    /// Properties of the ontology followed by the minted inverses.
    properties: Vec<ObjectPropertyId>,
    minted: FxHashSet<ObjectPropertyId>,
    inverses: FxHashMap<ObjectPropertyId, ObjectPropertyId>,
    supers: FxHashMap<ObjectPropertyId, Vec<ObjectPropertyId>>,
    subs: FxHashMap<ObjectPropertyId, Vec<ObjectPropertyId>>,
    reflexive: FxHashSet<ObjectPropertyId>,
    functional: FxHashSet<ObjectPropertyId>,
    ranges: FxHashMap<ObjectPropertyId, Vec<ClassId>>,
}

impl PropertyHierarchy {
    pub fn new(ontology: &ExtendedOntology, generator: &mut IdGenerator) -> Self {
        let mut hierarchy = Self {
            properties: ontology.object_properties().to_vec(),
            functional: ontology.functional_object_properties().clone(),
            ..Self::default()
        };
        hierarchy.complete_inverses(ontology, generator);

        let mut told = FxHashMap::<ObjectPropertyId, FxHashSet<ObjectPropertyId>>::default();
        for &property in &hierarchy.properties {
            for &sup in ontology.ri2_by_sub(property) {
                hierarchy.add_told(&mut told, property, sup);
            }
        }
        // Reflexivity and chains feed each other: r ∘ s ⊑ t with r reflexive
        // yields s ⊑ t, which may make t reflexive in turn.
        loop {
            hierarchy.close(&told);
            hierarchy.close_reflexive(ontology);
            let mut changed = false;
            for chain in ontology.chains() {
                if hierarchy.reflexive.contains(&chain.left) {
                    changed |= hierarchy.add_told(&mut told, chain.right, chain.sup);
                }
                if hierarchy.reflexive.contains(&chain.right) {
                    changed |= hierarchy.add_told(&mut told, chain.left, chain.sup);
                }
            }
            if !changed {
                break;
            }
        }

        for &property in &hierarchy.properties {
            let mut ranges = hierarchy.supers[&property]
                .iter()
                .flat_map(|sup| ontology.ranges(*sup).iter().copied())
                .collect::<Vec<_>>();
            if !ranges.is_empty() {
                ranges.sort_unstable();
                ranges.dedup();
                hierarchy.ranges.insert(property, ranges);
            }
        }
        hierarchy
    }

    fn complete_inverses(&mut self, ontology: &ExtendedOntology, generator: &mut IdGenerator) {
        let declared = self.properties.clone();
        for property in declared {
            if self.inverses.contains_key(&property) {
                continue;
            }
            let inverse = if let Some(inverse) = ontology.inverse_of(property) {
                inverse
            } else if property == ObjectPropertyId::TOP || property == ObjectPropertyId::BOTTOM {
                property
            } else {
                let inverse = generator.next_object_property();
                self.minted.insert(inverse);
                self.properties.push(inverse);
                inverse
            };
            self.inverses.insert(property, inverse);
            self.inverses.insert(inverse, property);
        }
    }

    /// Adds `sub ⊑ sup` and `sub⁻ ⊑ sup⁻`.
    fn add_told(
        &self,
        told: &mut FxHashMap<ObjectPropertyId, FxHashSet<ObjectPropertyId>>,
        sub: ObjectPropertyId,
        sup: ObjectPropertyId,
    ) -> bool {
        let direct = told.entry(sub).or_default().insert(sup);
        let inverse = told
            .entry(self.inverses[&sub])
            .or_default()
            .insert(self.inverses[&sup]);
        direct || inverse
    }

    fn close(&mut self, told: &FxHashMap<ObjectPropertyId, FxHashSet<ObjectPropertyId>>) {
        self.supers.clear();
        self.subs.clear();
        for &property in &self.properties {
            let mut reached = FxHashSet::default();
            let mut stack = vec![property];
            while let Some(current) = stack.pop() {
                if reached.insert(current) {
                    if let Some(next) = told.get(&current) {
                        stack.extend(next.iter().copied());
                    }
                }
            }
            let mut supers = reached.into_iter().collect::<Vec<_>>();
            supers.sort_unstable();
            for &sup in &supers {
                self.subs.entry(sup).or_default().push(property);
            }
            self.supers.insert(property, supers);
        }
        for subs in self.subs.values_mut() {
            subs.sort_unstable();
        }
    }

    fn close_reflexive(&mut self, ontology: &ExtendedOntology) {
        for &property in ontology.reflexive_object_properties() {
            for &sup in &self.supers[&property] {
                self.reflexive.insert(sup);
                self.reflexive.insert(self.inverses[&sup]);
            }
        }
    }

    /// The inverse of `property`.
    pub fn inverse_of(
        &self,
        property: ObjectPropertyId,
    ) -> Result<ObjectPropertyId, ClassifierError> {
        self.inverses
            .get(&property)
            .copied()
            .ok_or_else(|| InvariantViolation::UnknownObjectProperty(property).into())
    }

    /// Properties `s` with `property ⊑ s`, `property` included.
    pub fn super_object_properties(&self, property: ObjectPropertyId) -> &[ObjectPropertyId] {
        self.supers.get(&property).map_or(&[], Vec::as_slice)
    }

    /// Properties `r` with `r ⊑ property`, `property` included.
    pub fn sub_object_properties(&self, property: ObjectPropertyId) -> &[ObjectPropertyId] {
        self.subs.get(&property).map_or(&[], Vec::as_slice)
    }

    pub fn is_subproperty(&self, sub: ObjectPropertyId, sup: ObjectPropertyId) -> bool {
        self.super_object_properties(sub).binary_search(&sup).is_ok()
    }

    pub fn is_reflexive(&self, property: ObjectPropertyId) -> bool {
        self.reflexive.contains(&property)
    }

    pub fn is_functional(&self, property: ObjectPropertyId) -> bool {
        self.functional.contains(&property)
    }

    /// Range classes of the property and of all its super properties.
    pub fn ranges(&self, property: ObjectPropertyId) -> &[ClassId] {
        self.ranges.get(&property).map_or(&[], Vec::as_slice)
    }

    /// `true` for the inverses created because none was declared.
    pub fn is_minted(&self, property: ObjectPropertyId) -> bool {
        self.minted.contains(&property)
    }

    pub fn contains(&self, property: ObjectPropertyId) -> bool {
        self.inverses.contains_key(&property)
    }

    /// All properties, minted inverses included.
    pub fn object_properties(&self) -> &[ObjectPropertyId] {
        &self.properties
    }
}

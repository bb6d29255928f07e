//! Taxonomy of the named classes.

use crate::entity::ClassId;
use crate::error::{ClassifierError, InvariantViolation};
use rustc_hash::{FxHashMap, FxHashSet};

/// Subsumptions between named classes, ⊤ and ⊥ included.
///
/// Unsatisfiable classes are equivalent to ⊥. Every list returned is sorted.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    classes: Vec<ClassId>,
    /// Reflexive super classes.
    supers: FxHashMap<ClassId, FxHashSet<ClassId>>,
    /// Reflexive sub classes.
    subs: FxHashMap<ClassId, FxHashSet<ClassId>>,
}

impl ClassHierarchy {
    /// Builds the hierarchy of `classes` from the subsumers of each class.
    pub fn new(classes: &[ClassId], mut subsumers: impl FnMut(ClassId) -> Vec<ClassId>) -> Self {
        let mut classes = classes.to_vec();
        classes.extend([ClassId::BOTTOM, ClassId::TOP]);
        classes.sort_unstable();
        classes.dedup();
        let known = classes.iter().copied().collect::<FxHashSet<_>>();

        let mut supers = FxHashMap::<ClassId, FxHashSet<ClassId>>::default();
        for &class in &classes {
            let found = subsumers(class);
            let sups = if class == ClassId::BOTTOM || found.contains(&ClassId::BOTTOM) {
                known.clone()
            } else {
                found
                    .into_iter()
                    .filter(|sup| known.contains(sup))
                    .chain([class, ClassId::TOP])
                    .collect()
            };
            supers.insert(class, sups);
        }
        let mut subs = FxHashMap::<ClassId, FxHashSet<ClassId>>::default();
        for (&class, sups) in &supers {
            for &sup in sups {
                subs.entry(sup).or_default().insert(class);
            }
        }
        Self {
            classes,
            supers,
            subs,
        }
    }

    fn related(
        relation: &FxHashMap<ClassId, FxHashSet<ClassId>>,
        class: ClassId,
    ) -> Result<&FxHashSet<ClassId>, ClassifierError> {
        relation
            .get(&class)
            .ok_or_else(|| InvariantViolation::UnknownClass(class).into())
    }

    fn is_subsumed(&self, sub: ClassId, sup: ClassId) -> bool {
        self.supers.get(&sub).is_some_and(|sups| sups.contains(&sup))
    }

    fn is_equivalent(&self, left: ClassId, right: ClassId) -> bool {
        self.is_subsumed(left, right) && self.is_subsumed(right, left)
    }

    /// Strict members of `relation(class)`, only the closest ones if `direct`.
    ///
    /// `closer(candidate, other)` must be `true` if `other` lies between
    /// `class` and `candidate`.
    fn strict(
        &self,
        relation: &FxHashMap<ClassId, FxHashSet<ClassId>>,
        class: ClassId,
        direct: bool,
        closer: impl Fn(ClassId, ClassId) -> bool,
    ) -> Result<Vec<ClassId>, ClassifierError> {
        let candidates = Self::related(relation, class)?
            .iter()
            .copied()
            .filter(|other| !self.is_equivalent(class, *other))
            .collect::<Vec<_>>();
        let mut result = candidates
            .iter()
            .copied()
            .filter(|candidate| {
                !direct
                    || !candidates.iter().any(|other| {
                        !self.is_equivalent(*other, *candidate) && closer(*candidate, *other)
                    })
            })
            .collect::<Vec<_>>();
        result.sort_unstable();
        Ok(result)
    }

    /// Classes strictly subsuming `class`.
    pub fn super_classes(&self, class: ClassId, direct: bool) -> Result<Vec<ClassId>, ClassifierError> {
        // a super class is not direct if another super class lies below it
        self.strict(&self.supers, class, direct, |candidate, other| {
            self.is_subsumed(other, candidate)
        })
    }

    /// Classes strictly subsumed by `class`.
    pub fn sub_classes(&self, class: ClassId, direct: bool) -> Result<Vec<ClassId>, ClassifierError> {
        self.strict(&self.subs, class, direct, |candidate, other| {
            self.is_subsumed(candidate, other)
        })
    }

    /// Classes equivalent to `class`, `class` itself excluded.
    pub fn equivalent_classes(&self, class: ClassId) -> Result<Vec<ClassId>, ClassifierError> {
        let mut result = Self::related(&self.supers, class)?
            .iter()
            .copied()
            .filter(|other| *other != class && self.is_subsumed(*other, class))
            .collect::<Vec<_>>();
        result.sort_unstable();
        Ok(result)
    }

    /// Named classes equivalent to ⊥.
    pub fn unsatisfiable_classes(&self) -> Vec<ClassId> {
        self.classes
            .iter()
            .copied()
            .filter(|class| *class != ClassId::BOTTOM && self.is_subsumed(*class, ClassId::BOTTOM))
            .collect()
    }

    /// Every non trivial `(sub, super)` pair: reflexive pairs, pairs with a ⊤
    /// super class and pairs with a ⊥ sub class are left out.
    pub fn subsumptions(&self) -> Vec<(ClassId, ClassId)> {
        let mut result = Vec::new();
        for &sub in &self.classes {
            if sub == ClassId::BOTTOM {
                continue;
            }
            let mut sups = self.supers[&sub]
                .iter()
                .copied()
                .filter(|sup| *sup != sub && *sup != ClassId::TOP)
                .collect::<Vec<_>>();
            sups.sort_unstable();
            result.extend(sups.into_iter().map(|sup| (sub, sup)));
        }
        result
    }

    /// All classes of the hierarchy.
    pub fn classes(&self) -> &[ClassId] {
        &self.classes
    }
}

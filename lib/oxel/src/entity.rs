//! Identifier space for classes, object properties and individuals.
//!
//! Every entity the classifier manipulates is an integer. Named entities
//! keep their IRI in an [`EntitySpace`], auxiliary ones (introduced by the
//! normalizer or minted by the completion rules) have none.

use oxrdf::{NamedNode, NamedNodeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";
const OWL_TOP_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#topObjectProperty";
const OWL_BOTTOM_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#bottomObjectProperty";

/// Identifier of a class.
///
/// Nodes of the completion graph share this identifier space: a node
/// without pending existentials is identified by its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// `owl:Nothing` (⊥).
    pub const BOTTOM: Self = Self(0);
    /// `owl:Thing` (⊤).
    pub const TOP: Self = Self(1);

    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BOTTOM => f.write_str("⊥"),
            Self::TOP => f.write_str("⊤"),
            Self(id) => write!(f, "c{id}"),
        }
    }
}

/// Identifier of an object property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectPropertyId(u32);

impl ObjectPropertyId {
    /// `owl:bottomObjectProperty`.
    pub const BOTTOM: Self = Self(2);
    /// `owl:topObjectProperty`.
    pub const TOP: Self = Self(3);

    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectPropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Identifier of a named individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndividualId(u32);

impl IndividualId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Source of fresh identifiers.
///
/// A single generator serves classes, properties and individuals so that
/// identifiers never collide across kinds. It is `Clone` so that the
/// classifier can keep minting auxiliary classes from a snapshot.
///
/// Identifiers are `u32`. Once `u32::MAX` is handed out the generator is
/// [exhausted](Self::is_exhausted) and keeps returning it.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u32,
    exhausted: bool,
}

impl IdGenerator {
    const FIRST_FREE: u32 = 4;

    pub fn new() -> Self {
        Self {
            next: Self::FIRST_FREE,
            exhausted: false,
        }
    }

    fn next_u32(&mut self) -> u32 {
        let id = self.next;
        match id.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        id
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next: u32) -> Self {
        Self {
            next,
            exhausted: false,
        }
    }

    /// `true` if the next identifier would repeat one already handed out.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn next_class(&mut self) -> ClassId {
        ClassId(self.next_u32())
    }

    pub fn next_object_property(&mut self) -> ObjectPropertyId {
        ObjectPropertyId(self.next_u32())
    }

    pub fn next_individual(&mut self) -> IndividualId {
        IndividualId(self.next_u32())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Bidirectional IRI ↔ identifier table.
#[derive(Debug, Clone)]
struct Names<I> {
    by_iri: FxHashMap<String, I>,
    by_id: FxHashMap<I, NamedNode>,
}

impl<I: Copy + Eq + std::hash::Hash> Names<I> {
    fn new() -> Self {
        Self {
            by_iri: FxHashMap::default(),
            by_id: FxHashMap::default(),
        }
    }

    fn insert(&mut self, iri: NamedNode, id: I) {
        self.by_iri.insert(iri.as_str().to_owned(), id);
        self.by_id.insert(id, iri);
    }

    fn get(&self, iri: NamedNodeRef<'_>) -> Option<I> {
        self.by_iri.get(iri.as_str()).copied()
    }

    fn iri(&self, id: I) -> Option<NamedNodeRef<'_>> {
        self.by_id.get(&id).map(NamedNode::as_ref)
    }
}

/// Registry of every class, object property and individual of an ontology.
///
/// ```
/// use oxel::{ClassId, EntitySpace};
/// use oxrdf::NamedNodeRef;
///
/// let mut entities = EntitySpace::new();
/// let dog = entities.class(NamedNodeRef::new("http://example.org/Dog")?);
/// assert_eq!(entities.class(NamedNodeRef::new("http://example.org/Dog")?), dog);
/// assert_eq!(
///     entities.lookup_class(NamedNodeRef::new("http://www.w3.org/2002/07/owl#Thing")?),
///     Some(ClassId::TOP)
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct EntitySpace {
    generator: IdGenerator,
    classes: Names<ClassId>,
    object_properties: Names<ObjectPropertyId>,
    individuals: Names<IndividualId>,
    all_classes: Vec<ClassId>,
    all_object_properties: Vec<ObjectPropertyId>,
    all_individuals: Vec<IndividualId>,
    auxiliary_classes: FxHashSet<ClassId>,
    nominals: FxHashMap<IndividualId, ClassId>,
}

impl EntitySpace {
    pub fn new() -> Self {
        let mut space = Self {
            generator: IdGenerator::new(),
            classes: Names::new(),
            object_properties: Names::new(),
            individuals: Names::new(),
            all_classes: vec![ClassId::BOTTOM, ClassId::TOP],
            all_object_properties: vec![ObjectPropertyId::BOTTOM, ObjectPropertyId::TOP],
            all_individuals: Vec::new(),
            auxiliary_classes: FxHashSet::default(),
            nominals: FxHashMap::default(),
        };
        space
            .classes
            .insert(NamedNode::new_unchecked(OWL_NOTHING), ClassId::BOTTOM);
        space
            .classes
            .insert(NamedNode::new_unchecked(OWL_THING), ClassId::TOP);
        space.object_properties.insert(
            NamedNode::new_unchecked(OWL_BOTTOM_OBJECT_PROPERTY),
            ObjectPropertyId::BOTTOM,
        );
        space.object_properties.insert(
            NamedNode::new_unchecked(OWL_TOP_OBJECT_PROPERTY),
            ObjectPropertyId::TOP,
        );
        space
    }

    /// Returns the identifier of the named class, allocating it if needed.
    pub fn class(&mut self, iri: NamedNodeRef<'_>) -> ClassId {
        if let Some(id) = self.classes.get(iri) {
            return id;
        }
        let id = self.generator.next_class();
        self.classes.insert(iri.into_owned(), id);
        self.all_classes.push(id);
        id
    }

    /// Returns the identifier of the named object property, allocating it if needed.
    pub fn object_property(&mut self, iri: NamedNodeRef<'_>) -> ObjectPropertyId {
        if let Some(id) = self.object_properties.get(iri) {
            return id;
        }
        let id = self.generator.next_object_property();
        self.object_properties.insert(iri.into_owned(), id);
        self.all_object_properties.push(id);
        id
    }

    /// Returns the identifier of the named individual, allocating it if needed.
    pub fn individual(&mut self, iri: NamedNodeRef<'_>) -> IndividualId {
        if let Some(id) = self.individuals.get(iri) {
            return id;
        }
        let id = self.generator.next_individual();
        self.individuals.insert(iri.into_owned(), id);
        self.all_individuals.push(id);
        id
    }

    pub fn lookup_class(&self, iri: NamedNodeRef<'_>) -> Option<ClassId> {
        self.classes.get(iri)
    }

    pub fn lookup_object_property(&self, iri: NamedNodeRef<'_>) -> Option<ObjectPropertyId> {
        self.object_properties.get(iri)
    }

    pub fn lookup_individual(&self, iri: NamedNodeRef<'_>) -> Option<IndividualId> {
        self.individuals.get(iri)
    }

    /// The IRI of a class, `None` for auxiliary classes.
    pub fn class_iri(&self, id: ClassId) -> Option<NamedNodeRef<'_>> {
        self.classes.iri(id)
    }

    pub fn object_property_iri(&self, id: ObjectPropertyId) -> Option<NamedNodeRef<'_>> {
        self.object_properties.iri(id)
    }

    pub fn individual_iri(&self, id: IndividualId) -> Option<NamedNodeRef<'_>> {
        self.individuals.iri(id)
    }

    /// Allocates a class that has no IRI.
    pub fn new_auxiliary_class(&mut self) -> ClassId {
        let id = self.generator.next_class();
        self.auxiliary_classes.insert(id);
        self.all_classes.push(id);
        id
    }

    /// The auxiliary class standing for the nominal `{individual}`.
    ///
    /// It is allocated on first request and stable afterwards.
    pub fn nominal_class(&mut self, individual: IndividualId) -> ClassId {
        if let Some(class) = self.nominals.get(&individual) {
            return *class;
        }
        let class = self.new_auxiliary_class();
        self.nominals.insert(individual, class);
        class
    }

    pub fn is_auxiliary_class(&self, id: ClassId) -> bool {
        self.auxiliary_classes.contains(&id)
    }

    pub fn contains_class(&self, id: ClassId) -> bool {
        id == ClassId::BOTTOM
            || id == ClassId::TOP
            || self.classes.by_id.contains_key(&id)
            || self.auxiliary_classes.contains(&id)
    }

    pub fn contains_object_property(&self, id: ObjectPropertyId) -> bool {
        self.object_properties.by_id.contains_key(&id)
    }

    pub fn contains_individual(&self, id: IndividualId) -> bool {
        self.individuals.by_id.contains_key(&id)
    }

    /// All classes, reserved and auxiliary ones included, in allocation order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.all_classes.iter().copied()
    }

    /// All object properties, reserved ones included.
    pub fn object_properties(&self) -> impl Iterator<Item = ObjectPropertyId> + '_ {
        self.all_object_properties.iter().copied()
    }

    pub fn individuals(&self) -> impl Iterator<Item = IndividualId> + '_ {
        self.all_individuals.iter().copied()
    }

    /// Snapshot of the generator, to keep minting identifiers after this point.
    pub fn generator(&self) -> IdGenerator {
        self.generator.clone()
    }
}

impl Default for EntitySpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    #[test]
    fn reserved_identifiers() -> Result<(), Box<dyn std::error::Error>> {
        let entities = EntitySpace::new();
        assert_eq!(
            entities.lookup_class(NamedNodeRef::new(OWL_NOTHING)?),
            Some(ClassId::BOTTOM)
        );
        assert_eq!(
            entities.lookup_object_property(NamedNodeRef::new(OWL_TOP_OBJECT_PROPERTY)?),
            Some(ObjectPropertyId::TOP)
        );
        assert!(entities.contains_class(ClassId::TOP));
        Ok(())
    }

    #[test]
    fn identifiers_do_not_collide_across_kinds() -> Result<(), Box<dyn std::error::Error>> {
        let mut entities = EntitySpace::new();
        let a = entities.class(NamedNodeRef::new("http://example.org/A")?);
        let r = entities.object_property(NamedNodeRef::new("http://example.org/r")?);
        let i = entities.individual(NamedNodeRef::new("http://example.org/i")?);
        let aux = entities.new_auxiliary_class();
        let mut raw = vec![a.as_u32(), r.as_u32(), i.as_u32(), aux.as_u32()];
        raw.sort_unstable();
        raw.dedup();
        assert_eq!(raw.len(), 4);
        assert!(raw.iter().all(|id| *id >= 4));
        Ok(())
    }

    #[test]
    fn nominal_class_is_stable() -> Result<(), Box<dyn std::error::Error>> {
        let mut entities = EntitySpace::new();
        let i = entities.individual(NamedNodeRef::new("http://example.org/i")?);
        let first = entities.nominal_class(i);
        assert_eq!(entities.nominal_class(i), first);
        assert!(entities.is_auxiliary_class(first));
        assert!(entities.class_iri(first).is_none());
        Ok(())
    }

    #[test]
    fn generator_reports_exhaustion_instead_of_wrapping() {
        let mut generator = IdGenerator::starting_at(u32::MAX - 1);
        assert_eq!(generator.next_class().as_u32(), u32::MAX - 1);
        assert!(!generator.is_exhausted());
        assert_eq!(generator.next_object_property().as_u32(), u32::MAX);
        assert!(generator.is_exhausted());
        assert_eq!(generator.next_individual().as_u32(), u32::MAX);
    }

    #[test]
    fn generator_snapshot_continues_after_last_identifier() -> Result<(), Box<dyn std::error::Error>>
    {
        let mut entities = EntitySpace::new();
        let a = entities.class(NamedNodeRef::new("http://example.org/A")?);
        let mut generator = entities.generator();
        assert!(generator.next_class() > a);
        Ok(())
    }
}

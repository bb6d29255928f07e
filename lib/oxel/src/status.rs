//! Mutable state of a classification run.
//!
//! The status owns the three relations of the completion algorithm:
//! - S: the subsumers known for every node,
//! - R: the property labelled edges between nodes,
//! - V: the registered nodes.
//!
//! All rules mutate the state through [`ClassifierStatus::add_subsumer`],
//! [`ClassifierStatus::add_edge`] and [`ClassifierStatus::create_or_get_node`].
//! Every fact that is new is also queued so that the driver can feed it back
//! to the rules.

use crate::entity::{ClassId, IdGenerator, ObjectPropertyId};
use crate::error::{ClassifierError, InvariantViolation};
use crate::node::{NodeTable, VNode};
use crate::ontology::ExtendedOntology;
use crate::properties::PropertyHierarchy;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;

/// A fact of the S or R relation waiting to be processed by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    /// `class ∈ S(node)`
    Subsumer { node: ClassId, class: ClassId },
    /// `(left, right) ∈ R(property)`
    Edge {
        property: ObjectPropertyId,
        left: ClassId,
        right: ClassId,
    },
}

/// The edges of one property, indexed in both directions.
#[derive(Debug, Default)]
struct Relation {
    by_first: FxHashMap<ClassId, FxHashSet<ClassId>>,
    by_second: FxHashMap<ClassId, FxHashSet<ClassId>>,
}

impl Relation {
    fn insert(&mut self, left: ClassId, right: ClassId) -> bool {
        if !self.by_first.entry(left).or_default().insert(right) {
            return false;
        }
        self.by_second.entry(right).or_default().insert(left);
        true
    }

    fn contains(&self, left: ClassId, right: ClassId) -> bool {
        self.by_first
            .get(&left)
            .is_some_and(|rights| rights.contains(&right))
    }
}

/// The S, R and V relations and everything needed to look them up.
#[derive(Debug)]
pub struct ClassifierStatus {
    ontology: Arc<ExtendedOntology>,
    properties: Arc<PropertyHierarchy>,
    generator: IdGenerator,
    nodes: NodeTable,
    subsumers: FxHashMap<ClassId, FxHashSet<ClassId>>,
    subsumees: FxHashMap<ClassId, FxHashSet<ClassId>>,
    relations: FxHashMap<ObjectPropertyId, Relation>,
    successors: FxHashMap<ClassId, FxHashSet<ClassId>>,
    predecessors: FxHashMap<ClassId, FxHashSet<(ObjectPropertyId, ClassId)>>,
    /// Nodes registered as refinements (strict specializations) of a node.
    refinements: FxHashMap<ClassId, Vec<ClassId>>,
    conjunctions: FxHashMap<Box<[ClassId]>, ClassId>,
    conjuncts: FxHashMap<ClassId, Box<[ClassId]>>,
    nominal_classes: FxHashSet<ClassId>,
    pending: VecDeque<Entry>,
    subsumer_count: usize,
    edge_count: usize,
}

impl ClassifierStatus {
    /// Creates the status and seeds `S(x) = {x, ⊤}` for every class.
    ///
    /// `generator` must be a snapshot taken after every identifier of the
    /// ontology was allocated.
    pub fn new(ontology: Arc<ExtendedOntology>, mut generator: IdGenerator) -> Self {
        let properties = Arc::new(PropertyHierarchy::new(&ontology, &mut generator));
        let nominal_classes = ontology.nominals().map(|(_, class)| class).collect();
        let mut status = Self {
            ontology: Arc::clone(&ontology),
            properties,
            generator,
            nodes: NodeTable::new(),
            subsumers: FxHashMap::default(),
            subsumees: FxHashMap::default(),
            relations: FxHashMap::default(),
            successors: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            refinements: FxHashMap::default(),
            conjunctions: FxHashMap::default(),
            conjuncts: FxHashMap::default(),
            nominal_classes,
            pending: VecDeque::new(),
            subsumer_count: 0,
            edge_count: 0,
        };
        for &class in ontology.classes() {
            status.nodes.get_or_insert(VNode::new(class), || class);
            status.add_subsumer(class, class);
            status.add_subsumer(class, ClassId::TOP);
        }
        status
    }

    /// The indexed axioms.
    pub fn ontology(&self) -> &Arc<ExtendedOntology> {
        &self.ontology
    }

    /// The closed property hierarchy.
    pub fn properties(&self) -> &Arc<PropertyHierarchy> {
        &self.properties
    }

    /// Adds `subsumer ∈ S(node)`. Returns `true` if the fact is new.
    pub fn add_subsumer(&mut self, node: ClassId, subsumer: ClassId) -> bool {
        if !self.subsumers.entry(node).or_default().insert(subsumer) {
            return false;
        }
        self.subsumees.entry(subsumer).or_default().insert(node);
        self.subsumer_count += 1;
        self.pending.push_back(Entry::Subsumer {
            node,
            class: subsumer,
        });
        true
    }

    /// Adds `(left, right) ∈ R(property)`. Returns `true` if the fact is new.
    pub fn add_edge(&mut self, property: ObjectPropertyId, left: ClassId, right: ClassId) -> bool {
        if !self
            .relations
            .entry(property)
            .or_default()
            .insert(left, right)
        {
            return false;
        }
        self.successors.entry(left).or_default().insert(right);
        self.predecessors
            .entry(right)
            .or_default()
            .insert((property, left));
        self.edge_count += 1;
        self.pending.push_back(Entry::Edge {
            property,
            left,
            right,
        });
        true
    }

    /// Returns the identifier of `node`, registering it if needed.
    ///
    /// A new node is seeded in the same step with itself, ⊤, its base classes,
    /// the consequences of its obligations and the subsumers of each of the
    /// `origins` (the nodes it specializes). It is also recorded as a
    /// refinement of each origin so that later subsumers of the origins reach
    /// it. The boolean is `true` if the node is new.
    pub fn create_or_get_node(
        &mut self,
        node: VNode,
        origins: &[ClassId],
    ) -> Result<(ClassId, bool), ClassifierError> {
        for origin in origins {
            if !self.nodes.contains(*origin) {
                return Err(InvariantViolation::UnknownNode(*origin).into());
            }
        }
        if self.generator.is_exhausted() && self.nodes.id_of(&node).is_none() {
            return Err(InvariantViolation::IdentifiersExhausted.into());
        }
        let generator = &mut self.generator;
        let (id, is_new) = self
            .nodes
            .get_or_insert(node.clone(), || generator.next_class());
        if !is_new {
            return Ok((id, false));
        }
        self.add_subsumer(id, id);
        self.add_subsumer(id, ClassId::TOP);
        for base in self.base_classes(node.class()) {
            self.add_subsumer(id, base);
        }
        let ontology = Arc::clone(&self.ontology);
        let properties = Arc::clone(&self.properties);
        for obligation in node.obligations() {
            for &property in properties.super_object_properties(obligation.property) {
                for &sup in ontology.gci3_by_property_filler(property, obligation.filler) {
                    self.add_subsumer(id, sup);
                }
            }
        }
        for &origin in origins {
            if origin == id {
                continue;
            }
            for subsumer in self.subsumers(origin).collect::<Vec<_>>() {
                self.add_subsumer(id, subsumer);
            }
            self.refinements.entry(origin).or_default().push(id);
        }
        Ok((id, true))
    }

    /// The auxiliary class standing for the conjunction of `classes`.
    ///
    /// Conjunctions are flattened and memoized so that the same set of classes
    /// always yields the same class. A single class is returned as is. The
    /// class node of a new conjunction is registered as a refinement of each
    /// conjunct.
    pub fn conjunction(&mut self, classes: &[ClassId]) -> Result<ClassId, ClassifierError> {
        let mut members = classes
            .iter()
            .flat_map(|class| self.base_classes(*class))
            .collect::<Vec<_>>();
        members.sort_unstable();
        members.dedup();
        if members.contains(&ClassId::BOTTOM) {
            return Ok(ClassId::BOTTOM);
        }
        if members.len() > 1 {
            members.retain(|class| *class != ClassId::TOP);
        }
        match members.as_slice() {
            [] => return Ok(ClassId::TOP),
            [single] => return Ok(*single),
            _ => (),
        }
        let members = members.into_boxed_slice();
        if let Some(class) = self.conjunctions.get(&members) {
            return Ok(*class);
        }
        if self.generator.is_exhausted() {
            return Err(InvariantViolation::IdentifiersExhausted.into());
        }
        let class = self.generator.next_class();
        self.conjunctions.insert(members.clone(), class);
        self.conjuncts.insert(class, members.clone());
        self.create_or_get_node(VNode::new(class), &members)?;
        Ok(class)
    }

    /// The classes a node class stands for: the conjuncts of an auxiliary
    /// conjunction, the class itself otherwise.
    pub fn base_classes(&self, class: ClassId) -> Vec<ClassId> {
        self.conjuncts
            .get(&class)
            .map_or_else(|| vec![class], |members| members.to_vec())
    }

    /// The current subsumers of `node`.
    pub fn subsumers(&self, node: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subsumers.get(&node).into_iter().flatten().copied()
    }

    /// `|S(node)|`
    pub fn subsumer_count_of(&self, node: ClassId) -> usize {
        self.subsumers.get(&node).map_or(0, FxHashSet::len)
    }

    pub fn has_subsumer(&self, node: ClassId, subsumer: ClassId) -> bool {
        self.subsumers
            .get(&node)
            .is_some_and(|subsumers| subsumers.contains(&subsumer))
    }

    /// The nodes having `class` among their subsumers.
    pub fn subsumees(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subsumees.get(&class).into_iter().flatten().copied()
    }

    /// `y` such that `(left, y) ∈ R(property)`.
    pub fn second_by_first(
        &self,
        property: ObjectPropertyId,
        left: ClassId,
    ) -> impl Iterator<Item = ClassId> + '_ {
        self.relations
            .get(&property)
            .and_then(|relation| relation.by_first.get(&left))
            .into_iter()
            .flatten()
            .copied()
    }

    /// `x` such that `(x, right) ∈ R(property)`.
    pub fn first_by_second(
        &self,
        property: ObjectPropertyId,
        right: ClassId,
    ) -> impl Iterator<Item = ClassId> + '_ {
        self.relations
            .get(&property)
            .and_then(|relation| relation.by_second.get(&right))
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn has_edge(&self, property: ObjectPropertyId, left: ClassId, right: ClassId) -> bool {
        self.relations
            .get(&property)
            .is_some_and(|relation| relation.contains(left, right))
    }

    /// All `(property, x)` such that `(x, node) ∈ R(property)`.
    pub fn predecessors(
        &self,
        node: ClassId,
    ) -> impl Iterator<Item = (ObjectPropertyId, ClassId)> + '_ {
        self.predecessors.get(&node).into_iter().flatten().copied()
    }

    /// All `y` such that `(node, y) ∈ R(r)` for some property `r`.
    pub fn successors(&self, node: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.successors.get(&node).into_iter().flatten().copied()
    }

    /// Nodes registered as refinements of `node`.
    pub fn refinements_of(&self, node: ClassId) -> &[ClassId] {
        self.refinements.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn node(&self, id: ClassId) -> Result<&VNode, ClassifierError> {
        self.nodes
            .node(id)
            .ok_or_else(|| InvariantViolation::UnknownNode(id).into())
    }

    pub fn contains_node(&self, id: ClassId) -> bool {
        self.nodes.contains(id)
    }

    /// Node identifiers in registration order.
    pub fn node_ids(&self) -> &[ClassId] {
        self.nodes.ids()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn subsumer_count(&self) -> usize {
        self.subsumer_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Classes bridging individuals (`{a}`).
    pub fn nominal_classes(&self) -> &FxHashSet<ClassId> {
        &self.nominal_classes
    }

    pub fn inverse_object_property_of(
        &self,
        property: ObjectPropertyId,
    ) -> Result<ObjectPropertyId, ClassifierError> {
        self.properties.inverse_of(property)
    }

    pub fn super_object_properties(&self, property: ObjectPropertyId) -> &[ObjectPropertyId] {
        self.properties.super_object_properties(property)
    }

    pub fn sub_object_properties(&self, property: ObjectPropertyId) -> &[ObjectPropertyId] {
        self.properties.sub_object_properties(property)
    }

    /// Takes the oldest unprocessed fact.
    pub fn next_entry(&mut self) -> Option<Entry> {
        self.pending.pop_front()
    }

    pub fn has_pending_entries(&self) -> bool {
        !self.pending.is_empty()
    }
}

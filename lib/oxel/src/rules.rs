//! Completion rules.
//!
//! Every rule observes the facts of one relation. The S-observers fire when
//! a subsumer is added to a node, the R-observers when an edge is added. The
//! nominal rule needs a global view of the graph and only runs when both
//! queues are empty.

use crate::entity::{ClassId, ObjectPropertyId};
use crate::error::ClassifierError;
use crate::node::{Obligation, VNode};
use crate::properties::PropertyHierarchy;
use crate::status::{ClassifierStatus, Entry};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Completion rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionRule {
    /// Told subsumers and binary conjunctions
    Cr1,
    /// Existentials on the right-hand side
    Cr2,
    /// Existentials on the left-hand side, fired by a subsumer of the successor
    Cr3,
    /// Existentials on the left-hand side, fired by an edge
    Cr4,
    /// Unsatisfiability of successors
    Cr5,
    /// Inverse properties
    Cr6,
    /// Reflexive properties
    Cr7,
    /// Ranges
    Cr8,
    /// Functional properties
    Cr9,
    /// Property inclusions
    Ri2,
    /// Property chains
    Ri3,
    /// Propagation from a node to the nodes refining it
    Refinement,
    /// Nominals
    Nominal,
}

/// Which facts a rule observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Subsumer,
    Edge,
    Quiescence,
}

impl CompletionRule {
    /// Rules applied to every new subsumer.
    pub const SUBSUMER_RULES: &'static [Self] = &[
        Self::Cr1,
        Self::Cr2,
        Self::Cr3,
        Self::Cr5,
        Self::Cr6,
        Self::Cr7,
        Self::Refinement,
    ];

    /// Rules applied to every new edge.
    pub const EDGE_RULES: &'static [Self] = &[
        Self::Ri2,
        Self::Ri3,
        Self::Cr4,
        Self::Cr5,
        Self::Cr6,
        Self::Cr8,
        Self::Cr9,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cr1 => "cr1",
            Self::Cr2 => "cr2",
            Self::Cr3 => "cr3",
            Self::Cr4 => "cr4",
            Self::Cr5 => "cr5",
            Self::Cr6 => "cr6",
            Self::Cr7 => "cr7",
            Self::Cr8 => "cr8",
            Self::Cr9 => "cr9",
            Self::Ri2 => "ri2",
            Self::Ri3 => "ri3",
            Self::Refinement => "ref",
            Self::Nominal => "nom",
        }
    }

    pub fn triggers(self) -> &'static [Trigger] {
        match self {
            Self::Cr1 | Self::Cr2 | Self::Cr3 | Self::Cr7 | Self::Refinement => {
                &[Trigger::Subsumer]
            }
            Self::Cr4 | Self::Cr8 | Self::Cr9 | Self::Ri2 | Self::Ri3 => &[Trigger::Edge],
            Self::Cr5 | Self::Cr6 => &[Trigger::Subsumer, Trigger::Edge],
            Self::Nominal => &[Trigger::Quiescence],
        }
    }

    /// Applies the rule to a fact. Rules that do not observe the fact do nothing.
    pub fn apply(self, status: &mut ClassifierStatus, entry: Entry) -> Result<(), ClassifierError> {
        match entry {
            Entry::Subsumer { node, class } => self.apply_to_subsumer(status, node, class),
            Entry::Edge {
                property,
                left,
                right,
            } => self.apply_to_edge(status, property, left, right),
        }
    }

    fn apply_to_subsumer(
        self,
        status: &mut ClassifierStatus,
        node: ClassId,
        class: ClassId,
    ) -> Result<(), ClassifierError> {
        let ontology = Arc::clone(status.ontology());
        match self {
            Self::Cr1 => {
                for &sup in ontology.gci0_by_sub(class) {
                    status.add_subsumer(node, sup);
                }
                for &(other, sup) in ontology.gci1_by_operand(class) {
                    if other == class || status.has_subsumer(node, other) {
                        status.add_subsumer(node, sup);
                    }
                }
            }
            Self::Cr2 => {
                for existential in ontology.gci2_by_sub(class) {
                    status.add_edge(existential.property, node, existential.filler);
                }
            }
            Self::Cr3 => {
                for gci in ontology.gci3_by_filler(class) {
                    let predecessors = status
                        .first_by_second(gci.property, node)
                        .collect::<Vec<_>>();
                    for predecessor in predecessors {
                        status.add_subsumer(predecessor, gci.sup);
                    }
                }
            }
            Self::Cr5 => {
                if class == ClassId::BOTTOM {
                    let predecessors = status
                        .predecessors(node)
                        .map(|(_, predecessor)| predecessor)
                        .collect::<Vec<_>>();
                    for predecessor in predecessors {
                        status.add_subsumer(predecessor, ClassId::BOTTOM);
                    }
                }
            }
            Self::Cr6 => {
                let properties = Arc::clone(status.properties());
                for gci in ontology.gci3_by_filler(class) {
                    for &sub in properties.sub_object_properties(gci.property) {
                        let property = properties.inverse_of(sub)?;
                        let successors = status
                            .second_by_first(property, node)
                            .collect::<Vec<_>>();
                        for successor in successors {
                            refine(status, property, node, successor)?;
                        }
                    }
                }
            }
            Self::Cr7 => {
                for gci in ontology.gci3_by_filler(class) {
                    if status.properties().is_reflexive(gci.property) {
                        status.add_subsumer(node, gci.sup);
                    }
                }
            }
            Self::Refinement => {
                for refined in status.refinements_of(node).to_vec() {
                    status.add_subsumer(refined, class);
                }
            }
            Self::Cr4 | Self::Cr8 | Self::Cr9 | Self::Ri2 | Self::Ri3 | Self::Nominal => (),
        }
        Ok(())
    }

    fn apply_to_edge(
        self,
        status: &mut ClassifierStatus,
        property: ObjectPropertyId,
        left: ClassId,
        right: ClassId,
    ) -> Result<(), ClassifierError> {
        match self {
            Self::Cr4 => {
                let ontology = Arc::clone(status.ontology());
                let gcis = ontology.gci3_by_property(property);
                if gcis.len() <= status.subsumer_count_of(right) {
                    for gci in gcis {
                        if status.has_subsumer(right, gci.filler) {
                            status.add_subsumer(left, gci.sup);
                        }
                    }
                } else {
                    for filler in status.subsumers(right).collect::<Vec<_>>() {
                        for &sup in ontology.gci3_by_property_filler(property, filler) {
                            status.add_subsumer(left, sup);
                        }
                    }
                }
            }
            Self::Cr5 => {
                if status.has_subsumer(right, ClassId::BOTTOM) {
                    status.add_subsumer(left, ClassId::BOTTOM);
                }
            }
            Self::Cr6 => refine(status, property, left, right)?,
            Self::Cr8 => restrict_to_ranges(status, property, left, right)?,
            Self::Cr9 => merge_functional_successors(status, property, left)?,
            Self::Ri2 => {
                let properties = Arc::clone(status.properties());
                for &sup in properties.super_object_properties(property) {
                    if sup != property {
                        status.add_edge(sup, left, right);
                    }
                }
            }
            Self::Ri3 => {
                let ontology = Arc::clone(status.ontology());
                for chain in ontology.ri3_by_left(property) {
                    let targets = status
                        .second_by_first(chain.right, right)
                        .collect::<Vec<_>>();
                    for target in targets {
                        status.add_edge(chain.sup, left, target);
                    }
                }
                for chain in ontology.ri3_by_right(property) {
                    let sources = status
                        .first_by_second(chain.left, left)
                        .collect::<Vec<_>>();
                    for source in sources {
                        status.add_edge(chain.sup, source, right);
                    }
                }
            }
            Self::Cr1 | Self::Cr2 | Self::Cr3 | Self::Cr7 | Self::Refinement | Self::Nominal => (),
        }
        Ok(())
    }
}

/// Handles the inverse consequences of `(left, right) ∈ R(property)`.
///
/// With `s` the inverse of `property`, `right` is an `s`-predecessor of
/// `left`, so every `∃s.A ⊑ B` with `A ∈ S(left)` makes the successor a `B`.
/// As `right` may be shared by other predecessors, the obligations go to a
/// refinement of it.
fn refine(
    status: &mut ClassifierStatus,
    property: ObjectPropertyId,
    left: ClassId,
    right: ClassId,
) -> Result<(), ClassifierError> {
    if status.has_subsumer(right, ClassId::BOTTOM) {
        return Ok(());
    }
    let ontology = Arc::clone(status.ontology());
    let properties = Arc::clone(status.properties());
    let inverse = properties.inverse_of(property)?;
    let mut obligations = Vec::new();
    for &sup in properties.super_object_properties(inverse) {
        for gci in ontology.gci3_by_property(sup) {
            if status.has_subsumer(left, gci.filler) && !status.has_subsumer(right, gci.sup) {
                obligations.push(Obligation {
                    property: inverse,
                    filler: gci.filler,
                });
            }
        }
    }
    if obligations.is_empty() {
        return Ok(());
    }
    let node = status.node(right)?.extend(obligations);
    let (refined, _) = status.create_or_get_node(node, &[right])?;
    status.add_edge(property, left, refined);
    Ok(())
}

/// Applies the ranges of `property` to `right` and those of its inverse to `left`.
///
/// `right` is replaced by a successor satisfying the ranges, as it may be
/// shared by other predecessors. `left` is the node the edge starts from, so
/// the ranges of the inverse go straight to it.
fn restrict_to_ranges(
    status: &mut ClassifierStatus,
    property: ObjectPropertyId,
    left: ClassId,
    right: ClassId,
) -> Result<(), ClassifierError> {
    let properties = Arc::clone(status.properties());
    for &domain in properties.ranges(properties.inverse_of(property)?) {
        status.add_subsumer(left, domain);
    }
    if status.has_subsumer(right, ClassId::BOTTOM) {
        return Ok(());
    }
    let missing = properties
        .ranges(property)
        .iter()
        .copied()
        .filter(|range| !status.has_subsumer(right, *range))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        return Ok(());
    }
    let node = status.node(right)?.clone();
    let mut classes = status.base_classes(node.class());
    classes.extend(missing);
    let class = status.conjunction(&classes)?;
    let restricted = VNode::with_obligations(class, node.obligations().iter().copied());
    let (restricted, _) = status.create_or_get_node(restricted, &[right])?;
    status.add_edge(property, left, restricted);
    Ok(())
}

/// Merges the successors of `left` through every functional super property of `property`.
fn merge_functional_successors(
    status: &mut ClassifierStatus,
    property: ObjectPropertyId,
    left: ClassId,
) -> Result<(), ClassifierError> {
    let properties = Arc::clone(status.properties());
    for &functional in properties.super_object_properties(property) {
        if properties.is_functional(functional) {
            merge_successors(status, &properties, functional, left)?;
        }
    }
    Ok(())
}

/// Replaces all the `functional`-successors of `left` by a single node.
///
/// The merged node inherits every edge from `left` to a merged successor
/// whose property is below `functional`.
fn merge_successors(
    status: &mut ClassifierStatus,
    properties: &PropertyHierarchy,
    functional: ObjectPropertyId,
    left: ClassId,
) -> Result<(), ClassifierError> {
    let mut successors = status.second_by_first(functional, left).collect::<Vec<_>>();
    if successors.len() < 2 {
        return Ok(());
    }
    successors.sort_unstable();
    let mut classes = Vec::new();
    let mut obligations = Vec::new();
    let mut labels = FxHashSet::default();
    for &successor in &successors {
        let node = status.node(successor)?;
        obligations.extend(node.obligations().iter().copied());
        classes.extend(status.base_classes(node.class()));
        labels.extend(status.predecessors(successor).filter_map(|(label, predecessor)| {
            (predecessor == left && properties.is_subproperty(label, functional)).then_some(label)
        }));
    }
    let class = status.conjunction(&classes)?;
    let merged = VNode::with_obligations(class, obligations);
    let (merged, _) = status.create_or_get_node(merged, &successors)?;
    let mut labels = labels.into_iter().collect::<Vec<_>>();
    labels.sort_unstable();
    for label in labels {
        status.add_edge(label, left, merged);
    }
    Ok(())
}

/// Applies the nominal rule to the whole graph.
///
/// Two nodes sharing a nominal `{a}` are the same element whenever the second
/// one is reachable from the first one or from a nominal, so the first one
/// receives the subsumers of the second one. Returns `true` if a subsumer was
/// added.
pub fn apply_nominal_rule(status: &mut ClassifierStatus) -> Result<bool, ClassifierError> {
    let mut nominals = status.nominal_classes().iter().copied().collect::<Vec<_>>();
    if nominals.is_empty() {
        return Ok(false);
    }
    nominals.sort_unstable();
    let from_nominals = reachable(status, nominals.iter().copied());
    // only subsumers are added during a sweep, so reachability does not change
    let mut from_members = FxHashMap::<ClassId, FxHashSet<ClassId>>::default();
    let mut changed = false;
    for nominal in nominals {
        let mut members = status.subsumees(nominal).collect::<Vec<_>>();
        members.sort_unstable();
        for &member in &members {
            let from_member = from_members
                .entry(member)
                .or_insert_with(|| reachable(&*status, [member]));
            for &other in &members {
                if other == member
                    || !(from_member.contains(&other) || from_nominals.contains(&other))
                {
                    continue;
                }
                for subsumer in status.subsumers(other).collect::<Vec<_>>() {
                    changed |= status.add_subsumer(member, subsumer);
                }
            }
        }
    }
    Ok(changed)
}

fn reachable(
    status: &ClassifierStatus,
    roots: impl IntoIterator<Item = ClassId>,
) -> FxHashSet<ClassId> {
    let mut reached = FxHashSet::default();
    let mut stack = roots.into_iter().collect::<Vec<_>>();
    while let Some(node) = stack.pop() {
        if reached.insert(node) {
            stack.extend(status.successors(node));
        }
    }
    reached
}

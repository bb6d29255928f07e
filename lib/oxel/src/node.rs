//! Nodes of the completion graph.
//!
//! A node stands for an anonymous successor: a base class together with the
//! existential restrictions it must satisfy on top of it. Nodes are compared
//! structurally so that the same witness built by different rule firings is
//! registered only once.

use crate::entity::{ClassId, ObjectPropertyId};
use rustc_hash::FxHashMap;
use std::fmt;

/// A pending existential obligation `∃property.filler` of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Obligation {
    pub property: ObjectPropertyId,
    pub filler: ClassId,
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "∃{}.{}", self.property, self.filler)
    }
}

/// A witness of the completion graph.
///
/// The obligations are kept sorted and without duplicates, so two nodes built
/// from the same base class and the same set of obligations are equal and
/// hash the same whatever order the obligations were added in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VNode {
    class: ClassId,
    obligations: Box<[Obligation]>,
}

impl VNode {
    /// A node without obligations, identified by its class.
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            obligations: Box::new([]),
        }
    }

    pub fn with_obligations(
        class: ClassId,
        obligations: impl IntoIterator<Item = Obligation>,
    ) -> Self {
        let mut obligations = obligations.into_iter().collect::<Vec<_>>();
        obligations.sort_unstable();
        obligations.dedup();
        Self {
            class,
            obligations: obligations.into_boxed_slice(),
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    /// `true` if the node is the plain class node of [`Self::class`].
    pub fn is_class_node(&self) -> bool {
        self.obligations.is_empty()
    }

    pub fn has_obligation(&self, obligation: &Obligation) -> bool {
        self.obligations.binary_search(obligation).is_ok()
    }

    /// This node with extra obligations.
    #[must_use]
    pub fn extend(&self, obligations: impl IntoIterator<Item = Obligation>) -> Self {
        Self::with_obligations(
            self.class,
            self.obligations.iter().copied().chain(obligations),
        )
    }
}

impl fmt::Display for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        for obligation in &self.obligations {
            write!(f, " ⊓ {obligation}")?;
        }
        Ok(())
    }
}

/// Registry assigning a stable identifier to every distinct [`VNode`].
///
/// Nodes are stored in an arena; a hash map from node to arena slot gives
/// constant time deduplication.
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: Vec<VNode>,
    ids: Vec<ClassId>,
    slot_by_node: FxHashMap<VNode, usize>,
    slot_by_id: FxHashMap<ClassId, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of `node`, registering it if needed.
    ///
    /// `mint` is only called for new nodes carrying obligations; a class node
    /// is identified by its class. The boolean is `true` if the node is new.
    pub fn get_or_insert(
        &mut self,
        node: VNode,
        mint: impl FnOnce() -> ClassId,
    ) -> (ClassId, bool) {
        if let Some(slot) = self.slot_by_node.get(&node) {
            return (self.ids[*slot], false);
        }
        let id = if node.is_class_node() {
            node.class()
        } else {
            mint()
        };
        let slot = self.nodes.len();
        self.nodes.push(node.clone());
        self.ids.push(id);
        self.slot_by_node.insert(node, slot);
        self.slot_by_id.insert(id, slot);
        (id, true)
    }

    pub fn id_of(&self, node: &VNode) -> Option<ClassId> {
        self.slot_by_node.get(node).map(|slot| self.ids[*slot])
    }

    pub fn node(&self, id: ClassId) -> Option<&VNode> {
        self.slot_by_id.get(&id).map(|slot| &self.nodes[*slot])
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.slot_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node identifiers in registration order.
    pub fn ids(&self) -> &[ClassId] {
        &self.ids
    }
}

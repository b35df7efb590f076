//! The lineage graph
//!
//! A directed graph of citation edges: `A -> B` means A cites B as a
//! predicate, and `A -> TERMINAL` means A was confirmed to have no
//! discoverable predicates. Nodes are keyed by canonical number string in
//! ordered maps, so iteration (and everything derived from it, including
//! exported edge lists) is stable across runs.
//!
//! The graph is a plain arena: only the build coordinator mutates it, so it
//! needs no internal synchronization. Edges are never removed.

mod builder;
mod subgraph;

pub use builder::{BuildOutcome, CancellationToken, GraphBuilder};
pub use subgraph::subgraph;

use crate::approval::ApprovalId;
use std::collections::{BTreeMap, BTreeSet};

/// Directed graph of predicate citations, keyed by canonical number.
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    nodes: BTreeMap<String, ApprovalId>,
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; a no-op when already present.
    pub fn add_node(&mut self, id: &ApprovalId) {
        self.nodes
            .entry(id.as_str().to_string())
            .or_insert_with(|| id.clone());
    }

    /// Insert the edge `from -> to`, inserting both endpoints as needed.
    /// Re-inserting an existing edge is a no-op.
    pub fn add_edge(&mut self, from: &ApprovalId, to: &ApprovalId) {
        self.add_node(from);
        self.add_node(to);
        self.adjacency
            .entry(from.as_str().to_string())
            .or_default()
            .insert(to.as_str().to_string());
    }

    pub fn contains(&self, id: &ApprovalId) -> bool {
        self.nodes.contains_key(id.as_str())
    }

    /// Number of outgoing edges. A node with at least one outgoing edge,
    /// even just the dead-end marker, counts as expanded.
    pub fn out_degree(&self, id: &ApprovalId) -> usize {
        self.adjacency
            .get(id.as_str())
            .map(|targets| targets.len())
            .unwrap_or(0)
    }

    /// Direct citation targets of `id`, in canonical order.
    pub fn successors(&self, id: &ApprovalId) -> impl Iterator<Item = &ApprovalId> {
        self.adjacency
            .get(id.as_str())
            .into_iter()
            .flatten()
            .filter_map(|key| self.nodes.get(key))
    }

    /// All nodes, in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = &ApprovalId> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|targets| targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge as a canonical-string pair, ordered by source then target.
    ///
    /// Dead-end edges into the terminal sentinel are included; dropping them
    /// is the renderer's business, not the graph's.
    pub fn edge_list(&self) -> Vec<(String, String)> {
        self.adjacency
            .iter()
            .flat_map(|(from, targets)| {
                targets.iter().map(move |to| (from.clone(), to.clone()))
            })
            .collect()
    }
}

//! Seed-rooted subgraph extraction
//!
//! The shared graph accumulates edges from every expansion ever run against
//! it; reporting on one device wants only that device's lineage. The
//! extractor walks the reachable set breadth first and copies out every edge
//! whose source is reachable — a pure function over the input graph.

use super::LineageGraph;
use crate::approval::ApprovalId;
use std::collections::{BTreeSet, VecDeque};

/// The induced subgraph of everything reachable from `node`.
///
/// Contains an edge `left -> right` for every reachable `left`; dead-end
/// edges into the terminal sentinel are kept. Nodes outside the reachable
/// set never appear. A `node` absent from `graph`, or one with no outgoing
/// edges, yields an empty graph.
pub fn subgraph(graph: &LineageGraph, node: &ApprovalId) -> LineageGraph {
    let mut result = LineageGraph::new();
    if !graph.contains(node) {
        return result;
    }

    let mut reachable: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<ApprovalId> = VecDeque::new();
    reachable.insert(node.as_str().to_string());
    queue.push_back(node.clone());

    while let Some(current) = queue.pop_front() {
        for successor in graph.successors(&current) {
            result.add_edge(&current, successor);
            if reachable.insert(successor.as_str().to_string()) {
                queue.push_back(successor.clone());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ApprovalId {
        ApprovalId::parse(s).unwrap()
    }

    fn sample_graph() -> LineageGraph {
        let mut graph = LineageGraph::new();
        // One lineage rooted at K173585 ...
        graph.add_edge(&id("K173585"), &id("K081113"));
        graph.add_edge(&id("K081113"), &id("K001234"));
        graph.add_edge(&id("K001234"), &ApprovalId::terminal());
        // ... and an unrelated component.
        graph.add_edge(&id("P810002"), &id("P790001"));
        graph
    }

    #[test]
    fn keeps_only_reachable_edges() {
        let graph = sample_graph();
        let sub = subgraph(&graph, &id("K173585"));

        assert_eq!(
            sub.edge_list(),
            vec![
                ("K001234".to_string(), "K000000".to_string()),
                ("K081113".to_string(), "K001234".to_string()),
                ("K173585".to_string(), "K081113".to_string()),
            ]
        );
        assert!(!sub.contains(&id("P810002")));
        assert!(!sub.contains(&id("P790001")));
    }

    #[test]
    fn terminal_edges_are_included() {
        let graph = sample_graph();
        let sub = subgraph(&graph, &id("K001234"));
        assert_eq!(
            sub.edge_list(),
            vec![("K001234".to_string(), "K000000".to_string())]
        );
    }

    #[test]
    fn extraction_does_not_mutate_the_source() {
        let graph = sample_graph();
        let nodes_before = graph.node_count();
        let edges_before = graph.edge_count();
        let _ = subgraph(&graph, &id("K173585"));
        assert_eq!(graph.node_count(), nodes_before);
        assert_eq!(graph.edge_count(), edges_before);
    }

    #[test]
    fn absent_or_leaf_node_yields_empty_graph() {
        let graph = sample_graph();
        assert!(subgraph(&graph, &id("K999999")).is_empty());
        // P790001 is in the graph but has no outgoing edges.
        assert!(subgraph(&graph, &id("P790001")).is_empty());
    }

    #[test]
    fn cycles_do_not_loop_the_walk() {
        let mut graph = LineageGraph::new();
        graph.add_edge(&id("K111111"), &id("K222222"));
        graph.add_edge(&id("K222222"), &id("K111111"));
        let sub = subgraph(&graph, &id("K111111"));
        assert_eq!(sub.edge_count(), 2);
    }
}

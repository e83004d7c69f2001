//! Graph construction from interaction records.
//!
//! # Overview
//!
//! [`FlowGraph::from_connections`] turns the flat list of [`Connection`]s
//! produced by the document walker into adjacency indices plus a
//! [`petgraph`] reachability view used by the downstream analyses.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "an interaction on A navigates to (or overlays) B".
//! Only connections whose [`Connection::destination`] is present become
//! edges; `BACK`, `CLOSE` and `URL` actions are terminal and never traversed.
//!
//! ## Parallel Edges
//!
//! Several connections may link the same pair of nodes (different triggers).
//! The adjacency lists keep every connection so fan-out counts and path
//! steps stay per-connection, while the petgraph view collapses them to one
//! reachability edge.
//!
//! ## Cache Invalidation
//!
//! The graph carries a BLAKE3 content hash of its sorted distinct edge list.
//! It changes only when reachability changes, not when a trigger is swapped.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeSet, HashMap};

use flowlens_core::config::EntryPointPolicy;
use flowlens_core::model::Connection;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

// ---------------------------------------------------------------------------
// FlowGraph
// ---------------------------------------------------------------------------

/// Directed interaction graph borrowed from a connection list.
#[derive(Debug)]
pub struct FlowGraph<'a> {
    /// Reachability view: nodes = node ids, one edge per distinct pair.
    graph: DiGraph<String, ()>,
    /// BLAKE3 content hash of the distinct edge set.
    pub content_hash: String,
    outgoing: HashMap<&'a str, Vec<&'a Connection>>,
    incoming: HashMap<&'a str, Vec<&'a Connection>>,
    edges: Vec<&'a Connection>,
    source_ids: BTreeSet<&'a str>,
    destination_ids: BTreeSet<&'a str>,
    terminal_sources: BTreeSet<&'a str>,
}

impl<'a> FlowGraph<'a> {
    /// Build the graph. Input order is preserved within each adjacency list.
    #[instrument(skip_all, fields(connections = connections.len()))]
    pub fn from_connections(connections: &'a [Connection]) -> Self {
        let mut outgoing: HashMap<&'a str, Vec<&'a Connection>> = HashMap::new();
        let mut incoming: HashMap<&'a str, Vec<&'a Connection>> = HashMap::new();
        let mut edges = Vec::new();
        let mut source_ids = BTreeSet::new();
        let mut destination_ids = BTreeSet::new();
        let mut terminal_sources = BTreeSet::new();

        let mut graph = DiGraph::<String, ()>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for conn in connections {
            let source = conn.source_node_id.as_str();
            let Some(destination) = conn.destination() else {
                terminal_sources.insert(source);
                continue;
            };

            source_ids.insert(source);
            destination_ids.insert(destination);
            outgoing.entry(source).or_default().push(conn);
            incoming.entry(destination).or_default().push(conn);
            edges.push(conn);

            let source_idx = *node_map
                .entry(source.to_string())
                .or_insert_with(|| graph.add_node(source.to_string()));
            let destination_idx = *node_map
                .entry(destination.to_string())
                .or_insert_with(|| graph.add_node(destination.to_string()));

            // Avoid duplicate edges (petgraph allows them by default).
            if !graph.contains_edge(source_idx, destination_idx) {
                graph.add_edge(source_idx, destination_idx, ());
            }
        }

        let content_hash = compute_edge_hash(&graph);

        Self {
            graph,
            content_hash,
            outgoing,
            incoming,
            edges,
            source_ids,
            destination_ids,
            terminal_sources,
        }
    }

    /// Traversable connections leaving `node`, in input order.
    #[must_use]
    pub fn outgoing(&self, node: &str) -> &[&'a Connection] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Traversable connections arriving at `node`, in input order.
    #[must_use]
    pub fn incoming(&self, node: &str) -> &[&'a Connection] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Distinct destinations reachable in one step from `node`, first-seen order.
    #[must_use]
    pub fn successors(&self, node: &str) -> Vec<&'a str> {
        let mut seen = BTreeSet::new();
        self.outgoing(node)
            .iter()
            .copied()
            .filter_map(Connection::destination)
            .filter(|dest| seen.insert(*dest))
            .collect()
    }

    /// Every traversable connection, in input order.
    #[must_use]
    pub fn edges(&self) -> &[&'a Connection] {
        &self.edges
    }

    /// Node ids that originate at least one traversable connection.
    #[must_use]
    pub const fn source_ids(&self) -> &BTreeSet<&'a str> {
        &self.source_ids
    }

    /// Node ids that are the destination of at least one connection.
    #[must_use]
    pub const fn destination_ids(&self) -> &BTreeSet<&'a str> {
        &self.destination_ids
    }

    /// Entry points under `policy`, falling back to every source when the
    /// policy's difference set is empty.
    #[must_use]
    pub fn entry_points(&self, policy: EntryPointPolicy) -> Vec<String> {
        let entries: Vec<String> = match policy {
            EntryPointPolicy::TargetsNeverSources => {
                difference(&self.destination_ids, &self.source_ids)
            }
            EntryPointPolicy::SourcesNeverTargets => {
                difference(&self.source_ids, &self.destination_ids)
            }
        };

        if entries.is_empty() {
            self.source_ids.iter().map(|id| (*id).to_string()).collect()
        } else {
            entries
        }
    }

    /// Sources that never appear as a destination.
    #[must_use]
    pub fn dead_ends(&self) -> Vec<String> {
        difference(&self.source_ids, &self.destination_ids)
    }

    /// Nodes where navigation leaves the graph: destinations that are never
    /// sources, plus nodes carrying a terminal (`BACK`/`CLOSE`/`URL`) action.
    #[must_use]
    pub fn exit_points(&self) -> Vec<String> {
        let sinks = self
            .destination_ids
            .iter()
            .filter(|id| !self.source_ids.contains(*id));
        sinks
            .chain(self.terminal_sources.iter())
            .copied()
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct node ids touched by any connection, terminal ones included.
    #[must_use]
    pub fn unique_screens(&self) -> usize {
        self.source_ids
            .iter()
            .chain(self.destination_ids.iter())
            .chain(self.terminal_sources.iter())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Return the number of distinct nodes in the reachability view.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of distinct reachability edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn difference(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> Vec<String> {
    left.difference(right).map(|id| (*id).to_string()).collect()
}

/// Compute a BLAKE3 hash of the sorted distinct edge list.
fn compute_edge_hash(graph: &DiGraph<String, ()>) -> String {
    let mut edges: Vec<(&str, &str)> = graph
        .raw_edges()
        .iter()
        .map(|edge| {
            (
                graph[edge.source()].as_str(),
                graph[edge.target()].as_str(),
            )
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (source, target) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

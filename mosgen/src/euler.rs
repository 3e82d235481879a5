//! The Euler multigraph over nets, keyed by diffusion-net name.
//!
//! Each transistor contributes one edge between its source net and its drain net, carrying the
//! gate terminal as interior data. Every edge is filed under both endpoints' adjacency lists so
//! a traversal starting from either net finds it; the two filings are kept in lockstep by
//! [`Multigraph::remove_edge`] returning enough information to restore both sides exactly.

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::terminal::TerminalRef;

/// One transistor, represented as an edge between its source and drain nets.
#[derive(Debug, Clone, PartialEq)]
pub struct EulerEdge {
    /// The endpoint filed under this adjacency list's own net.
    pub u: TerminalRef,
    /// The other endpoint.
    pub v: TerminalRef,
    /// Interior terminals (the gate) walked when traversing from `u` to `v`.
    pub interior: Vec<TerminalRef>,
}

/// A multigraph of transistors, keyed by net name.
#[derive(Debug, Clone, Default)]
pub struct Multigraph {
    graph: IndexMap<ArcStr, Vec<EulerEdge>>,
}

impl Multigraph {
    /// Creates an empty multigraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Net names in insertion order.
    pub fn nets(&self) -> impl Iterator<Item = &ArcStr> {
        self.graph.keys()
    }

    /// The half-edges filed at `net`, if any.
    pub fn edges_at(&self, net: &str) -> &[EulerEdge] {
        self.graph.get(net).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of half-edges filed at `net`.
    pub fn degree(&self, net: &str) -> usize {
        self.edges_at(net).len()
    }

    /// `true` if every adjacency list is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.values().all(Vec::is_empty)
    }

    /// Adds an edge between `u` and `v`, filed under both endpoints.
    pub fn add_edge(&mut self, u: TerminalRef, v: TerminalRef, interior: Vec<TerminalRef>) {
        self.insert_edge_at(u, v, interior, None);
    }

    /// Adds an edge, optionally reinserting at a specific `(u_index, v_index)` position in each
    /// endpoint's adjacency list (used to restore exact pre-removal order after a bridge test).
    pub fn insert_edge_at(&mut self, u: TerminalRef, v: TerminalRef, interior: Vec<TerminalRef>, index: Option<(usize, usize)>) {
        let mut reversed = interior.clone();
        reversed.reverse();

        let u_net = u.net.clone();
        let v_net = v.net.clone();
        let forward = EulerEdge { u: u.clone(), v: v.clone(), interior };
        let backward = EulerEdge { u: v, v: u, interior: reversed };

        let u_list = self.graph.entry(u_net).or_default();
        match index {
            Some((ui, _)) => u_list.insert(ui.min(u_list.len()), forward),
            None => u_list.push(forward),
        }
        let v_list = self.graph.entry(v_net).or_default();
        match index {
            Some((_, vi)) => v_list.insert(vi.min(v_list.len()), backward),
            None => v_list.push(backward),
        }
    }

    /// Removes the first half-edge at `u_net` whose other endpoint is `v_net` with a matching
    /// interior, along with its mirror filed at `v_net`.
    ///
    /// Returns the removed edge (as filed at `u_net`, i.e. with `.u` on the `u_net` side) along
    /// with the index it occupied in each adjacency list, so a caller can restore the multigraph
    /// to a byte-identical state with [`Multigraph::insert_edge_at`].
    ///
    /// # Panics
    ///
    /// Panics if no matching edge is found; callers only ever remove edges they know are present.
    pub fn remove_edge(&mut self, u_net: &str, v_net: &str, interior: &[TerminalRef]) -> (EulerEdge, usize, usize) {
        let (ui, removed) = Self::find_and_remove(
            self.graph.get_mut(u_net).unwrap_or_else(|| panic!("no adjacency list for net `{u_net}`")),
            v_net,
            interior,
        );
        let mut reversed: Vec<TerminalRef> = interior.to_vec();
        reversed.reverse();
        let (vi, _) = Self::find_and_remove(
            self.graph.get_mut(v_net).unwrap_or_else(|| panic!("no adjacency list for net `{v_net}`")),
            u_net,
            &reversed,
        );
        (removed, ui, vi)
    }

    fn find_and_remove(list: &mut Vec<EulerEdge>, other_net: &str, interior: &[TerminalRef]) -> (usize, EulerEdge) {
        let idx = list
            .iter()
            .position(|e| e.v.net.as_str() == other_net && e.interior == interior)
            .unwrap_or_else(|| panic!("no matching edge to net `{other_net}`"));
        (idx, list.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{Terminal, TerminalKind};

    fn diff(net: &str) -> TerminalRef {
        Terminal::new_shared(TerminalKind::Diff, net, 1.0, 1.0)
    }
    fn gate(net: &str) -> TerminalRef {
        Terminal::new_shared(TerminalKind::Gate, net, 1.0, 1.0)
    }

    #[test]
    fn add_edge_files_both_endpoints() {
        let mut g = Multigraph::new();
        g.add_edge(diff("a"), diff("b"), vec![gate("g")]);
        assert_eq!(g.degree("a"), 1);
        assert_eq!(g.degree("b"), 1);
        assert_eq!(g.edges_at("b")[0].v.net.as_str(), "a");
    }

    #[test]
    fn remove_then_reinsert_restores_adjacency() {
        let mut g = Multigraph::new();
        g.add_edge(diff("a"), diff("b"), vec![gate("g1")]);
        g.add_edge(diff("a"), diff("c"), vec![gate("g2")]);
        let before_a = g.edges_at("a").to_vec();
        let before_b = g.edges_at("b").to_vec();

        let (removed, ui, vi) = g.remove_edge("a", "b", &[gate("g1")]);
        assert_eq!(g.degree("a"), 1);
        assert_eq!(g.degree("b"), 0);

        g.insert_edge_at(removed.u, removed.v, removed.interior, Some((ui, vi)));
        assert_eq!(g.edges_at("a"), before_a.as_slice());
        assert_eq!(g.edges_at("b"), before_b.as_slice());
    }
}

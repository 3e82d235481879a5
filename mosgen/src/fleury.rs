//! Fleury's bridge-avoiding algorithm, run over the [`Multigraph`] to order transistors for
//! maximal diffusion sharing.
//!
//! Traversal is explicit-stack rather than recursive: a finger/multiplier count in the hundreds
//! would otherwise blow the call stack, since each taken edge would be one recursive frame.

use std::collections::HashSet;

use crate::euler::Multigraph;
use crate::terminal::TerminalRef;

/// Walks the whole multigraph, restarting on a fresh odd-degree (or, failing that, any
/// remaining) net each time the current trail runs out of edges, until no edges remain.
///
/// `finger` selects emission style: `true` includes the starting terminal of each sub-trail in
/// the output (multi-finger topology, where consecutive diffusion/gate/diffusion triples share
/// diffusion); `false` omits it (multiplier topology, where each row starts a fresh diffusion
/// island).
pub fn fleury_trail(graph: &mut Multigraph, finger: bool) -> Vec<TerminalRef> {
    let mut full = Vec::new();
    while !graph.is_empty() {
        let start = initial_vertex(graph);
        let mut order = if finger { vec![start.clone()] } else { Vec::new() };
        trail_from(graph, start.net.as_str(), finger, &mut order);
        full.extend(order);
    }
    full
}

/// Picks the net to start a sub-trail from: the first odd-degree net in insertion order, or (if
/// every remaining net has even degree) the first net with any edges left at all.
fn initial_vertex(graph: &Multigraph) -> TerminalRef {
    for net in graph.nets() {
        let edges = graph.edges_at(net);
        if !edges.is_empty() && edges.len() % 2 == 1 {
            return endpoint_on(net, &edges[0]);
        }
    }
    for net in graph.nets() {
        let edges = graph.edges_at(net);
        if !edges.is_empty() {
            return endpoint_on(net, &edges[0]);
        }
    }
    panic!("initial_vertex called on an empty multigraph");
}

fn endpoint_on(net: &str, edge: &crate::euler::EulerEdge) -> TerminalRef {
    if edge.u.net.as_str() == net {
        edge.u.clone()
    } else {
        edge.v.clone()
    }
}

/// Consumes every edge reachable from `start_net` by always taking the sole remaining edge (when
/// degree is 1) or the first non-bridge edge (when degree is higher), pushing visited terminals
/// into `out` as it goes. Equivalent to the recursive "take an edge, recurse into its far
/// endpoint, then keep trying the next edge at this vertex" structure, but run with an explicit
/// stack of in-progress vertices instead of the call stack.
fn trail_from(graph: &mut Multigraph, start_net: &str, finger: bool, out: &mut Vec<TerminalRef>) {
    let mut stack: Vec<String> = vec![start_net.to_string()];
    while let Some(vertex) = stack.last().cloned() {
        let degree = graph.degree(&vertex);
        if degree == 0 {
            stack.pop();
            continue;
        }

        let take_idx = if degree == 1 { 0 } else { first_non_bridge_index(graph, &vertex) };
        let edge = graph.edges_at(&vertex)[take_idx].clone();
        let far = edge.v.clone();

        if finger {
            out.extend(edge.interior.iter().cloned());
            out.push(far.clone());
        } else {
            out.push(edge.u.clone());
            out.extend(edge.interior.iter().cloned());
            out.push(far.clone());
        }

        graph.remove_edge(&vertex, &far.net, &edge.interior);
        stack.push(far.net.to_string());
    }
}

/// Index of the first edge at `net` that is not a bridge, i.e. whose removal still leaves `net`
/// able to reach the edge's far endpoint. By the theory behind Fleury's algorithm, whenever a
/// vertex has more than one remaining edge, at most one of them is a bridge, so this search
/// always succeeds before exhausting the list; the fallback to index 0 only guards against that
/// invariant being violated by malformed input rather than describing a real case.
fn first_non_bridge_index(graph: &mut Multigraph, net: &str) -> usize {
    let n = graph.degree(net);
    for i in 0..n {
        let edge = graph.edges_at(net)[i].clone();
        if !is_bridge(graph, net, &edge) {
            return i;
        }
    }
    0
}

/// `true` if removing `edge` from `net`'s adjacency would disconnect `net` from the edge's far
/// endpoint. Determined by removing the edge, running a reachability search, and reinserting the
/// edge at its original position in both adjacency lists before returning.
fn is_bridge(graph: &mut Multigraph, net: &str, edge: &crate::euler::EulerEdge) -> bool {
    let far_net = edge.v.net.clone();
    let (removed, ui, vi) = graph.remove_edge(net, far_net.as_str(), &edge.interior);

    let mut visited = HashSet::new();
    dfs_visit(graph, net, &mut visited);
    let bridge = !visited.contains(far_net.as_str());

    graph.insert_edge_at(removed.u, removed.v, removed.interior, Some((ui, vi)));
    bridge
}

/// Explicit-stack reachability search, marking every net reachable from `start`.
fn dfs_visit(graph: &Multigraph, start: &str, visited: &mut HashSet<String>) {
    let mut stack = vec![start.to_string()];
    while let Some(net) = stack.pop() {
        if !visited.insert(net.clone()) {
            continue;
        }
        for edge in graph.edges_at(&net) {
            let far = if edge.u.net.as_str() == net { edge.v.net.as_str() } else { edge.u.net.as_str() };
            if !visited.contains(far) {
                stack.push(far.to_string());
            }
        }
    }
}

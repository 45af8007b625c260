//! Rank assignment.

use crate::LayeredGraph;
use crate::graphlib::alg;
use rustc_hash::FxHashMap as HashMap;

/// Assigns every node the length of the longest path reaching it from a source, honoring each
/// edge's `minlen`. Self-loops never constrain ranks.
///
/// Nodes are relaxed in topological order (insertion order breaks ties). A cyclic graph falls back
/// to a single relaxation pass in insertion order, which terminates but does not guarantee
/// `minlen` for edges that close a cycle.
pub fn longest_path(g: &mut LayeredGraph) {
    let topo = alg::topsort(g).unwrap_or_else(|| g.node_ids());

    let mut rank: HashMap<String, i32> = topo.iter().map(|id| (id.clone(), 0)).collect();
    for v in &topo {
        let r = rank.get(v).copied().unwrap_or(0);
        for e in g.out_edges(v) {
            if e.v == e.w {
                continue;
            }
            let minlen = g.edge_by_key(&e).map(|l| l.minlen).unwrap_or(1).max(1) as i32;
            let next = r.saturating_add(minlen);
            let entry = rank.entry(e.w.clone()).or_insert(0);
            if next > *entry {
                *entry = next;
            }
        }
    }

    g.for_each_node_mut(|id, n| {
        n.rank = Some(rank.get(id).copied().unwrap_or(0));
    });
}

/// Shifts ranks so the smallest one is zero.
pub fn normalize_ranks(g: &mut LayeredGraph) {
    let mut min_rank: i32 = i32::MAX;
    g.for_each_node(|_id, n| {
        if let Some(rank) = n.rank {
            min_rank = min_rank.min(rank);
        }
    });
    if min_rank == i32::MAX {
        return;
    }
    g.for_each_node_mut(|_id, n| {
        if let Some(rank) = n.rank {
            n.rank = Some(rank - min_rank);
        }
    });
}

pub fn rank(g: &mut LayeredGraph) {
    longest_path(g);
    normalize_ranks(g);
}

/// Node ids grouped by rank, each rank in insertion order.
pub fn layers(g: &LayeredGraph) -> Vec<Vec<String>> {
    let mut max_rank: i32 = -1;
    g.for_each_node(|_id, n| {
        if let Some(rank) = n.rank {
            max_rank = max_rank.max(rank);
        }
    });
    let mut out: Vec<Vec<String>> = vec![Vec::new(); (max_rank + 1).max(0) as usize];
    g.for_each_node(|id, n| {
        if let Some(layer) = n.rank.and_then(|r| out.get_mut(r.max(0) as usize)) {
            layer.push(id.to_string());
        }
    });
    out
}

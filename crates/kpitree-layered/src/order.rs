//! Node ordering / crossing reduction.
//!
//! Initial order comes from a depth-first walk, then alternating barycenter sweeps reorder each
//! rank against its neighbor rank. The layering with the fewest weighted crossings is kept.

use crate::LayeredGraph;
use crate::rank;
use rustc_hash::FxHashMap as HashMap;

/// Sweeps without improvement before giving up.
const MAX_STALE_SWEEPS: usize = 4;

/// Depth-first initial ordering: starting nodes are visited by (rank, insertion order), and each
/// node pulls its successors into their ranks as it is visited.
pub fn init_order(g: &LayeredGraph) -> Vec<Vec<String>> {
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); rank::layers(g).len()];
    if layers.is_empty() {
        return layers;
    }

    let mut start: Vec<(i32, usize, String)> = Vec::new();
    for (idx, id) in g.nodes().enumerate() {
        let r = g.node(id).and_then(|n| n.rank).unwrap_or(i32::MAX);
        start.push((r, idx, id.to_string()));
    }
    start.sort();

    fn dfs(
        g: &LayeredGraph,
        v: &str,
        visited: &mut HashMap<String, ()>,
        layers: &mut [Vec<String>],
    ) {
        if visited.insert(v.to_string(), ()).is_some() {
            return;
        }
        if let Some(layer) = g
            .node(v)
            .and_then(|n| n.rank)
            .and_then(|r| layers.get_mut(r.max(0) as usize))
        {
            layer.push(v.to_string());
        }
        for w in g.successors(v) {
            dfs(g, w, visited, layers);
        }
    }

    let mut visited: HashMap<String, ()> = HashMap::default();
    for (_, _, v) in start {
        dfs(g, &v, &mut visited, &mut layers);
    }
    layers
}

/// Weighted number of crossings between every pair of adjacent ranks.
pub fn cross_count(g: &LayeredGraph, layering: &[Vec<String>]) -> f64 {
    let mut cc: f64 = 0.0;
    for i in 1..layering.len() {
        cc += two_layer_cross_count(g, &layering[i - 1], &layering[i]);
    }
    cc
}

fn two_layer_cross_count(g: &LayeredGraph, north: &[String], south: &[String]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }

    let south_pos: HashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut south_entries: Vec<(usize, f64)> = Vec::new();
    for v in north {
        let mut entries: Vec<(usize, f64)> = g
            .out_edges(v)
            .into_iter()
            .filter_map(|e| {
                let pos = *south_pos.get(e.w.as_str())?;
                let weight = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(1.0);
                Some((pos, weight))
            })
            .collect();
        entries.sort_by_key(|(pos, _)| *pos);
        south_entries.extend(entries);
    }

    // Accumulator tree over south positions.
    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<f64> = vec![0.0; tree_size];

    let mut cc: f64 = 0.0;
    for (pos, weight) in south_entries {
        let mut index = pos + first_index;
        tree[index] += weight;
        let mut weight_sum: f64 = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        cc += weight * weight_sum;
    }

    cc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// Order a rank by its predecessors in the rank above.
    InEdges,
    /// Order a rank by its successors in the rank below.
    OutEdges,
}

/// Weighted mean position of each node's neighbors in `fixed`. `None` for nodes without any.
pub fn barycenters(
    g: &LayeredGraph,
    movable: &[String],
    fixed: &[String],
    rel: Relationship,
) -> Vec<Option<f64>> {
    let fixed_pos: HashMap<&str, usize> = fixed
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    movable
        .iter()
        .map(|v| {
            let edges = match rel {
                Relationship::InEdges => g.in_edges(v),
                Relationship::OutEdges => g.out_edges(v),
            };
            let mut sum = 0.0;
            let mut weight = 0.0;
            for e in edges {
                let other = match rel {
                    Relationship::InEdges => e.v.as_str(),
                    Relationship::OutEdges => e.w.as_str(),
                };
                let Some(&pos) = fixed_pos.get(other) else {
                    continue;
                };
                let w = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(1.0);
                sum += w * pos as f64;
                weight += w;
            }
            (weight > 0.0).then(|| sum / weight)
        })
        .collect()
}

/// Stable reorder: nodes with a barycenter are sorted by it, nodes without one keep their index.
pub fn sort_by_barycenter(layer: &[String], bc: &[Option<f64>]) -> Vec<String> {
    let mut sortable: Vec<(f64, usize)> = Vec::new();
    let mut fixed: Vec<usize> = Vec::new();
    for (i, b) in bc.iter().enumerate() {
        match b {
            Some(b) => sortable.push((*b, i)),
            None => fixed.push(i),
        }
    }
    sortable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut out: Vec<String> = Vec::with_capacity(layer.len());
    let mut sortable = sortable.into_iter();
    let mut fixed = fixed.into_iter().peekable();
    while out.len() < layer.len() {
        if fixed.peek() == Some(&out.len()) {
            let i = fixed.next().unwrap_or_default();
            out.push(layer[i].clone());
        } else if let Some((_, i)) = sortable.next() {
            out.push(layer[i].clone());
        } else if let Some(i) = fixed.next() {
            out.push(layer[i].clone());
        } else {
            break;
        }
    }
    out
}

fn sweep(g: &LayeredGraph, layering: &mut [Vec<String>], down: bool) {
    if layering.len() < 2 {
        return;
    }
    if down {
        for r in 1..layering.len() {
            let bc = barycenters(g, &layering[r], &layering[r - 1], Relationship::InEdges);
            layering[r] = sort_by_barycenter(&layering[r], &bc);
        }
    } else {
        for r in (0..layering.len() - 1).rev() {
            let bc = barycenters(g, &layering[r], &layering[r + 1], Relationship::OutEdges);
            layering[r] = sort_by_barycenter(&layering[r], &bc);
        }
    }
}

/// Computes an ordering and stores it in each node's `order`.
pub fn order(g: &mut LayeredGraph) {
    let mut layering = init_order(g);
    let mut best = layering.clone();
    let mut best_cc = cross_count(g, &best);

    let mut i = 0usize;
    let mut last_best = 0usize;
    while last_best < MAX_STALE_SWEEPS && best_cc > 0.0 {
        sweep(g, &mut layering, i % 2 == 0);
        let cc = cross_count(g, &layering);
        if cc < best_cc {
            best_cc = cc;
            best = layering.clone();
            last_best = 0;
        } else {
            last_best += 1;
        }
        i += 1;
    }

    for layer in &best {
        for (idx, v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = Some(idx);
            }
        }
    }
}

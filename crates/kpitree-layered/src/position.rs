//! Coordinate assignment.
//!
//! Ranks are stacked along y using the tallest node of each rank. Along x every rank starts packed
//! and centered on zero, then alternating sweeps pull each node toward the weighted mean x of its
//! neighbors in the adjacent rank. A sweep never reorders a rank and never brings two neighbors
//! closer than `nodesep`.

use crate::LayeredGraph;
use rustc_hash::FxHashMap as HashMap;

/// Down/up sweep pairs. The last sweep of each pair is upward, which centers parents over their
/// children.
const SWEEP_PAIRS: usize = 4;

/// Node ids grouped by rank, each rank sorted by `order` (insertion order when unset).
pub fn layer_matrix(g: &LayeredGraph) -> Vec<Vec<String>> {
    let mut layers = crate::rank::layers(g);
    for layer in &mut layers {
        layer.sort_by_key(|id| g.node(id).and_then(|n| n.order).unwrap_or(usize::MAX));
    }
    layers
}

pub fn position(g: &mut LayeredGraph) {
    let layering = layer_matrix(g);
    position_y(g, &layering);
    let xs = position_x(g, &layering);
    g.for_each_node_mut(|id, n| {
        if let Some(&x) = xs.get(id) {
            n.x = Some(x);
        }
    });
}

fn position_y(g: &mut LayeredGraph, layering: &[Vec<String>]) {
    let rank_sep = g.graph().ranksep;
    let mut prev_y: f64 = 0.0;
    for ids in layering {
        let mut max_h: f64 = 0.0;
        for id in ids {
            if let Some(n) = g.node(id) {
                max_h = max_h.max(n.height);
            }
        }
        for id in ids {
            if let Some(n) = g.node_mut(id) {
                n.y = Some(prev_y + max_h / 2.0);
            }
        }
        prev_y += max_h + rank_sep;
    }
}

pub fn position_x(g: &LayeredGraph, layering: &[Vec<String>]) -> HashMap<String, f64> {
    let node_sep = g.graph().nodesep;
    let width = |id: &str| g.node(id).map(|n| n.width).unwrap_or(0.0);

    let mut xs: HashMap<String, f64> = HashMap::default();
    for ids in layering {
        let total: f64 = ids.iter().map(|id| width(id)).sum::<f64>()
            + node_sep * ids.len().saturating_sub(1) as f64;
        let mut cursor = -total / 2.0;
        for id in ids {
            let w = width(id);
            xs.insert(id.clone(), cursor + w / 2.0);
            cursor += w + node_sep;
        }
    }

    for _ in 0..SWEEP_PAIRS {
        for r in 1..layering.len() {
            align_layer(g, &layering[r], &mut xs, true);
        }
        for r in (0..layering.len().saturating_sub(1)).rev() {
            align_layer(g, &layering[r], &mut xs, false);
        }
    }

    xs
}

fn align_layer(g: &LayeredGraph, ids: &[String], xs: &mut HashMap<String, f64>, down: bool) {
    if ids.is_empty() {
        return;
    }
    let node_sep = g.graph().nodesep;
    let Some(rank) = g.node(&ids[0]).and_then(|n| n.rank) else {
        return;
    };
    let neighbor_rank = if down { rank - 1 } else { rank + 1 };

    let desired: Vec<f64> = ids
        .iter()
        .map(|v| {
            let edges = if down { g.in_edges(v) } else { g.out_edges(v) };
            let mut sum = 0.0;
            let mut weight = 0.0;
            for e in edges {
                let other = if down { &e.v } else { &e.w };
                if g.node(other).and_then(|n| n.rank) != Some(neighbor_rank) {
                    continue;
                }
                let Some(&x) = xs.get(other) else {
                    continue;
                };
                let w = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(1.0);
                sum += w * x;
                weight += w;
            }
            if weight > 0.0 {
                sum / weight
            } else {
                xs.get(v).copied().unwrap_or(0.0)
            }
        })
        .collect();

    let widths: Vec<f64> = ids
        .iter()
        .map(|id| g.node(id).map(|n| n.width).unwrap_or(0.0))
        .collect();
    let placed = place_in_order(&desired, &widths, node_sep);
    for (id, x) in ids.iter().zip(placed) {
        xs.insert(id.clone(), x);
    }
}

/// Places centers as close to `desired` as a left push and a right push allow, keeping order and
/// the minimum gap between consecutive footprints. The result is the mean of both pushes, so every
/// gap is still at least `node_sep`.
pub fn place_in_order(desired: &[f64], widths: &[f64], node_sep: f64) -> Vec<f64> {
    let n = desired.len();
    if n == 0 {
        return Vec::new();
    }
    let sep = |i: usize| (widths[i] + widths[i + 1]) / 2.0 + node_sep;

    let mut right = desired.to_vec();
    for i in 1..n {
        right[i] = right[i].max(right[i - 1] + sep(i - 1));
    }
    let mut left = desired.to_vec();
    for i in (0..n - 1).rev() {
        left[i] = left[i].min(left[i + 1] - sep(i));
    }

    right
        .iter()
        .zip(left.iter())
        .map(|(r, l)| (r + l) / 2.0)
        .collect()
}

/// Moves the graph so its bounding box starts at the origin and records its extent.
pub fn translate(g: &mut LayeredGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    g.for_each_node(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            min_x = min_x.min(x - n.width / 2.0);
            min_y = min_y.min(y - n.height / 2.0);
            max_x = max_x.max(x + n.width / 2.0);
            max_y = max_y.max(y + n.height / 2.0);
        }
    });
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }

    g.for_each_node_mut(|_id, n| {
        if let Some(x) = n.x {
            n.x = Some(x - min_x);
        }
        if let Some(y) = n.y {
            n.y = Some(y - min_y);
        }
    });
    let label = g.graph_mut();
    label.width = max_x - min_x;
    label.height = max_y - min_y;
}

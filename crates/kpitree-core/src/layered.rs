use crate::config::{LayeredConfig, NodeFootprint, RankDirection};
use crate::geom::{Point, point};
use crate::model::Position;
use kpitree_layered::{EdgeLabel, GraphLabel, LayeredGraph, NodeLabel, RankDir};
use rustc_hash::FxHashMap;

/// A layered DAG layout backend.
///
/// Implementations return one anchor per node, the center of its footprint. Nodes without edges
/// must still be placed, and the same input in the same order must produce the same anchors.
pub trait LayeredLayout {
    fn anchors(
        &self,
        nodes: &[&str],
        edges: &[(&str, &str)],
        footprint: &NodeFootprint,
        config: &LayeredConfig,
    ) -> FxHashMap<String, Point>;
}

/// The backend bundled with this crate, built on `kpitree-layered`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLayered;

impl LayeredLayout for BuiltinLayered {
    fn anchors(
        &self,
        nodes: &[&str],
        edges: &[(&str, &str)],
        footprint: &NodeFootprint,
        config: &LayeredConfig,
    ) -> FxHashMap<String, Point> {
        let mut g = LayeredGraph::new();
        g.set_graph(GraphLabel {
            rankdir: rank_dir(config.direction),
            nodesep: config.node_spacing,
            ranksep: config.rank_spacing,
            ..Default::default()
        });
        for id in nodes {
            g.set_node(*id, NodeLabel::sized(footprint.width, footprint.height));
        }
        for (v, w) in edges {
            if g.has_node(v) && g.has_node(w) {
                g.set_edge_with_label(*v, *w, EdgeLabel::default());
            }
        }

        kpitree_layered::layout(&mut g);

        let mut out: FxHashMap<String, Point> = FxHashMap::default();
        g.for_each_node(|id, n| {
            if let (Some(x), Some(y)) = (n.x, n.y) {
                out.insert(id.to_string(), point(x, y));
            }
        });
        out
    }
}

fn rank_dir(direction: RankDirection) -> RankDir {
    match direction {
        RankDirection::TB => RankDir::TB,
        RankDirection::BT => RankDir::BT,
        RankDirection::LR => RankDir::LR,
        RankDirection::RL => RankDir::RL,
    }
}

/// Runs `backend` and converts its anchors to top-left positions.
pub fn place<L: LayeredLayout + ?Sized>(
    backend: &L,
    nodes: &[&str],
    edges: &[(&str, &str)],
    footprint: &NodeFootprint,
    config: &LayeredConfig,
) -> FxHashMap<String, Position> {
    backend
        .anchors(nodes, edges, footprint, config)
        .into_iter()
        .map(|(id, anchor)| (id, footprint.position_centered_on(anchor)))
        .collect()
}

//! The layout entry point.
//!
//! A call builds the current view (the focus-filtered tree in hierarchical mode, one island in
//! radial mode), computes a position for every node in it, then lets pinned positions win. Nothing
//! is cached between calls.

use crate::config::{LayoutConfig, LayoutMode, LayoutRequest};
use crate::document::Document;
use crate::layered::{BuiltinLayered, LayeredLayout, place};
use crate::model::{
    Hierarchy, LayoutEdge, LayoutNode, LayoutResult, Position, TopMetric, TreeNode, TreePath,
};
use crate::overrides::OverrideTable;
use crate::radial::{PackRequest, RadialPacker, factor_ring};
use crate::select::select_subgraph;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

/// Default spots for unpinned nodes while the user is placing nodes by hand: each level gets its
/// own column, and siblings step diagonally so none of them hide another.
mod stagger {
    pub const TOP_METRIC_ORIGIN: (f64, f64) = (100.0, 80.0);
    pub const TOP_METRIC_STEP: (f64, f64) = (40.0, 20.0);
    pub const FACTOR_ORIGIN: (f64, f64) = (420.0, 160.0);
    pub const FACTOR_STEP: (f64, f64) = (40.0, 50.0);
    pub const LEVER_ORIGIN_X: f64 = 740.0;
    pub const LEVER_STEP: (f64, f64) = (40.0, 10.0);
}

fn staggered_position(path: TreePath) -> Position {
    use stagger::*;
    match (path.factor, path.lever) {
        (None, _) => {
            let k = path.top as f64;
            Position::new(
                TOP_METRIC_ORIGIN.0 + TOP_METRIC_STEP.0 * k,
                TOP_METRIC_ORIGIN.1 + TOP_METRIC_STEP.1 * k,
            )
        }
        (Some(d), None) => {
            let d = d as f64;
            Position::new(
                FACTOR_ORIGIN.0 + FACTOR_STEP.0 * d,
                FACTOR_ORIGIN.1 + FACTOR_STEP.1 * d,
            )
        }
        (Some(d), Some(l)) => {
            let (d, l) = (d as f64, l as f64);
            Position::new(
                LEVER_ORIGIN_X + LEVER_STEP.0 * l,
                FACTOR_ORIGIN.1 + FACTOR_STEP.1 * d + LEVER_STEP.1 * l,
            )
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine<L = BuiltinLayered> {
    config: LayoutConfig,
    layered: L,
}

impl LayoutEngine<BuiltinLayered> {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            layered: BuiltinLayered,
        }
    }
}

impl<L: LayeredLayout> LayoutEngine<L> {
    pub fn with_backend(config: LayoutConfig, layered: L) -> Self {
        Self { config, layered }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layout(
        &self,
        hierarchy: &Hierarchy,
        overrides: &OverrideTable,
        request: &LayoutRequest,
    ) -> LayoutResult {
        let island_root = match request.mode {
            LayoutMode::Hierarchical => None,
            LayoutMode::Radial => {
                let Some(root) = island(hierarchy, request.island_root_id.as_deref()) else {
                    return LayoutResult::default();
                };
                Some(root)
            }
        };
        let view = match island_root {
            Some((k, metric)) => metric.walk(k),
            None => hierarchical_view(hierarchy, request.focus_id.as_deref()),
        };
        if view.is_empty() {
            return LayoutResult::default();
        }

        let computed: FxHashMap<&str, Position> = if request.manual_positioning {
            view.iter()
                .map(|n| (n.id, staggered_position(n.path)))
                .collect()
        } else {
            match island_root {
                Some((_, metric)) => self.radial_positions(metric),
                None => self.layered_positions(&view),
            }
        };

        let result = assemble(&view, &computed, overrides);
        tracing::debug!(
            mode = %request.mode,
            manual = request.manual_positioning,
            nodes = result.nodes.len(),
            edges = result.edges.len(),
            "layout computed"
        );
        result
    }

    pub fn layout_document(&self, document: &Document, request: &LayoutRequest) -> LayoutResult {
        self.layout(&document.hierarchy, &document.positions, request)
    }

    /// Lays out an untyped document. Input that does not look like a document yields an empty
    /// result instead of an error.
    pub fn layout_value(&self, value: &Value, request: &LayoutRequest) -> LayoutResult {
        let document = Document::from_value_lenient(value);
        self.layout_document(&document, request)
    }

    fn layered_positions<'a>(&self, view: &[TreeNode<'a>]) -> FxHashMap<&'a str, Position> {
        let ids: Vec<&str> = view.iter().map(|n| n.id).collect();
        let edges = view_edges(view);
        let mut placed = place(
            &self.layered,
            &ids,
            &edges,
            &self.config.footprint,
            &self.config.layered,
        );
        ids.into_iter()
            .filter_map(|id| placed.remove(id).map(|p| (id, p)))
            .collect()
    }

    fn radial_positions<'a>(&self, metric: &'a TopMetric) -> FxHashMap<&'a str, Position> {
        let config = &self.config;
        let footprint = &config.footprint;
        let center = config.radial.center_point();
        let offset = config.radial.unplaced_lever_offset;

        let mut out: FxHashMap<&str, Position> = FxHashMap::default();
        out.insert(&metric.id, footprint.position_centered_on(center));

        let ring = factor_ring(metric.factors.len(), config);
        let packer = RadialPacker::new(config);
        for (factor, anchor) in metric.factors.iter().zip(&ring) {
            let factor_pos = footprint.position_centered_on(anchor.point);
            out.insert(&factor.id, factor_pos);

            let packing = packer.pack(&PackRequest {
                center,
                base_radius: config.radial.lever_base_radius(),
                anchor_angle: anchor.angle,
                slot_width: anchor.step,
                count: factor.levers.len(),
            });
            for (idx, lever) in factor.levers.iter().enumerate() {
                let pos = match packing.point(idx) {
                    Some(p) => footprint.position_centered_on(p),
                    None => Position::new(factor_pos.x + offset.x, factor_pos.y + offset.y),
                };
                out.insert(&lever.id, pos);
            }
        }
        out
    }
}

/// The whole tree, or the focus keep-set when `focus_id` names an entry.
fn hierarchical_view<'h>(hierarchy: &'h Hierarchy, focus_id: Option<&str>) -> Vec<TreeNode<'h>> {
    let all = hierarchy.walk();
    let Some(focus_id) = focus_id else {
        return all;
    };
    match select_subgraph(hierarchy, focus_id) {
        Some(keep) => all.into_iter().filter(|n| keep.contains(n.id)).collect(),
        None => {
            tracing::debug!(focus = focus_id, "focus id not found; showing the full tree");
            all
        }
    }
}

/// The island to show: the named top metric, or the first one.
fn island<'h>(hierarchy: &'h Hierarchy, root_id: Option<&str>) -> Option<(usize, &'h TopMetric)> {
    if let Some(id) = root_id {
        if let Some(found) = hierarchy
            .top_metrics
            .iter()
            .enumerate()
            .find(|(_, m)| m.id == id)
        {
            return Some(found);
        }
        tracing::debug!(island = id, "island root not found; using the first top metric");
    }
    hierarchy.top_metrics.first().map(|m| (0, m))
}

/// Parent/child pairs whose endpoints are both in `view`, in child pre-order.
fn view_edges<'a>(view: &[TreeNode<'a>]) -> Vec<(&'a str, &'a str)> {
    let present: FxHashSet<&str> = view.iter().map(|n| n.id).collect();
    view.iter()
        .filter_map(|n| {
            let parent = n.parent?;
            present.contains(parent).then_some((parent, n.id))
        })
        .collect()
}

fn assemble(
    view: &[TreeNode<'_>],
    computed: &FxHashMap<&str, Position>,
    overrides: &OverrideTable,
) -> LayoutResult {
    let nodes = view
        .iter()
        .map(|n| LayoutNode {
            id: n.id.to_string(),
            category: n.category,
            label: n.label.to_string(),
            position: overrides
                .get(n.id)
                .or_else(|| computed.get(n.id).copied())
                .unwrap_or_default(),
        })
        .collect();
    let edges = view_edges(view)
        .into_iter()
        .map(|(source, target)| LayoutEdge::between(source, target))
        .collect();
    LayoutResult { nodes, edges }
}

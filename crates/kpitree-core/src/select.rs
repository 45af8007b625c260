//! Focus filtering for hierarchical mode.
//!
//! What stays visible depends on which level the focus id names: a top metric keeps its whole
//! subtree, a factor keeps its top metric and its own levers, a lever keeps only its ancestor
//! chain.

use crate::model::{Category, Factor, Hierarchy, Lever, TopMetric};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRole<'a> {
    TopMetric {
        metric: &'a TopMetric,
    },
    Factor {
        metric: &'a TopMetric,
        factor: &'a Factor,
    },
    Lever {
        metric: &'a TopMetric,
        factor: &'a Factor,
        lever: &'a Lever,
    },
}

impl<'a> NodeRole<'a> {
    pub fn category(&self) -> Category {
        match self {
            Self::TopMetric { .. } => Category::TopMetric,
            Self::Factor { .. } => Category::Factor,
            Self::Lever { .. } => Category::Lever,
        }
    }

    pub fn top_metric(&self) -> &'a TopMetric {
        match *self {
            Self::TopMetric { metric }
            | Self::Factor { metric, .. }
            | Self::Lever { metric, .. } => metric,
        }
    }

    /// Ids from the top metric down to (excluding) the classified node.
    pub fn ancestors(&self) -> Vec<&'a str> {
        match *self {
            Self::TopMetric { .. } => Vec::new(),
            Self::Factor { metric, .. } => vec![metric.id.as_str()],
            Self::Lever { metric, factor, .. } => vec![metric.id.as_str(), factor.id.as_str()],
        }
    }
}

/// Finds the entry named `id` and reports its level. The first match in pre-order wins.
pub fn classify<'a>(hierarchy: &'a Hierarchy, id: &str) -> Option<NodeRole<'a>> {
    for metric in &hierarchy.top_metrics {
        if metric.id == id {
            return Some(NodeRole::TopMetric { metric });
        }
        for factor in &metric.factors {
            if factor.id == id {
                return Some(NodeRole::Factor { metric, factor });
            }
            if let Some(lever) = factor.levers.iter().find(|l| l.id == id) {
                return Some(NodeRole::Lever {
                    metric,
                    factor,
                    lever,
                });
            }
        }
    }
    None
}

/// Node ids that survive a focus filter. An edge survives when both its endpoints do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet {
    ids: FxHashSet<String>,
}

impl KeepSet {
    fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn keeps_edge(&self, source: &str, target: &str) -> bool {
        self.contains(source) && self.contains(target)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Kept ids in hierarchy pre-order.
    pub fn ordered_ids<'h>(&self, hierarchy: &'h Hierarchy) -> Vec<&'h str> {
        hierarchy
            .walk()
            .into_iter()
            .map(|n| n.id)
            .filter(|id| self.contains(id))
            .collect()
    }
}

/// The keep-set for `focus_id`, or `None` when no entry has that id.
pub fn select_subgraph(hierarchy: &Hierarchy, focus_id: &str) -> Option<KeepSet> {
    let role = classify(hierarchy, focus_id)?;
    let mut keep = KeepSet::default();
    match role {
        NodeRole::TopMetric { metric } => {
            for n in metric.walk(0) {
                keep.insert(n.id);
            }
        }
        NodeRole::Factor { metric, factor } => {
            keep.insert(&metric.id);
            keep.insert(&factor.id);
            for lever in &factor.levers {
                keep.insert(&lever.id);
            }
        }
        NodeRole::Lever {
            metric,
            factor,
            lever,
        } => {
            keep.insert(&metric.id);
            keep.insert(&factor.id);
            keep.insert(&lever.id);
        }
    }
    tracing::debug!(
        focus = focus_id,
        role = %role.category(),
        kept = keep.len(),
        "focus filter applied"
    );
    Some(keep)
}

use crate::model::{Hierarchy, Position};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-pinned positions keyed by node id, in insertion order.
///
/// Entries may name ids that are no longer in the hierarchy. Layout ignores them; [`prune`]
/// removes them.
///
/// [`prune`]: OverrideTable::prune
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: IndexMap<String, Position>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Pins `id` at `position` (a finished drag). Returns the previous pin.
    pub fn commit(&mut self, id: impl Into<String>, position: Position) -> Option<Position> {
        self.entries.insert(id.into(), position)
    }

    pub fn remove(&mut self, id: &str) -> Option<Position> {
        self.entries.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry whose id is not in `hierarchy`, returning the dropped ids.
    pub fn prune(&mut self, hierarchy: &Hierarchy) -> Vec<String> {
        let live: FxHashSet<&str> = hierarchy.walk().into_iter().map(|n| n.id).collect();
        let mut dropped = Vec::new();
        self.entries.retain(|id, _| {
            let keep = live.contains(id.as_str());
            if !keep {
                dropped.push(id.clone());
            }
            keep
        });
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "pruned stale overrides");
        }
        dropped
    }

    /// Unpins every node of the island rooted at `top_metric_id` so the next radial layout places
    /// it from scratch. Returns how many entries were removed.
    pub fn clear_island(&mut self, hierarchy: &Hierarchy, top_metric_id: &str) -> usize {
        let Some(metric) = hierarchy.top_metric(top_metric_id) else {
            return 0;
        };
        let mut removed = 0;
        for n in metric.walk(0) {
            if self.remove(n.id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Reads an `{ id: {x, y} }` object, skipping entries that are not a pair of numbers.
    pub fn from_value_lenient(value: &Value) -> Self {
        let mut table = Self::new();
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("override table is not an object; ignoring it");
            }
            return table;
        };
        for (id, entry) in map {
            let x = entry.get("x").and_then(Value::as_f64);
            let y = entry.get("y").and_then(Value::as_f64);
            match (x, y) {
                (Some(x), Some(y)) => {
                    table.commit(id.clone(), Position::new(x, y));
                }
                _ => tracing::warn!(id = %id, "skipping malformed override entry"),
            }
        }
        table
    }
}

impl FromIterator<(String, Position)> for OverrideTable {
    fn from_iter<T: IntoIterator<Item = (String, Position)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

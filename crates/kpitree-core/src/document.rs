use crate::model::{Hierarchy, TopMetric};
use crate::overrides::OverrideTable;
use crate::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A saved tree together with its pinned positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    #[serde(flatten)]
    pub hierarchy: Hierarchy,
    pub positions: OverrideTable,
}

/// Input shape of [`Document`], spelled out so the legacy field names resolve at the top level.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default, alias = "kpis")]
    top_metrics: Vec<TopMetric>,
    #[serde(default, alias = "overrides")]
    positions: OverrideTable,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Self {
            hierarchy: Hierarchy {
                top_metrics: raw.top_metrics,
            },
            positions: raw.positions,
        }
    }
}

impl Document {
    pub fn new(hierarchy: Hierarchy, positions: OverrideTable) -> Self {
        Self {
            hierarchy,
            positions,
        }
    }

    /// Parses and validates a document: every id must be non-empty and unique across the tree.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Best-effort read. A missing or non-array `topMetrics` gives an empty tree, top metrics
    /// that fail to parse are skipped, and malformed position entries are dropped.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!("document is not a JSON object; using an empty tree");
            return Self::default();
        };

        let metrics = obj.get("topMetrics").or_else(|| obj.get("kpis"));
        let mut hierarchy = Hierarchy::default();
        match metrics.and_then(Value::as_array) {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    match serde_json::from_value::<TopMetric>(item.clone()) {
                        Ok(metric) => hierarchy.top_metrics.push(metric),
                        Err(err) => {
                            tracing::warn!(index = idx, error = %err, "skipping malformed top metric")
                        }
                    }
                }
            }
            None => tracing::warn!("document has no `topMetrics` array; using an empty tree"),
        }

        let positions = obj
            .get("positions")
            .or_else(|| obj.get("overrides"))
            .map(OverrideTable::from_value_lenient)
            .unwrap_or_default();

        Self {
            hierarchy,
            positions,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for n in self.hierarchy.walk() {
            if n.id.is_empty() {
                return Err(Error::InvalidDocument {
                    message: format!("{} with an empty id", n.category),
                });
            }
            if !seen.insert(n.id) {
                return Err(Error::InvalidDocument {
                    message: format!("duplicate id `{}`", n.id),
                });
            }
        }
        Ok(())
    }

    /// Removes positions for ids that are no longer in the tree.
    pub fn prune(&mut self) -> Vec<String> {
        self.positions.prune(&self.hierarchy)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

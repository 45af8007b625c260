use crate::config::NodeFootprint;
use crate::geom::Point;
use serde::{Deserialize, Serialize};

/// The three-level tree: top metrics own factors, factors own levers.
///
/// Ids are unique across all levels. Documents written by older tools spell the levels
/// `kpis` / `drivers` and the labels `name`; both spellings are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    #[serde(default, alias = "kpis")]
    pub top_metrics: Vec<TopMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMetric {
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(default, alias = "drivers")]
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(default)]
    pub levers: Vec<Lever>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lever {
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TopMetric,
    Factor,
    Lever,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopMetric => "top-metric",
            Self::Factor => "factor",
            Self::Lever => "lever",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node sits in the tree: index of its top metric, of its factor within that top metric
/// and of the lever within that factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreePath {
    pub top: usize,
    pub factor: Option<usize>,
    pub lever: Option<usize>,
}

/// A borrowed view of one hierarchy entry, produced by [`Hierarchy::walk`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub category: Category,
    pub parent: Option<&'a str>,
    pub path: TreePath,
}

impl Hierarchy {
    pub fn is_empty(&self) -> bool {
        self.top_metrics.is_empty()
    }

    pub fn top_metric(&self, id: &str) -> Option<&TopMetric> {
        self.top_metrics.iter().find(|m| m.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.top_metrics.iter().map(TopMetric::node_count).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.walk().iter().any(|n| n.id == id)
    }

    /// All entries in pre-order: each top metric, then each of its factors followed by that
    /// factor's levers.
    pub fn walk(&self) -> Vec<TreeNode<'_>> {
        let mut out = Vec::with_capacity(self.node_count());
        for (k, m) in self.top_metrics.iter().enumerate() {
            m.walk_into(k, &mut out);
        }
        out
    }
}

impl TopMetric {
    pub fn node_count(&self) -> usize {
        1 + self
            .factors
            .iter()
            .map(|f| 1 + f.levers.len())
            .sum::<usize>()
    }

    /// Pre-order walk of this subtree; `top` is the metric's index in its hierarchy.
    pub fn walk(&self, top: usize) -> Vec<TreeNode<'_>> {
        let mut out = Vec::with_capacity(self.node_count());
        self.walk_into(top, &mut out);
        out
    }

    fn walk_into<'a>(&'a self, top: usize, out: &mut Vec<TreeNode<'a>>) {
        out.push(TreeNode {
            id: &self.id,
            label: &self.label,
            category: Category::TopMetric,
            parent: None,
            path: TreePath {
                top,
                factor: None,
                lever: None,
            },
        });
        for (d, f) in self.factors.iter().enumerate() {
            out.push(TreeNode {
                id: &f.id,
                label: &f.label,
                category: Category::Factor,
                parent: Some(&self.id),
                path: TreePath {
                    top,
                    factor: Some(d),
                    lever: None,
                },
            });
            for (l, lever) in f.levers.iter().enumerate() {
                out.push(TreeNode {
                    id: &lever.id,
                    label: &lever.label,
                    category: Category::Lever,
                    parent: Some(&f.id),
                    path: TreePath {
                        top,
                        factor: Some(d),
                        lever: Some(l),
                    },
                });
            }
        }
    }
}

/// Top-left corner of a node footprint, in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub category: Category,
    pub label: String,
    pub position: Position,
}

impl LayoutNode {
    /// Center of the node footprint.
    pub fn center(&self, footprint: &NodeFootprint) -> Position {
        Position::new(
            self.position.x + footprint.width / 2.0,
            self.position.y + footprint.height / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl LayoutEdge {
    pub fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Bounding box of every node footprint; `None` when there are no nodes.
    pub fn bounds(&self, footprint: &NodeFootprint) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().flat_map(|n| {
            let Position { x, y } = n.position;
            [(x, y), (x + footprint.width, y + footprint.height)]
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

//! Layout tuning knobs.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only needs to name the
//! values it changes.

use crate::geom::{Point, Vector, point, vector};
use crate::model::Position;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub footprint: NodeFootprint,
    pub layered: LayeredConfig,
    pub radial: RadialConfig,
    pub lever_arc: LeverArcConfig,
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Fixed size shared by every node, plus the gap kept between neighbors on a ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeFootprint {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for NodeFootprint {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 48.0,
            padding: 16.0,
        }
    }
}

impl NodeFootprint {
    /// Center-to-center distance two neighbors on a ring must keep.
    pub fn spacing(&self) -> f64 {
        self.width + self.padding
    }

    pub fn half_extent(&self) -> Vector {
        vector(self.width / 2.0, self.height / 2.0)
    }

    /// Top-left position of a footprint centered on `center`.
    pub fn position_centered_on(&self, center: Point) -> Position {
        Position::from(center - self.half_extent())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayeredConfig {
    pub direction: RankDirection,
    pub node_spacing: f64,
    pub rank_spacing: f64,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            direction: RankDirection::TB,
            node_spacing: 50.0,
            rank_spacing: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialConfig {
    /// Canvas point the island's top metric is centered on.
    pub center: Position,
    /// Lower bound of the factor ring radius.
    pub factor_radius: f64,
    /// Lever rings start this far beyond `factor_radius`.
    pub lever_ring_offset: f64,
    /// Angle of the first factor, in radians. `-π/2` puts it straight above the center.
    pub start_angle: f64,
    /// Where a lever the packer could not place goes, relative to its factor.
    pub unplaced_lever_offset: Position,
    /// Size rings with the exact chord length instead of the arc-length approximation.
    pub exact_chord_spacing: bool,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            center: Position::new(720.0, 420.0),
            factor_radius: 200.0,
            lever_ring_offset: 220.0,
            start_angle: -std::f64::consts::FRAC_PI_2,
            unplaced_lever_offset: Position::new(260.0, 0.0),
            exact_chord_spacing: false,
        }
    }
}

impl RadialConfig {
    pub fn center_point(&self) -> Point {
        point(self.center.x, self.center.y)
    }

    pub fn lever_base_radius(&self) -> f64 {
        self.factor_radius + self.lever_ring_offset
    }
}

/// How much of a factor's angular slot its levers may fan out over, and how rings grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeverArcConfig {
    /// Fraction of the factor slot the lever arc may use.
    pub cap_ratio: f64,
    pub base_arc_degrees: f64,
    pub per_item_degrees: f64,
    pub max_arc_degrees: f64,
    /// Added to the node height to get the radial distance between rings.
    pub ring_gap_padding: f64,
    pub max_rings: usize,
}

impl Default for LeverArcConfig {
    fn default() -> Self {
        Self {
            cap_ratio: 0.8,
            base_arc_degrees: 20.0,
            per_item_degrees: 10.0,
            max_arc_degrees: 140.0,
            ring_gap_padding: 28.0,
            max_rings: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// The whole tree (or its focus-filtered part), layered top-down.
    #[default]
    #[serde(alias = "vertical")]
    Hierarchical,
    /// One top metric's subtree on concentric rings.
    #[serde(alias = "island")]
    Radial,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Radial => "radial",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hierarchical" | "vertical" => Ok(Self::Hierarchical),
            "radial" | "island" => Ok(Self::Radial),
            _ => Err(Error::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Per-call view selection: which mode, which focus, and whether the user is placing nodes by
/// hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutRequest {
    pub mode: LayoutMode,
    /// Hierarchical mode only.
    pub focus_id: Option<String>,
    /// Radial mode only.
    pub island_root_id: Option<String>,
    pub manual_positioning: bool,
}

impl LayoutRequest {
    pub fn hierarchical() -> Self {
        Self::default()
    }

    pub fn radial() -> Self {
        Self {
            mode: LayoutMode::Radial,
            ..Self::default()
        }
    }

    pub fn with_focus(mut self, id: impl Into<String>) -> Self {
        self.focus_id = Some(id.into());
        self
    }

    pub fn with_island_root(mut self, id: impl Into<String>) -> Self {
        self.island_root_id = Some(id.into());
        self
    }

    pub fn with_manual_positioning(mut self, manual: bool) -> Self {
        self.manual_positioning = manual;
        self
    }
}

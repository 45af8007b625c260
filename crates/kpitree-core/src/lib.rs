#![forbid(unsafe_code)]

//! Layout engine for metric trees.
//!
//! A tree of top metrics, their contributing factors and the levers that move each factor is laid
//! out either as a layered top-down diagram or as rings around a single top metric. Positions the
//! user pinned always win over computed ones.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod geom;
pub mod layered;
pub mod model;
pub mod overrides;
pub mod radial;
pub mod select;

pub use config::{LayoutConfig, LayoutMode, LayoutRequest};
pub use document::Document;
pub use engine::LayoutEngine;
pub use error::{Error, Result};
pub use model::{
    Category, Factor, Hierarchy, LayoutEdge, LayoutNode, LayoutResult, Lever, Position, TopMetric,
};
pub use overrides::OverrideTable;
pub use select::{KeepSet, NodeRole, classify, select_subgraph};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

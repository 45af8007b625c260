//! Ring placement for radial mode.
//!
//! Factors sit on one ring around the top metric. Each factor owns an angular slot, and its levers
//! fan out inside that slot over one or more concentric rings further out. A ring only takes as
//! many levers as fit at the ring's radius without two neighbors coming closer than the footprint
//! spacing, so crowded factors spill onto larger rings instead of squeezing.

use crate::config::{LayoutConfig, LeverArcConfig, NodeFootprint};
use crate::geom::{
    ANGLE_EPSILON, CirclePoint, Point, min_radius_for_arc, min_radius_for_chord,
    min_step_for_arc, min_step_for_chord, points_on_circle, polar,
};

/// One factor's lever fan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackRequest {
    pub center: Point,
    /// Radius of the innermost lever ring.
    pub base_radius: f64,
    /// Direction of the owning factor, in radians.
    pub anchor_angle: f64,
    /// Angular width the fan may use before reaching the neighboring factor's fan.
    pub slot_width: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    pub point: Point,
    pub angle: f64,
    pub radius: f64,
    /// Zero for the innermost ring.
    pub ring: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packing {
    /// In request order: item `i` of the fan is `placed[i]`.
    pub placed: Vec<PlacedItem>,
    /// Items left over once the ring budget ran out.
    pub unplaced: usize,
}

impl Packing {
    pub fn point(&self, index: usize) -> Option<Point> {
        self.placed.get(index).map(|p| p.point)
    }

    pub fn rings_used(&self) -> usize {
        self.placed.iter().map(|p| p.ring + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RadialPacker<'a> {
    footprint: &'a NodeFootprint,
    arc: &'a LeverArcConfig,
    exact_chord: bool,
}

impl<'a> RadialPacker<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            footprint: &config.footprint,
            arc: &config.lever_arc,
            exact_chord: config.radial.exact_chord_spacing,
        }
    }

    /// Angular spread of a fan of `count` levers: grows per item up to the configured maximum,
    /// never wider than `cap_ratio` of the slot.
    pub fn desired_arc(&self, count: usize, slot_width: f64) -> f64 {
        let per_item = self.arc.per_item_degrees * count.saturating_sub(1) as f64;
        let degrees = (self.arc.base_arc_degrees + per_item).min(self.arc.max_arc_degrees);
        (slot_width * self.arc.cap_ratio).min(degrees.to_radians())
    }

    pub fn ring_gap(&self) -> f64 {
        self.footprint.height + self.arc.ring_gap_padding
    }

    pub fn ring_radius(&self, base_radius: f64, ring: usize) -> f64 {
        base_radius + ring as f64 * self.ring_gap()
    }

    /// Smallest angle between neighbors on a ring of `radius`.
    pub fn min_step(&self, radius: f64) -> f64 {
        if self.exact_chord {
            min_step_for_chord(radius, self.footprint.spacing())
        } else {
            min_step_for_arc(radius, self.footprint.spacing())
        }
    }

    /// How many items fit across `arc` on a ring of `radius`. Always at least one.
    pub fn ring_capacity(&self, arc: f64, radius: f64) -> usize {
        let fit = (arc / self.min_step(radius).max(ANGLE_EPSILON)).floor();
        if fit.is_finite() && fit > 0.0 {
            fit as usize + 1
        } else {
            1
        }
    }

    pub fn pack(&self, request: &PackRequest) -> Packing {
        let count = request.count;
        if count == 0 {
            return Packing::default();
        }

        if count == 1 {
            let radius = request.base_radius.max(self.footprint.spacing());
            return Packing {
                placed: vec![PlacedItem {
                    point: polar(request.center, radius, request.anchor_angle),
                    angle: request.anchor_angle,
                    radius,
                    ring: 0,
                }],
                unplaced: 0,
            };
        }

        let arc = self.desired_arc(count, request.slot_width);
        let mut placed: Vec<PlacedItem> = Vec::with_capacity(count);
        let mut remaining = count;
        let mut ring = 0usize;

        while remaining > 0 && ring < self.arc.max_rings {
            let radius = self.ring_radius(request.base_radius, ring);
            let capacity = self.ring_capacity(arc, radius);

            // A ring that holds a single item cannot spread the fan; move outward.
            if capacity <= 1 && arc > 0.0 {
                tracing::trace!(ring, radius, "lever ring too small, skipping");
                ring += 1;
                continue;
            }

            let take = remaining.min(capacity);
            let delta = if take > 1 {
                arc / (take - 1) as f64
            } else {
                0.0
            };
            for i in 0..take {
                let offset = if take == 1 {
                    0.0
                } else {
                    -arc / 2.0 + i as f64 * delta
                };
                let angle = request.anchor_angle + offset;
                placed.push(PlacedItem {
                    point: polar(request.center, radius, angle),
                    angle,
                    radius,
                    ring,
                });
            }
            tracing::trace!(ring, radius, capacity, placed = take, "lever ring filled");

            remaining -= take;
            ring += 1;
        }

        if remaining > 0 {
            tracing::warn!(
                count,
                unplaced = remaining,
                max_rings = self.arc.max_rings,
                "lever rings exhausted; remaining levers fall back to their factor offset"
            );
        }

        Packing {
            placed,
            unplaced: remaining,
        }
    }
}

/// Radius of the factor ring for `factor_count` factors: the configured minimum, widened until
/// neighbors keep the footprint spacing.
pub fn factor_ring_radius(factor_count: usize, config: &LayoutConfig) -> f64 {
    if factor_count == 0 {
        return config.radial.factor_radius;
    }
    let step = std::f64::consts::TAU / factor_count as f64;
    let spacing = config.footprint.spacing();
    let needed = if config.radial.exact_chord_spacing {
        min_radius_for_chord(step, spacing)
    } else {
        min_radius_for_arc(step, spacing)
    };
    config.radial.factor_radius.max(needed)
}

/// Anchor points of the factor ring, starting at the configured start angle.
pub fn factor_ring(factor_count: usize, config: &LayoutConfig) -> Vec<CirclePoint> {
    points_on_circle(
        factor_count,
        config.radial.center_point(),
        factor_ring_radius(factor_count, config),
        config.radial.start_angle,
    )
}

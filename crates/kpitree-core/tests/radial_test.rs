use kpitree_core::LayoutConfig;
use kpitree_core::geom::point;
use kpitree_core::radial::{PackRequest, RadialPacker, factor_ring, factor_ring_radius};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

fn request(count: usize, anchor_angle: f64, slot_width: f64) -> PackRequest {
    PackRequest {
        center: point(0.0, 0.0),
        base_radius: 420.0,
        anchor_angle,
        slot_width,
        count,
    }
}

fn exact_chord_config() -> LayoutConfig {
    let mut config = LayoutConfig::default();
    config.radial.exact_chord_spacing = true;
    config
}

#[test]
fn no_levers_no_positions() {
    let config = LayoutConfig::default();
    let packing = RadialPacker::new(&config).pack(&request(0, 0.0, TAU));
    assert!(packing.placed.is_empty());
    assert_eq!(packing.unplaced, 0);
    assert_eq!(packing.rings_used(), 0);
}

#[test]
fn single_lever_sits_on_the_anchor_angle() {
    let config = LayoutConfig::default();
    let packer = RadialPacker::new(&config);
    for anchor in [-FRAC_PI_2, 0.3, PI] {
        let packing = packer.pack(&request(1, anchor, FRAC_PI_2));
        assert_eq!(packing.placed.len(), 1);
        let item = packing.placed[0];
        assert_eq!(item.angle, anchor);
        assert_eq!(item.radius, 420.0);
        assert!((item.point.x - 420.0 * anchor.cos()).abs() < 1e-9);
        assert!((item.point.y - 420.0 * anchor.sin()).abs() < 1e-9);
    }
}

#[test]
fn single_lever_radius_never_drops_below_the_spacing() {
    let config = LayoutConfig::default();
    let mut req = request(1, 0.0, TAU);
    req.base_radius = 50.0;
    let packing = RadialPacker::new(&config).pack(&req);
    assert_eq!(packing.placed[0].radius, 196.0);
    assert!((packing.placed[0].point.x - 196.0).abs() < 1e-9);
}

#[test]
fn desired_arc_grows_per_item_and_respects_caps() {
    let config = LayoutConfig::default();
    let packer = RadialPacker::new(&config);
    assert!((packer.desired_arc(2, TAU) - 30f64.to_radians()).abs() < 1e-12);
    assert!((packer.desired_arc(5, FRAC_PI_2) - 60f64.to_radians()).abs() < 1e-12);
    // Hard maximum.
    assert!((packer.desired_arc(20, TAU) - 140f64.to_radians()).abs() < 1e-12);
    // Slot cap: 0.8 of a 30° slot.
    let slot = 30f64.to_radians();
    assert!((packer.desired_arc(10, slot) - slot * 0.8).abs() < 1e-12);
}

#[test]
fn ring_capacity_counts_fence_posts() {
    let config = LayoutConfig::default();
    let packer = RadialPacker::new(&config);
    // 196 / 420 ≈ 0.467 rad between neighbors.
    assert_eq!(packer.ring_capacity(30f64.to_radians(), 420.0), 2);
    assert_eq!(packer.ring_capacity(0.1, 420.0), 1);
    assert_eq!(packer.ring_capacity(0.0, 420.0), 1);
    assert_eq!(packer.ring_gap(), 76.0);
    assert_eq!(packer.ring_radius(420.0, 2), 572.0);
}

#[test]
fn two_levers_straddle_the_anchor() {
    let config = LayoutConfig::default();
    let packing = RadialPacker::new(&config).pack(&request(2, -FRAC_PI_2, FRAC_PI_2));
    assert_eq!(packing.placed.len(), 2);
    let a = packing.placed[0].point;
    let b = packing.placed[1].point;
    assert!((a.x + 108.704).abs() < 1e-3, "{a:?}");
    assert!((a.y + 405.6888).abs() < 1e-3, "{a:?}");
    assert!((b.x - 108.704).abs() < 1e-3, "{b:?}");
    assert!((b.y + 405.6888).abs() < 1e-3, "{b:?}");
}

#[test]
fn overflow_moves_to_the_next_ring() {
    let config = LayoutConfig::default();
    let packing = RadialPacker::new(&config).pack(&request(3, -FRAC_PI_2, FRAC_PI_2));
    assert_eq!(packing.placed.len(), 3);
    assert_eq!(packing.rings_used(), 2);
    let third = packing.placed[2];
    assert_eq!(third.ring, 1);
    assert_eq!(third.radius, 496.0);
    assert_eq!(third.angle, -FRAC_PI_2);
    assert!(third.point.x.abs() < 1e-9);
    assert!((third.point.y + 496.0).abs() < 1e-9);
}

/// Largest factor count whose slots still hold 29 levers within the ring limit.
const FACTORS_WITHOUT_DROPS: usize = 22;

/// Same-ring neighbors keep the footprint spacing along the arc, and along the chord too when
/// chord spacing is on. Rings sit a fixed gap apart.
fn assert_packing_is_spread(config: &LayoutConfig) {
    let packer = RadialPacker::new(config);
    let spacing = config.footprint.spacing();
    let gap = packer.ring_gap();
    let exact = config.radial.exact_chord_spacing;

    for factors in 1..=40usize {
        let slot = TAU / factors as f64;
        for k in 0..factors {
            let anchor = -FRAC_PI_2 + k as f64 * slot;
            for count in 0..30usize {
                let packing = packer.pack(&request(count, anchor, slot));
                assert_eq!(
                    packing.placed.len() + packing.unplaced,
                    count,
                    "factors={factors} count={count}"
                );
                if factors <= FACTORS_WITHOUT_DROPS {
                    assert_eq!(packing.unplaced, 0, "factors={factors} count={count}");
                }

                for item in &packing.placed {
                    assert!(
                        (item.angle - anchor).abs() <= slot * 0.4 + 1e-12,
                        "lever leaves its slot: factors={factors} count={count}"
                    );
                    if count > 1 {
                        assert!((item.radius - (420.0 + item.ring as f64 * gap)).abs() < 1e-9);
                    }
                }

                for (i, a) in packing.placed.iter().enumerate() {
                    for b in &packing.placed[i + 1..] {
                        if a.ring != b.ring {
                            assert!((a.radius - b.radius).abs() >= gap - 1e-9);
                            continue;
                        }
                        let arc = (a.angle - b.angle).abs() * a.radius;
                        assert!(
                            arc >= spacing - 1e-6,
                            "factors={factors} count={count} ring={} arc={arc}",
                            a.ring
                        );
                        if exact {
                            let d = (a.point - b.point).length();
                            assert!(
                                d >= spacing - 1e-6,
                                "factors={factors} count={count} ring={} distance={d}",
                                a.ring
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn arc_spacing_can_leave_chords_short_of_the_footprint() {
    // 20 factors, 23 levers: the two-item ring is 196 apart along the arc, a bit less straight.
    let config = LayoutConfig::default();
    let slot = TAU / 20.0;
    let packing = RadialPacker::new(&config).pack(&request(23, -FRAC_PI_2, slot));
    let spacing = config.footprint.spacing();
    let mut shortest = f64::INFINITY;
    for (i, a) in packing.placed.iter().enumerate() {
        for b in packing.placed[i + 1..].iter().filter(|b| b.ring == a.ring) {
            assert!((a.angle - b.angle).abs() * a.radius >= spacing - 1e-6);
            shortest = shortest.min((a.point - b.point).length());
        }
    }
    assert!(shortest < spacing, "shortest={shortest}");

    let exact = exact_chord_config();
    let packing = RadialPacker::new(&exact).pack(&request(23, -FRAC_PI_2, slot));
    for (i, a) in packing.placed.iter().enumerate() {
        for b in packing.placed[i + 1..].iter().filter(|b| b.ring == a.ring) {
            assert!((a.point - b.point).length() >= spacing - 1e-6);
        }
    }
}

#[test]
fn packed_levers_keep_their_spacing() {
    assert_packing_is_spread(&LayoutConfig::default());
}

#[test]
fn packed_levers_keep_their_spacing_with_exact_chords() {
    assert_packing_is_spread(&exact_chord_config());
}

#[test]
fn packing_is_deterministic() {
    let config = LayoutConfig::default();
    let packer = RadialPacker::new(&config);
    let req = request(17, 0.7, TAU / 5.0);
    assert_eq!(packer.pack(&req), packer.pack(&req));
}

#[test]
fn crowded_slots_run_out_of_rings() {
    let config = LayoutConfig::default();
    let packing = RadialPacker::new(&config).pack(&request(30, -FRAC_PI_2, TAU / 23.0));
    assert!(packing.unplaced > 0);
    assert_eq!(packing.placed.len() + packing.unplaced, 30);
    assert!(packing.rings_used() <= 20);
}

#[test]
fn factor_ring_radius_widens_for_many_factors() {
    let config = LayoutConfig::default();
    assert_eq!(factor_ring_radius(0, &config), 200.0);
    assert_eq!(factor_ring_radius(1, &config), 200.0);
    assert_eq!(factor_ring_radius(4, &config), 200.0);
    let ten = factor_ring_radius(10, &config);
    assert!((ten - 196.0 / (TAU / 10.0)).abs() < 1e-9);

    let exact = factor_ring_radius(10, &exact_chord_config());
    assert!((exact - 196.0 / (2.0 * (PI / 10.0).sin())).abs() < 1e-9);
    assert!(exact > ten);
}

#[test]
fn factor_ring_starts_straight_up() {
    let config = LayoutConfig::default();
    let ring = factor_ring(2, &config);
    assert_eq!(ring.len(), 2);
    assert!((ring[0].point.x - 720.0).abs() < 1e-9);
    assert!((ring[0].point.y - 220.0).abs() < 1e-9);
    assert!((ring[1].point.x - 720.0).abs() < 1e-9);
    assert!((ring[1].point.y - 620.0).abs() < 1e-9);
    assert_eq!(ring[0].step, PI);
}

use kpitree_layered::position;

#[test]
fn place_in_order_keeps_desired_positions_when_they_fit() {
    let placed = position::place_in_order(&[0.0, 300.0], &[100.0, 100.0], 50.0);
    assert_eq!(placed, vec![0.0, 300.0]);
}

#[test]
fn place_in_order_spreads_colliding_nodes_symmetrically() {
    let placed = position::place_in_order(&[0.0, 0.0], &[180.0, 180.0], 50.0);
    assert_eq!(placed, vec![-115.0, 115.0]);
}

#[test]
fn place_in_order_never_violates_separation() {
    let widths = [180.0, 60.0, 120.0, 180.0, 40.0];
    let desired = [10.0, -40.0, 0.0, 500.0, 490.0];
    let placed = position::place_in_order(&desired, &widths, 50.0);
    for i in 1..placed.len() {
        let gap = placed[i] - placed[i - 1];
        let min = (widths[i] + widths[i - 1]) / 2.0 + 50.0;
        assert!(gap >= min - 1e-9, "gap {gap} < {min} at {i}");
    }
}

#[test]
fn place_in_order_handles_empty_input() {
    assert!(position::place_in_order(&[], &[], 50.0).is_empty());
}

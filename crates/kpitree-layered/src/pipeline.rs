use crate::{LayeredGraph, coordinate_system, order, position, rank};

/// Lays out `g` in place: every node receives `rank`, `order`, `x` and `y` (footprint center),
/// and the graph label receives the overall `width` / `height`.
pub fn layout(g: &mut LayeredGraph) {
    if g.node_count() == 0 {
        return;
    }
    coordinate_system::adjust(g);
    rank::rank(g);
    order::order(g);
    position::position(g);
    coordinate_system::undo(g);
    position::translate(g);
}

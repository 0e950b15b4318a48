//! Axis-aligned intersection predicates used by the bin and the stability test.

/// Position of an axis-aligned box's lower-near-left corner.
pub type Point3 = (f64, f64, f64);

/// Width/height/depth extent of an axis-aligned box.
pub type Extent3 = (f64, f64, f64);

/// Index into a `Point3`/`Extent3` triple: 0=width, 1=height, 2=depth.
pub const WIDTH: usize = 0;
pub const HEIGHT: usize = 1;
pub const DEPTH: usize = 2;

#[inline]
fn axis(p: Point3, i: usize) -> f64 {
    match i {
        WIDTH => p.0,
        HEIGHT => p.1,
        _ => p.2,
    }
}

/// True iff the two boxes' projections onto axes `ax`/`ay` overlap on an open
/// interval (touching edges do not count as intersecting).
pub fn rect_intersect(
    pos1: Point3,
    dim1: Extent3,
    pos2: Point3,
    dim2: Extent3,
    ax: usize,
    ay: usize,
) -> bool {
    let (d1x, d1y) = (axis(dim1, ax), axis(dim1, ay));
    let (d2x, d2y) = (axis(dim2, ax), axis(dim2, ay));
    let cx1 = axis(pos1, ax) + d1x / 2.0;
    let cy1 = axis(pos1, ay) + d1y / 2.0;
    let cx2 = axis(pos2, ax) + d2x / 2.0;
    let cy2 = axis(pos2, ay) + d2y / 2.0;

    let ix = (cx1 - cx2).abs();
    let iy = (cy1 - cy2).abs();

    ix < (d1x + d2x) / 2.0 && iy < (d1y + d2y) / 2.0
}

/// True iff two axis-aligned boxes overlap on all three dimensions (open intervals).
pub fn intersect(pos1: Point3, dim1: Extent3, pos2: Point3, dim2: Extent3) -> bool {
    rect_intersect(pos1, dim1, pos2, dim2, WIDTH, HEIGHT)
        && rect_intersect(pos1, dim1, pos2, dim2, HEIGHT, DEPTH)
        && rect_intersect(pos1, dim1, pos2, dim2, WIDTH, DEPTH)
}

/// Strict open-interval overlap of two 2D rectangles, used by the non-stackable
/// adjacency rule on the X-Z footprint.
pub fn rect_overlap(x1: f64, y1: f64, w1: f64, d1: f64, x2: f64, y2: f64, w2: f64, d2: f64) -> bool {
    x1 < x2 + w2 && x1 + w1 > x2 && y1 < y2 + d2 && y1 + d1 > y2
}

/// `max(0, min(a1,b1) - max(a0,b0))` after truncating each endpoint to an
/// integer. Stands in for interval-intersection length across the fix-point
/// relaxation and the support-ratio stability test; see design notes on why
/// this must not be replaced with exact real-interval arithmetic.
pub fn int_overlap_count(a0: f64, a1: f64, b0: f64, b1: f64) -> i64 {
    let a0 = a0.floor() as i64;
    let a1 = a1.floor() as i64;
    let b0 = b0.floor() as i64;
    let b1 = b1.floor() as i64;
    (a1.min(b1) - a0.max(b0)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = ((0.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        let b = ((2.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        assert!(!intersect(a.0, a.1, b.0, b.1));
    }

    #[test]
    fn overlapping_boxes_intersect() {
        let a = ((0.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        let b = ((1.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        assert!(intersect(a.0, a.1, b.0, b.1));
    }

    #[test]
    fn rect_overlap_is_strict() {
        assert!(!rect_overlap(0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 2.0, 2.0));
        assert!(rect_overlap(0.0, 0.0, 2.0, 2.0, 1.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn int_overlap_count_matches_integer_ranges() {
        // [0,3) and [2,5) share {2} -> count 1
        assert_eq!(int_overlap_count(0.0, 3.0, 2.0, 5.0), 1);
        // disjoint ranges
        assert_eq!(int_overlap_count(0.0, 2.0, 2.0, 4.0), 0);
    }
}

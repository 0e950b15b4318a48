//! Bin model: occupancy registry, placement pipeline, fix-point relaxation,
//! stability tests, non-stackable adjacency, corner reinforcements (component C).

use log::{debug, trace};

use crate::geometry::{self, int_overlap_count, Extent3, Point3};
use crate::item::{Dimensions, Item, Rotation, Shape};
use crate::Error;

/// A committed axis-aligned occupancy box in a bin's `fit_items` registry.
#[derive(Debug, Clone, Copy)]
pub struct OccupancyBox {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub z0: f64,
    pub z1: f64,
}

impl OccupancyBox {
    fn from_pivot(pivot: Point3, dim: Extent3) -> Self {
        OccupancyBox {
            x0: pivot.0,
            x1: pivot.0 + dim.0,
            y0: pivot.1,
            y1: pivot.1 + dim.1,
            z0: pivot.2,
            z1: pivot.2 + dim.2,
        }
    }
}

/// A committed placement: a snapshot of the item descriptor plus the
/// position and rotation it was committed under. Base `width`/`height`/`depth`
/// on `item.dimensions` are never permuted; `rotation` records the committed
/// orientation separately, per the data-only external contract.
#[derive(Debug, Clone)]
pub struct PlacedItem {
    pub item: Item,
    pub position: Point3,
    pub rotation: Rotation,
}

impl PlacedItem {
    /// The item's extent as actually occupied in the bin.
    pub fn placed_dimension(&self) -> Dimensions {
        self.item.get_dimension(self.rotation)
    }
}

/// How a bin's committed items are re-ordered by `Packer::put_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutType {
    /// Ordering is left untouched.
    Unspecified,
    /// Sort by Y, then Z, then X (X dominant).
    General,
    /// Sort by X, then Y, then Z (Z dominant).
    OpenTop,
}

impl PutType {
    pub fn from_code(code: i32) -> PutType {
        match code {
            1 => PutType::General,
            2 => PutType::OpenTop,
            _ => PutType::Unspecified,
        }
    }
}

/// An axis-aligned container. Owns the occupancy registry (`fit_items`) and
/// the committed/rejected item lists.
#[derive(Debug)]
pub struct Bin {
    pub name: String,
    pub dimensions: Dimensions,
    pub max_weight: f64,
    pub corner: f64,
    pub put_type: PutType,
    pub items: Vec<PlacedItem>,
    pub unfitted_items: Vec<Item>,
    fit_items: Vec<OccupancyBox>,
    pub fix_point: bool,
    pub check_stable: bool,
    pub support_surface_ratio: f64,
    pub gravity: [f64; 4],
}

impl Bin {
    pub fn new(
        name: impl Into<String>,
        whd: (f64, f64, f64),
        max_weight: f64,
        corner: f64,
        put_type: i32,
    ) -> Result<Bin, Error> {
        let (w, h, d) = whd;
        if w <= 0.0 || h <= 0.0 || d <= 0.0 {
            return Err(Error::InvalidDimensions { w, h, d });
        }
        if max_weight < 0.0 {
            return Err(Error::NegativeWeight(max_weight));
        }
        let dimensions = Dimensions::new(w, h, d);
        Ok(Bin {
            name: name.into(),
            dimensions,
            max_weight,
            corner,
            put_type: PutType::from_code(put_type),
            items: Vec::new(),
            unfitted_items: Vec::new(),
            fit_items: vec![sentinel_floor(dimensions)],
            fix_point: false,
            check_stable: false,
            support_surface_ratio: 0.0,
            gravity: [0.0; 4],
        })
    }

    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|p| p.item.weight).sum()
    }

    /// Occupancy registry, including the sentinel floor row and any corner
    /// reinforcements. Exposed read-only for the `fit_items` row-count invariant.
    pub fn fit_items(&self) -> &[OccupancyBox] {
        &self.fit_items
    }

    /// Tries, in `item.rotations` order, to place `item` with its
    /// lower-near-left corner at `pivot`. Returns `true` and commits on the
    /// first rotation that passes every check. See module docs for the
    /// asymmetric early-exit control flow this mirrors exactly from the
    /// original heuristic.
    pub fn put_item(&mut self, item: &Item, pivot: Point3) -> bool {
        for &rotation in &item.rotations {
            let dim = item.get_dimension(rotation);
            let dim3 = (dim.w, dim.h, dim.d);

            if self.exceeds_boundary(dim3, pivot) {
                trace!("{}: boundary violation for {} at {:?}", self.name, item.partno, pivot);
                continue;
            }

            if self.intersects_any(pivot, dim3) {
                trace!("{}: intersection for {} at {:?}", self.name, item.partno, pivot);
                continue;
            }

            if self.total_weight() + item.weight > self.max_weight {
                trace!("{}: weight exceeded for {}", self.name, item.partno);
                return false;
            }

            let mut commit_pivot = pivot;
            if self.fix_point {
                commit_pivot = self.relax_pivot(commit_pivot, dim3);

                if self.overlaps_non_stackable(commit_pivot, dim3, item.stackable) {
                    trace!("{}: non-stackable overlap for {}", self.name, item.partno);
                    return false;
                }

                if self.check_stable && !self.is_stable(commit_pivot, dim3) {
                    trace!("{}: unstable for {}", self.name, item.partno);
                    return false;
                }
            }

            self.fit_items.push(OccupancyBox::from_pivot(commit_pivot, dim3));
            self.items.push(PlacedItem {
                item: item.clone(),
                position: commit_pivot,
                rotation,
            });
            debug!(
                "{}: committed {} rotation={:?} at {:?}",
                self.name, item.partno, rotation, commit_pivot
            );
            return true;
        }

        false
    }

    fn exceeds_boundary(&self, dim: Extent3, pivot: Point3) -> bool {
        let bin = (self.dimensions.w, self.dimensions.h, self.dimensions.d);
        pivot.0 + dim.0 > bin.0 || pivot.1 + dim.1 > bin.1 || pivot.2 + dim.2 > bin.2
    }

    fn intersects_any(&self, pivot: Point3, dim: Extent3) -> bool {
        self.items
            .iter()
            .any(|p| geometry::intersect(pivot, dim, p.position, to_extent(p.placed_dimension())))
    }

    /// Three-pass fix-point relaxation: snap Y, then X, then Z, repeated
    /// three times. Axis order must be preserved exactly.
    fn relax_pivot(&self, pivot: Point3, dim: Extent3) -> Point3 {
        let mut pivot = pivot;
        for _ in 0..3 {
            let b = OccupancyBox::from_pivot(pivot, dim);
            pivot.1 = self.relax_axis(Axis::Height, b);
            let b = OccupancyBox::from_pivot(pivot, dim);
            pivot.0 = self.relax_axis(Axis::Width, b);
            let b = OccupancyBox::from_pivot(pivot, dim);
            pivot.2 = self.relax_axis(Axis::Depth, b);
        }
        pivot
    }

    /// `check_height`/`check_width`/`check_depth`, generalized to one
    /// function parameterized by axis (SPEC_FULL.md explicitly allows this).
    fn relax_axis(&self, axis: Axis, tentative: OccupancyBox) -> f64 {
        let (a0, _a1, b0, b1, c0, c1, extent) = axis.project(tentative);
        let dim_a = axis.extent(self.dimensions);

        let mut intervals: Vec<(f64, f64)> = self
            .fit_items
            .iter()
            .filter(|row| {
                let (_, _, rb0, rb1, rc0, rc1, _) = axis.project(**row);
                int_overlap_count(rb0, rb1, b0, b1) > 0 && int_overlap_count(rc0, rc1, c0, c1) > 0
            })
            .map(|row| axis.interval(*row))
            .collect();

        intervals.push((0.0, 0.0));
        intervals.push((dim_a, dim_a));
        intervals.sort_by(|x, y| x.1.partial_cmp(&y.1).unwrap());

        for pair in intervals.windows(2) {
            if pair[1].0 - pair[0].1 >= extent {
                return pair[0].1;
            }
        }
        a0
    }

    fn overlaps_non_stackable(&self, pivot: Point3, dim: Extent3, new_stackable: bool) -> bool {
        let (x1, y1, z1) = pivot;
        let (w1, h1, d1) = dim;

        self.items.iter().any(|p| {
            let (x2, y2, z2) = p.position;
            let (w2, h2, d2) = to_extent(p.placed_dimension());

            let resting_on_nonstackable_p = !p.item.stackable
                && y1 == y2 + h2
                && geometry::rect_overlap(x1, z1, w1, d1, x2, z2, w2, d2);

            let new_is_nonstackable_adjacency = !new_stackable
                && (y1 + h1 == y2 || y1 == y2 + h2)
                && geometry::rect_overlap(x1, z1, w1, d1, x2, z2, w2, d2);

            resting_on_nonstackable_p || new_is_nonstackable_adjacency
        })
    }

    fn is_stable(&self, pivot: Point3, dim: Extent3) -> bool {
        let item_area = dim.0 * dim.1;
        let mut support_area = 0.0;
        for row in &self.fit_items {
            if (pivot.2 - row.z1).abs() < f64::EPSILON {
                let wx = int_overlap_count(pivot.0, pivot.0 + dim.0, row.x0, row.x1) as f64;
                let wy = int_overlap_count(pivot.1, pivot.1 + dim.1, row.y0, row.y1) as f64;
                support_area += wx * wy;
            }
        }

        if item_area > 0.0 && support_area / item_area >= self.support_surface_ratio {
            return true;
        }

        self.vertices_supported(pivot, dim)
    }

    fn vertices_supported(&self, pivot: Point3, dim: Extent3) -> bool {
        let corners = [
            (pivot.0, pivot.1),
            (pivot.0 + dim.0, pivot.1),
            (pivot.0, pivot.1 + dim.1),
            (pivot.0 + dim.0, pivot.1 + dim.1),
        ];
        let mut supported = [false; 4];
        for row in &self.fit_items {
            if (pivot.2 - row.z1).abs() < f64::EPSILON {
                for (idx, &(vx, vy)) in corners.iter().enumerate() {
                    if row.x0 <= vx && vx <= row.x1 && row.y0 <= vy && vy <= row.y1 {
                        supported[idx] = true;
                    }
                }
            }
        }
        supported.iter().all(|&s| s)
    }

    /// Eight cubic corner-reinforcement items, in the fixed placement order
    /// consumed by `put_corner`.
    pub fn add_corners(&self) -> [Item; 8] {
        std::array::from_fn(|i| {
            Item::new(
                format!("corner{i}"),
                "corner",
                Shape::Cube,
                (self.corner, self.corner, self.corner),
                0.0,
                0,
                0,
                true,
                "gray",
                true,
                Some(Rotation::ALL.to_vec()),
            )
            .expect("corner item dimensions are always valid when corner > 0")
        })
    }

    /// Places corner item `index` at its fixed bin-corner position.
    pub fn put_corner(&mut self, index: usize, item: Item) {
        let c = self.corner;
        let (w, h, d) = (self.dimensions.w, self.dimensions.h, self.dimensions.d);
        let positions: [Point3; 8] = [
            (0.0, 0.0, 0.0),
            (0.0, 0.0, d - c),
            (0.0, h - c, d - c),
            (0.0, h - c, 0.0),
            (w - c, h - c, 0.0),
            (w - c, 0.0, 0.0),
            (w - c, 0.0, d - c),
            (w - c, h - c, d - c),
        ];
        let position = positions[index];
        self.fit_items
            .push(OccupancyBox::from_pivot(position, (c, c, c)));
        self.items.push(PlacedItem {
            item,
            position,
            rotation: Rotation::Whd,
        });
    }

    /// Resets `items` to empty and `fit_items` to the sentinel floor row.
    pub fn clear_bin(&mut self) {
        self.items.clear();
        self.fit_items = vec![sentinel_floor(self.dimensions)];
    }
}

fn sentinel_floor(dimensions: Dimensions) -> OccupancyBox {
    OccupancyBox {
        x0: 0.0,
        x1: dimensions.w,
        y0: 0.0,
        y1: dimensions.h,
        z0: 0.0,
        z1: 0.0,
    }
}

fn to_extent(d: Dimensions) -> Extent3 {
    (d.w, d.h, d.d)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Width,
    Height,
    Depth,
}

impl Axis {
    fn extent(self, dim: Dimensions) -> f64 {
        match self {
            Axis::Width => dim.w,
            Axis::Height => dim.h,
            Axis::Depth => dim.d,
        }
    }

    /// Splits a tentative box into (a0, a1, b0, b1, c0, c1, extent-along-A),
    /// where A is this axis and B, C are the other two, in the fixed order
    /// the original `check_width`/`check_height`/`check_depth` use.
    #[allow(clippy::type_complexity)]
    fn project(self, b: OccupancyBox) -> (f64, f64, f64, f64, f64, f64, f64) {
        match self {
            Axis::Height => (b.y0, b.y1, b.x0, b.x1, b.z0, b.z1, b.y1 - b.y0),
            Axis::Width => (b.x0, b.x1, b.z0, b.z1, b.y0, b.y1, b.x1 - b.x0),
            Axis::Depth => (b.z0, b.z1, b.x0, b.x1, b.y0, b.y1, b.z1 - b.z0),
        }
    }

    fn interval(self, row: OccupancyBox) -> (f64, f64) {
        match self {
            Axis::Height => (row.y0, row.y1),
            Axis::Width => (row.x0, row.x1),
            Axis::Depth => (row.z0, row.z1),
        }
    }
}

//! Item model: dimensions, rotation set, per-rotation projection (component B).

use uuid::Uuid;

use crate::Error;

/// Shape of an item's bounding volume. Cylinders are packed as their bounding
/// box; true cylinder collision is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    Cylinder,
}

/// One of the six axis-aligned permutations of `(w, h, d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rotation {
    Whd = 0,
    Hwd = 1,
    Hdw = 2,
    Dhw = 3,
    Dwh = 4,
    Wdh = 5,
}

impl Rotation {
    /// All six axis-aligned rotations, in the fixed numbering of the spec.
    pub const ALL: [Rotation; 6] = [
        Rotation::Whd,
        Rotation::Hwd,
        Rotation::Hdw,
        Rotation::Dhw,
        Rotation::Dwh,
        Rotation::Wdh,
    ];

    /// The two rotations that keep the original height axis vertical.
    pub const NOT_UPSIDE_DOWN: [Rotation; 2] = [Rotation::Whd, Rotation::Hwd];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A `(w, h, d)` extent, always stored in the item's *base* orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub w: f64,
    pub h: f64,
    pub d: f64,
}

impl Dimensions {
    pub fn new(w: f64, h: f64, d: f64) -> Self {
        Dimensions { w, h, d }
    }

    pub fn volume(&self) -> f64 {
        self.w * self.h * self.d
    }

    /// Project this base extent under `rotation`.
    pub fn permute(&self, rotation: Rotation) -> Dimensions {
        let Dimensions { w, h, d } = *self;
        match rotation {
            Rotation::Whd => Dimensions::new(w, h, d),
            Rotation::Hwd => Dimensions::new(h, w, d),
            Rotation::Hdw => Dimensions::new(h, d, w),
            Rotation::Dhw => Dimensions::new(d, h, w),
            Rotation::Dwh => Dimensions::new(d, w, h),
            Rotation::Wdh => Dimensions::new(w, d, h),
        }
    }

    fn max(&self) -> f64 {
        self.w.max(self.h).max(self.d)
    }
}

/// Immutable item descriptor. Position and committed rotation are never
/// stored here; they live on the `PlacedItem` record the bin produces at
/// commit time (see design notes: "Global mutable item fields").
#[derive(Debug, Clone)]
pub struct Item {
    pub id: Uuid,
    pub partno: String,
    pub group: String,
    pub shape: Shape,
    pub dimensions: Dimensions,
    pub weight: f64,
    pub priority: i32,
    pub loadbear: i32,
    pub upsidedown: bool,
    pub color: String,
    pub stackable: bool,
    pub rotations: Vec<Rotation>,
}

impl Item {
    /// Constructs an item, applying the default-rotation rule from the spec
    /// when `rotations` is `None`, and rejecting malformed input eagerly.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        partno: impl Into<String>,
        group: impl Into<String>,
        shape: Shape,
        whd: (f64, f64, f64),
        weight: f64,
        priority: i32,
        loadbear: i32,
        upsidedown: bool,
        color: impl Into<String>,
        stackable: bool,
        rotations: Option<Vec<Rotation>>,
    ) -> Result<Item, Error> {
        let (w, h, d) = whd;
        if w <= 0.0 || h <= 0.0 || d <= 0.0 {
            return Err(Error::InvalidDimensions { w, h, d });
        }
        if weight < 0.0 {
            return Err(Error::NegativeWeight(weight));
        }
        if let Some(ref rs) = rotations {
            if rs.is_empty() {
                return Err(Error::EmptyRotationSet);
            }
        }

        let upsidedown = if shape == Shape::Cylinder { false } else { upsidedown };

        let rotations = if shape == Shape::Cylinder || !upsidedown {
            Rotation::NOT_UPSIDE_DOWN.to_vec()
        } else {
            rotations.unwrap_or_else(|| Rotation::ALL.to_vec())
        };

        Ok(Item {
            id: Uuid::new_v4(),
            partno: partno.into(),
            group: group.into(),
            shape,
            dimensions: Dimensions::new(w, h, d),
            weight,
            priority,
            loadbear,
            upsidedown,
            color: color.into(),
            stackable,
            rotations,
        })
    }

    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// Projected extent under `rotation`.
    pub fn get_dimension(&self, rotation: Rotation) -> Dimensions {
        self.dimensions.permute(rotation)
    }

    /// Product of the two largest base dimensions if `upsidedown`, else `w * h`.
    pub fn get_max_area(&self) -> f64 {
        if self.upsidedown {
            let mut dims = [self.dimensions.w, self.dimensions.h, self.dimensions.d];
            dims.sort_by(|a, b| b.partial_cmp(a).unwrap());
            dims[0] * dims[1]
        } else {
            self.dimensions.w * self.dimensions.h
        }
    }

    /// Rotations from the allowed set under which the middle (height)
    /// dimension is *not* the largest base dimension.
    pub fn get_horizontal_dimensions(&self) -> Vec<Rotation> {
        let max_dim = self.dimensions.max();
        self.rotations
            .iter()
            .copied()
            .filter(|&r| self.get_dimension(r).h != max_dim)
            .collect()
    }

    /// Rotations from the allowed set under which the middle (height)
    /// dimension equals the largest base dimension.
    pub fn get_vertical_dimensions(&self) -> Vec<Rotation> {
        let max_dim = self.dimensions.max();
        self.rotations
            .iter()
            .copied()
            .filter(|&r| self.get_dimension(r).h == max_dim)
            .collect()
    }
}

//! Deterministic heuristic engine for 3D axis-aligned bin packing: given a
//! set of bins and items, decide which item goes in which bin, at what
//! position, and under which rotation.
//!
//! The four components live one per module: [`geometry`] (intersection
//! predicates), [`item`] (the item descriptor and rotation model), [`bin`]
//! (a single container's placement pipeline), and [`packer`] (global
//! ordering and the multi-bin loop).

pub mod bin;
pub mod geometry;
pub mod item;
pub mod packer;

/// The bread-and-butter, ready-to-use surface.
pub mod prelude {
    pub use crate::Error;
    pub use crate::bin::{Bin, PlacedItem, PutType};
    pub use crate::item::{Dimensions, Item, Rotation, Shape};
    pub use crate::packer::{PackOptions, Packer};
}

/// Errors raised at construction time for caller-supplied input that can
/// never be packed, as opposed to an item that simply doesn't fit — that
/// outcome is reported via `unfitted_items`/`unfit_items`, never this type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid dimensions: w={w}, h={h}, d={d} (all must be positive)")]
    InvalidDimensions { w: f64, h: f64, d: f64 },

    #[error("negative weight: {0}")]
    NegativeWeight(f64),

    #[error("explicit rotation set must not be empty")]
    EmptyRotationSet,

    #[error("binding group names no registered item: {0}")]
    UnknownBindingGroup(String),
}

//! Rectilinear dissection of a rectangle around holes.
//!
//! - Algorithms: GridMarker (reference row-major sweep), Bands (sweep-line over hole edges)
//! - Entry points: `dissect` / `dissect_with` take a source rect and holes and return disjoint
//!   rects covering the source minus the holes
//! - Overlay model: `MaskLayout` turns a dissection into opaque mask boxes; `MaskController`
//!   joins several highlight sources into one mask
//! - Data model is serde-serializable; `Scene` and `to_json` handle JSON I/O.
//!
//! Quick example:
//! ```
//! use rect_dissect_core::{Rect, dissect};
//! # fn main() -> rect_dissect_core::Result<()> {
//! let page = Rect::new(0.0, 0.0, 300.0, 300.0);
//! let holes = [Rect::new(10.0, 10.0, 10.0, 10.0)];
//! let boxes = dissect(page, &holes)?;
//! assert!(boxes.iter().all(|b| !b.intersects(&holes[0])));
//! # Ok(()) }
//! ```

pub mod config;
pub mod controller;
pub mod dissect;
pub mod error;
pub mod export;
pub mod mask;
pub mod model;
pub mod pipeline;
pub mod verify;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `rect_dissect_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{DissectConfig, DissectConfigBuilder, Strategy};
    pub use crate::controller::{MaskController, NotifierId};
    pub use crate::dissect::{ObstacleList, ObstacleSet};
    pub use crate::mask::{MaskBox, MaskLayout};
    pub use crate::model::{DissectStats, GridRect, Rect};
    pub use crate::verify::{Violation, check_dissection, check_dissection_with};
    pub use crate::{Scene, dissect, dissect_with};
}

//! Geometric operations: crop, rotate, flip and resize.
//!
//! These work on any bitmap color type. Crop, flip, resize and quarter-turn
//! rotations keep the source color type; arbitrary rotations produce RGBA so
//! the expanded corners can be transparent.
//!
//! # Coordinate System
//!
//! - Crop coordinates are integer pixels, origin at the top-left corner
//! - Rotation angles are in degrees, positive = clockwise

mod crop;
mod flip;
mod resize;
mod rotation;

pub use crop::{apply_crop, CropRect};
pub use flip::{apply_flip, FlipDirection};
pub use resize::{apply_resize, resize_exact, target_dimensions, MAX_DIMENSION, MAX_PIXELS};
pub use rotation::{apply_rotation, compute_rotated_bounds, Interpolation, TRANSPARENT};

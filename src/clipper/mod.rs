//! Polygon clipping in homogeneous clip space (Sutherland-Hodgman).

pub mod clip_space;

pub use clip_space::{ClipPlane, ClipSpaceClipper};

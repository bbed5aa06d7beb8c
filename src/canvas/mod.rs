//! Canvas Raster Layer
//!
//! Owns the RGBA drawing surface, PNG snapshot encoding, and the bounding-box
//! scan over drawn pixels that anchors result overlays.

pub mod bounds;
mod font;
pub mod surface;

pub use bounds::{drawn_bounds, BoundingBox};
pub use surface::{strip_data_uri, CanvasSurface, Rgba, DATA_URI_PREFIX};

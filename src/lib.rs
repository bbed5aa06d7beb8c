//! mathsketch - Handwritten math recognition gateway and canvas session engine
//!
//! Two halves: an HTTP gateway that forwards canvas snapshots to a multimodal
//! model and normalizes its response, and a headless session engine modelling
//! the drawing surface, variable bindings, and result overlays.

pub mod canvas;
pub mod config;
pub mod gateway;
pub mod server;
pub mod session;
pub mod transcribe;

pub use canvas::{drawn_bounds, BoundingBox, CanvasSurface};
pub use gateway::{RecognitionGateway, RecognitionResult};
pub use session::SessionState;

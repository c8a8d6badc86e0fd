//! Interactive graph editing canvas.
//!
//! [`geometry`] and [`controller`] are DOM-free; [`component`] binds them to a
//! `<canvas>` element and [`render`] paints each frame.

mod component;
pub mod controller;
pub mod geometry;
pub mod render;
mod weight_dialog;

pub use component::GraphCanvas;

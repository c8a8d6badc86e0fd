//! Algorithm runs: request a step sequence from the service and walk it.

pub mod api;
mod client;
pub mod engine;
mod panel;

pub use client::AlgorithmClient;
pub use engine::{Algorithm, HighlightSets, PlaybackEngine};
pub use panel::AlgorithmPanel;

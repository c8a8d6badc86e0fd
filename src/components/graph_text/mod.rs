//! Text views of the graph and the flat file format.

pub mod codec;
pub mod flat;
pub mod layout;
mod panel;

pub use layout::CircleLayout;
pub use panel::{GraphTextPanel, replace_graph};

pub mod graph_canvas;
pub mod graph_text;
pub mod playback;

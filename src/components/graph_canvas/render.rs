use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geometry::{
	EdgeGeometry, EdgeLayout, LABEL_FONT, LabelBox, NODE_RADIUS, TextMeasure, ViewTransform, layout_edges,
};
use crate::components::playback::{Algorithm, HighlightSets};
use crate::model::{EdgeId, Graph, GraphMode, NodeId};

const ARROW_LENGTH: f64 = 12.0;
const NODE_OUTLINE: &str = "#e5e7eb";
const NODE_LABEL_FONT: &str = "bold 16px system-ui";
const LABEL_FILL: &str = "#020617";
const LABEL_BORDER: &str = "#1f2937";
const LABEL_TEXT: &str = "#e5e7eb";

/// Everything one frame depends on.
pub struct Frame<'a> {
	pub graph: &'a Graph,
	pub mode: GraphMode,
	pub transform: ViewTransform,
	pub highlights: &'a HighlightSets,
	pub pending_source: Option<NodeId>,
	pub algorithm: Algorithm,
	pub width: f64,
	pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub width: f64,
}

/// Current step beats visited beats default.
pub fn edge_style(id: EdgeId, highlights: &HighlightSets) -> EdgeStyle {
	if highlights.highlight_edges.contains(&id) {
		EdgeStyle {
			color: "#f97316",
			width: 4.0,
		}
	} else if highlights.visited_edges.contains(&id) {
		EdgeStyle {
			color: "#22c55e",
			width: 3.5,
		}
	} else {
		EdgeStyle {
			color: "#3b82f6",
			width: 3.0,
		}
	}
}

/// Current step beats visited beats pending edge source beats default.
pub fn node_fill(id: NodeId, highlights: &HighlightSets, pending_source: Option<NodeId>) -> &'static str {
	if highlights.highlight_nodes.contains(&id) {
		"#22c55e"
	} else if highlights.visited_nodes.contains(&id) {
		"#1d4ed8"
	} else if pending_source == Some(id) {
		"#22c55e"
	} else {
		"#0f172a"
	}
}

/// Arrowheads mark orientation, which spanning-tree runs ignore.
pub fn draws_arrowheads(mode: GraphMode, algorithm: Algorithm) -> bool {
	mode.is_oriented() && !algorithm.is_spanning_tree()
}

/// Measures label text with the live 2D context.
pub struct CanvasMeasure<'a>(pub &'a CanvasRenderingContext2d);

impl TextMeasure for CanvasMeasure<'_> {
	fn text_width(&self, text: &str) -> f64 {
		self.0.save();
		self.0.set_font(LABEL_FONT);
		let width = self.0.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
		self.0.restore();
		width
	}
}

pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
	ctx.clear_rect(0.0, 0.0, frame.width, frame.height);

	let t = frame.transform;
	let _ = ctx.set_transform(t.k, 0.0, 0.0, t.k, t.x, t.y);

	let layouts = layout_edges(frame.graph);
	draw_edges(frame, &layouts, ctx);
	if draws_arrowheads(frame.mode, frame.algorithm) {
		draw_arrowheads(frame, &layouts, ctx);
	}
	if frame.mode.is_weighted() {
		draw_weight_labels(&layouts, ctx);
	}
	draw_nodes(frame, ctx);
}

fn trace_edge(geometry: &EdgeGeometry, ctx: &CanvasRenderingContext2d) {
	ctx.begin_path();
	ctx.move_to(geometry.start.x, geometry.start.y);
	match geometry.control {
		Some(c) => ctx.quadratic_curve_to(c.x, c.y, geometry.end.x, geometry.end.y),
		None => ctx.line_to(geometry.end.x, geometry.end.y),
	}
}

fn draw_edges(frame: &Frame<'_>, layouts: &[EdgeLayout], ctx: &CanvasRenderingContext2d) {
	for layout in layouts {
		let style = edge_style(layout.edge.id, frame.highlights);
		trace_edge(&layout.geometry, ctx);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		ctx.stroke();
	}
}

fn draw_arrowheads(frame: &Frame<'_>, layouts: &[EdgeLayout], ctx: &CanvasRenderingContext2d) {
	for layout in layouts {
		let style = edge_style(layout.edge.id, frame.highlights);
		let tip = layout.geometry.end;
		let angle = layout.geometry.end_angle();
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(
			tip.x - ARROW_LENGTH * (angle - PI / 6.0).cos(),
			tip.y - ARROW_LENGTH * (angle - PI / 6.0).sin(),
		);
		ctx.line_to(
			tip.x - ARROW_LENGTH * (angle + PI / 6.0).cos(),
			tip.y - ARROW_LENGTH * (angle + PI / 6.0).sin(),
		);
		ctx.close_path();
		ctx.set_fill_style_str(style.color);
		ctx.fill();
	}
}

fn draw_weight_labels(layouts: &[EdgeLayout], ctx: &CanvasRenderingContext2d) {
	let measure = CanvasMeasure(ctx);
	for layout in layouts {
		let text = layout.label_text();
		let rect = LabelBox::around(layout.geometry.label_anchor(), measure.text_width(&text));

		ctx.set_fill_style_str(LABEL_FILL);
		ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
		ctx.set_stroke_style_str(LABEL_BORDER);
		ctx.set_line_width(1.0);
		ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);

		let center = rect.center();
		ctx.set_font(LABEL_FONT);
		ctx.set_fill_style_str(LABEL_TEXT);
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(&text, center.x, center.y);
	}
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(NODE_LABEL_FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for node in frame.graph.nodes() {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_fill(node.id, frame.highlights, frame.pending_source));
		ctx.fill();
		ctx.set_stroke_style_str(NODE_OUTLINE);
		ctx.set_line_width(2.0);
		ctx.stroke();

		ctx.set_fill_style_str(NODE_OUTLINE);
		let _ = ctx.fill_text(&node.id.to_string(), node.x, node.y);
	}
}

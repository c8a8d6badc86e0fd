//! Gesture state machine for the editing canvas.
//!
//! The controller owns the view transform and every piece of transient
//! interaction state. Handlers never mutate the graph they are given; an
//! edit comes back as a whole replacement `Graph` for the caller to commit.

use log::{debug, warn};

use super::geometry::{
	NODE_RADIUS, Point, TextMeasure, ViewTransform, find_edge_at, find_weight_label_at, format_weight,
	hit_test_node, layout_edges,
};
use crate::error::WeightInputError;
use crate::model::{EdgeId, Graph, GraphMode, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	Primary,
	Middle,
	Secondary,
	Other,
}

impl PointerButton {
	/// Maps `MouseEvent.button`.
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => PointerButton::Primary,
			1 => PointerButton::Middle,
			2 => PointerButton::Secondary,
			_ => PointerButton::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
	pub node: NodeId,
	/// Press point minus node center, in world units.
	pub grab: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanState {
	/// Last pointer position in screen space.
	pub last: Point,
}

/// An open weight-edit dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightEdit {
	pub edge: EdgeId,
	pub text: String,
	pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CanvasController {
	transform: ViewTransform,
	drag: Option<DragState>,
	pan: Option<PanState>,
	pending_source: Option<NodeId>,
	weight_edit: Option<WeightEdit>,
	frozen: bool,
}

impl CanvasController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn pending_source(&self) -> Option<NodeId> {
		self.pending_source
	}

	pub fn weight_edit(&self) -> Option<&WeightEdit> {
		self.weight_edit.as_ref()
	}

	/// Freezes editing during playback. Pan and zoom stay live.
	pub fn set_frozen(&mut self, frozen: bool) {
		self.frozen = frozen;
		if frozen {
			self.drag = None;
			self.pending_source = None;
			self.weight_edit = None;
		}
	}

	/// Drops interaction state that points at ids the new graph no longer
	/// has, and any weight edit once the mode stops carrying weights.
	pub fn sync_with(&mut self, graph: &Graph, mode: GraphMode) {
		if self.pending_source.is_some_and(|id| graph.node(id).is_none()) {
			self.pending_source = None;
		}
		if self.drag.is_some_and(|d| graph.node(d.node).is_none()) {
			self.drag = None;
		}
		if !mode.is_weighted() || self.weight_edit.as_ref().is_some_and(|w| graph.edge(w.edge).is_none()) {
			self.weight_edit = None;
		}
	}

	pub fn pointer_down(
		&mut self,
		graph: &Graph,
		mode: GraphMode,
		button: PointerButton,
		screen: Point,
		measure: &impl TextMeasure,
	) -> Option<Graph> {
		match button {
			PointerButton::Middle => {
				self.pan = Some(PanState { last: screen });
				None
			}
			PointerButton::Primary if !self.frozen => self.primary_down(graph, mode, screen, measure),
			_ => None,
		}
	}

	fn primary_down(
		&mut self,
		graph: &Graph,
		mode: GraphMode,
		screen: Point,
		measure: &impl TextMeasure,
	) -> Option<Graph> {
		let world = self.transform.screen_to_world(screen);

		if let Some(node) = hit_test_node(graph.nodes(), world, NODE_RADIUS).and_then(|id| graph.node(id)) {
			self.drag = Some(DragState {
				node: node.id,
				grab: world - Point::from(node),
			});
			return None;
		}

		// presses on a line or label are reserved for double-click
		let layouts = layout_edges(graph);
		if mode.is_weighted() && find_weight_label_at(&layouts, world, measure).is_some() {
			return None;
		}
		if find_edge_at(&layouts, world).is_some() {
			return None;
		}

		let Some((next, id)) = graph.with_node_at(world.x, world.y) else {
			warn!("node id range exhausted, node not created");
			return None;
		};
		debug!("created node {id} at ({:.1}, {:.1})", world.x, world.y);
		self.pending_source = None;
		Some(next)
	}

	pub fn pointer_move(&mut self, graph: &Graph, screen: Point) -> Option<Graph> {
		if let Some(pan) = self.pan.as_mut() {
			let delta = screen - pan.last;
			pan.last = screen;
			self.transform = self.transform.panned(delta.x, delta.y);
			return None;
		}
		if self.frozen {
			return None;
		}
		let drag = self.drag?;
		let target = self.transform.screen_to_world(screen) - drag.grab;
		let next = graph.with_node_moved(drag.node, target.x, target.y);
		if next.is_none() {
			self.drag = None;
		}
		next
	}

	pub fn pointer_up(&mut self) {
		self.drag = None;
		self.pan = None;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		self.transform = self.transform.zoomed_at(screen, delta_y);
	}

	/// Weight editing in weighted mode, otherwise the two-step edge creation
	/// protocol on nodes.
	pub fn double_click(
		&mut self,
		graph: &Graph,
		mode: GraphMode,
		screen: Point,
		measure: &impl TextMeasure,
	) -> Option<Graph> {
		if self.frozen {
			return None;
		}
		let world = self.transform.screen_to_world(screen);

		if mode.is_weighted() {
			let layouts = layout_edges(graph);
			if let Some(edge) =
				find_weight_label_at(&layouts, world, measure).or_else(|| find_edge_at(&layouts, world))
			{
				self.open_weight_edit(graph, edge);
				return None;
			}
		}

		let Some(target) = hit_test_node(graph.nodes(), world, NODE_RADIUS) else {
			self.pending_source = None;
			return None;
		};

		match self.pending_source.take() {
			None => {
				self.pending_source = Some(target);
				None
			}
			Some(source) if source == target => None,
			Some(source) => {
				let next = graph.with_edge(source, target, mode);
				if next.is_some() {
					debug!("created edge {source} -> {target}");
				}
				next
			}
		}
	}

	/// Right click: delete node (with its edges), else delete edge, else
	/// cancel a pending edge source.
	pub fn context_menu(&mut self, graph: &Graph, screen: Point) -> Option<Graph> {
		if self.frozen {
			return None;
		}
		let world = self.transform.screen_to_world(screen);

		if let Some(id) = hit_test_node(graph.nodes(), world, NODE_RADIUS) {
			if self.pending_source == Some(id) {
				self.pending_source = None;
			}
			debug!("deleting node {id}");
			return graph.without_node(id);
		}
		if let Some(edge) = find_edge_at(&layout_edges(graph), world) {
			debug!("deleting edge {edge}");
			return graph.without_edge(edge);
		}
		self.pending_source = None;
		None
	}

	fn open_weight_edit(&mut self, graph: &Graph, edge: EdgeId) {
		let Some(e) = graph.edge(edge) else {
			return;
		};
		self.pending_source = None;
		self.weight_edit = Some(WeightEdit {
			edge,
			text: format_weight(e.display_weight()),
			error: None,
		});
	}

	pub fn set_weight_text(&mut self, text: String) {
		if let Some(edit) = self.weight_edit.as_mut() {
			edit.text = text;
		}
	}

	pub fn cancel_weight_edit(&mut self) {
		self.weight_edit = None;
	}

	/// On success the dialog closes and the reweighted graph is returned
	/// (`None` if the edge vanished meanwhile). On bad input the dialog stays
	/// open with the error attached.
	pub fn commit_weight_edit(&mut self, graph: &Graph, mode: GraphMode) -> Result<Option<Graph>, WeightInputError> {
		if !mode.is_weighted() {
			self.weight_edit = None;
			return Ok(None);
		}
		let Some(edit) = self.weight_edit.as_mut() else {
			return Ok(None);
		};
		match parse_weight(&edit.text) {
			Ok(weight) => {
				let edge = edit.edge;
				self.weight_edit = None;
				Ok(graph.with_weight(edge, weight, mode))
			}
			Err(err) => {
				edit.error = Some(err.to_string());
				Err(err)
			}
		}
	}
}

pub fn parse_weight(text: &str) -> Result<f64, WeightInputError> {
	let trimmed = text.trim();
	if trimmed.is_empty() {
		return Err(WeightInputError::Empty);
	}
	let value: f64 = trimmed
		.parse()
		.map_err(|_| WeightInputError::NotANumber(trimmed.to_string()))?;
	if !value.is_finite() {
		return Err(WeightInputError::NotFinite);
	}
	Ok(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::geometry::tests::{FixedWidth, world_to_screen};
	use crate::model::{Edge, Node};

	fn graph(nodes: &[(NodeId, f64, f64)], edges: &[(EdgeId, NodeId, NodeId)], mode: GraphMode) -> Graph {
		Graph::new(
			nodes.iter().map(|&(id, x, y)| Node { id, x, y }).collect(),
			edges
				.iter()
				.map(|&(id, from, to)| Edge {
					id,
					from,
					to,
					weight: mode.is_weighted().then_some(1.0),
				})
				.collect(),
			mode,
		)
		.unwrap()
	}

	fn press(c: &mut CanvasController, g: &Graph, mode: GraphMode, x: f64, y: f64) -> Option<Graph> {
		c.pointer_down(g, mode, PointerButton::Primary, Point::new(x, y), &FixedWidth)
	}

	fn dbl(c: &mut CanvasController, g: &Graph, mode: GraphMode, x: f64, y: f64) -> Option<Graph> {
		c.double_click(g, mode, Point::new(x, y), &FixedWidth)
	}

	#[test]
	fn click_on_empty_space_creates_one_node() {
		let g = graph(&[(1, 0.0, 0.0), (4, 400.0, 400.0)], &[], GraphMode::Undirected);
		let mut c = CanvasController::new();
		let next = press(&mut c, &g, GraphMode::Undirected, 120.0, 80.0).unwrap();
		assert_eq!(next.nodes().len(), 3);
		assert_eq!(next.node(5), Some(&Node { id: 5, x: 120.0, y: 80.0 }));
	}

	#[test]
	fn click_respects_the_view_transform() {
		let mut c = CanvasController::new();
		c.pointer_down(&Graph::empty(), GraphMode::Undirected, PointerButton::Middle, Point::new(0.0, 0.0), &FixedWidth);
		c.pointer_move(&Graph::empty(), Point::new(50.0, 20.0));
		c.pointer_up();
		assert_eq!(c.transform(), ViewTransform { x: 50.0, y: 20.0, k: 1.0 });
		let next = press(&mut c, &Graph::empty(), GraphMode::Undirected, 150.0, 120.0).unwrap();
		assert_eq!(next.node(1), Some(&Node { id: 1, x: 100.0, y: 100.0 }));
	}

	#[test]
	fn press_on_edge_or_label_does_nothing() {
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(1, 1, 2)], GraphMode::Weighted);
		let mut c = CanvasController::new();
		// on the line, clear of the label box
		assert!(press(&mut c, &g, GraphMode::Weighted, 50.0, 2.0).is_none());
		// on the label
		assert!(press(&mut c, &g, GraphMode::Weighted, 100.0, 12.0).is_none());
		assert!(c.pointer_move(&g, Point::new(60.0, 60.0)).is_none());
	}

	#[test]
	fn dragging_keeps_the_grab_offset() {
		let g = graph(&[(1, 100.0, 100.0)], &[], GraphMode::Undirected);
		let mut c = CanvasController::new();
		assert!(press(&mut c, &g, GraphMode::Undirected, 110.0, 95.0).is_none());
		let moved = c.pointer_move(&g, Point::new(210.0, 195.0)).unwrap();
		assert_eq!(moved.node(1), Some(&Node { id: 1, x: 200.0, y: 200.0 }));
		c.pointer_up();
		assert!(c.pointer_move(&moved, Point::new(0.0, 0.0)).is_none());
	}

	#[test]
	fn wheel_zoom_keeps_cursor_anchor() {
		let mut c = CanvasController::new();
		let anchor = Point::new(300.0, 200.0);
		let before = c.transform().screen_to_world(anchor);
		c.wheel(anchor, -120.0);
		assert!((c.transform().k - 1.1).abs() < 1e-12);
		let after = world_to_screen(&c.transform(), before);
		assert!(after.distance(anchor) < 1e-9);
	}

	#[test]
	fn double_clicks_build_an_edge() {
		let mode = GraphMode::Directed;
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[], mode);
		let mut c = CanvasController::new();
		assert!(dbl(&mut c, &g, mode, 0.0, 0.0).is_none());
		assert_eq!(c.pending_source(), Some(1));
		let next = dbl(&mut c, &g, mode, 200.0, 0.0).unwrap();
		assert_eq!(c.pending_source(), None);
		assert_eq!(next.edges(), &[Edge { id: 1, from: 1, to: 2, weight: None }]);

		// repeating the same pair is refused but still clears the selection
		dbl(&mut c, &next, mode, 0.0, 0.0);
		assert!(dbl(&mut c, &next, mode, 200.0, 0.0).is_none());
		assert_eq!(c.pending_source(), None);
	}

	#[test]
	fn double_click_cancels_pending_source() {
		let mode = GraphMode::Undirected;
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[], mode);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, mode, 0.0, 0.0);
		assert!(dbl(&mut c, &g, mode, 0.0, 0.0).is_none());
		assert_eq!(c.pending_source(), None);

		dbl(&mut c, &g, mode, 0.0, 0.0);
		dbl(&mut c, &g, mode, 500.0, 500.0);
		assert_eq!(c.pending_source(), None);
	}

	#[test]
	fn pending_source_that_vanished_is_a_no_op() {
		let mode = GraphMode::Undirected;
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0), (3, 0.0, 200.0)], &[], mode);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, mode, 0.0, 0.0);
		let without = g.without_node(1).unwrap();
		assert!(dbl(&mut c, &without, mode, 200.0, 0.0).is_none());
	}

	#[test]
	fn context_menu_deletes_node_then_edge() {
		let mode = GraphMode::Undirected;
		let g = graph(
			&[(1, 0.0, 0.0), (2, 200.0, 0.0), (3, 0.0, 200.0)],
			&[(1, 1, 2), (2, 2, 3), (3, 3, 1)],
			mode,
		);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, mode, 0.0, 0.0);
		let g2 = c.context_menu(&g, Point::new(0.0, 0.0)).unwrap();
		assert_eq!(c.pending_source(), None);
		assert_eq!(g2.edges().iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);

		let g3 = c.context_menu(&g2, Point::new(100.0, 100.0)).unwrap();
		assert!(g3.edges().is_empty());
		assert_eq!(g3.nodes().len(), 2);
		assert!(c.context_menu(&g3, Point::new(600.0, 600.0)).is_none());
	}

	#[test]
	fn weight_edit_validates_input() {
		let mode = GraphMode::Weighted;
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(7, 1, 2)], mode);
		let mut c = CanvasController::new();
		assert!(dbl(&mut c, &g, mode, 100.0, 12.0).is_none());
		let edit = c.weight_edit().unwrap();
		assert_eq!((edit.edge, edit.text.as_str()), (7, "1"));

		c.set_weight_text("   ".into());
		assert_eq!(c.commit_weight_edit(&g, mode), Err(WeightInputError::Empty));
		c.set_weight_text("abc".into());
		assert!(matches!(c.commit_weight_edit(&g, mode), Err(WeightInputError::NotANumber(_))));
		assert!(c.weight_edit().unwrap().error.is_some());

		c.set_weight_text(" -3.5 ".into());
		let next = c.commit_weight_edit(&g, mode).unwrap().unwrap();
		assert_eq!(next.edge(7).unwrap().weight, Some(-3.5));
		assert!(c.weight_edit().is_none());
	}

	#[test]
	fn mode_switch_closes_the_weight_edit() {
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(1, 1, 2)], GraphMode::Weighted);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, GraphMode::Weighted, 100.0, 12.0);
		assert!(c.weight_edit().is_some());

		let plain = g.converted_to(GraphMode::Undirected);
		c.sync_with(&plain, GraphMode::Undirected);
		assert!(c.weight_edit().is_none());
		c.set_weight_text("7".into());
		assert_eq!(c.commit_weight_edit(&plain, GraphMode::Undirected), Ok(None));
	}

	#[test]
	fn weight_commit_outside_weighted_mode_writes_nothing() {
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(1, 1, 2)], GraphMode::Weighted);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, GraphMode::Weighted, 100.0, 12.0);
		c.set_weight_text("7".into());

		let plain = g.converted_to(GraphMode::Directed);
		assert_eq!(c.commit_weight_edit(&plain, GraphMode::Directed), Ok(None));
		assert!(c.weight_edit().is_none());
		assert_eq!(plain.edge(1).unwrap().weight, None);
	}

	#[test]
	fn click_with_exhausted_node_ids_is_ignored() {
		let g = graph(&[(i64::MAX, 400.0, 400.0)], &[], GraphMode::Undirected);
		let mut c = CanvasController::new();
		assert!(press(&mut c, &g, GraphMode::Undirected, 120.0, 80.0).is_none());
	}

	#[test]
	fn double_click_on_edge_only_edits_in_weighted_mode() {
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(1, 1, 2)], GraphMode::Directed);
		let mut c = CanvasController::new();
		assert!(dbl(&mut c, &g, GraphMode::Directed, 100.0, 0.0).is_none());
		assert!(c.weight_edit().is_none());
	}

	#[test]
	fn frozen_canvas_only_pans_and_zooms() {
		let mode = GraphMode::Undirected;
		let g = graph(&[(1, 0.0, 0.0), (2, 200.0, 0.0)], &[(1, 1, 2)], mode);
		let mut c = CanvasController::new();
		dbl(&mut c, &g, mode, 0.0, 0.0);
		c.set_frozen(true);
		assert_eq!(c.pending_source(), None);
		assert!(press(&mut c, &g, mode, 400.0, 400.0).is_none());
		assert!(press(&mut c, &g, mode, 0.0, 0.0).is_none());
		assert!(c.pointer_move(&g, Point::new(50.0, 50.0)).is_none());
		assert!(dbl(&mut c, &g, mode, 0.0, 0.0).is_none());
		assert!(c.context_menu(&g, Point::new(0.0, 0.0)).is_none());

		c.pointer_down(&g, mode, PointerButton::Middle, Point::new(0.0, 0.0), &FixedWidth);
		c.pointer_move(&g, Point::new(10.0, 5.0));
		c.wheel(Point::new(0.0, 0.0), 100.0);
		assert_eq!(c.transform().x, 9.0);
		assert_eq!(c.transform().y, 4.5);
	}

	#[test]
	fn parse_weight_rejects_non_finite() {
		assert_eq!(parse_weight("inf"), Err(WeightInputError::NotFinite));
		assert_eq!(parse_weight("2e1"), Ok(20.0));
	}
}

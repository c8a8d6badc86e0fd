//! Pure geometry over world coordinates: the view transform, node/edge/label
//! hit-testing and the curve layout shared by the renderer.

use std::collections::HashMap;
use std::ops::{Add, Mul, Sub};

use crate::model::{Edge, EdgeId, Graph, Node, NodeId};

pub const NODE_RADIUS: f64 = 25.0;
/// Perpendicular distance of an anti-parallel arc's control point from the chord.
pub const CURVE_OFFSET: f64 = 40.0;
pub const EDGE_HIT_THRESHOLD: f64 = 6.0;
/// Curved hit-testing samples `t = 0, 1/N, …, 1`.
pub const CURVE_SAMPLES: usize = 20;

pub const LABEL_OFFSET_STRAIGHT: f64 = 15.0;
pub const LABEL_OFFSET_CURVED: f64 = 40.0;
pub const LABEL_PADDING_X: f64 = 8.0;
pub const LABEL_HEIGHT: f64 = 30.0;
/// Labels sit slightly above their anchor.
pub const LABEL_LIFT: f64 = 8.0;
pub const LABEL_FONT: &str = "22px system-ui";

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 5.0;
const ZOOM_IN: f64 = 1.1;
const ZOOM_OUT: f64 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	fn dot(self, other: Point) -> f64 {
		self.x * other.x + self.y * other.y
	}

	fn length_sq(self) -> f64 {
		self.dot(self)
	}
}

impl From<&Node> for Point {
	fn from(n: &Node) -> Self {
		Point::new(n.x, n.y)
	}
}

impl Add for Point {
	type Output = Point;
	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;
	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;
	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

/// `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_world(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// One wheel notch around `anchor` (screen space). The world point under
	/// the anchor stays under it.
	pub fn zoomed_at(&self, anchor: Point, delta_y: f64) -> Self {
		let factor = if delta_y < 0.0 { ZOOM_IN } else { ZOOM_OUT };
		let k = (self.k * factor).clamp(MIN_SCALE, MAX_SCALE);
		let world = self.screen_to_world(anchor);
		Self {
			x: anchor.x - world.x * k,
			y: anchor.y - world.y * k,
			k,
		}
	}

	pub fn panned(&self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			k: self.k,
		}
	}
}

/// First node (insertion order) whose center lies within `radius` of `p`.
pub fn hit_test_node(nodes: &[Node], p: Point, radius: f64) -> Option<NodeId> {
	nodes
		.iter()
		.find(|n| Point::from(*n).distance(p) <= radius)
		.map(|n| n.id)
}

/// Which way an edge runs relative to its pair's `(min, max)` ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// `min -> max`
	Forward,
	/// `max -> min`
	Backward,
}

/// All edges between one unordered pair of nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePair {
	pub a: NodeId,
	pub b: NodeId,
	pub forward: Option<Edge>,
	pub backward: Option<Edge>,
}

impl EdgePair {
	pub fn has_forward(&self) -> bool {
		self.forward.is_some()
	}

	pub fn has_backward(&self) -> bool {
		self.backward.is_some()
	}

	/// Both directions present: the pair is drawn as two arcs.
	pub fn is_curved(&self) -> bool {
		self.has_forward() && self.has_backward()
	}

	pub fn edges(&self) -> impl Iterator<Item = (Direction, Edge)> + '_ {
		self.forward
			.map(|e| (Direction::Forward, e))
			.into_iter()
			.chain(self.backward.map(|e| (Direction::Backward, e)))
	}
}

/// Groups edges by unordered endpoint pair, in order of first appearance.
pub fn pair_edges(edges: &[Edge]) -> Vec<EdgePair> {
	let mut index: HashMap<(NodeId, NodeId), usize> = HashMap::new();
	let mut pairs: Vec<EdgePair> = Vec::new();
	for edge in edges {
		let (a, b) = (edge.from.min(edge.to), edge.from.max(edge.to));
		let slot = *index.entry((a, b)).or_insert_with(|| {
			pairs.push(EdgePair {
				a,
				b,
				forward: None,
				backward: None,
			});
			pairs.len() - 1
		});
		let pair = &mut pairs[slot];
		if edge.from == a {
			pair.forward.get_or_insert(*edge);
		} else {
			pair.backward.get_or_insert(*edge);
		}
	}
	pairs
}

/// Where one edge is drawn: boundary-to-boundary, optionally bowed into a
/// quadratic Bézier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeGeometry {
	pub start: Point,
	pub end: Point,
	pub control: Option<Point>,
	/// Unit normal of the side this edge bows (or puts its label) toward.
	pub normal: Point,
	/// Signed control-point offset along the pair's `a -> b` left normal;
	/// zero for straight edges.
	pub bow: f64,
}

impl EdgeGeometry {
	/// `a` and `b` are the pair's lower- and higher-id nodes.
	pub fn new(pair: &EdgePair, a: &Node, b: &Node, direction: Direction) -> Self {
		let (pa, pb) = (Point::from(a), Point::from(b));
		let delta = pb - pa;
		let len = match delta.length_sq().sqrt() {
			l if l > 0.0 => l,
			_ => 1.0,
		};
		let unit = delta * (1.0 / len);
		let start_ab = pa + unit * NODE_RADIUS;
		let end_ab = pb - unit * NODE_RADIUS;
		let left = Point::new(-unit.y, unit.x);

		let (start, end, side) = match direction {
			Direction::Forward => (start_ab, end_ab, 1.0),
			Direction::Backward => (end_ab, start_ab, -1.0),
		};
		let normal = left * side;
		let curved = pair.is_curved();
		let mid = (start + end) * 0.5;
		Self {
			start,
			end,
			control: curved.then(|| mid + normal * CURVE_OFFSET),
			normal,
			bow: if curved { side * CURVE_OFFSET } else { 0.0 },
		}
	}

	pub fn is_curved(&self) -> bool {
		self.control.is_some()
	}

	pub fn chord_midpoint(&self) -> Point {
		(self.start + self.end) * 0.5
	}

	pub fn point_at(&self, t: f64) -> Point {
		match self.control {
			Some(c) => {
				let u = 1.0 - t;
				self.start * (u * u) + c * (2.0 * u * t) + self.end * (t * t)
			}
			None => self.start + (self.end - self.start) * t,
		}
	}

	/// Direction of travel at `end`, for the arrowhead.
	pub fn end_angle(&self) -> f64 {
		let from = self.control.unwrap_or(self.start);
		(self.end.y - from.y).atan2(self.end.x - from.x)
	}

	/// Center of the weight label.
	pub fn label_anchor(&self) -> Point {
		let offset = if self.is_curved() {
			LABEL_OFFSET_CURVED
		} else {
			LABEL_OFFSET_STRAIGHT
		};
		self.chord_midpoint() + self.normal * offset
	}

	/// The `CURVE_SAMPLES + 1` points used for curved hit-testing.
	pub fn samples(&self) -> impl Iterator<Item = Point> + '_ {
		(0..=CURVE_SAMPLES).map(move |i| self.point_at(i as f64 / CURVE_SAMPLES as f64))
	}
}

/// Straight edges: projection must fall on the segment and lie within
/// `threshold`. Curved edges: nearest of the sampled curve points.
pub fn hit_test_edge(geometry: &EdgeGeometry, p: Point, threshold: f64) -> bool {
	if geometry.is_curved() {
		return geometry
			.samples()
			.map(|s| s.distance(p))
			.fold(f64::INFINITY, f64::min)
			<= threshold;
	}
	let seg = geometry.end - geometry.start;
	let len_sq = seg.length_sq();
	if len_sq == 0.0 {
		return false;
	}
	let t = (p - geometry.start).dot(seg) / len_sq;
	if !(0.0..=1.0).contains(&t) {
		return false;
	}
	(geometry.start + seg * t).distance(p) <= threshold
}

/// Width of rendered label text in world units.
pub trait TextMeasure {
	fn text_width(&self, text: &str) -> f64;
}

/// Axis-aligned weight label rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl LabelBox {
	pub fn around(anchor: Point, text_width: f64) -> Self {
		let width = text_width + LABEL_PADDING_X * 2.0;
		Self {
			x: anchor.x - width / 2.0,
			y: anchor.y - LABEL_HEIGHT / 2.0 - LABEL_LIFT,
			width,
			height: LABEL_HEIGHT,
		}
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}
}

pub fn hit_test_weight_label(geometry: &EdgeGeometry, text_width: f64, p: Point) -> bool {
	LabelBox::around(geometry.label_anchor(), text_width).contains(p)
}

/// Label text for a weight (`5`, `2.5`, `-3`).
pub fn format_weight(weight: f64) -> String {
	format!("{weight}")
}

/// One edge resolved against the current node positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeLayout {
	pub edge: Edge,
	pub direction: Direction,
	pub geometry: EdgeGeometry,
}

impl EdgeLayout {
	pub fn label_text(&self) -> String {
		format_weight(self.edge.display_weight())
	}
}

/// Geometry for every drawable edge, grouped by pair (forward before
/// backward). Edges whose endpoints are missing are skipped.
pub fn layout_edges(graph: &Graph) -> Vec<EdgeLayout> {
	let mut out = Vec::with_capacity(graph.edges().len());
	for pair in pair_edges(graph.edges()) {
		let (Some(a), Some(b)) = (graph.node(pair.a), graph.node(pair.b)) else {
			continue;
		};
		for (direction, edge) in pair.edges() {
			out.push(EdgeLayout {
				edge,
				direction,
				geometry: EdgeGeometry::new(&pair, a, b, direction),
			});
		}
	}
	out
}

pub fn find_edge_at(layouts: &[EdgeLayout], p: Point) -> Option<EdgeId> {
	layouts
		.iter()
		.find(|l| hit_test_edge(&l.geometry, p, EDGE_HIT_THRESHOLD))
		.map(|l| l.edge.id)
}

pub fn find_weight_label_at(
	layouts: &[EdgeLayout],
	p: Point,
	measure: &impl TextMeasure,
) -> Option<EdgeId> {
	layouts
		.iter()
		.find(|l| hit_test_weight_label(&l.geometry, measure.text_width(&l.label_text()), p))
		.map(|l| l.edge.id)
}

//! Node placement for graphs that arrive without positions.

use std::f64::consts::PI;

use crate::model::{Edge, Graph, GraphMode, Node, NodeId};

const RADIUS_FRACTION: f64 = 0.35;
const MIN_RANDOM_NODES: usize = 4;
const MAX_RANDOM_NODES: usize = 10;
const DIRECTED_EDGE_PROBABILITY: f64 = 0.25;
const UNORDERED_EDGE_PROBABILITY: f64 = 0.35;

/// Places nodes evenly on a circle centred in a `width` x `height` frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleLayout {
	pub width: f64,
	pub height: f64,
}

impl CircleLayout {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn radius(&self) -> f64 {
		self.width.min(self.height) * RADIUS_FRACTION
	}

	/// One node per id, in the order given, starting at angle zero.
	pub fn place(&self, ids: &[NodeId]) -> Vec<Node> {
		let (cx, cy, r) = (self.width / 2.0, self.height / 2.0, self.radius());
		let n = ids.len() as f64;
		ids.iter()
			.enumerate()
			.map(|(i, &id)| {
				let angle = 2.0 * PI * i as f64 / n;
				Node {
					id,
					x: cx + r * angle.cos(),
					y: cy + r * angle.sin(),
				}
			})
			.collect()
	}
}

/// A small random graph on ids `1..=n`. `random` yields uniform values in
/// `[0, 1)`.
pub fn random_graph(mode: GraphMode, layout: &CircleLayout, mut random: impl FnMut() -> f64) -> Graph {
	let span = MAX_RANDOM_NODES - MIN_RANDOM_NODES + 1;
	let n = MIN_RANDOM_NODES + ((random() * span as f64) as usize).min(span - 1);
	let ids: Vec<NodeId> = (1..=n as NodeId).collect();
	let nodes = layout.place(&ids);

	let mut pairs = Vec::new();
	if mode.is_ordered() {
		for &from in &ids {
			for &to in &ids {
				if from != to && random() < DIRECTED_EDGE_PROBABILITY {
					pairs.push((from, to));
				}
			}
		}
	} else {
		for (i, &from) in ids.iter().enumerate() {
			for &to in &ids[i + 1..] {
				if random() < UNORDERED_EDGE_PROBABILITY {
					pairs.push((from, to));
				}
			}
		}
	}
	if pairs.is_empty() && n > 1 {
		pairs.push((ids[0], ids[1]));
	}

	let edges = pairs
		.into_iter()
		.zip(1..)
		.map(|((from, to), id)| Edge {
			id,
			from,
			to,
			weight: mode.is_weighted().then(|| 1.0 + ((random() * 9.0) as i64).min(8) as f64),
		})
		.collect();

	// generated pairs satisfy every invariant
	Graph::new(nodes, edges, mode).unwrap_or_else(|_| Graph::empty())
}

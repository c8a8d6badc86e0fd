//! Canonical in-memory graph.
//!
//! A [`Graph`] is an immutable value: every edit helper returns a fresh graph
//! (or `None` when the edit would be invalid) so readers holding the previous
//! value never observe a half-applied change.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Caller-assigned node identifier.
pub type NodeId = i64;
/// Caller-assigned edge identifier.
pub type EdgeId = i64;

/// Edge semantics for the whole session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
	#[default]
	Undirected,
	Directed,
	Weighted,
}

impl GraphMode {
	/// Every mode, in toolbar order.
	pub const ALL: [GraphMode; 3] = [GraphMode::Undirected, GraphMode::Directed, GraphMode::Weighted];

	/// Wire / file keyword.
	pub fn as_str(self) -> &'static str {
		match self {
			GraphMode::Undirected => "undirected",
			GraphMode::Directed => "directed",
			GraphMode::Weighted => "weighted",
		}
	}

	/// Parses a mode keyword, ignoring case and surrounding whitespace.
	pub fn parse(keyword: &str) -> Option<Self> {
		let keyword = keyword.trim();
		Self::ALL
			.into_iter()
			.find(|mode| mode.as_str().eq_ignore_ascii_case(keyword))
	}

	pub fn label(self) -> &'static str {
		match self {
			GraphMode::Undirected => "Undirected",
			GraphMode::Directed => "Directed",
			GraphMode::Weighted => "Weighted",
		}
	}

	pub fn is_weighted(self) -> bool {
		self == GraphMode::Weighted
	}

	/// Whether `(a, b)` and `(b, a)` are distinct edges.
	pub fn is_ordered(self) -> bool {
		self == GraphMode::Directed
	}

	/// Whether edges are drawn with a direction (arrowheads, curved
	/// anti-parallel pairs).
	pub fn is_oriented(self) -> bool {
		self != GraphMode::Undirected
	}
}

impl fmt::Display for GraphMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	pub id: EdgeId,
	pub from: NodeId,
	pub to: NodeId,
	/// Present only in weighted mode.
	pub weight: Option<f64>,
}

impl Edge {
	/// True when the edge joins `a` and `b`; in unordered mode either way round.
	pub fn joins(&self, a: NodeId, b: NodeId, mode: GraphMode) -> bool {
		(self.from == a && self.to == b) || (!mode.is_ordered() && self.from == b && self.to == a)
	}

	pub fn touches(&self, node: NodeId) -> bool {
		self.from == node || self.to == node
	}

	/// Weight as shown to the user; absent weights display as `1`.
	pub fn display_weight(&self) -> f64 {
		self.weight.unwrap_or(1.0)
	}
}

/// Node and edge sets satisfying the model invariants.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
}

impl Graph {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Validates and assembles a graph. Node order is kept as given and is
	/// the insertion order used for hit-testing ties and start-node defaults.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, mode: GraphMode) -> Result<Self, ModelError> {
		let mut node_ids = HashSet::with_capacity(nodes.len());
		for node in &nodes {
			if !node_ids.insert(node.id) {
				return Err(ModelError::DuplicateNode(node.id));
			}
		}

		let mut edge_ids = HashSet::with_capacity(edges.len());
		let mut pairs = HashSet::with_capacity(edges.len());
		for edge in &edges {
			if !edge_ids.insert(edge.id) {
				return Err(ModelError::DuplicateEdgeId(edge.id));
			}
			for endpoint in [edge.from, edge.to] {
				if !node_ids.contains(&endpoint) {
					return Err(ModelError::DanglingEndpoint {
						edge: edge.id,
						node: endpoint,
					});
				}
			}
			if edge.from == edge.to {
				return Err(ModelError::SelfLoop {
					edge: edge.id,
					node: edge.from,
				});
			}
			if edge.weight.is_some_and(|w| !w.is_finite()) {
				return Err(ModelError::NonFiniteWeight(edge.id));
			}
			if !pairs.insert(pair_key(edge.from, edge.to, mode)) {
				return Err(ModelError::DuplicateEdge {
					edge: edge.id,
					from: edge.from,
					to: edge.to,
				});
			}
		}

		Ok(Self { nodes, edges })
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Node ids in ascending order.
	pub fn sorted_node_ids(&self) -> Vec<NodeId> {
		let mut ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
		ids.sort_unstable();
		ids
	}

	/// `max(existing) + 1`, or `1` for an empty graph. `None` once the
	/// maximum id is `i64::MAX`.
	pub fn next_node_id(&self) -> Option<NodeId> {
		self.nodes.iter().map(|n| n.id).max().map_or(Some(1), |max| max.checked_add(1))
	}

	pub fn next_edge_id(&self) -> Option<EdgeId> {
		self.edges.iter().map(|e| e.id).max().map_or(Some(1), |max| max.checked_add(1))
	}

	/// Whether an edge `from -> to` already exists under the mode's
	/// uniqueness rule.
	pub fn has_edge(&self, from: NodeId, to: NodeId, mode: GraphMode) -> bool {
		self.edges.iter().any(|e| e.joins(from, to, mode))
	}

	/// First edge with a negative weight, if any.
	pub fn first_negative_weight(&self) -> Option<EdgeId> {
		self.edges
			.iter()
			.find(|e| e.weight.is_some_and(|w| w < 0.0))
			.map(|e| e.id)
	}

	/// Adds a node at a world position with a freshly issued id. Returns
	/// `None` when no id is left to issue.
	pub fn with_node_at(&self, x: f64, y: f64) -> Option<(Graph, NodeId)> {
		let id = self.next_node_id()?;
		let mut nodes = self.nodes.clone();
		nodes.push(Node { id, x, y });
		Some((
			Graph {
				nodes,
				edges: self.edges.clone(),
			},
			id,
		))
	}

	pub fn with_node_moved(&self, id: NodeId, x: f64, y: f64) -> Option<Graph> {
		self.node(id)?;
		let nodes = self
			.nodes
			.iter()
			.map(|n| if n.id == id { Node { id, x, y } } else { *n })
			.collect();
		Some(Graph {
			nodes,
			edges: self.edges.clone(),
		})
	}

	/// Removes a node and every edge incident to it.
	pub fn without_node(&self, id: NodeId) -> Option<Graph> {
		self.node(id)?;
		Some(Graph {
			nodes: self.nodes.iter().filter(|n| n.id != id).copied().collect(),
			edges: self.edges.iter().filter(|e| !e.touches(id)).copied().collect(),
		})
	}

	/// Adds `from -> to`. Returns `None` for a missing endpoint, a self-loop,
	/// an edge the mode already has or an exhausted edge id range.
	pub fn with_edge(&self, from: NodeId, to: NodeId, mode: GraphMode) -> Option<Graph> {
		if from == to || self.node(from).is_none() || self.node(to).is_none() {
			return None;
		}
		if self.has_edge(from, to, mode) {
			return None;
		}
		let id = self.next_edge_id()?;
		let mut edges = self.edges.clone();
		edges.push(Edge {
			id,
			from,
			to,
			weight: mode.is_weighted().then_some(1.0),
		});
		Some(Graph {
			nodes: self.nodes.clone(),
			edges,
		})
	}

	pub fn without_edge(&self, id: EdgeId) -> Option<Graph> {
		self.edge(id)?;
		Some(Graph {
			nodes: self.nodes.clone(),
			edges: self.edges.iter().filter(|e| e.id != id).copied().collect(),
		})
	}

	/// Sets one edge weight. Only weighted graphs carry weights.
	pub fn with_weight(&self, id: EdgeId, weight: f64, mode: GraphMode) -> Option<Graph> {
		if !mode.is_weighted() || !weight.is_finite() {
			return None;
		}
		self.edge(id)?;
		let edges = self
			.edges
			.iter()
			.map(|e| {
				if e.id == id {
					Edge {
						weight: Some(weight),
						..*e
					}
				} else {
					*e
				}
			})
			.collect();
		Some(Graph {
			nodes: self.nodes.clone(),
			edges,
		})
	}

	/// Builds the edge set for a new mode: weights become `1` when entering
	/// weighted mode and disappear when leaving it; entering an unordered mode
	/// keeps only the first edge of each anti-parallel pair.
	pub fn converted_to(&self, mode: GraphMode) -> Graph {
		let mut seen = HashSet::with_capacity(self.edges.len());
		let edges = self
			.edges
			.iter()
			.filter(|e| seen.insert(pair_key(e.from, e.to, mode)))
			.map(|e| Edge {
				weight: if mode.is_weighted() {
					Some(e.weight.unwrap_or(1.0))
				} else {
					None
				},
				..*e
			})
			.collect();
		Graph {
			nodes: self.nodes.clone(),
			edges,
		}
	}
}

fn pair_key(from: NodeId, to: NodeId, mode: GraphMode) -> (NodeId, NodeId) {
	if mode.is_ordered() {
		(from, to)
	} else {
		(from.min(to), from.max(to))
	}
}

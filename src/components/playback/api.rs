//! Wire format of the algorithm service.

use serde::{Deserialize, Serialize};

use super::engine::Algorithm;
use crate::model::{EdgeId, Graph, GraphMode, NodeId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
	pub id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgePayload {
	pub id: EdgeId,
	pub from_node: NodeId,
	pub to_node: NodeId,
	pub weight: Option<f64>,
}

/// Body of `POST /api/algorithms/run`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
	pub algorithm: Algorithm,
	pub graph_type: GraphMode,
	pub nodes: Vec<NodePayload>,
	pub edges: Vec<EdgePayload>,
	pub start_node_id: Option<NodeId>,
	pub target_node_id: Option<NodeId>,
}

impl RunRequest {
	/// Snapshot of `graph` for one run.
	pub fn snapshot(graph: &Graph, mode: GraphMode, algorithm: Algorithm, start: Option<NodeId>) -> Self {
		Self {
			algorithm,
			graph_type: mode,
			nodes: graph.nodes().iter().map(|n| NodePayload { id: n.id }).collect(),
			edges: graph
				.edges()
				.iter()
				.map(|e| EdgePayload {
					id: e.id,
					from_node: e.from,
					to_node: e.to,
					weight: e.weight,
				})
				.collect(),
			start_node_id: start,
			target_node_id: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunCreated {
	pub run_id: String,
	pub algorithm: String,
	pub total_steps: usize,
}

/// Body of `GET /api/algorithms/run/{run_id}/step/{index}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepHighlight {
	pub step_index: usize,
	pub total_steps: usize,
	pub algorithm: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub highlight_nodes: Vec<NodeId>,
	#[serde(default)]
	pub highlight_edges: Vec<EdgeId>,
	#[serde(default)]
	pub visited_nodes: Vec<NodeId>,
	#[serde(default)]
	pub visited_edges: Vec<EdgeId>,
}

pub fn run_path(base: &str) -> String {
	format!("{}/api/algorithms/run", base.trim_end_matches('/'))
}

pub fn step_path(base: &str, run_id: &str, index: usize) -> String {
	format!("{}/{run_id}/step/{index}", run_path(base))
}

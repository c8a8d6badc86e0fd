//! Error types shared across the editor.

use thiserror::Error;

use crate::components::playback::Algorithm;
use crate::model::{EdgeId, NodeId};

/// A whole-graph replacement that would break a model invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
	#[error("node {0} appears more than once")]
	DuplicateNode(NodeId),
	#[error("edge id {0} appears more than once")]
	DuplicateEdgeId(EdgeId),
	#[error("edge {edge} references missing node {node}")]
	DanglingEndpoint { edge: EdgeId, node: NodeId },
	#[error("edge {edge} is a self-loop on node {node}; self-loops are not supported")]
	SelfLoop { edge: EdgeId, node: NodeId },
	#[error("edge {edge} duplicates an existing edge between {from} and {to}")]
	DuplicateEdge { edge: EdgeId, from: NodeId, to: NodeId },
	#[error("edge {0} has a non-finite weight")]
	NonFiniteWeight(EdgeId),
}

/// Malformed text handed to one of the notation codecs or to file import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.render())]
pub struct ValidationError {
	/// 1-based line in the submitted text, when the problem is tied to one.
	pub line: Option<usize>,
	/// What is wrong with the input.
	pub reason: String,
}

impl ValidationError {
	/// An error pinned to a line of the input.
	pub fn at(line: usize, reason: impl Into<String>) -> Self {
		Self {
			line: Some(line),
			reason: reason.into(),
		}
	}

	/// An error about the input as a whole.
	pub fn whole(reason: impl Into<String>) -> Self {
		Self {
			line: None,
			reason: reason.into(),
		}
	}

	fn render(&self) -> String {
		match self.line {
			Some(line) => format!("line {line}: {}", self.reason),
			None => self.reason.clone(),
		}
	}
}

impl From<ModelError> for ValidationError {
	fn from(err: ModelError) -> Self {
		Self::whole(err.to_string())
	}
}

/// Why a run cannot be submitted right now. The panel disables the run
/// button instead of attempting the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
	#[error("No nodes in graph.")]
	EmptyGraph,
	#[error("{0} requires a weighted graph.")]
	RequiresWeighted(Algorithm),
	#[error("{algorithm} does not support negative weights (edge {edge}).")]
	NegativeWeight { algorithm: Algorithm, edge: EdgeId },
	#[error("A run is already in progress.")]
	Busy,
}

/// Failure talking to the algorithm service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	#[error("request failed: {0}")]
	Request(String),
	#[error("HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("could not decode response: {0}")]
	Decode(String),
}

impl From<serde_json::Error> for TransportError {
	fn from(err: serde_json::Error) -> Self {
		Self::Decode(err.to_string())
	}
}

/// Rejected text in the weight-edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightInputError {
	#[error("Weight cannot be empty.")]
	Empty,
	#[error("Weight must be a number (got \"{0}\").")]
	NotANumber(String),
	#[error("Weight must be finite.")]
	NotFinite,
}

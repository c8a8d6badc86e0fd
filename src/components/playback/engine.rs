//! Run/step state machine for algorithm playback.
//!
//! The engine performs no I/O. `submit`, `next` and `previous` hand back a
//! ticket describing the request to make; the caller performs it and feeds
//! the outcome to `complete_submit` / `complete_step`. Tickets carry the
//! generation they were issued under, so a response that arrives after the
//! user navigated away or finished the run is dropped instead of applied.

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::api::{RunCreated, RunRequest, StepHighlight};
use crate::error::{PreconditionError, TransportError};
use crate::model::{EdgeId, Graph, GraphMode, NodeId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
	#[default]
	Bfs,
	Dfs,
	Kruskal,
	Prim,
	Dijkstra,
	BellmanFord,
}

impl Algorithm {
	pub const ALL: [Algorithm; 6] = [
		Algorithm::Bfs,
		Algorithm::Dfs,
		Algorithm::Kruskal,
		Algorithm::Prim,
		Algorithm::Dijkstra,
		Algorithm::BellmanFord,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Algorithm::Bfs => "bfs",
			Algorithm::Dfs => "dfs",
			Algorithm::Kruskal => "kruskal",
			Algorithm::Prim => "prim",
			Algorithm::Dijkstra => "dijkstra",
			Algorithm::BellmanFord => "bellmanford",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|a| a.as_str() == s)
	}

	pub fn label(self) -> &'static str {
		match self {
			Algorithm::Bfs => "BFS",
			Algorithm::Dfs => "DFS",
			Algorithm::Kruskal => "Kruskal",
			Algorithm::Prim => "Prim",
			Algorithm::Dijkstra => "Dijkstra",
			Algorithm::BellmanFord => "Bellman-Ford",
		}
	}

	pub fn requires_weights(self) -> bool {
		!matches!(self, Algorithm::Bfs | Algorithm::Dfs)
	}

	pub fn rejects_negative_weights(self) -> bool {
		self == Algorithm::Dijkstra
	}

	/// Spanning-tree algorithms treat every edge as undirected.
	pub fn is_spanning_tree(self) -> bool {
		matches!(self, Algorithm::Kruskal | Algorithm::Prim)
	}
}

impl fmt::Display for Algorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Node/edge ids to draw as "current step" and as "already processed".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSets {
	pub highlight_nodes: HashSet<NodeId>,
	pub highlight_edges: HashSet<EdgeId>,
	pub visited_nodes: HashSet<NodeId>,
	pub visited_edges: HashSet<EdgeId>,
}

impl HighlightSets {
	pub fn is_empty(&self) -> bool {
		self.highlight_nodes.is_empty()
			&& self.highlight_edges.is_empty()
			&& self.visited_nodes.is_empty()
			&& self.visited_edges.is_empty()
	}
}

impl From<&StepHighlight> for HighlightSets {
	fn from(step: &StepHighlight) -> Self {
		Self {
			highlight_nodes: step.highlight_nodes.iter().copied().collect(),
			highlight_edges: step.highlight_edges.iter().copied().collect(),
			visited_nodes: step.visited_nodes.iter().copied().collect(),
			visited_edges: step.visited_edges.iter().copied().collect(),
		}
	}
}

/// A run the service has created.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveRun {
	pub run_id: String,
	pub algorithm: Algorithm,
	pub total_steps: usize,
	/// Index of the step on display; `None` until the first fetch lands.
	pub current: Option<usize>,
	/// Index of the step fetch in flight, if any.
	pub in_flight: Option<usize>,
	pub description: Option<String>,
	/// Failure of the most recent step fetch.
	pub last_error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RunState {
	#[default]
	Idle,
	Submitting { algorithm: Algorithm },
	Active(ActiveRun),
	Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitTicket {
	generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepTicket {
	pub run_id: String,
	pub index: usize,
	generation: u64,
}

#[derive(Clone, Debug, Default)]
pub struct PlaybackEngine {
	state: RunState,
	highlights: HighlightSets,
	notice: Option<String>,
	generation: u64,
}

impl PlaybackEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> &RunState {
		&self.state
	}

	pub fn highlights(&self) -> &HighlightSets {
		&self.highlights
	}

	pub fn active_run(&self) -> Option<&ActiveRun> {
		match &self.state {
			RunState::Active(run) => Some(run),
			_ => None,
		}
	}

	/// A submission or step fetch is outstanding.
	pub fn is_busy(&self) -> bool {
		match &self.state {
			RunState::Submitting { .. } => true,
			RunState::Active(run) => run.in_flight.is_some(),
			_ => false,
		}
	}

	/// Graph editing is frozen from submission until the run is finished.
	pub fn locks_editing(&self) -> bool {
		matches!(self.state, RunState::Submitting { .. } | RunState::Active(_))
	}

	/// Static preconditions on the graph for `algorithm`.
	pub fn validate_submission(graph: &Graph, mode: GraphMode, algorithm: Algorithm) -> Result<(), PreconditionError> {
		if graph.is_empty() {
			return Err(PreconditionError::EmptyGraph);
		}
		if algorithm.requires_weights() && !mode.is_weighted() {
			return Err(PreconditionError::RequiresWeighted(algorithm));
		}
		if algorithm.rejects_negative_weights() {
			if let Some(edge) = graph.first_negative_weight() {
				return Err(PreconditionError::NegativeWeight { algorithm, edge });
			}
		}
		Ok(())
	}

	/// Whether the run button should be enabled. An active run has to be
	/// finished before another is submitted.
	pub fn can_submit(&self, graph: &Graph, mode: GraphMode, algorithm: Algorithm) -> Result<(), PreconditionError> {
		if self.locks_editing() {
			return Err(PreconditionError::Busy);
		}
		Self::validate_submission(graph, mode, algorithm)
	}

	/// Snapshots the graph into a run request. An unset or vanished start
	/// node falls back to the first node in insertion order.
	pub fn submit(
		&mut self,
		graph: &Graph,
		mode: GraphMode,
		algorithm: Algorithm,
		start: Option<NodeId>,
	) -> Result<(SubmitTicket, RunRequest), PreconditionError> {
		self.can_submit(graph, mode, algorithm)?;
		let start = start
			.filter(|id| graph.node(*id).is_some())
			.or_else(|| graph.nodes().first().map(|n| n.id));

		self.generation += 1;
		self.highlights = HighlightSets::default();
		self.notice = None;
		self.state = RunState::Submitting { algorithm };
		info!(
			"submitting {algorithm} over {} nodes / {} edges from {start:?}",
			graph.nodes().len(),
			graph.edges().len()
		);
		Ok((
			SubmitTicket {
				generation: self.generation,
			},
			RunRequest::snapshot(graph, mode, algorithm, start),
		))
	}

	/// Applies the service's answer to a submission. Returns the first step
	/// fetch to perform, if any.
	pub fn complete_submit(
		&mut self,
		ticket: SubmitTicket,
		result: Result<RunCreated, TransportError>,
	) -> Option<StepTicket> {
		let algorithm = match self.state {
			RunState::Submitting { algorithm } if ticket.generation == self.generation => algorithm,
			_ => {
				debug!("discarding stale run submission response");
				return None;
			}
		};
		let created = match result {
			Ok(created) => created,
			Err(err) => {
				warn!("run submission failed: {err}");
				self.state = RunState::Error {
					message: err.to_string(),
				};
				return None;
			}
		};
		if created.total_steps == 0 {
			info!("run {} has no steps", created.run_id);
			self.state = RunState::Idle;
			self.notice = Some("Run has no steps.".into());
			return None;
		}
		info!("run {} created with {} steps", created.run_id, created.total_steps);
		self.state = RunState::Active(ActiveRun {
			run_id: created.run_id,
			algorithm,
			total_steps: created.total_steps,
			current: None,
			in_flight: None,
			description: None,
			last_error: None,
		});
		self.request_step(0)
	}

	/// No-op at the last step or while a fetch is in flight. Before the first
	/// step has landed this re-requests step 0.
	pub fn next(&mut self) -> Option<StepTicket> {
		let run = self.active_run()?;
		let index = run.current.map_or(0, |c| c + 1);
		if index >= run.total_steps {
			return None;
		}
		self.request_step(index)
	}

	/// No-op at step 0 or while a fetch is in flight.
	pub fn previous(&mut self) -> Option<StepTicket> {
		let current = self.active_run()?.current?;
		if current == 0 {
			return None;
		}
		self.request_step(current - 1)
	}

	pub fn can_go_next(&self) -> bool {
		self.active_run().is_some_and(|run| {
			run.in_flight.is_none() && run.current.map_or(0, |c| c + 1) < run.total_steps
		})
	}

	pub fn can_go_previous(&self) -> bool {
		self.active_run()
			.is_some_and(|run| run.in_flight.is_none() && run.current.is_some_and(|c| c > 0))
	}

	fn request_step(&mut self, index: usize) -> Option<StepTicket> {
		let generation = self.generation;
		let RunState::Active(run) = &mut self.state else {
			return None;
		};
		if run.in_flight.is_some() {
			return None;
		}
		run.in_flight = Some(index);
		debug!("fetching step {index} of run {}", run.run_id);
		Some(StepTicket {
			run_id: run.run_id.clone(),
			index,
			generation,
		})
	}

	/// Applies a step fetch outcome. Returns `true` when a new step is now on
	/// display. A failure leaves the previous step displayed.
	pub fn complete_step(&mut self, ticket: StepTicket, result: Result<StepHighlight, TransportError>) -> bool {
		let generation = self.generation;
		let RunState::Active(run) = &mut self.state else {
			debug!("discarding step {} for an inactive run", ticket.index);
			return false;
		};
		if ticket.generation != generation || ticket.run_id != run.run_id || run.in_flight != Some(ticket.index) {
			debug!("discarding stale step {} of run {}", ticket.index, ticket.run_id);
			return false;
		}
		run.in_flight = None;

		let step = match result {
			Ok(step) if step.step_index == ticket.index => step,
			Ok(step) => {
				let message = format!("expected step {}, service sent step {}", ticket.index, step.step_index);
				warn!("{message}");
				run.last_error = Some(message);
				return false;
			}
			Err(err) => {
				warn!("failed to fetch step {}: {err}", ticket.index);
				run.last_error = Some(format!("Failed to fetch step {}: {err}", ticket.index));
				return false;
			}
		};

		run.current = Some(step.step_index);
		run.description = step.description.clone();
		run.last_error = None;
		self.highlights = HighlightSets::from(&step);
		true
	}

	/// Leaves playback: drops the run handle and every highlight.
	pub fn finish(&mut self) {
		if let Some(run) = self.active_run() {
			info!("finished run {}", run.run_id);
		}
		self.generation += 1;
		self.state = RunState::Idle;
		self.highlights = HighlightSets::default();
		self.notice = None;
	}

	pub fn acknowledge_error(&mut self) {
		if matches!(self.state, RunState::Error { .. }) {
			self.state = RunState::Idle;
		}
	}

	/// The graph changed underneath; the overlay no longer applies.
	pub fn clear_highlights(&mut self) {
		self.highlights = HighlightSets::default();
	}

	/// `current/total`, 1-based.
	pub fn step_label(&self) -> Option<String> {
		let run = self.active_run()?;
		Some(format!("{}/{}", run.current.map_or(0, |c| c + 1), run.total_steps))
	}

	pub fn status_line(&self) -> String {
		match &self.state {
			RunState::Idle => self.notice.clone().unwrap_or_else(|| "Idle".into()),
			RunState::Submitting { algorithm } => format!("Running {algorithm}..."),
			RunState::Active(run) => match (run.current, run.in_flight) {
				(None, Some(_)) => "Run created. Loading first step...".into(),
				(None, None) => "Run created.".into(),
				(Some(_), _) => {
					let step = format!("Step {}", self.step_label().unwrap_or_default());
					match &run.description {
						Some(description) => format!("{step}: {description}"),
						None => step,
					}
				}
			},
			RunState::Error { .. } => "Error".into(),
		}
	}

	/// Error text for the panel, from a failed submission or step fetch.
	pub fn error_message(&self) -> Option<&str> {
		match &self.state {
			RunState::Error { message } => Some(message),
			RunState::Active(run) => run.last_error.as_deref(),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	fn weighted_pair(weight: f64) -> Graph {
		Graph::new(
			vec![Node { id: 1, x: 0.0, y: 0.0 }, Node { id: 2, x: 1.0, y: 0.0 }],
			vec![Edge {
				id: 1,
				from: 1,
				to: 2,
				weight: Some(weight),
			}],
			GraphMode::Weighted,
		)
		.unwrap()
	}

	fn created(total_steps: usize) -> Result<RunCreated, TransportError> {
		Ok(RunCreated {
			run_id: "run-1".into(),
			algorithm: "bfs".into(),
			total_steps,
		})
	}

	fn step(index: usize, nodes: &[NodeId]) -> Result<StepHighlight, TransportError> {
		Ok(StepHighlight {
			step_index: index,
			total_steps: 3,
			algorithm: "bfs".into(),
			highlight_nodes: nodes.to_vec(),
			visited_edges: vec![1],
			..Default::default()
		})
	}

	/// Starts a run with `total` steps and lands step 0.
	fn started(total: usize) -> PlaybackEngine {
		let mut engine = PlaybackEngine::new();
		let (ticket, _) = engine
			.submit(&weighted_pair(1.0), GraphMode::Weighted, Algorithm::Bfs, None)
			.unwrap();
		let first = engine.complete_submit(ticket, created(total)).unwrap();
		assert!(engine.complete_step(first, step(0, &[1])));
		engine
	}

	fn current(engine: &PlaybackEngine) -> Option<usize> {
		engine.active_run().and_then(|r| r.current)
	}

	#[test]
	fn empty_graph_cannot_be_submitted() {
		let mut engine = PlaybackEngine::new();
		assert_eq!(
			engine.submit(&Graph::empty(), GraphMode::Undirected, Algorithm::Bfs, None),
			Err(PreconditionError::EmptyGraph)
		);
		assert_eq!(engine.state(), &RunState::Idle);
	}

	#[test]
	fn weighted_algorithms_need_weighted_mode() {
		let engine = PlaybackEngine::new();
		let g = weighted_pair(5.0);
		assert_eq!(
			engine.can_submit(&g, GraphMode::Directed, Algorithm::Kruskal),
			Err(PreconditionError::RequiresWeighted(Algorithm::Kruskal))
		);
		assert_eq!(engine.can_submit(&g, GraphMode::Weighted, Algorithm::Dijkstra), Ok(()));
		assert_eq!(
			engine.can_submit(&weighted_pair(-3.0), GraphMode::Weighted, Algorithm::Dijkstra),
			Err(PreconditionError::NegativeWeight {
				algorithm: Algorithm::Dijkstra,
				edge: 1
			})
		);
		assert_eq!(
			engine.can_submit(&weighted_pair(-3.0), GraphMode::Weighted, Algorithm::BellmanFord),
			Ok(())
		);
	}

	#[test]
	fn start_node_defaults_to_first_node() {
		let mut engine = PlaybackEngine::new();
		let g = weighted_pair(1.0);
		let (_, request) = engine.submit(&g, GraphMode::Weighted, Algorithm::Dijkstra, Some(42)).unwrap();
		assert_eq!(request.start_node_id, Some(1));
		assert!(engine.locks_editing());
		assert_eq!(
			engine.can_submit(&g, GraphMode::Weighted, Algorithm::Bfs),
			Err(PreconditionError::Busy)
		);
	}

	#[test]
	fn navigation_is_bounded() {
		let mut engine = started(3);
		assert_eq!(current(&engine), Some(0));
		assert!(engine.previous().is_none());

		for expected in 1..=2 {
			let ticket = engine.next().unwrap();
			assert_eq!(ticket.index, expected);
			assert!(engine.complete_step(ticket, step(expected, &[2])));
			assert_eq!(current(&engine), Some(expected));
		}
		assert!(engine.next().is_none());
		assert!(!engine.can_go_next());
		assert_eq!(current(&engine), Some(2));
		assert_eq!(engine.step_label().as_deref(), Some("3/3"));
		assert!(engine.status_line().starts_with("Step 3/3"));
	}

	#[test]
	fn only_one_step_fetch_at_a_time() {
		let mut engine = started(3);
		let ticket = engine.next().unwrap();
		assert!(engine.is_busy());
		assert!(engine.next().is_none());
		assert!(engine.previous().is_none());
		assert!(engine.complete_step(ticket, step(1, &[2])));
		assert!(!engine.is_busy());
	}

	#[test]
	fn failed_fetch_keeps_the_previous_step() {
		let mut engine = started(3);
		let before = engine.highlights().clone();
		let ticket = engine.next().unwrap();
		assert!(!engine.complete_step(ticket, Err(TransportError::Status { status: 500, body: "boom".into() })));
		assert_eq!(current(&engine), Some(0));
		assert_eq!(engine.highlights(), &before);
		assert!(engine.error_message().unwrap().contains("HTTP 500"));

		// explicit retry
		let retry = engine.next().unwrap();
		assert!(engine.complete_step(retry, step(1, &[2])));
		assert_eq!(engine.error_message(), None);
	}

	#[test]
	fn responses_after_finish_are_discarded() {
		let mut engine = started(3);
		let ticket = engine.next().unwrap();
		engine.finish();
		assert!(engine.highlights().is_empty());
		assert!(!engine.locks_editing());
		assert!(!engine.complete_step(ticket, step(1, &[2])));
		assert!(engine.highlights().is_empty());
		assert_eq!(engine.state(), &RunState::Idle);
	}

	#[test]
	fn stale_submission_is_discarded() {
		let mut engine = PlaybackEngine::new();
		let g = weighted_pair(1.0);
		let (old, _) = engine.submit(&g, GraphMode::Weighted, Algorithm::Bfs, None).unwrap();
		engine.finish();
		assert!(engine.complete_submit(old, created(3)).is_none());
		assert_eq!(engine.state(), &RunState::Idle);
	}

	#[test]
	fn mismatched_step_index_is_rejected() {
		let mut engine = started(3);
		let ticket = engine.next().unwrap();
		assert!(!engine.complete_step(ticket, step(2, &[2])));
		assert_eq!(current(&engine), Some(0));
		assert!(engine.error_message().is_some());
	}

	#[test]
	fn zero_step_run_fetches_nothing() {
		let mut engine = PlaybackEngine::new();
		let (ticket, _) = engine
			.submit(&weighted_pair(1.0), GraphMode::Weighted, Algorithm::Bfs, None)
			.unwrap();
		assert!(engine.complete_submit(ticket, created(0)).is_none());
		assert_eq!(engine.state(), &RunState::Idle);
		assert_eq!(engine.status_line(), "Run has no steps.");
	}

	#[test]
	fn submission_failure_needs_acknowledgement() {
		let mut engine = PlaybackEngine::new();
		let (ticket, _) = engine
			.submit(&weighted_pair(1.0), GraphMode::Weighted, Algorithm::Bfs, None)
			.unwrap();
		assert!(engine.complete_submit(ticket, Err(TransportError::Request("offline".into()))).is_none());
		assert!(matches!(engine.state(), RunState::Error { .. }));
		assert!(!engine.locks_editing());
		engine.acknowledge_error();
		assert_eq!(engine.state(), &RunState::Idle);
	}

	#[test]
	fn step_populates_highlight_sets() {
		let engine = started(3);
		let h = engine.highlights();
		assert!(h.highlight_nodes.contains(&1));
		assert!(h.visited_edges.contains(&1));
		assert!(h.visited_nodes.is_empty());
		assert_eq!(engine.status_line(), "Step 1/3");
	}

	#[test]
	fn algorithm_names_round_trip() {
		for algorithm in Algorithm::ALL {
			assert_eq!(Algorithm::parse(algorithm.as_str()), Some(algorithm));
			assert_eq!(
				serde_json::to_string(&algorithm).unwrap(),
				format!("\"{}\"", algorithm.as_str())
			);
		}
	}
}

//! The three editable text notations: adjacency matrix, adjacency list and
//! edge list.
//!
//! Parsers build a complete graph or fail with the offending line; nodes get
//! circle positions by ascending id and edges are numbered from 1 in input
//! order. Blank text parses to the empty graph.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use super::layout::CircleLayout;
use crate::components::graph_canvas::geometry::format_weight;
use crate::error::ValidationError;
use crate::model::{Edge, EdgeId, Graph, GraphMode, NodeId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextNotation {
	#[default]
	AdjacencyMatrix,
	AdjacencyList,
	EdgeList,
}

impl TextNotation {
	pub const ALL: [TextNotation; 3] = [
		TextNotation::AdjacencyMatrix,
		TextNotation::AdjacencyList,
		TextNotation::EdgeList,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			TextNotation::AdjacencyMatrix => "adjacency-matrix",
			TextNotation::AdjacencyList => "adjacency-list",
			TextNotation::EdgeList => "edge-list",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|n| n.as_str() == s)
	}

	pub fn label(self) -> &'static str {
		match self {
			TextNotation::AdjacencyMatrix => "Adjacency matrix",
			TextNotation::AdjacencyList => "Adjacency list",
			TextNotation::EdgeList => "Edge list",
		}
	}
}

impl fmt::Display for TextNotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Non-blank lines, trimmed, with their 1-based line numbers.
pub(crate) fn numbered_lines(text: &str) -> Vec<(usize, &str)> {
	text.lines()
		.enumerate()
		.map(|(i, l)| (i + 1, l.trim()))
		.filter(|(_, l)| !l.is_empty())
		.collect()
}

pub fn to_text(graph: &Graph, mode: GraphMode, notation: TextNotation) -> String {
	if graph.is_empty() {
		return String::new();
	}
	match notation {
		TextNotation::AdjacencyMatrix => matrix_text(graph, mode),
		TextNotation::AdjacencyList => adjacency_list_text(graph, mode),
		TextNotation::EdgeList => edge_list_text(graph, mode),
	}
}

pub fn parse(
	text: &str,
	notation: TextNotation,
	mode: GraphMode,
	layout: &CircleLayout,
) -> Result<Graph, ValidationError> {
	let lines = numbered_lines(text);
	if lines.is_empty() {
		return Ok(Graph::empty());
	}
	match notation {
		TextNotation::AdjacencyMatrix => parse_matrix(&lines, mode, layout),
		TextNotation::AdjacencyList => parse_adjacency_list(&lines, mode, layout),
		TextNotation::EdgeList => parse_edge_lines(&lines, mode, layout),
	}
}

fn matrix_text(graph: &Graph, mode: GraphMode) -> String {
	let ids = graph.sorted_node_ids();
	let index: BTreeMap<NodeId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
	let mut cells = vec![vec![0.0; ids.len()]; ids.len()];
	for e in graph.edges() {
		let (Some(&i), Some(&j)) = (index.get(&e.from), index.get(&e.to)) else {
			continue;
		};
		let value = if mode.is_weighted() { e.display_weight() } else { 1.0 };
		cells[i][j] = value;
		if !mode.is_ordered() {
			cells[j][i] = value;
		}
	}
	cells
		.iter()
		.map(|row| row.iter().map(|&v| format_weight(v)).collect::<Vec<_>>().join(" "))
		.collect::<Vec<_>>()
		.join("\n")
}

fn adjacency_list_text(graph: &Graph, mode: GraphMode) -> String {
	let mut neighbours: BTreeMap<NodeId, BTreeSet<NodeId>> =
		graph.nodes().iter().map(|n| (n.id, BTreeSet::new())).collect();
	for e in graph.edges() {
		neighbours.entry(e.from).or_default().insert(e.to);
		if !mode.is_ordered() {
			neighbours.entry(e.to).or_default().insert(e.from);
		}
	}
	neighbours
		.iter()
		.map(|(id, ns)| {
			if ns.is_empty() {
				format!("{id}:")
			} else {
				let ns: Vec<String> = ns.iter().map(ToString::to_string).collect();
				format!("{id}: {}", ns.join(" "))
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// `from to [weight]` per edge, preceded by one bare id per isolated node.
pub(crate) fn edge_list_text(graph: &Graph, mode: GraphMode) -> String {
	let connected: HashSet<NodeId> = graph.edges().iter().flat_map(|e| [e.from, e.to]).collect();
	let isolated = graph
		.sorted_node_ids()
		.into_iter()
		.filter(|id| !connected.contains(id))
		.map(|id| id.to_string());
	let edges = graph.edges().iter().map(|e| edge_line(e, mode));
	isolated.chain(edges).collect::<Vec<_>>().join("\n")
}

pub(crate) fn edge_line(e: &Edge, mode: GraphMode) -> String {
	if mode.is_weighted() {
		format!("{} {} {}", e.from, e.to, format_weight(e.display_weight()))
	} else {
		format!("{} {}", e.from, e.to)
	}
}

fn parse_id(token: &str, line: usize, what: &str) -> Result<NodeId, ValidationError> {
	token
		.parse()
		.map_err(|_| ValidationError::at(line, format!("invalid {what} \"{token}\" (expected an integer id)")))
}

fn parse_number(token: &str, line: usize, what: &str) -> Result<f64, ValidationError> {
	match token.parse::<f64>() {
		Ok(v) if v.is_finite() => Ok(v),
		_ => Err(ValidationError::at(line, format!("invalid {what} \"{token}\" (expected a number)"))),
	}
}

fn build(
	ids: BTreeSet<NodeId>,
	edges: Vec<Edge>,
	mode: GraphMode,
	layout: &CircleLayout,
) -> Result<Graph, ValidationError> {
	let ids: Vec<NodeId> = ids.into_iter().collect();
	Ok(Graph::new(layout.place(&ids), edges, mode)?)
}

fn parse_matrix(lines: &[(usize, &str)], mode: GraphMode, layout: &CircleLayout) -> Result<Graph, ValidationError> {
	let rows = lines
		.iter()
		.map(|&(line, text)| {
			text.split_whitespace()
				.map(|tok| parse_number(tok, line, "matrix value"))
				.collect::<Result<Vec<f64>, _>>()
				.map(|row| (line, row))
		})
		.collect::<Result<Vec<_>, _>>()?;

	let n = rows.len();
	for (i, (line, row)) in rows.iter().enumerate() {
		if row.len() != n {
			return Err(ValidationError::at(
				*line,
				format!("matrix must be square: expected {n} values, found {}", row.len()),
			));
		}
		if row[i] != 0.0 {
			return Err(ValidationError::at(*line, "self-loops are not supported (non-zero diagonal)"));
		}
	}

	let mut edges = Vec::new();
	let mut push = |from: usize, to: usize, value: f64| {
		edges.push(Edge {
			id: edges.len() as EdgeId + 1,
			from: from as NodeId + 1,
			to: to as NodeId + 1,
			weight: mode.is_weighted().then_some(value),
		});
	};
	for i in 0..n {
		if mode.is_ordered() {
			for j in (0..n).filter(|&j| j != i && rows[i].1[j] != 0.0) {
				push(i, j, rows[i].1[j]);
			}
		} else {
			for j in i + 1..n {
				let value = if rows[i].1[j] != 0.0 { rows[i].1[j] } else { rows[j].1[i] };
				if value != 0.0 {
					push(i, j, value);
				}
			}
		}
	}
	build((1..=n as NodeId).collect(), edges, mode, layout)
}

fn parse_adjacency_list(
	lines: &[(usize, &str)],
	mode: GraphMode,
	layout: &CircleLayout,
) -> Result<Graph, ValidationError> {
	let mut ids = BTreeSet::new();
	let mut seen = HashSet::new();
	let mut edges = Vec::new();

	for &(line, text) in lines {
		let Some((left, right)) = text.split_once(':') else {
			return Err(ValidationError::at(line, "missing ':' after the node id"));
		};
		let from = parse_id(left.trim(), line, "node id")?;
		ids.insert(from);
		for token in right.split_whitespace() {
			let to = parse_id(token, line, "neighbour")?;
			if to == from {
				return Err(ValidationError::at(line, format!("self-loop on node {from} is not supported")));
			}
			ids.insert(to);
			let (a, b) = if mode.is_ordered() { (from, to) } else { (from.min(to), from.max(to)) };
			if seen.insert((a, b)) {
				edges.push(Edge {
					id: edges.len() as EdgeId + 1,
					from: a,
					to: b,
					weight: mode.is_weighted().then_some(1.0),
				});
			}
		}
	}
	build(ids, edges, mode, layout)
}

/// Edge-list body, shared with the flat import format. Single-integer lines
/// are isolated nodes; a missing weight defaults to 1 in weighted mode and a
/// weight token is ignored otherwise.
pub(crate) fn parse_edge_lines(
	lines: &[(usize, &str)],
	mode: GraphMode,
	layout: &CircleLayout,
) -> Result<Graph, ValidationError> {
	let mut ids = BTreeSet::new();
	let mut seen = HashSet::new();
	let mut edges = Vec::new();

	for &(line, text) in lines {
		let tokens: Vec<&str> = text.split_whitespace().collect();
		match tokens.as_slice() {
			[id] => {
				ids.insert(parse_id(id, line, "node id")?);
			}
			[from, to, rest @ ..] if rest.len() <= 1 => {
				let from = parse_id(from, line, "node id")?;
				let to = parse_id(to, line, "node id")?;
				if from == to {
					return Err(ValidationError::at(line, format!("self-loop on node {from} is not supported")));
				}
				let weight = match (mode.is_weighted(), rest.first()) {
					(true, Some(w)) => Some(parse_number(w, line, "weight")?),
					(true, None) => Some(1.0),
					(false, _) => None,
				};
				let key = if mode.is_ordered() { (from, to) } else { (from.min(to), from.max(to)) };
				if !seen.insert(key) {
					return Err(ValidationError::at(
						line,
						format!("duplicate edge between {from} and {to}"),
					));
				}
				ids.extend([from, to]);
				edges.push(Edge {
					id: edges.len() as EdgeId + 1,
					from,
					to,
					weight,
				});
			}
			_ => {
				return Err(ValidationError::at(line, "expected \"from to\" or \"from to weight\""));
			}
		}
	}
	build(ids, edges, mode, layout)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Node;
	use proptest::prelude::*;

	const LAYOUT: CircleLayout = CircleLayout {
		width: 900.0,
		height: 600.0,
	};

	fn graph(n: NodeId, edges: &[(NodeId, NodeId, Option<f64>)], mode: GraphMode) -> Graph {
		let nodes = (1..=n).map(|id| Node { id, x: 0.0, y: 0.0 }).collect();
		let edges = edges
			.iter()
			.zip(1..)
			.map(|(&(from, to, weight), id)| Edge { id, from, to, weight })
			.collect();
		Graph::new(nodes, edges, mode).unwrap()
	}

	fn edge_set(g: &Graph, mode: GraphMode, with_weights: bool) -> BTreeSet<(NodeId, NodeId, Option<i64>)> {
		g.edges()
			.iter()
			.map(|e| {
				let (a, b) = if mode.is_ordered() { (e.from, e.to) } else { (e.from.min(e.to), e.from.max(e.to)) };
				(a, b, with_weights.then(|| e.display_weight() as i64))
			})
			.collect()
	}

	#[test]
	fn matrix_text_is_symmetric_for_unordered_modes() {
		let g = graph(3, &[(1, 2, Some(5.0)), (3, 2, Some(2.5))], GraphMode::Weighted);
		assert_eq!(
			to_text(&g, GraphMode::Weighted, TextNotation::AdjacencyMatrix),
			"0 5 0\n5 0 2.5\n0 2.5 0"
		);
		let d = graph(2, &[(2, 1, None)], GraphMode::Directed);
		assert_eq!(to_text(&d, GraphMode::Directed, TextNotation::AdjacencyMatrix), "0 0\n1 0");
	}

	#[test]
	fn matrix_rejects_ragged_rows_and_diagonal() {
		let err = parse("0 1\n1 0 0", TextNotation::AdjacencyMatrix, GraphMode::Undirected, &LAYOUT).unwrap_err();
		assert_eq!(err.line, Some(2));
		assert!(err.to_string().contains("square"));

		let err = parse("0 1\n1 x", TextNotation::AdjacencyMatrix, GraphMode::Undirected, &LAYOUT).unwrap_err();
		assert_eq!(err.to_string(), "line 2: invalid matrix value \"x\" (expected a number)");

		let err = parse("1 0\n0 0", TextNotation::AdjacencyMatrix, GraphMode::Directed, &LAYOUT).unwrap_err();
		assert_eq!(err.line, Some(1));
	}

	#[test]
	fn unordered_matrix_falls_back_to_lower_triangle() {
		let g = parse("0 0\n7 0", TextNotation::AdjacencyMatrix, GraphMode::Weighted, &LAYOUT).unwrap();
		assert_eq!(g.edges(), &[Edge { id: 1, from: 1, to: 2, weight: Some(7.0) }]);
	}

	#[test]
	fn adjacency_list_dedups_unordered_pairs() {
		let g = parse("1: 2 3 2\n2: 1\n3:", TextNotation::AdjacencyList, GraphMode::Weighted, &LAYOUT).unwrap();
		let pairs: Vec<_> = g.edges().iter().map(|e| (e.id, e.from, e.to, e.weight)).collect();
		assert_eq!(pairs, vec![(1, 1, 2, Some(1.0)), (2, 1, 3, Some(1.0))]);

		let err = parse("1 2", TextNotation::AdjacencyList, GraphMode::Directed, &LAYOUT).unwrap_err();
		assert_eq!(err.to_string(), "line 1: missing ':' after the node id");
	}

	#[test]
	fn adjacency_list_text_lists_isolated_nodes() {
		let g = graph(3, &[(2, 1, None)], GraphMode::Undirected);
		assert_eq!(to_text(&g, GraphMode::Undirected, TextNotation::AdjacencyList), "1: 2\n2: 1\n3:");
	}

	#[test]
	fn edge_list_isolated_nodes_and_defaults() {
		let text = "\n4\n1 2\n2 3 -1.5\n";
		let g = parse(text, TextNotation::EdgeList, GraphMode::Weighted, &LAYOUT).unwrap();
		assert_eq!(g.sorted_node_ids(), vec![1, 2, 3, 4]);
		assert_eq!(g.edges()[0].weight, Some(1.0));
		assert_eq!(g.edges()[1].weight, Some(-1.5));
		assert_eq!(to_text(&g, GraphMode::Weighted, TextNotation::EdgeList), "4\n1 2 1\n2 3 -1.5");
	}

	#[test]
	fn edge_list_errors_name_the_line() {
		let dup = parse("1 2\n2 1", TextNotation::EdgeList, GraphMode::Undirected, &LAYOUT).unwrap_err();
		assert_eq!(dup.line, Some(2));
		// anti-parallel is fine when directed
		assert!(parse("1 2\n2 1", TextNotation::EdgeList, GraphMode::Directed, &LAYOUT).is_ok());

		let self_loop = parse("1 2\n\n3 3", TextNotation::EdgeList, GraphMode::Directed, &LAYOUT).unwrap_err();
		assert_eq!(self_loop.line, Some(3));

		let too_many = parse("1 2 3 4", TextNotation::EdgeList, GraphMode::Weighted, &LAYOUT).unwrap_err();
		assert_eq!(too_many.line, Some(1));

		let bad_weight = parse("1 2 heavy", TextNotation::EdgeList, GraphMode::Weighted, &LAYOUT).unwrap_err();
		assert!(bad_weight.to_string().contains("weight"));
	}

	#[test]
	fn blank_text_is_the_empty_graph() {
		for notation in TextNotation::ALL {
			assert!(parse("  \n\n", notation, GraphMode::Directed, &LAYOUT).unwrap().is_empty());
			assert_eq!(to_text(&Graph::empty(), GraphMode::Directed, notation), "");
		}
	}

	#[test]
	fn parsed_nodes_sit_on_the_circle_by_id() {
		let g = parse("5 2", TextNotation::EdgeList, GraphMode::Undirected, &LAYOUT).unwrap();
		let first = &g.nodes()[0];
		assert_eq!(first.id, 2);
		assert!((first.x - (450.0 + LAYOUT.radius())).abs() < 1e-9);
	}

	fn mode_strategy() -> impl Strategy<Value = GraphMode> {
		prop_oneof![Just(GraphMode::Undirected), Just(GraphMode::Directed), Just(GraphMode::Weighted)]
	}

	/// Contiguous ids so the matrix, which renumbers, keeps them.
	fn graph_strategy() -> impl Strategy<Value = (GraphMode, Graph)> {
		(mode_strategy(), 1..8i64).prop_flat_map(|(mode, n)| {
			proptest::collection::vec((1..=n, 1..=n, 1..10i64), 0..16).prop_map(move |raw| {
				let mut seen = HashSet::new();
				let mut edges = Vec::new();
				for (from, to, w) in raw {
					let key = if mode.is_ordered() { (from, to) } else { (from.min(to), from.max(to)) };
					if from != to && seen.insert(key) {
						edges.push((from, to, mode.is_weighted().then_some(w as f64)));
					}
				}
				(mode, graph(n, &edges, mode))
			})
		})
	}

	proptest! {
		#[test]
		fn notations_round_trip((mode, g) in graph_strategy()) {
			for notation in TextNotation::ALL {
				let text = to_text(&g, mode, notation);
				let back = parse(&text, notation, mode, &LAYOUT).unwrap();
				prop_assert_eq!(back.sorted_node_ids(), g.sorted_node_ids());
				// adjacency lists do not carry weights
				let weights = mode.is_weighted() && notation != TextNotation::AdjacencyList;
				prop_assert_eq!(edge_set(&back, mode, weights), edge_set(&g, mode, weights));
			}
		}
	}
}

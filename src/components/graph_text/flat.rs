//! Flat export/import file format.
//!
//! ```text
//! weighted
//!
//! 4
//!
//! 1 2 5
//! 2 3 1.5
//! ```
//!
//! Mode keyword, blank line, one bare id per isolated node, blank line, one
//! edge per line. Import ignores blank lines, so the sections only matter to
//! human readers.

use std::collections::HashSet;

use super::codec::{edge_line, numbered_lines, parse_edge_lines};
use super::layout::CircleLayout;
use crate::error::ValidationError;
use crate::model::{Graph, GraphMode, NodeId};

pub const EXPORT_FILE_NAME: &str = "graph_export.txt";

pub fn export(graph: &Graph, mode: GraphMode) -> Result<String, ValidationError> {
	if graph.is_empty() {
		return Err(ValidationError::whole("No graph to export."));
	}
	let connected: HashSet<NodeId> = graph.edges().iter().flat_map(|e| [e.from, e.to]).collect();

	let mut lines = vec![mode.as_str().to_string(), String::new()];
	lines.extend(
		graph
			.sorted_node_ids()
			.into_iter()
			.filter(|id| !connected.contains(id))
			.map(|id| id.to_string()),
	);
	lines.push(String::new());
	lines.extend(graph.edges().iter().map(|e| edge_line(e, mode)));
	Ok(lines.join("\n"))
}

/// Reads a file written by [`export`]. Edge ids are reissued from 1 in file
/// order and nodes are laid out on the circle.
pub fn import(text: &str, layout: &CircleLayout) -> Result<(GraphMode, Graph), ValidationError> {
	let lines = numbered_lines(text);
	let Some((&(line, keyword), body)) = lines.split_first() else {
		return Err(ValidationError::whole("File is empty."));
	};
	let mode = GraphMode::parse(keyword).ok_or_else(|| {
		ValidationError::at(
			line,
			format!("unknown graph type \"{keyword}\" (expected undirected, directed or weighted)"),
		)
	})?;
	let graph = parse_edge_lines(body, mode, layout)?;
	Ok((mode, graph))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	const LAYOUT: CircleLayout = CircleLayout {
		width: 900.0,
		height: 600.0,
	};

	fn sample() -> Graph {
		Graph::new(
			vec![
				Node { id: 1, x: 10.0, y: 10.0 },
				Node { id: 2, x: 20.0, y: 10.0 },
				Node { id: 3, x: 30.0, y: 10.0 },
				Node { id: 4, x: 40.0, y: 10.0 },
			],
			vec![
				Edge { id: 7, from: 1, to: 2, weight: Some(5.0) },
				Edge { id: 9, from: 3, to: 2, weight: Some(1.5) },
			],
			GraphMode::Weighted,
		)
		.unwrap()
	}

	#[test]
	fn export_layout() {
		assert_eq!(
			export(&sample(), GraphMode::Weighted).unwrap(),
			"weighted\n\n4\n\n1 2 5\n3 2 1.5"
		);
	}

	#[test]
	fn export_refuses_empty_graph() {
		assert!(export(&Graph::empty(), GraphMode::Undirected).is_err());
	}

	#[test]
	fn import_reissues_edge_ids_and_lays_out_nodes() {
		let (mode, g) = import("WEIGHTED\n\n4\n\n1 2 5\n3 2 1.5\n", &LAYOUT).unwrap();
		assert_eq!(mode, GraphMode::Weighted);
		assert_eq!(g.sorted_node_ids(), vec![1, 2, 3, 4]);
		let edges: Vec<_> = g.edges().iter().map(|e| (e.id, e.from, e.to, e.weight)).collect();
		assert_eq!(edges, vec![(1, 1, 2, Some(5.0)), (2, 3, 2, Some(1.5))]);
		assert!((g.nodes()[0].x - (450.0 + LAYOUT.radius())).abs() < 1e-9);
	}

	#[test]
	fn import_round_trips_export() {
		let g = sample();
		let (mode, back) = import(&export(&g, GraphMode::Weighted).unwrap(), &LAYOUT).unwrap();
		assert_eq!(mode, GraphMode::Weighted);
		assert_eq!(back.sorted_node_ids(), g.sorted_node_ids());
		let pairs = |g: &Graph| g.edges().iter().map(|e| (e.from, e.to, e.weight)).collect::<Vec<_>>();
		assert_eq!(pairs(&back), pairs(&g));
	}

	#[test]
	fn import_errors() {
		assert_eq!(import("\n \n", &LAYOUT).unwrap_err().to_string(), "File is empty.");

		let bad_mode = import("\nsideways\n1 2", &LAYOUT).unwrap_err();
		assert_eq!(bad_mode.line, Some(2));

		let bad_edge = import("directed\n\n1 two", &LAYOUT).unwrap_err();
		assert_eq!(bad_edge.line, Some(3));
	}
}

//! Unique node keys and placeholder synthesis for link endpoints.
//!
//! Every rendering backend needs a node set keyed by unique id that covers
//! every link endpoint. [`reconcile_node_set`] is the one place that builds it.

use std::collections::HashMap;

use super::mapping::DEFAULT_NODE_SIZE;
use super::types::{NormalizedLink, NormalizedNode, RawRow};

/// Fill color of nodes synthesized for unknown link endpoints.
pub const PLACEHOLDER_COLOR: &str = "#FFB6C1";

/// Nodes keyed by id, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeIndex {
	nodes: Vec<NormalizedNode>,
	positions: HashMap<String, usize>,
}

impl NodeIndex {
	pub fn get(&self, id: &str) -> Option<&NormalizedNode> {
		self.positions.get(id).map(|&i| &self.nodes[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.positions.contains_key(id)
	}

	/// Position of `id` in iteration order.
	pub fn position(&self, id: &str) -> Option<usize> {
		self.positions.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &NormalizedNode> {
		self.nodes.iter()
	}

	pub fn into_nodes(self) -> Vec<NormalizedNode> {
		self.nodes
	}

	/// Inserts unless the id is already present. Returns whether it was added.
	fn insert(&mut self, node: NormalizedNode) -> bool {
		if self.positions.contains_key(&node.id) {
			return false;
		}
		self.positions.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		true
	}
}

/// Indexes declared nodes (first occurrence wins on duplicate ids), then
/// adds a placeholder for every link endpoint that is still unknown.
pub fn reconcile_node_set(nodes: &[NormalizedNode], links: &[NormalizedLink]) -> NodeIndex {
	let mut index = NodeIndex::default();
	for node in nodes {
		index.insert(node.clone());
	}
	for link in links {
		for endpoint in [&link.source, &link.target] {
			if !index.contains(endpoint) {
				index.insert(placeholder_node(endpoint));
			}
		}
	}
	index
}

pub fn placeholder_node(id: &str) -> NormalizedNode {
	NormalizedNode {
		id: id.to_string(),
		label: id.to_string(),
		color: PLACEHOLDER_COLOR.to_string(),
		size: DEFAULT_NODE_SIZE,
		original_data: RawRow::new(),
		placeholder: true,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, label: &str) -> NormalizedNode {
		NormalizedNode {
			id: id.into(),
			label: label.into(),
			color: "#3b82f6".into(),
			size: 10.0,
			original_data: RawRow::new(),
			placeholder: false,
		}
	}

	fn link(source: &str, target: &str) -> NormalizedLink {
		NormalizedLink {
			source: source.into(),
			target: target.into(),
			weight: 1.0,
			color: "#6b7280".into(),
			original_data: RawRow::new(),
		}
	}

	#[test]
	fn first_declared_node_wins() {
		let nodes = vec![node("a", "First"), node("b", "B"), node("a", "Second")];
		let index = reconcile_node_set(&nodes, &[]);
		assert_eq!(index.len(), 2);
		assert_eq!(index.get("a").map(|n| n.label.as_str()), Some("First"));
		assert_eq!(index.position("b"), Some(1));
	}

	#[test]
	fn unknown_endpoints_become_placeholders() {
		let nodes = vec![node("a", "A")];
		let links = vec![link("a", "c"), link("d", "c")];
		let index = reconcile_node_set(&nodes, &links);

		let ids: Vec<_> = index.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "c", "d"]);
		assert_eq!(index.iter().filter(|n| n.placeholder).count(), 2);

		let c = index.get("c").unwrap();
		assert!(c.placeholder);
		assert_eq!(c.label, "c");
		assert_eq!(c.color, PLACEHOLDER_COLOR);
		assert_eq!(c.size, DEFAULT_NODE_SIZE);
		assert!(c.original_data.is_empty());
	}

	#[test]
	fn reconciling_twice_changes_nothing() {
		let nodes = vec![node("a", "A"), node("a", "dup")];
		let links = vec![link("a", "z")];
		let once = reconcile_node_set(&nodes, &links).into_nodes();
		let twice = reconcile_node_set(&once, &links).into_nodes();
		assert_eq!(once, twice);
		assert_eq!(once.len(), 2);
	}
}

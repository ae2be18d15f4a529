//! Visible-subgraph derivation: text search, column filters and endpoint
//! pruning over the normalized arrays.
//!
//! Everything here is a pure function of its arguments and recomputed from
//! the full arrays on every change. Output order follows input order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;
use serde_json::Value;

use super::reconcile::reconcile_node_set;
use super::types::{
	FilterDefinition, FilterKind, FilterTarget, NormalizedGraph, NormalizedLink, NormalizedNode,
};
use super::values::{float_text, value_number, value_text};

/// Runtime selection for one filter.
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveFilterValue {
	/// Keep items whose column equals this text exactly.
	Exact(String),
	/// Keep items whose column is numeric and within the inclusive bounds.
	Range { min: Option<f64>, max: Option<f64> },
}

impl ActiveFilterValue {
	/// `false` for "All values" selections: an empty string or an unbounded range.
	pub fn is_active(&self) -> bool {
		match self {
			ActiveFilterValue::Exact(value) => !value.is_empty(),
			ActiveFilterValue::Range { min, max } => min.is_some() || max.is_some(),
		}
	}

	fn fits(&self, kind: FilterKind) -> bool {
		matches!(
			(self, kind),
			(ActiveFilterValue::Exact(_), FilterKind::Qualitative)
				| (ActiveFilterValue::Range { .. }, FilterKind::Quantitative)
		)
	}

	fn accepts(&self, value: Option<Value>) -> bool {
		match self {
			ActiveFilterValue::Exact(expected) => {
				value_text(value.as_ref()).is_some_and(|text| &text == expected)
			}
			ActiveFilterValue::Range { min, max } => {
				let Some(n) = value_number(value.as_ref()).filter(|n| n.is_finite()) else {
					return false;
				};
				min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi)
			}
		}
	}
}

/// Filter id to selected value.
pub type ActiveFilters = BTreeMap<String, ActiveFilterValue>;

/// Nodes and links left after search, filters and endpoint pruning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleSubgraph {
	pub nodes: Vec<NormalizedNode>,
	pub links: Vec<NormalizedLink>,
}

/// Value of `column` on a node: a normalized field of that name, else the
/// original row's cell.
pub fn node_field(node: &NormalizedNode, column: &str) -> Option<Value> {
	match column {
		"id" => Some(Value::String(node.id.clone())),
		"label" => Some(Value::String(node.label.clone())),
		"color" => Some(Value::String(node.color.clone())),
		"size" => serde_json::Number::from_f64(node.size).map(Value::Number),
		_ => node.original_data.get(column).cloned(),
	}
}

/// Value of `column` on a link, resolved like [`node_field`].
pub fn link_field(link: &NormalizedLink, column: &str) -> Option<Value> {
	match column {
		"source" => Some(Value::String(link.source.clone())),
		"target" => Some(Value::String(link.target.clone())),
		"weight" => serde_json::Number::from_f64(link.weight).map(Value::Number),
		"color" => Some(Value::String(link.color.clone())),
		_ => link.original_data.get(column).cloned(),
	}
}

/// Case-insensitive substring match over the normalized fields and every
/// original cell. `needle` must already be lowercased.
fn node_matches_search(node: &NormalizedNode, needle: &str) -> bool {
	let contains = |text: &str| text.to_lowercase().contains(needle);
	contains(&node.id)
		|| contains(&node.label)
		|| contains(&node.color)
		|| contains(&float_text(node.size))
		|| node.original_data.values().any(|value| match value {
			Value::String(s) => contains(s),
			Value::Null => false,
			other => value_text(Some(other)).is_some_and(|text| contains(&text)),
		})
}

/// Derives the visible subgraph from the given arrays.
///
/// Search narrows nodes only. Each enabled filter with an active value of
/// the right shape then narrows its target array. Finally links with an
/// endpoint outside the surviving node set are dropped, so every returned
/// link resolves on both ends.
pub fn apply_filters(
	nodes: &[NormalizedNode],
	links: &[NormalizedLink],
	filters: &[FilterDefinition],
	active: &ActiveFilters,
	search: &str,
) -> VisibleSubgraph {
	let needle = search.trim().to_lowercase();
	let mut visible_nodes: Vec<&NormalizedNode> = if needle.is_empty() {
		nodes.iter().collect()
	} else {
		nodes.iter().filter(|n| node_matches_search(n, &needle)).collect()
	};
	let mut visible_links: Vec<&NormalizedLink> = links.iter().collect();

	for (filter_id, value) in active {
		if !value.is_active() {
			continue;
		}
		let Some(filter) = filters.iter().find(|f| &f.id == filter_id) else {
			continue;
		};
		if !filter.enabled || !value.fits(filter.kind) {
			continue;
		}
		match filter.target {
			FilterTarget::Nodes => {
				visible_nodes.retain(|n| value.accepts(node_field(n, &filter.column)));
			}
			FilterTarget::Links => {
				visible_links.retain(|l| value.accepts(link_field(l, &filter.column)));
			}
		}
	}

	let node_ids: HashSet<&str> = visible_nodes.iter().map(|n| n.id.as_str()).collect();
	visible_links.retain(|l| node_ids.contains(l.source.as_str()) && node_ids.contains(l.target.as_str()));

	debug!(
		"toile: visible subgraph {}/{} nodes, {}/{} links",
		visible_nodes.len(),
		nodes.len(),
		visible_links.len(),
		links.len()
	);

	VisibleSubgraph {
		nodes: visible_nodes.into_iter().cloned().collect(),
		links: visible_links.into_iter().cloned().collect(),
	}
}

/// The visualization pipeline: reconcile the full node set first, so links
/// to undeclared endpoints survive through placeholders, then filter.
pub fn derive_visible_subgraph(
	graph: &NormalizedGraph,
	filters: &[FilterDefinition],
	active: &ActiveFilters,
	search: &str,
) -> VisibleSubgraph {
	let nodes = reconcile_node_set(&graph.nodes, &graph.links).into_nodes();
	apply_filters(&nodes, &graph.links, filters, active, search)
}

/// Sorted, distinct, non-empty texts of a filter's column over the full graph.
pub fn distinct_values(graph: &NormalizedGraph, filter: &FilterDefinition) -> Vec<String> {
	let values: BTreeSet<String> = match filter.target {
		FilterTarget::Nodes => graph
			.nodes
			.iter()
			.filter_map(|n| value_text(node_field(n, &filter.column).as_ref()))
			.collect(),
		FilterTarget::Links => graph
			.links
			.iter()
			.filter_map(|l| value_text(link_field(l, &filter.column).as_ref()))
			.collect(),
	};
	values.into_iter().collect()
}

/// Smallest and largest numeric value of a filter's column, if any.
pub fn numeric_bounds(graph: &NormalizedGraph, filter: &FilterDefinition) -> Option<(f64, f64)> {
	let numbers: Vec<f64> = match filter.target {
		FilterTarget::Nodes => graph
			.nodes
			.iter()
			.filter_map(|n| value_number(node_field(n, &filter.column).as_ref()))
			.collect(),
		FilterTarget::Links => graph
			.links
			.iter()
			.filter_map(|l| value_number(link_field(l, &filter.column).as_ref()))
			.collect(),
	};
	numbers
		.into_iter()
		.filter(|n| n.is_finite())
		.fold(None, |bounds, n| match bounds {
			None => Some((n, n)),
			Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::project::types::RawRow;
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;
	use serde_json::json;

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

	fn link(source: &str, target: &str, weight: f64) -> NormalizedLink {
		NormalizedLink {
			source: source.into(),
			target: target.into(),
			weight,
			color: "#6b7280".into(),
			original_data: RawRow::new(),
		}
	}

	fn filter(id: &str, target: FilterTarget, kind: FilterKind, column: &str) -> FilterDefinition {
		FilterDefinition {
			id: id.into(),
			target,
			kind,
			column: column.into(),
			title: id.into(),
			enabled: true,
		}
	}

	fn exact(pairs: &[(&str, &str)]) -> ActiveFilters {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), ActiveFilterValue::Exact(v.to_string())))
			.collect()
	}

	fn ids(subgraph: &VisibleSubgraph) -> Vec<&str> {
		subgraph.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn no_filters_keeps_everything() {
		let nodes = vec![node("a", "A"), node("b", "B")];
		let links = vec![link("a", "b", 1.0)];
		let visible = apply_filters(&nodes, &links, &[], &ActiveFilters::new(), "");
		assert_eq!(visible.nodes, nodes);
		assert_eq!(visible.links, links);
	}

	#[test]
	fn node_filter_prunes_dangling_links() {
		let nodes = vec![node("a", "A"), node("b", "B")];
		let links = vec![link("a", "b", 1.0)];
		let filters = vec![filter("f1", FilterTarget::Nodes, FilterKind::Qualitative, "label")];
		let visible = apply_filters(&nodes, &links, &filters, &exact(&[("f1", "A")]), "");
		assert_eq!(ids(&visible), vec!["a"]);
		assert!(visible.links.is_empty());
	}

	#[test]
	fn unmatched_search_empties_the_graph() {
		let nodes = vec![node("a", "A"), node("b", "B")];
		let links = vec![link("a", "b", 1.0)];
		let visible = apply_filters(&nodes, &links, &[], &ActiveFilters::new(), "zz");
		assert!(visible.nodes.is_empty());
		assert!(visible.links.is_empty());
	}

	#[test]
	fn placeholders_keep_links_to_undeclared_endpoints() {
		let graph = NormalizedGraph {
			nodes: vec![node("a", "A")],
			links: vec![link("a", "c", 1.0)],
		};

		let plain = apply_filters(&graph.nodes, &graph.links, &[], &ActiveFilters::new(), "");
		assert!(plain.links.is_empty());

		let reconciled = derive_visible_subgraph(&graph, &[], &ActiveFilters::new(), "");
		assert_eq!(ids(&reconciled), vec!["a", "c"]);
		assert!(reconciled.nodes[1].placeholder);
		assert_eq!(reconciled.links.len(), 1);
	}

	#[test]
	fn search_is_trimmed_case_insensitive_and_covers_original_cells() {
		let mut plant = node("p1", "Plant");
		plant.original_data = json!({"city": "Lyon", "staff": 40}).as_object().cloned().unwrap();
		let nodes = vec![plant, node("w1", "Warehouse")];

		let by_city = apply_filters(&nodes, &[], &[], &ActiveFilters::new(), "  LYO ");
		assert_eq!(ids(&by_city), vec!["p1"]);

		let by_number = apply_filters(&nodes, &[], &[], &ActiveFilters::new(), "40");
		assert_eq!(ids(&by_number), vec!["p1"]);

		let by_label = apply_filters(&nodes, &[], &[], &ActiveFilters::new(), "house");
		assert_eq!(ids(&by_label), vec!["w1"]);
	}

	#[test]
	fn link_filters_use_original_columns() {
		let mut road = link("a", "b", 1.0);
		road.original_data = json!({"mode": "road"}).as_object().cloned().unwrap();
		let mut rail = link("b", "a", 3.0);
		rail.original_data = json!({"mode": "rail"}).as_object().cloned().unwrap();
		let nodes = vec![node("a", "A"), node("b", "B")];
		let links = vec![road, rail];
		let filters = vec![filter("m", FilterTarget::Links, FilterKind::Qualitative, "mode")];

		let visible = apply_filters(&nodes, &links, &filters, &exact(&[("m", "rail")]), "");
		assert_eq!(visible.nodes.len(), 2);
		assert_eq!(visible.links.len(), 1);
		assert_eq!(visible.links[0].source, "b");
	}

	#[test]
	fn exact_match_is_case_sensitive() {
		let nodes = vec![node("a", "Alpha")];
		let filters = vec![filter("f", FilterTarget::Nodes, FilterKind::Qualitative, "label")];
		let visible = apply_filters(&nodes, &[], &filters, &exact(&[("f", "alpha")]), "");
		assert!(visible.nodes.is_empty());
	}

	#[test]
	fn quantitative_filters_keep_inclusive_ranges() {
		let nodes = vec![node("a", "A"), node("b", "B")];
		let links = vec![link("a", "b", 1.0), link("b", "a", 5.0), link("a", "a", 9.0)];
		let filters = vec![filter("w", FilterTarget::Links, FilterKind::Quantitative, "weight")];
		let active: ActiveFilters = [(
			"w".to_string(),
			ActiveFilterValue::Range {
				min: Some(1.0),
				max: Some(5.0),
			},
		)]
		.into();

		let visible = apply_filters(&nodes, &links, &filters, &active, "");
		let weights: Vec<f64> = visible.links.iter().map(|l| l.weight).collect();
		assert_eq!(weights, vec![1.0, 5.0]);
	}

	#[test]
	fn range_excludes_non_numeric_cells() {
		let mut big = node("a", "A");
		big.original_data = json!({"rank": "12"}).as_object().cloned().unwrap();
		let mut unknown = node("b", "B");
		unknown.original_data = json!({"rank": "n/a"}).as_object().cloned().unwrap();
		let filters = vec![filter("r", FilterTarget::Nodes, FilterKind::Quantitative, "rank")];
		let active: ActiveFilters = [(
			"r".to_string(),
			ActiveFilterValue::Range {
				min: Some(10.0),
				max: None,
			},
		)]
		.into();

		let visible = apply_filters(&[big, unknown], &[], &filters, &active, "");
		assert_eq!(ids(&visible), vec!["a"]);
	}

	#[test]
	fn disabled_and_mismatched_filters_are_ignored() {
		let nodes = vec![node("a", "A"), node("b", "B")];
		let mut off = filter("off", FilterTarget::Nodes, FilterKind::Qualitative, "label");
		off.enabled = false;
		let quant = filter("q", FilterTarget::Nodes, FilterKind::Quantitative, "label");
		let filters = vec![off, quant];

		let active = exact(&[("off", "A"), ("q", "A"), ("ghost", "A")]);
		let visible = apply_filters(&nodes, &[], &filters, &active, "");
		assert_eq!(visible.nodes.len(), 2);
	}

	#[test]
	fn distinct_values_and_bounds() {
		let mut a = node("a", "A");
		a.original_data = json!({"kind": "plant", "staff": 4}).as_object().cloned().unwrap();
		let mut b = node("b", "B");
		b.original_data = json!({"kind": "depot", "staff": "12"}).as_object().cloned().unwrap();
		let mut c = node("c", "C");
		c.original_data = json!({"kind": "", "staff": "?"}).as_object().cloned().unwrap();
		let d = node("d", "D");
		let graph = NormalizedGraph {
			nodes: vec![a, b, c, d],
			links: vec![],
		};

		let kind = filter("k", FilterTarget::Nodes, FilterKind::Qualitative, "kind");
		assert_eq!(distinct_values(&graph, &kind), vec!["depot", "plant"]);

		let staff = filter("s", FilterTarget::Nodes, FilterKind::Quantitative, "staff");
		assert_eq!(numeric_bounds(&graph, &staff), Some((4.0, 12.0)));

		let size = filter("z", FilterTarget::Nodes, FilterKind::Quantitative, "size");
		assert_eq!(numeric_bounds(&graph, &size), Some((10.0, 10.0)));
	}

	fn arb_graph() -> impl Strategy<Value = (Vec<NormalizedNode>, Vec<NormalizedLink>)> {
		let ids = prop::sample::select(vec!["a", "b", "c", "d", "e"]);
		let labels = prop::sample::select(vec!["red", "green", "blue"]);
		let nodes = prop::collection::vec((ids.clone(), labels), 0..8)
			.prop_map(|v| v.into_iter().map(|(id, label)| node(id, label)).collect::<Vec<_>>());
		let links = prop::collection::vec((ids.clone(), ids, 0.0..10.0f64), 0..12)
			.prop_map(|v| v.into_iter().map(|(s, t, w)| link(s, t, w)).collect::<Vec<_>>());
		(nodes, links)
	}

	fn label_filters() -> Vec<FilterDefinition> {
		vec![
			filter("label", FilterTarget::Nodes, FilterKind::Qualitative, "label"),
			filter("id", FilterTarget::Nodes, FilterKind::Qualitative, "id"),
		]
	}

	proptest! {
		#[test]
		fn every_visible_link_resolves(
			(nodes, links) in arb_graph(),
			label in prop::sample::select(vec!["", "red", "green"]),
			search in prop::sample::select(vec!["", "a", "blue"]),
		) {
			let visible = apply_filters(&nodes, &links, &label_filters(), &exact(&[("label", label)]), search);
			let node_ids: HashSet<&str> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
			for l in &visible.links {
				prop_assert!(node_ids.contains(l.source.as_str()));
				prop_assert!(node_ids.contains(l.target.as_str()));
			}
		}

		#[test]
		fn more_filters_never_add_nodes(
			(nodes, links) in arb_graph(),
			label in prop::sample::select(vec!["red", "green", "blue"]),
			id in prop::sample::select(vec!["a", "b", "c"]),
		) {
			let filters = label_filters();
			let fewer = apply_filters(&nodes, &links, &filters, &exact(&[("label", label)]), "");
			let more = apply_filters(&nodes, &links, &filters, &exact(&[("label", label), ("id", id)]), "");
			for n in &more.nodes {
				prop_assert!(fewer.nodes.contains(n));
			}
			prop_assert!(more.nodes.len() <= fewer.nodes.len());
		}

		#[test]
		fn filtering_is_deterministic(
			(nodes, links) in arb_graph(),
			label in prop::sample::select(vec!["", "red"]),
		) {
			let active = exact(&[("label", label)]);
			let first = apply_filters(&nodes, &links, &label_filters(), &active, "e");
			let second = apply_filters(&nodes, &links, &label_filters(), &active, "e");
			prop_assert_eq!(first, second);
		}
	}
}

//! Column mapping: raw rows to normalized nodes and links.
//!
//! Mapping never rejects a row. Missing ids become empty strings, missing
//! labels fall back to the id, and unparsable sizes or weights fall back to
//! their defaults with a warning so `NaN` never enters the model.

use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{
	FilterDefinition, FilterKind, FilterTarget, LinkMapping, NodeMapping, NormalizedGraph,
	NormalizedLink, NormalizedNode, RawRow, VisualizationLib,
};
use super::values::{value_number, value_text};
use crate::error::MappingError;

pub const DEFAULT_NODE_COLOR: &str = "#3b82f6";
pub const DEFAULT_NODE_SIZE: f64 = 10.0;
pub const DEFAULT_LINK_COLOR: &str = "#6b7280";
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// Maps every raw row to exactly one node or link, preserving order.
pub fn map_to_graph(
	raw_nodes: &[RawRow],
	raw_links: &[RawRow],
	node_mapping: &NodeMapping,
	link_mapping: &LinkMapping,
) -> NormalizedGraph {
	NormalizedGraph {
		nodes: raw_nodes.iter().map(|row| map_node(row, node_mapping)).collect(),
		links: raw_links.iter().map(|row| map_link(row, link_mapping)).collect(),
	}
}

pub fn map_node(row: &RawRow, mapping: &NodeMapping) -> NormalizedNode {
	let id = mapped_text(row, &mapping.id).unwrap_or_default();
	let label = mapped_text(row, &mapping.label).unwrap_or_else(|| id.clone());
	let color = mapped_text(row, &mapping.color).unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string());
	let size = mapped_number(row, &mapping.size, DEFAULT_NODE_SIZE, "size", &id);

	NormalizedNode {
		id,
		label,
		color,
		size,
		original_data: row.clone(),
		placeholder: false,
	}
}

pub fn map_link(row: &RawRow, mapping: &LinkMapping) -> NormalizedLink {
	let source = mapped_text(row, &mapping.source).unwrap_or_default();
	let target = mapped_text(row, &mapping.target).unwrap_or_default();
	let color = mapped_text(row, &mapping.color).unwrap_or_else(|| DEFAULT_LINK_COLOR.to_string());
	let weight = mapped_number(
		row,
		&mapping.weight,
		DEFAULT_LINK_WEIGHT,
		"weight",
		&format!("{source}->{target}"),
	);

	NormalizedLink {
		source,
		target,
		weight,
		color,
		original_data: row.clone(),
	}
}

fn mapped_text(row: &RawRow, column: &str) -> Option<String> {
	if column.is_empty() {
		return None;
	}
	value_text(row.get(column))
}

fn mapped_number(row: &RawRow, column: &str, default: f64, field: &str, owner: &str) -> f64 {
	if column.is_empty() {
		return default;
	}
	let Some(raw) = value_text(row.get(column)) else {
		return default;
	};
	match value_number(row.get(column)) {
		Some(n) if n.is_finite() => n,
		_ => {
			warn!("toile: {owner}: {field} value {raw:?} is not numeric, using {default}");
			default
		}
	}
}

/// Everything decided on the mapping screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
	pub node_mapping: NodeMapping,
	pub link_mapping: LinkMapping,
	#[serde(default)]
	pub filters: Vec<FilterDefinition>,
	#[serde(default)]
	pub visualization_lib: VisualizationLib,
}

impl MappingConfig {
	/// Starting point for the mapping screen: fields from `previous` where set,
	/// else the first and second column of each table.
	pub fn draft(
		node_columns: &[String],
		link_columns: &[String],
		previous: Option<&MappingConfig>,
	) -> Self {
		let column = |columns: &[String], i: usize| columns.get(i).cloned().unwrap_or_default();
		let prefer = |prev: Option<&String>, fallback: String| match prev {
			Some(p) if !p.is_empty() => p.clone(),
			_ => fallback,
		};
		let prev_nodes = previous.map(|p| &p.node_mapping);
		let prev_links = previous.map(|p| &p.link_mapping);

		Self {
			node_mapping: NodeMapping {
				id: prefer(prev_nodes.map(|m| &m.id), column(node_columns, 0)),
				label: prefer(prev_nodes.map(|m| &m.label), column(node_columns, 1)),
				color: prev_nodes.map(|m| m.color.clone()).unwrap_or_default(),
				size: prev_nodes.map(|m| m.size.clone()).unwrap_or_default(),
			},
			link_mapping: LinkMapping {
				source: prefer(prev_links.map(|m| &m.source), column(link_columns, 0)),
				target: prefer(prev_links.map(|m| &m.target), column(link_columns, 1)),
				weight: prev_links.map(|m| m.weight.clone()).unwrap_or_default(),
				color: prev_links.map(|m| m.color.clone()).unwrap_or_default(),
			},
			filters: previous.map(|p| p.filters.clone()).unwrap_or_default(),
			visualization_lib: previous.map(|p| p.visualization_lib).unwrap_or_default(),
		}
	}

	/// Required fields are mapped and, when the column lists are known,
	/// every mapped field names an existing column.
	pub fn validate(
		&self,
		node_columns: &[String],
		link_columns: &[String],
	) -> Result<(), MappingError> {
		let n = &self.node_mapping;
		let l = &self.link_mapping;
		if n.id.is_empty() {
			return Err(MappingError::MissingNodeId);
		}
		if n.label.is_empty() {
			return Err(MappingError::MissingNodeLabel);
		}
		if l.source.is_empty() {
			return Err(MappingError::MissingLinkSource);
		}
		if l.target.is_empty() {
			return Err(MappingError::MissingLinkTarget);
		}

		let checks: [(&'static str, &str, &[String]); 8] = [
			("node id", n.id.as_str(), node_columns),
			("node label", n.label.as_str(), node_columns),
			("node color", n.color.as_str(), node_columns),
			("node size", n.size.as_str(), node_columns),
			("link source", l.source.as_str(), link_columns),
			("link target", l.target.as_str(), link_columns),
			("link weight", l.weight.as_str(), link_columns),
			("link color", l.color.as_str(), link_columns),
		];
		for (field, column, columns) in checks {
			if !column.is_empty() && !columns.is_empty() && !columns.iter().any(|c| c == column) {
				return Err(MappingError::UnknownColumn {
					field,
					column: column.to_string(),
				});
			}
		}
		Ok(())
	}

	/// Appends a new qualitative node filter and returns its id.
	pub fn add_filter(&mut self, node_columns: &[String], now_millis: i64) -> String {
		let id = next_filter_id(&self.filters, now_millis);
		self.filters.push(FilterDefinition {
			id: id.clone(),
			target: FilterTarget::Nodes,
			kind: FilterKind::Qualitative,
			column: node_columns.first().cloned().unwrap_or_default(),
			title: "New filter".to_string(),
			enabled: true,
		});
		id
	}

	pub fn remove_filter(&mut self, id: &str) {
		self.filters.retain(|f| f.id != id);
	}

	/// Points a filter at another table, resetting its column when the old
	/// one does not exist there.
	pub fn retarget_filter(&mut self, id: &str, target: FilterTarget, columns: &[String]) {
		if let Some(filter) = self.filters.iter_mut().find(|f| f.id == id) {
			filter.target = target;
			if !columns.iter().any(|c| c == &filter.column) {
				filter.column = columns.first().cloned().unwrap_or_default();
			}
		}
	}
}

/// `filter-<millis>`, suffixed until unique among `existing`.
pub fn next_filter_id(existing: &[FilterDefinition], now_millis: i64) -> String {
	let base = format!("filter-{now_millis}");
	let taken = |candidate: &str| existing.iter().any(|f| f.id == candidate);
	if !taken(&base) {
		return base;
	}
	let mut n = 1;
	loop {
		let candidate = format!("{base}-{n}");
		if !taken(&candidate) {
			return candidate;
		}
		n += 1;
	}
}

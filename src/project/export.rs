//! The project document: what gets downloaded and what the JSON import
//! path reads back.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::state::ProjectState;
use super::types::{
	FilterDefinition, LinkMapping, NodeMapping, NormalizedLink, NormalizedNode, ProjectSettings,
	RawRow, VisualizationLib,
};
use crate::error::ExportError;

/// Full interchange document. Every section is optional on input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectExport {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub project_settings: Option<ProjectSettings>,
	pub nodes: Vec<RawRow>,
	pub links: Vec<RawRow>,
	pub node_columns: Vec<String>,
	pub link_columns: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_mapping: Option<NodeMapping>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub link_mapping: Option<LinkMapping>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub visualization_lib: Option<VisualizationLib>,
	pub processed_nodes: Vec<NormalizedNode>,
	pub processed_links: Vec<NormalizedLink>,
	pub filters: Vec<FilterDefinition>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<ExportMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportMetadata {
	pub export_date: String,
	pub node_count: usize,
	pub link_count: usize,
}

/// Merges every stage's output into one document stamped with `now`.
pub fn assemble_export(state: &ProjectState, now: DateTime<Utc>) -> Result<ProjectExport, ExportError> {
	let (Some(data), Some(mapping), Some(graph)) = (&state.data, &state.mapping, &state.graph) else {
		return Err(ExportError::NotReady);
	};

	Ok(ProjectExport {
		project_settings: state.settings.clone(),
		nodes: data.nodes.clone(),
		links: data.links.clone(),
		node_columns: data.node_columns.clone(),
		link_columns: data.link_columns.clone(),
		node_mapping: Some(mapping.node_mapping.clone()),
		link_mapping: Some(mapping.link_mapping.clone()),
		visualization_lib: Some(mapping.visualization_lib),
		processed_nodes: graph.nodes.clone(),
		processed_links: graph.links.clone(),
		filters: mapping.filters.clone(),
		metadata: Some(ExportMetadata {
			export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
			node_count: graph.nodes.len(),
			link_count: graph.links.len(),
		}),
	})
}

/// `<sanitized title>-graph-project.json`, or `graph-project.json` when
/// there is no title.
pub fn export_filename(settings: Option<&ProjectSettings>) -> String {
	match settings.map(|s| s.title.as_str()).filter(|t| !t.is_empty()) {
		Some(title) => {
			let stem: String = title
				.chars()
				.map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
				.collect();
			format!("{stem}-graph-project.json")
		}
		None => "graph-project.json".to_string(),
	}
}

pub fn to_pretty_json(export: &ProjectExport) -> Result<String, ExportError> {
	Ok(serde_json::to_string_pretty(export)?)
}

//! The wizard's project record.
//!
//! A [`ProjectState`] is never mutated in place: each transition consumes
//! the current value and returns the next one with a bumped revision, or an
//! error that leaves the caller holding nothing new.

use log::info;

use super::export::ProjectExport;
use super::filter::{ActiveFilters, VisibleSubgraph, derive_visible_subgraph};
use super::import::ImportedData;
use super::mapping::{MappingConfig, map_to_graph};
use super::types::{NormalizedGraph, ProjectSettings};
use crate::error::TransitionError;

/// Wizard screens, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
	#[default]
	Settings,
	Import,
	Mapping,
	Visualization,
}

impl Stage {
	pub fn index(self) -> usize {
		match self {
			Stage::Settings => 0,
			Stage::Import => 1,
			Stage::Mapping => 2,
			Stage::Visualization => 3,
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			Stage::Settings => "Project settings",
			Stage::Import => "Data import",
			Stage::Mapping => "Column mapping",
			Stage::Visualization => "Visualization",
		}
	}

	pub fn previous(self) -> Stage {
		match self {
			Stage::Settings | Stage::Import => Stage::Settings,
			Stage::Mapping => Stage::Import,
			Stage::Visualization => Stage::Mapping,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectState {
	/// Incremented by every successful transition.
	pub revision: u64,
	pub stage: Stage,
	pub settings: Option<ProjectSettings>,
	pub data: Option<ImportedData>,
	pub mapping: Option<MappingConfig>,
	/// Normalized arrays, present once the mapping has been applied.
	pub graph: Option<NormalizedGraph>,
}

impl ProjectState {
	fn advance(mut self, stage: Stage) -> Self {
		self.revision += 1;
		self.stage = stage;
		self
	}

	/// Replaces the settings and moves to the import screen.
	pub fn with_settings(mut self, settings: ProjectSettings) -> Result<Self, TransitionError> {
		settings.validate()?;
		self.settings = Some(settings);
		Ok(self.advance(Stage::Import))
	}

	/// Installs freshly parsed CSV tables. Any previous mapping and graph are
	/// dropped since they refer to the old columns.
	pub fn with_import(mut self, data: ImportedData) -> Result<Self, TransitionError> {
		if self.settings.is_none() {
			return Err(TransitionError::MissingStage(Stage::Settings.title()));
		}
		self.data = Some(data);
		self.mapping = None;
		self.graph = None;
		Ok(self.advance(Stage::Mapping))
	}

	/// Loads a project document wholesale. Its settings replace the current
	/// ones when it carries a title, and its mapping seeds the mapping screen.
	pub fn with_project(mut self, project: ProjectExport) -> Result<Self, TransitionError> {
		if let Some(settings) = project.project_settings.filter(|s| !s.title.trim().is_empty()) {
			self.settings = Some(settings);
		}
		if self.settings.is_none() {
			return Err(TransitionError::MissingStage(Stage::Settings.title()));
		}

		let has_mapping = project.node_mapping.is_some()
			|| project.link_mapping.is_some()
			|| !project.filters.is_empty()
			|| project.visualization_lib.is_some();
		self.mapping = has_mapping.then(|| MappingConfig {
			node_mapping: project.node_mapping.unwrap_or_default(),
			link_mapping: project.link_mapping.unwrap_or_default(),
			filters: project.filters,
			visualization_lib: project.visualization_lib.unwrap_or_default(),
		});
		self.data = Some(ImportedData {
			nodes: project.nodes,
			links: project.links,
			node_columns: project.node_columns,
			link_columns: project.link_columns,
		});
		self.graph = None;
		Ok(self.advance(Stage::Mapping))
	}

	/// Validates and applies the mapping, producing the normalized graph.
	pub fn with_mapping(mut self, mapping: MappingConfig) -> Result<Self, TransitionError> {
		let Some(data) = &self.data else {
			return Err(TransitionError::MissingStage(Stage::Import.title()));
		};
		mapping.validate(&data.node_columns, &data.link_columns)?;

		let graph = map_to_graph(&data.nodes, &data.links, &mapping.node_mapping, &mapping.link_mapping);
		info!(
			"toile: mapped {} nodes and {} links for {}",
			graph.nodes.len(),
			graph.links.len(),
			mapping.visualization_lib.key()
		);
		self.graph = Some(graph);
		self.mapping = Some(mapping);
		Ok(self.advance(Stage::Visualization))
	}

	/// Moves forward past the settings or import screen without new input,
	/// keeping what was entered on an earlier visit.
	pub fn resume(self) -> Result<Self, TransitionError> {
		let next = match self.stage {
			Stage::Settings => self.settings.is_some().then_some(Stage::Import),
			Stage::Import => self.data.is_some().then_some(Stage::Mapping),
			Stage::Mapping | Stage::Visualization => None,
		};
		match next {
			Some(stage) => Ok(self.advance(stage)),
			None => Err(TransitionError::MissingStage(self.stage.title())),
		}
	}

	/// Steps back one screen, keeping everything entered so far.
	pub fn back(self) -> Self {
		let stage = self.stage.previous();
		self.advance(stage)
	}

	/// The current visible subgraph, empty before the mapping is applied.
	pub fn visible_subgraph(&self, active: &ActiveFilters, search: &str) -> VisibleSubgraph {
		match (&self.graph, &self.mapping) {
			(Some(graph), Some(mapping)) => derive_visible_subgraph(graph, &mapping.filters, active, search),
			(Some(graph), None) => derive_visible_subgraph(graph, &[], active, search),
			_ => VisibleSubgraph::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{MappingError, SettingsError};
	use crate::project::types::{RawRow, VisualizationLib};
	use serde_json::json;

	fn settings() -> ProjectSettings {
		ProjectSettings {
			title: "Grid".into(),
			description: "Substations".into(),
			..ProjectSettings::default()
		}
	}

	fn rows(value: serde_json::Value) -> Vec<RawRow> {
		value
			.as_array()
			.unwrap()
			.iter()
			.map(|v| v.as_object().cloned().unwrap())
			.collect()
	}

	fn imported() -> ImportedData {
		ImportedData {
			nodes: rows(json!([{"id": "a", "name": "A"}, {"id": "b", "name": "B"}])),
			links: rows(json!([{"from": "a", "to": "b"}])),
			node_columns: vec!["id".into(), "name".into()],
			link_columns: vec!["from".into(), "to".into()],
		}
	}

	#[test]
	fn walks_every_stage() {
		let state = ProjectState::default()
			.with_settings(settings())
			.unwrap()
			.with_import(imported())
			.unwrap();
		assert_eq!(state.stage, Stage::Mapping);

		let data = state.data.as_ref().unwrap();
		let mapping = MappingConfig::draft(&data.node_columns, &data.link_columns, None);
		let state = state.with_mapping(mapping).unwrap();
		assert_eq!(state.stage, Stage::Visualization);
		assert_eq!(state.revision, 3);
		assert_eq!(state.graph.as_ref().unwrap().nodes[1].label, "B");

		let visible = state.visible_subgraph(&ActiveFilters::new(), "");
		assert_eq!(visible.links.len(), 1);
	}

	#[test]
	fn invalid_settings_are_refused() {
		let err = ProjectState::default()
			.with_settings(ProjectSettings::default())
			.unwrap_err();
		assert!(matches!(err, TransitionError::Settings(SettingsError::MissingTitle)));
	}

	#[test]
	fn import_requires_settings() {
		let err = ProjectState::default().with_import(imported()).unwrap_err();
		assert!(matches!(err, TransitionError::MissingStage(_)));
	}

	#[test]
	fn incomplete_mapping_is_refused() {
		let state = ProjectState::default()
			.with_settings(settings())
			.unwrap()
			.with_import(imported())
			.unwrap();
		let err = state.with_mapping(MappingConfig::default()).unwrap_err();
		assert!(matches!(err, TransitionError::Mapping(MappingError::MissingNodeId)));
	}

	#[test]
	fn project_document_seeds_mapping() {
		let project = ProjectExport {
			project_settings: Some(settings()),
			node_columns: vec!["id".into()],
			visualization_lib: Some(VisualizationLib::GoJs),
			..ProjectExport::default()
		};
		let state = ProjectState::default().with_project(project).unwrap();
		assert_eq!(state.stage, Stage::Mapping);
		assert_eq!(state.settings.as_ref().unwrap().title, "Grid");
		assert_eq!(state.mapping.as_ref().unwrap().visualization_lib, VisualizationLib::GoJs);
		assert!(state.graph.is_none());
	}

	#[test]
	fn back_keeps_data() {
		let state = ProjectState::default()
			.with_settings(settings())
			.unwrap()
			.with_import(imported())
			.unwrap()
			.back();
		assert_eq!(state.stage, Stage::Import);
		assert!(state.data.is_some());
		assert_eq!(state.back().back().stage, Stage::Settings);
	}

	#[test]
	fn resume_skips_a_revisited_import() {
		let state = ProjectState::default()
			.with_settings(settings())
			.unwrap()
			.with_import(imported())
			.unwrap()
			.back()
			.resume()
			.unwrap();
		assert_eq!(state.stage, Stage::Mapping);
		assert!(state.data.is_some());

		let err = ProjectState::default().resume().unwrap_err();
		assert!(matches!(err, TransitionError::MissingStage(_)));
	}
}

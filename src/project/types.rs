//! Project data model shared by every wizard stage.
//!
//! Field names serialize in camelCase so exported documents stay readable by
//! older exports of the same format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SettingsError;

/// One parsed record: column name to string or number, in header order.
pub type RawRow = serde_json::Map<String, Value>;

/// Metadata entered on the first screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
	pub title: String,
	pub description: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub author: String,
	#[serde(default)]
	pub created_at: String,
}

impl ProjectSettings {
	/// Fresh, empty settings stamped with `created_at`.
	pub fn new(created_at: impl Into<String>) -> Self {
		Self {
			created_at: created_at.into(),
			..Self::default()
		}
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.title.trim().is_empty() {
			return Err(SettingsError::MissingTitle);
		}
		if self.description.trim().is_empty() {
			return Err(SettingsError::MissingDescription);
		}
		Ok(())
	}

	/// Appends a trimmed tag. Returns `false` for blanks and duplicates.
	pub fn add_tag(&mut self, tag: &str) -> bool {
		let tag = tag.trim();
		if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
			return false;
		}
		self.tags.push(tag.to_string());
		true
	}

	pub fn remove_tag(&mut self, tag: &str) {
		self.tags.retain(|t| t != tag);
	}
}

/// Column names backing each semantic node field. Empty means "not mapped".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub color: String,
	#[serde(default)]
	pub size: String,
}

/// Column names backing each semantic link field. Empty means "not mapped".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMapping {
	#[serde(default)]
	pub source: String,
	#[serde(default)]
	pub target: String,
	#[serde(default)]
	pub weight: String,
	#[serde(default)]
	pub color: String,
}

/// A graph vertex after column mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNode {
	pub id: String,
	pub label: String,
	pub color: String,
	pub size: f64,
	#[serde(default)]
	pub original_data: RawRow,
	/// Synthesized for a link endpoint that had no entity row.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub placeholder: bool,
}

/// A directed edge after column mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLink {
	pub source: String,
	pub target: String,
	pub weight: f64,
	pub color: String,
	#[serde(default)]
	pub original_data: RawRow,
}

/// Normalized node and link arrays, in import order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedGraph {
	pub nodes: Vec<NormalizedNode>,
	pub links: Vec<NormalizedLink>,
}

/// Which array a filter narrows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTarget {
	#[default]
	Nodes,
	Links,
}

impl FilterTarget {
	pub fn as_str(self) -> &'static str {
		match self {
			FilterTarget::Nodes => "nodes",
			FilterTarget::Links => "links",
		}
	}

	pub fn display_name(self) -> &'static str {
		match self {
			FilterTarget::Nodes => "Entities",
			FilterTarget::Links => "Links",
		}
	}
}

/// Exact-match (`Qualitative`) or numeric range (`Quantitative`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
	#[default]
	Qualitative,
	Quantitative,
}

impl FilterKind {
	pub fn as_str(self) -> &'static str {
		match self {
			FilterKind::Qualitative => "qualitative",
			FilterKind::Quantitative => "quantitative",
		}
	}

	pub fn display_name(self) -> &'static str {
		match self {
			FilterKind::Qualitative => "Qualitative",
			FilterKind::Quantitative => "Quantitative",
		}
	}
}

/// A named, user-configured predicate over one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
	pub id: String,
	pub target: FilterTarget,
	#[serde(rename = "type")]
	pub kind: FilterKind,
	pub column: String,
	pub title: String,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
}

fn enabled_by_default() -> bool {
	true
}

/// Which rendering backend draws the visible subgraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualizationLib {
	/// Native canvas force layout.
	#[default]
	#[serde(rename = "d3js")]
	Force,
	#[serde(rename = "echarts")]
	ECharts,
	#[serde(rename = "gojs")]
	GoJs,
	#[serde(rename = "amcharts-hierarchy", alias = "amcharts")]
	AmChartsHierarchy,
	#[serde(rename = "jointjs")]
	JointJs,
}

impl VisualizationLib {
	pub const ALL: [VisualizationLib; 5] = [
		VisualizationLib::Force,
		VisualizationLib::ECharts,
		VisualizationLib::GoJs,
		VisualizationLib::AmChartsHierarchy,
		VisualizationLib::JointJs,
	];

	/// Selector value as stored in project documents.
	pub fn key(self) -> &'static str {
		match self {
			VisualizationLib::Force => "d3js",
			VisualizationLib::ECharts => "echarts",
			VisualizationLib::GoJs => "gojs",
			VisualizationLib::AmChartsHierarchy => "amcharts-hierarchy",
			VisualizationLib::JointJs => "jointjs",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"d3js" => Some(VisualizationLib::Force),
			"echarts" => Some(VisualizationLib::ECharts),
			"gojs" => Some(VisualizationLib::GoJs),
			"amcharts-hierarchy" | "amcharts" => Some(VisualizationLib::AmChartsHierarchy),
			"jointjs" => Some(VisualizationLib::JointJs),
			_ => None,
		}
	}

	pub fn display_name(self) -> &'static str {
		match self {
			VisualizationLib::Force => "Force layout (canvas)",
			VisualizationLib::ECharts => "ECharts",
			VisualizationLib::GoJs => "GoJS layered diagram",
			VisualizationLib::AmChartsHierarchy => "amCharts hierarchy",
			VisualizationLib::JointJs => "JointJS routed diagram",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn settings_require_title_and_description() {
		let mut settings = ProjectSettings::new("2024-05-01T10:00:00.000Z");
		assert_eq!(settings.validate(), Err(SettingsError::MissingTitle));
		settings.title = "  Supply chain ".into();
		assert_eq!(settings.validate(), Err(SettingsError::MissingDescription));
		settings.description = "Vendors and plants".into();
		assert_eq!(settings.validate(), Ok(()));
	}

	#[test]
	fn tags_are_trimmed_and_unique() {
		let mut settings = ProjectSettings::default();
		assert!(settings.add_tag(" energy "));
		assert!(!settings.add_tag("energy"));
		assert!(!settings.add_tag("   "));
		assert!(settings.add_tag("grid"));
		settings.remove_tag("energy");
		assert_eq!(settings.tags, vec!["grid".to_string()]);
	}

	#[test]
	fn filter_definition_uses_type_key_and_defaults_enabled() {
		let filter: FilterDefinition = serde_json::from_str(
			r#"{"id":"f1","target":"links","type":"quantitative","column":"w","title":"Weight"}"#,
		)
		.unwrap();
		assert_eq!(filter.target, FilterTarget::Links);
		assert_eq!(filter.kind, FilterKind::Quantitative);
		assert!(filter.enabled);

		let json = serde_json::to_value(&filter).unwrap();
		assert_eq!(json["type"], "quantitative");
	}

	#[test]
	fn visualization_lib_keys_round_trip() {
		for lib in VisualizationLib::ALL {
			let json = serde_json::to_string(&lib).unwrap();
			assert_eq!(json, format!("\"{}\"", lib.key()));
			assert_eq!(VisualizationLib::from_key(lib.key()), Some(lib));
		}
		let legacy: VisualizationLib = serde_json::from_str("\"amcharts\"").unwrap();
		assert_eq!(legacy, VisualizationLib::AmChartsHierarchy);
	}

	#[test]
	fn library_defaults_to_the_force_canvas() {
		assert_eq!(VisualizationLib::default(), VisualizationLib::Force);
		assert_eq!(VisualizationLib::default().key(), "d3js");
	}

	#[test]
	fn placeholder_flag_is_omitted_when_false() {
		let node = NormalizedNode {
			id: "a".into(),
			label: "A".into(),
			color: "#3b82f6".into(),
			size: 10.0,
			original_data: RawRow::new(),
			placeholder: false,
		};
		let json = serde_json::to_value(&node).unwrap();
		assert!(json.get("placeholder").is_none());
		assert_eq!(json["originalData"], serde_json::json!({}));
	}
}

//! Browser-independent project model: import, column mapping, filtering,
//! reconciliation and export.

pub mod export;
pub mod filter;
pub mod import;
pub mod mapping;
pub mod reconcile;
pub mod state;
pub mod types;
pub mod values;

pub use export::{ExportMetadata, ProjectExport, assemble_export, export_filename, to_pretty_json};
pub use filter::{
	ActiveFilterValue, ActiveFilters, VisibleSubgraph, apply_filters, derive_visible_subgraph,
	distinct_values, numeric_bounds,
};
pub use import::{ImportedData, SourceFile, import_csv_pair, import_project_json};
pub use mapping::{MappingConfig, map_to_graph};
pub use reconcile::{
	NodeIndex, PLACEHOLDER_COLOR, placeholder_node, reconcile_node_set,
};
pub use state::{ProjectState, Stage};
pub use types::{
	FilterDefinition, FilterKind, FilterTarget, LinkMapping, NodeMapping, NormalizedGraph,
	NormalizedLink, NormalizedNode, ProjectSettings, RawRow, VisualizationLib,
};

//! Error types for each stage of the wizard and for the rendering boundary.
//!
//! Errors never escape a stage transition: screens catch them and display the
//! message, leaving the wizard on the current step.

use thiserror::Error;

/// Validation failures for the project settings form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
	#[error("project title is required")]
	MissingTitle,
	#[error("project description is required")]
	MissingDescription,
}

/// Failures while reading CSV files or a JSON project document.
#[derive(Debug, Error)]
pub enum ImportError {
	#[error("{file}: {message}")]
	Csv { file: String, message: String },
	#[error("invalid project document: {0}")]
	Json(#[from] serde_json::Error),
	#[error("{0} file is missing")]
	MissingFile(&'static str),
	#[error("{file}: expected a {expected} file")]
	WrongExtension { file: String, expected: &'static str },
	#[error("failed to read {file}: {message}")]
	Read { file: String, message: String },
}

/// A mapping that cannot produce a graph.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MappingError {
	#[error("node id column is not mapped")]
	MissingNodeId,
	#[error("node label column is not mapped")]
	MissingNodeLabel,
	#[error("link source column is not mapped")]
	MissingLinkSource,
	#[error("link target column is not mapped")]
	MissingLinkTarget,
	#[error("{field} is mapped to unknown column \"{column}\"")]
	UnknownColumn { field: &'static str, column: String },
}

/// A wizard transition that was refused.
#[derive(Debug, Error)]
pub enum TransitionError {
	#[error(transparent)]
	Settings(#[from] SettingsError),
	#[error(transparent)]
	Mapping(#[from] MappingError),
	#[error("{0} must be completed first")]
	MissingStage(&'static str),
}

/// Failures while producing the export document.
#[derive(Debug, Error)]
pub enum ExportError {
	#[error("nothing to export before the mapping stage is completed")]
	NotReady,
	#[error("failed to serialize project: {0}")]
	Json(#[from] serde_json::Error),
}

/// Failures at the rendering-backend boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
	#[error("script {0} failed to load")]
	ScriptLoad(String),
	#[error("global `{0}` is not defined; is the library loaded?")]
	MissingGlobal(String),
	#[error("javascript error: {0}")]
	Js(String),
	#[error("browser environment unavailable: {0}")]
	Dom(&'static str),
}

impl From<wasm_bindgen::JsValue> for RenderError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		let message = value
			.as_string()
			.or_else(|| {
				js_sys::Reflect::get(&value, &"message".into())
					.ok()
					.and_then(|m| m.as_string())
			})
			.unwrap_or_else(|| format!("{value:?}"));
		RenderError::Js(message)
	}
}

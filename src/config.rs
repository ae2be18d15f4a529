//! Page-level configuration.
//!
//! The host page may embed a JSON object in
//! `<script id="toile-config" type="application/json">` to override the
//! library script URLs, the initially selected renderer or the canvas theme.
//! Missing fields keep their defaults.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::project::VisualizationLib;

/// Id of the script element read by [`load_app_config`].
pub const CONFIG_ELEMENT_ID: &str = "toile-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
	/// Renderer preselected for new mappings.
	pub default_library: VisualizationLib,
	/// Canvas theme for the native force layout: `"light"` or `"dark"`.
	pub theme: String,
	pub scripts: LibraryScripts,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			default_library: VisualizationLib::default(),
			theme: "light".to_string(),
			scripts: LibraryScripts::default(),
		}
	}
}

/// Script URLs loaded, in order, before a JavaScript renderer mounts.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LibraryScripts {
	pub echarts: Vec<String>,
	pub gojs: Vec<String>,
	pub amcharts: Vec<String>,
	pub jointjs: Vec<String>,
}

impl Default for LibraryScripts {
	fn default() -> Self {
		let urls = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
		Self {
			echarts: urls(&["https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"]),
			gojs: urls(&["https://cdn.jsdelivr.net/npm/gojs@3/release/go.js"]),
			amcharts: urls(&[
				"https://cdn.amcharts.com/lib/5/index.js",
				"https://cdn.amcharts.com/lib/5/hierarchy.js",
				"https://cdn.amcharts.com/lib/5/themes/Animated.js",
			]),
			jointjs: urls(&["https://cdn.jsdelivr.net/npm/@joint/core@4/dist/joint.min.js"]),
		}
	}
}

impl LibraryScripts {
	/// Scripts for `lib`; the native force layout needs none.
	pub fn for_library(&self, lib: VisualizationLib) -> &[String] {
		match lib {
			VisualizationLib::Force => &[],
			VisualizationLib::ECharts => &self.echarts,
			VisualizationLib::GoJs => &self.gojs,
			VisualizationLib::AmChartsHierarchy => &self.amcharts,
			VisualizationLib::JointJs => &self.jointjs,
		}
	}
}

pub fn parse_app_config(text: &str) -> Result<AppConfig, serde_json::Error> {
	serde_json::from_str(text)
}

/// Reads the embedded configuration, falling back to defaults when the
/// element is absent or malformed.
pub fn load_app_config() -> AppConfig {
	let Some(text) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
		.and_then(|el| el.dyn_into::<HtmlScriptElement>().ok())
		.and_then(|script| script.text().ok())
	else {
		return AppConfig::default();
	};

	match parse_app_config(&text) {
		Ok(config) => {
			info!("toile: loaded page configuration");
			config
		}
		Err(e) => {
			warn!("toile: ignoring malformed page configuration: {e}");
			AppConfig::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config =
			parse_app_config(r#"{"defaultLibrary":"gojs","scripts":{"gojs":["/vendor/go.js"]}}"#)
				.unwrap();
		assert_eq!(config.default_library, VisualizationLib::GoJs);
		assert_eq!(config.theme, "light");
		assert_eq!(config.scripts.for_library(VisualizationLib::GoJs), ["/vendor/go.js"]);
		assert_eq!(config.scripts.amcharts.len(), 3);
		assert!(config.scripts.for_library(VisualizationLib::Force).is_empty());
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(parse_app_config("{}").unwrap(), AppConfig::default());
	}
}

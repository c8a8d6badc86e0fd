//! Build-time application settings.

use log::Level;

const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Settings shared through Leptos context.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Origin of the algorithm service.
	pub api_base: String,
	pub log_level: Level,
	/// Canvas size, also the frame for circle layouts.
	pub canvas_width: f64,
	pub canvas_height: f64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_string(),
			log_level: Level::Debug,
			canvas_width: 900.0,
			canvas_height: 600.0,
		}
	}
}

impl AppConfig {
	/// Defaults overridden by `GRAPH_API_BASE` / `GRAPH_LOG_LEVEL` as set
	/// when the crate was compiled.
	pub fn from_build_env() -> Self {
		Self::with_overrides(option_env!("GRAPH_API_BASE"), option_env!("GRAPH_LOG_LEVEL"))
	}

	fn with_overrides(api_base: Option<&str>, log_level: Option<&str>) -> Self {
		let mut config = Self::default();
		if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
			config.api_base = base.trim_end_matches('/').to_string();
		}
		if let Some(level) = log_level.and_then(|l| l.trim().parse().ok()) {
			config.log_level = level;
		}
		config
	}
}

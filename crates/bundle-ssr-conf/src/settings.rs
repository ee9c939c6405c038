//! Adapter settings.

use crate::error::{ConfError, ConfResult};
use crate::head::HeadDefaults;
use crate::mode::RenderMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Marker the template is split at when none is configured.
pub const DEFAULT_APP_MARKER: &str = "{{ APP }}";

/// Environment variable overriding the project name.
pub const PROJECT_ENV_VAR: &str = "BUNDLE_SSR_PROJECT";

/// Token in [`OutputConfig::filename`] replaced by the project name.
const NAME_TOKEN: &str = "[name]";

const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1000;
const DEFAULT_CACHE_TTL_SECS: u64 = 15 * 60;
const DEFAULT_STREAM_BUFFER: usize = 16;

/// Bounds of the render-output cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
	/// Whether render output may be cached at all.
	pub enabled: bool,
	/// Maximum number of cached entries.
	pub max_entries: u64,
	/// Time-to-live of a cached entry in seconds.
	pub ttl_secs: u64,
}

impl Default for CacheOptions {
	fn default() -> Self {
		Self {
			enabled: true,
			max_entries: DEFAULT_CACHE_MAX_ENTRIES,
			ttl_secs: DEFAULT_CACHE_TTL_SECS,
		}
	}
}

impl CacheOptions {
	/// Time-to-live as a [`Duration`].
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	/// Disables caching.
	pub fn disabled() -> Self {
		Self {
			enabled: false,
			..Self::default()
		}
	}
}

/// Options passed through to the render engine.
///
/// Fields missing from a settings document keep their defaults, so a partial
/// `[renderer_options]` table merges over the default cache bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
	/// Render-output cache bounds.
	pub cache: CacheOptions,
}

impl RendererOptions {
	/// Creates the default options (1000 entries, 15 minutes).
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the cache bounds.
	pub fn with_cache(mut self, cache: CacheOptions) -> Self {
		self.cache = cache;
		self
	}
}

/// Where the server bundle is written by the build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
	/// Output directory.
	pub path: PathBuf,
	/// File name pattern; `[name]` is replaced by the project name.
	pub filename: String,
}

impl Default for OutputConfig {
	fn default() -> Self {
		Self {
			path: PathBuf::from("dist"),
			filename: "[name].server.js".to_string(),
		}
	}
}

/// Build configuration of the server bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerBuildConfig {
	/// Output location.
	pub output: OutputConfig,
}

impl ServerBuildConfig {
	/// Creates a build config for the given directory and filename pattern.
	pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
		Self {
			output: OutputConfig {
				path: path.into(),
				filename: filename.into(),
			},
		}
	}

	/// File name of the bundle for `project_name`.
	pub fn bundle_filename(&self, project_name: &str) -> String {
		self.output.filename.replacen(NAME_TOKEN, project_name, 1)
	}

	/// Full path of the bundle for `project_name`.
	pub fn bundle_path(&self, project_name: &str) -> PathBuf {
		self.output.path.join(self.bundle_filename(project_name))
	}
}

/// What the stream writer does when rendering fails mid-stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum OnRenderError {
	/// Log the error and abort the response without writing anything more.
	#[default]
	Abort,
	/// Log the error, write a client-side redirect and end the response.
	Redirect {
		/// Location the client is sent to.
		path: String,
	},
}

/// Settings of one rendering adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrSettings {
	/// Selects the bundle and renderer.
	pub project_name: String,
	/// How bundles are obtained.
	pub mode: RenderMode,
	/// Options passed to the render engine.
	pub renderer_options: RendererOptions,
	/// Location of the built bundle.
	pub server_build: ServerBuildConfig,
	/// Marker the HTML template is split at.
	pub app_marker: String,
	/// Head injection defaults; `None` disables head injection.
	pub default_head_data: Option<HeadDefaults>,
	/// Behavior on a render stream error.
	pub on_render_error: OnRenderError,
	/// Number of chunks the response channel buffers before writers wait.
	pub stream_buffer: usize,
}

impl Default for SsrSettings {
	fn default() -> Self {
		Self {
			project_name: String::new(),
			mode: RenderMode::default(),
			renderer_options: RendererOptions::default(),
			server_build: ServerBuildConfig::default(),
			app_marker: DEFAULT_APP_MARKER.to_string(),
			default_head_data: None,
			on_render_error: OnRenderError::default(),
			stream_buffer: DEFAULT_STREAM_BUFFER,
		}
	}
}

impl SsrSettings {
	/// Creates default settings for `project_name`.
	pub fn new(project_name: impl Into<String>) -> Self {
		Self {
			project_name: project_name.into(),
			..Self::default()
		}
	}

	/// Parses settings from a TOML document and validates them.
	pub fn from_toml_str(source: &str) -> ConfResult<Self> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads settings from a TOML file and validates them.
	pub fn from_file(path: impl AsRef<Path>) -> ConfResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| ConfError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "loaded bundle-ssr settings");
		Self::from_toml_str(&source)
	}

	/// Applies `BUNDLE_SSR_ENV` / `NODE_ENV` and `BUNDLE_SSR_PROJECT`.
	pub fn with_env_overrides(mut self) -> ConfResult<Self> {
		if let Some(mode) = RenderMode::from_env()? {
			self.mode = mode;
		}
		if let Ok(project) = std::env::var(PROJECT_ENV_VAR)
			&& !project.trim().is_empty()
		{
			self.project_name = project;
		}
		self.validate()?;
		Ok(self)
	}

	/// Sets the render mode.
	pub fn with_mode(mut self, mode: RenderMode) -> Self {
		self.mode = mode;
		self
	}

	/// Sets the renderer options.
	pub fn with_renderer_options(mut self, options: RendererOptions) -> Self {
		self.renderer_options = options;
		self
	}

	/// Sets the server build config.
	pub fn with_server_build(mut self, server_build: ServerBuildConfig) -> Self {
		self.server_build = server_build;
		self
	}

	/// Sets the template marker.
	pub fn with_app_marker(mut self, marker: impl Into<String>) -> Self {
		self.app_marker = marker.into();
		self
	}

	/// Enables head injection with the given defaults.
	pub fn with_head_defaults(mut self, defaults: HeadDefaults) -> Self {
		self.default_head_data = Some(defaults);
		self
	}

	/// Sets the render error strategy.
	pub fn with_on_render_error(mut self, on_error: OnRenderError) -> Self {
		self.on_render_error = on_error;
		self
	}

	/// Sets the response channel capacity.
	pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
		self.stream_buffer = capacity;
		self
	}

	/// Whether head injection is in play.
	pub fn head_injection_enabled(&self) -> bool {
		self.default_head_data.is_some()
	}

	/// Checks values that would make the adapter unusable.
	pub fn validate(&self) -> ConfResult<()> {
		if self.project_name.trim().is_empty() {
			return Err(ConfError::Invalid {
				field: "project_name",
				message: "must not be empty".to_string(),
			});
		}
		if self.app_marker.is_empty() {
			return Err(ConfError::Invalid {
				field: "app_marker",
				message: "must not be empty".to_string(),
			});
		}
		if self.stream_buffer == 0 {
			return Err(ConfError::Invalid {
				field: "stream_buffer",
				message: "must be at least 1".to_string(),
			});
		}
		if self.renderer_options.cache.enabled && self.renderer_options.cache.max_entries == 0 {
			return Err(ConfError::Invalid {
				field: "renderer_options.cache.max_entries",
				message: "must be at least 1 when the cache is enabled".to_string(),
			});
		}
		if let OnRenderError::Redirect { path } = &self.on_render_error
			&& path.is_empty()
		{
			return Err(ConfError::Invalid {
				field: "on_render_error.path",
				message: "redirect path must not be empty".to_string(),
			});
		}
		Ok(())
	}
}

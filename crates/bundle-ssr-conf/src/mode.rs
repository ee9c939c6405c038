//! Render mode selection.

use crate::error::ConfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the render mode.
pub const MODE_ENV_VAR: &str = "BUNDLE_SSR_ENV";

/// Fallback environment variable for the render mode.
pub const NODE_ENV_VAR: &str = "NODE_ENV";

/// How bundles are obtained.
///
/// - `Production`: the bundle artifact is read from disk once per project.
/// - `Development`: bundles arrive from a watching build collaborator and
///   replace the renderer on every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
	/// Hot-swapped bundles fed by a build watcher.
	Development,
	/// A fixed bundle read once from disk.
	#[default]
	Production,
}

impl RenderMode {
	/// Reads the mode from `BUNDLE_SSR_ENV`, then `NODE_ENV`.
	///
	/// Returns `Ok(None)` when neither variable is set.
	pub fn from_env() -> Result<Option<Self>, ConfError> {
		let raw = std::env::var(MODE_ENV_VAR)
			.or_else(|_| std::env::var(NODE_ENV_VAR))
			.ok();

		raw.map(|value| value.parse()).transpose()
	}

	/// Returns `true` for [`RenderMode::Development`].
	pub fn is_development(self) -> bool {
		matches!(self, Self::Development)
	}
}

impl FromStr for RenderMode {
	type Err = ConfError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Self::Development),
			"production" | "prod" => Ok(Self::Production),
			other => Err(ConfError::UnknownMode(other.to_string())),
		}
	}
}

impl fmt::Display for RenderMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Development => f.write_str("development"),
			Self::Production => f.write_str("production"),
		}
	}
}

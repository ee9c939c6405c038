//! Settings errors.

use std::path::PathBuf;

/// Result type for settings operations.
pub type ConfResult<T> = Result<T, ConfError>;

/// Errors raised while loading or validating settings.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
	/// The settings file could not be read.
	#[error("failed to read settings file {path}: {source}")]
	Io {
		/// Path of the settings file.
		path: PathBuf,
		/// Underlying IO error.
		#[source]
		source: std::io::Error,
	},

	/// The settings document is not valid TOML or has the wrong shape.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A render mode string was not recognized.
	#[error("unknown render mode: {0}")]
	UnknownMode(String),

	/// A setting has an unusable value.
	#[error("invalid setting `{field}`: {message}")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// What is wrong with it.
		message: String,
	},
}

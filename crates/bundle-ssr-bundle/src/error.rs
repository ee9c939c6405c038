//! Bundle provider errors.

use bundle_ssr_renderer::RenderError;
use std::path::PathBuf;

/// Result type for bundle provider operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors that abort renderer initialization.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
	/// The bundle artifact could not be read.
	#[error("failed to read bundle for project '{project}' from {path}: {source}")]
	Read {
		/// Project whose bundle was requested.
		project: String,
		/// Location of the artifact.
		path: PathBuf,
		/// Underlying IO error.
		#[source]
		source: std::io::Error,
	},

	/// The render engine rejected the bundle.
	#[error(transparent)]
	Renderer(#[from] RenderError),
}

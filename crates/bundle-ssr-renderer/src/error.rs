//! Render errors.

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the render engine.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
	/// The bundle could not be turned into a renderer.
	#[error("invalid bundle for project '{project}': {message}")]
	InvalidBundle {
		/// Project the bundle belongs to.
		project: String,
		/// What went wrong.
		message: String,
	},

	/// The engine executing bundles is not available.
	#[error("render runtime unavailable: {0}")]
	Runtime(String),

	/// Rendering a request failed.
	#[error("render failed: {0}")]
	Render(String),
}

impl RenderError {
	/// Creates an [`RenderError::InvalidBundle`].
	pub fn invalid_bundle(project: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidBundle {
			project: project.into(),
			message: message.into(),
		}
	}
}

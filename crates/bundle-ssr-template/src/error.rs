//! Template errors.

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors raised while preparing a template.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
	/// The application marker does not occur in the template.
	#[error("marker `{marker}` not found in template")]
	MarkerNotFound {
		/// The marker that was searched for.
		marker: String,
	},

	/// The marker is the empty string.
	#[error("template marker must not be empty")]
	EmptyMarker,
}

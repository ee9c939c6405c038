//! Adapter errors.

use bundle_ssr_bundle::BundleError;
use bundle_ssr_conf::ConfError;
use bundle_ssr_stream::SinkError;
use bundle_ssr_template::TemplateError;

/// Result type for adapter operations.
pub type SsrResult<T> = Result<T, SsrError>;

/// Errors returned by [`SsrAdapter`](crate::SsrAdapter).
///
/// Render failures are not among them: they are handled while streaming
/// and reported through [`RenderOutcome`](crate::RenderOutcome).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SsrError {
	/// Invalid settings.
	#[error(transparent)]
	Conf(#[from] ConfError),

	/// The template could not be split.
	#[error(transparent)]
	Template(#[from] TemplateError),

	/// The renderer could not be initialized.
	#[error(transparent)]
	Bundle(#[from] BundleError),

	/// The response sink rejected a write.
	#[error(transparent)]
	Sink(#[from] SinkError),
}

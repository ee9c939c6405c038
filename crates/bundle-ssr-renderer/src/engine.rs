//! Render engine traits and the per-project renderer handle.

use crate::bundle::Bundle;
use crate::context::RenderContext;
use crate::error::RenderResult;
use bundle_ssr_conf::RendererOptions;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// Lazy, finite, non-restartable sequence of rendered HTML chunks.
///
/// The stream either ends after the last chunk or yields one error and
/// ends.
pub type RenderStream = BoxStream<'static, RenderResult<Bytes>>;

/// Executes one bundle.
pub trait BundleRenderer: Send + Sync {
	/// Starts rendering `context`.
	///
	/// Nothing runs until the stream is polled. The renderer may fill the
	/// context's output slots at any point before it yields the first chunk.
	fn render_to_stream(&self, context: RenderContext) -> RenderStream;
}

/// Builds a [`BundleRenderer`] from a bundle.
pub trait RendererFactory: Send + Sync {
	/// Creates a renderer for `bundle`.
	///
	/// # Errors
	///
	/// Fails when the bundle cannot be loaded by the engine.
	fn create(
		&self,
		bundle: &Bundle,
		options: &RendererOptions,
	) -> RenderResult<Arc<dyn BundleRenderer>>;
}

/// The renderer of one project, wrapping exactly one bundle.
///
/// `generation` counts how many renderers were built for the project
/// before this one, starting at 1.
#[derive(Clone)]
pub struct Renderer {
	project: String,
	generation: u64,
	engine: Arc<dyn BundleRenderer>,
}

impl Renderer {
	/// Wraps an engine built for `project`.
	pub fn new(project: impl Into<String>, generation: u64, engine: Arc<dyn BundleRenderer>) -> Self {
		Self {
			project: project.into(),
			generation,
			engine,
		}
	}

	/// Builds a renderer for `bundle` through `factory`.
	pub fn build(
		factory: &dyn RendererFactory,
		bundle: &Bundle,
		options: &RendererOptions,
		generation: u64,
	) -> RenderResult<Self> {
		let engine = factory.create(bundle, options)?;
		Ok(Self::new(bundle.project(), generation, engine))
	}

	/// Project name.
	pub fn project(&self) -> &str {
		&self.project
	}

	/// Build generation of this renderer.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Renders `context` to a chunk stream.
	pub fn render_to_stream(&self, context: RenderContext) -> RenderStream {
		self.engine.render_to_stream(context)
	}
}

impl fmt::Debug for Renderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer")
			.field("project", &self.project)
			.field("generation", &self.generation)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RenderError;
	use futures::StreamExt;
	use rstest::rstest;

	struct EchoRenderer;

	impl BundleRenderer for EchoRenderer {
		fn render_to_stream(&self, context: RenderContext) -> RenderStream {
			futures::stream::iter([Ok(Bytes::from(context.url().to_string()))]).boxed()
		}
	}

	struct EchoFactory;

	impl RendererFactory for EchoFactory {
		fn create(
			&self,
			bundle: &Bundle,
			_options: &RendererOptions,
		) -> RenderResult<Arc<dyn BundleRenderer>> {
			if bundle.is_empty() {
				return Err(RenderError::invalid_bundle(bundle.project(), "empty"));
			}
			Ok(Arc::new(EchoRenderer))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_renderer_delegates_to_engine() {
		let renderer = Renderer::build(
			&EchoFactory,
			&Bundle::new("app", "x"),
			&RendererOptions::default(),
			1,
		)
		.unwrap();

		let chunks: Vec<_> = renderer
			.render_to_stream(RenderContext::new("/about"))
			.collect()
			.await;

		assert_eq!(renderer.project(), "app");
		assert_eq!(renderer.generation(), 1);
		assert_eq!(chunks, vec![Ok(Bytes::from_static(b"/about"))]);
	}

	#[rstest]
	fn test_build_propagates_factory_error() {
		let err = Renderer::build(
			&EchoFactory,
			&Bundle::new("app", ""),
			&RendererOptions::default(),
			1,
		)
		.unwrap_err();

		assert!(matches!(err, RenderError::InvalidBundle { .. }));
	}
}

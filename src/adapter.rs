//! The request-level render pipeline.

use crate::error::SsrResult;
use crate::request::RenderRequest;
use bundle_ssr_bundle::{
	BundleProvider, RendererRegistry, Resolution, StaticBundleProvider, WatchedBundleProvider,
};
use bundle_ssr_conf::SsrSettings;
use bundle_ssr_renderer::{RenderContext, RendererFactory};
use bundle_ssr_stream::{
	ResponseBody, ResponseSink, StreamWriter, WriteOutcome, channel, write_not_ready,
};
use bundle_ssr_template::TemplateSplitter;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Builds the render context of a request.
pub type ContextHandler = Arc<dyn Fn(&RenderRequest) -> RenderContext + Send + Sync>;

/// What [`SsrAdapter::render`] did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
	/// No renderer yet; the not-ready body was written.
	NotReady,
	/// The request was rendered by the renderer of `generation`.
	Rendered {
		/// Generation of the renderer used.
		generation: u64,
		/// How the response stream ended.
		outcome: WriteOutcome,
	},
}

/// Renders requests of one project into a template.
///
/// ```no_run
/// # use bundle_ssr::{RenderRequest, SsrAdapter, SsrSettings, BufferSink};
/// # use bundle_ssr::renderer::JsRendererFactory;
/// # use std::sync::Arc;
/// # async fn run() -> Result<(), bundle_ssr::SsrError> {
/// let settings = SsrSettings::new("shop");
/// let adapter = SsrAdapter::production(settings, Arc::new(JsRendererFactory::new()))?;
///
/// let mut sink = BufferSink::new();
/// let template = "<html><body>{{ APP }}</body></html>";
/// adapter.render(&RenderRequest::new("/"), &mut sink, template).await?;
/// # Ok(())
/// # }
/// ```
pub struct SsrAdapter {
	settings: SsrSettings,
	provider: Arc<dyn BundleProvider>,
	splitter: TemplateSplitter,
	writer: StreamWriter,
	context_handler: Option<ContextHandler>,
}

impl SsrAdapter {
	/// Creates an adapter resolving renderers through `provider`.
	///
	/// # Errors
	///
	/// Fails when `settings` do not validate.
	pub fn new(settings: SsrSettings, provider: Arc<dyn BundleProvider>) -> SsrResult<Self> {
		settings.validate()?;
		Ok(Self {
			writer: StreamWriter::from_settings(&settings),
			settings,
			provider,
			splitter: TemplateSplitter::new(),
			context_handler: None,
		})
	}

	/// Creates an adapter loading the built bundle from
	/// `server_build.output` on first request.
	pub fn production(settings: SsrSettings, factory: Arc<dyn RendererFactory>) -> SsrResult<Self> {
		let provider = StaticBundleProvider::new(
			Arc::new(RendererRegistry::new()),
			factory,
			settings.server_build.clone(),
			settings.renderer_options.clone(),
		);
		Self::new(settings, Arc::new(provider))
	}

	/// Creates an adapter fed by build updates.
	///
	/// Returns the provider as well; spawn its update loop with
	/// [`WatchedBundleProvider::spawn`] or
	/// [`WatchedBundleProvider::spawn_with_channel`].
	pub fn development(
		settings: SsrSettings,
		factory: Arc<dyn RendererFactory>,
	) -> SsrResult<(Self, WatchedBundleProvider)> {
		let provider = WatchedBundleProvider::new(
			Arc::new(RendererRegistry::new()),
			factory,
			settings.renderer_options.clone(),
		);
		let adapter = Self::new(settings, Arc::new(provider.clone()))?;
		Ok((adapter, provider))
	}

	/// Creates the adapter matching `settings.mode`.
	///
	/// In development mode the update-fed provider is returned alongside
	/// the adapter.
	pub fn for_mode(
		settings: SsrSettings,
		factory: Arc<dyn RendererFactory>,
	) -> SsrResult<(Self, Option<WatchedBundleProvider>)> {
		if settings.mode.is_development() {
			let (adapter, provider) = Self::development(settings, factory)?;
			Ok((adapter, Some(provider)))
		} else {
			Ok((Self::production(settings, factory)?, None))
		}
	}

	/// Builds render contexts with `handler` instead of the default
	/// `{ url }` context.
	pub fn with_context_handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&RenderRequest) -> RenderContext + Send + Sync + 'static,
	{
		self.context_handler = Some(Arc::new(handler));
		self
	}

	/// Active settings.
	pub fn settings(&self) -> &SsrSettings {
		&self.settings
	}

	/// The renderer provider.
	pub fn provider(&self) -> &Arc<dyn BundleProvider> {
		&self.provider
	}

	/// Render context for `request`.
	pub fn context_for(&self, request: &RenderRequest) -> RenderContext {
		match &self.context_handler {
			Some(handler) => handler(request),
			None => RenderContext::new(request.url()),
		}
	}

	/// Renders `request` into `template` and streams the result to `sink`.
	///
	/// # Errors
	///
	/// Template errors and renderer initialization errors are returned
	/// before anything is written. Sink errors end the response early.
	/// Render errors are not errors here; see [`RenderOutcome`].
	pub async fn render<S>(
		&self,
		request: &RenderRequest,
		sink: &mut S,
		template: &str,
	) -> SsrResult<RenderOutcome>
	where
		S: ResponseSink + ?Sized,
	{
		let started = Instant::now();
		let outcome = self.render_inner(request, sink, template).await;

		if self.settings.mode.is_development() {
			tracing::debug!(
				url = request.url(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				"whole request"
			);
		}
		outcome
	}

	async fn render_inner<S>(
		&self,
		request: &RenderRequest,
		sink: &mut S,
		template: &str,
	) -> SsrResult<RenderOutcome>
	where
		S: ResponseSink + ?Sized,
	{
		let split = self.splitter.split(template, &self.settings.app_marker)?;
		let project = self.settings.project_name.as_str();

		let renderer = match self.provider.resolve(project).await? {
			Resolution::Ready(renderer) => renderer,
			Resolution::Pending => {
				tracing::debug!(project, url = request.url(), "Renderer not ready");
				write_not_ready(sink).await?;
				return Ok(RenderOutcome::NotReady);
			}
		};

		let context = self.context_for(request);
		let chunks = renderer.render_to_stream(context.clone());
		let outcome = self.writer.write(&context, &split, chunks, sink).await?;

		Ok(RenderOutcome::Rendered {
			generation: renderer.generation(),
			outcome,
		})
	}

	/// Renders `request` on a background task and returns the response body
	/// it streams into.
	///
	/// The body buffers at most `stream_buffer` chunks. If the render fails
	/// before completing the response, the body fails too.
	pub fn spawn_render(
		self: &Arc<Self>,
		request: RenderRequest,
		template: impl Into<String>,
	) -> (ResponseBody, JoinHandle<SsrResult<RenderOutcome>>) {
		let (mut sink, body) = channel(self.settings.stream_buffer);
		let adapter = Arc::clone(self);
		let template = template.into();

		let handle = tokio::spawn(async move {
			let result = adapter.render(&request, &mut sink, &template).await;
			if let Err(error) = &result {
				tracing::error!(url = request.url(), error = %error, "Render request failed");
				sink.abort(&error.to_string()).await;
			}
			result
		});
		(body, handle)
	}
}

impl fmt::Debug for SsrAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SsrAdapter")
			.field("project", &self.settings.project_name)
			.field("mode", &self.settings.mode)
			.field("has_context_handler", &self.context_handler.is_some())
			.finish_non_exhaustive()
	}
}

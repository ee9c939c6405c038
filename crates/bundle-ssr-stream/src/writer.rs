//! Splices a render stream into the template.

use crate::error::SinkError;
use crate::sink::ResponseSink;
use bundle_ssr_conf::{HeadDefaults, OnRenderError, SsrSettings};
use bundle_ssr_renderer::{RenderContext, RenderError, RenderStream};
use bundle_ssr_template::{TemplateSplit, inject, redirect_script, state_script};
use bytes::Bytes;
use futures::StreamExt;

/// Body written while the bundle is still being built.
pub const NOT_READY_BODY: &str = "waiting for compilation... refresh in a moment.";

/// Writes [`NOT_READY_BODY`] and ends the sink.
pub async fn write_not_ready<S>(sink: &mut S) -> Result<(), SinkError>
where
	S: ResponseSink + ?Sized,
{
	sink.write(Bytes::from_static(NOT_READY_BODY.as_bytes())).await?;
	sink.end().await
}

/// Progress of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
	/// No chunk has been rendered yet.
	AwaitingFirstChunk,
	/// At least one chunk has been written.
	Streaming,
	/// The sink was ended or aborted.
	Finished,
}

/// How a response ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
	/// Every chunk and the tail were written and the sink ended.
	Completed {
		/// Number of rendered chunks.
		chunks: usize,
	},
	/// Rendering failed and the sink was aborted.
	Aborted {
		/// The render error.
		error: RenderError,
	},
	/// Rendering failed and the redirect script was written.
	Redirected {
		/// The render error.
		error: RenderError,
		/// Redirect target.
		path: String,
	},
}

impl WriteOutcome {
	/// Whether the response completed normally.
	pub fn is_completed(&self) -> bool {
		matches!(self, Self::Completed { .. })
	}
}

/// Writes `head`, rendered chunks and `tail` to a sink.
///
/// With head defaults configured, the head fragment is held back until the
/// first chunk so the renderer can fill in per-request head data; the
/// injected head is then written once. Without them the head is written
/// before rendering starts.
#[derive(Debug, Clone, Default)]
pub struct StreamWriter {
	head_defaults: Option<HeadDefaults>,
	on_error: OnRenderError,
}

impl StreamWriter {
	/// Creates a writer.
	pub fn new(head_defaults: Option<HeadDefaults>, on_error: OnRenderError) -> Self {
		Self {
			head_defaults,
			on_error,
		}
	}

	/// Creates a writer configured from `settings`.
	pub fn from_settings(settings: &SsrSettings) -> Self {
		Self::new(
			settings.default_head_data.clone(),
			settings.on_render_error.clone(),
		)
	}

	/// Whether the head is held back for injection.
	pub fn injects_head(&self) -> bool {
		self.head_defaults.is_some()
	}

	/// Streams one response.
	///
	/// # Errors
	///
	/// Fails only when the sink rejects a write; render errors are handled
	/// according to the configured [`OnRenderError`] and reported through
	/// the returned [`WriteOutcome`].
	pub async fn write<S>(
		&self,
		context: &RenderContext,
		split: &TemplateSplit,
		mut chunks: RenderStream,
		sink: &mut S,
	) -> Result<WriteOutcome, SinkError>
	where
		S: ResponseSink + ?Sized,
	{
		let mut phase = StreamPhase::AwaitingFirstChunk;
		let mut written = 0usize;

		if !self.injects_head() {
			sink.write(Bytes::copy_from_slice(split.head().as_bytes())).await?;
		}

		while let Some(item) = chunks.next().await {
			let chunk = match item {
				Ok(chunk) => chunk,
				Err(error) => return self.fail(context, error, sink).await,
			};

			if phase == StreamPhase::AwaitingFirstChunk {
				let preamble = match self.preamble(context, split) {
					Ok(preamble) => preamble,
					Err(error) => return self.fail(context, error, sink).await,
				};
				if !preamble.is_empty() {
					sink.write(Bytes::from(preamble)).await?;
				}
				phase = StreamPhase::Streaming;
			}

			sink.write(chunk).await?;
			written += 1;
		}

		if phase == StreamPhase::AwaitingFirstChunk {
			let preamble = match self.preamble(context, split) {
				Ok(preamble) => preamble,
				Err(error) => return self.fail(context, error, sink).await,
			};
			if !preamble.is_empty() {
				sink.write(Bytes::from(preamble)).await?;
			}
		}

		sink.write(Bytes::copy_from_slice(split.tail().as_bytes())).await?;
		sink.end().await?;
		phase = StreamPhase::Finished;

		tracing::trace!(url = context.url(), chunks = written, ?phase, "Response streamed");
		Ok(WriteOutcome::Completed { chunks: written })
	}

	/// The deferred head (when injecting) followed by the initial state
	/// script (when the renderer set one).
	fn preamble(&self, context: &RenderContext, split: &TemplateSplit) -> Result<String, RenderError> {
		let mut preamble = match &self.head_defaults {
			Some(defaults) => inject(split.head(), &context.head_data(), defaults),
			None => String::new(),
		};
		if let Some(state) = context.initial_state() {
			let script = state_script(&state)
				.map_err(|e| RenderError::Render(format!("failed to serialize initial state: {e}")))?;
			preamble.push_str(&script);
		}
		Ok(preamble)
	}

	async fn fail<S>(
		&self,
		context: &RenderContext,
		error: RenderError,
		sink: &mut S,
	) -> Result<WriteOutcome, SinkError>
	where
		S: ResponseSink + ?Sized,
	{
		tracing::error!(url = context.url(), error = %error, "Render failed mid-stream");

		match &self.on_error {
			OnRenderError::Abort => {
				sink.abort(&error.to_string()).await;
				Ok(WriteOutcome::Aborted { error })
			}
			OnRenderError::Redirect { path } => {
				sink.write(Bytes::from(redirect_script(path))).await?;
				sink.end().await?;
				Ok(WriteOutcome::Redirected {
					error,
					path: path.clone(),
				})
			}
		}
	}
}

//! JavaScript bundle renderer.
//!
//! The bundle is evaluated once in a `boa_engine` context and must define a
//! global `render(context)` function:
//!
//! ```javascript
//! function render(context) {
//!     context.initialState = { user: "ada" };
//!     context.headData = { title: "Profile" };
//!     return ["<main>", "<h1>" + context.url + "</h1>", "</main>"];
//! }
//!
//! // Optional: opt a request into the render cache.
//! function serverCacheKey(context) {
//!     return context.url === "/" ? "home" : null;
//! }
//! ```
//!
//! `render` returns a string or an array of strings (one chunk each). The
//! context object carries `url` and the request metadata; `initialState` and
//! `headData` assigned by the bundle are copied back into the
//! [`RenderContext`].
//!
//! # Thread Safety
//!
//! `boa_engine::Context` is `!Send + !Sync`. Each renderer owns a dedicated
//! thread holding the context and receives commands over a bounded channel,
//! so [`JsBundleRenderer`] is `Send + Sync` without `unsafe`.

use crate::bundle::Bundle;
use crate::cache::{CachedRender, RenderCache};
use crate::context::{RenderContext, RenderOutput};
use crate::engine::{BundleRenderer, RenderStream, RendererFactory};
use crate::error::{RenderError, RenderResult};
use boa_engine::{Context, JsError, JsValue, Source};
use bundle_ssr_conf::RendererOptions;
use bundle_ssr_template::HeadData;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::{mpsc, oneshot};

/// Pending commands per runtime before callers wait.
const COMMAND_BUFFER: usize = 16;

const BUNDLE_CHECK: &str = "typeof render === 'function'";

/// Command sent to the dedicated JavaScript thread.
enum RuntimeCommand {
	/// Compute the optional cache key for a context.
	CacheKey {
		context_json: String,
		response_tx: oneshot::Sender<RenderResult<Option<String>>>,
	},
	/// Render a context.
	Render {
		context_json: String,
		response_tx: oneshot::Sender<RenderResult<JsRenderOutput>>,
	},
}

/// What the render wrapper script hands back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsRenderOutput {
	chunks: Vec<String>,
	initial_state: Option<serde_json::Value>,
	head_data: Option<HeadData>,
}

/// Handle to the thread running one bundle.
struct JsRuntime {
	command_tx: mpsc::Sender<RuntimeCommand>,
}

impl JsRuntime {
	/// Spawns the runtime thread and evaluates `bundle` in it.
	///
	/// Blocks until the bundle is loaded.
	fn spawn(bundle: &Bundle) -> RenderResult<Self> {
		let (command_tx, command_rx) = mpsc::channel::<RuntimeCommand>(COMMAND_BUFFER);
		let (init_tx, init_rx) = std_mpsc::channel::<RenderResult<()>>();
		let project = bundle.project().to_string();
		let source = bundle.clone();

		thread::Builder::new()
			.name(format!("bundle-ssr-js-{project}"))
			.spawn(move || runtime_thread_main(source, command_rx, init_tx))
			.map_err(|e| RenderError::Runtime(format!("failed to spawn runtime thread: {e}")))?;

		init_rx.recv().map_err(|_| {
			RenderError::Runtime("runtime thread terminated during initialization".to_string())
		})??;

		Ok(Self { command_tx })
	}

	async fn cache_key(&self, context_json: String) -> RenderResult<Option<String>> {
		let (response_tx, response_rx) = oneshot::channel();
		self.send(RuntimeCommand::CacheKey {
			context_json,
			response_tx,
		})
		.await?;
		response_rx.await.map_err(|_| {
			RenderError::Runtime("runtime thread terminated during rendering".to_string())
		})?
	}

	async fn render(&self, context_json: String) -> RenderResult<JsRenderOutput> {
		let (response_tx, response_rx) = oneshot::channel();
		self.send(RuntimeCommand::Render {
			context_json,
			response_tx,
		})
		.await?;
		response_rx.await.map_err(|_| {
			RenderError::Runtime("runtime thread terminated during rendering".to_string())
		})?
	}

	async fn send(&self, command: RuntimeCommand) -> RenderResult<()> {
		self.command_tx
			.send(command)
			.await
			.map_err(|_| RenderError::Runtime("runtime thread is not available".to_string()))
	}
}

/// Main function of the runtime thread. The `Context` never leaves it.
fn runtime_thread_main(
	bundle: Bundle,
	mut command_rx: mpsc::Receiver<RuntimeCommand>,
	init_tx: std_mpsc::Sender<RenderResult<()>>,
) {
	let mut context = Context::default();

	let init_result = load_bundle(&bundle, &mut context);
	let init_ok = init_result.is_ok();
	if init_tx.send(init_result).is_err() || !init_ok {
		return;
	}
	drop(bundle);

	// Runs until every sender is dropped.
	while let Some(command) = command_rx.blocking_recv() {
		match command {
			RuntimeCommand::CacheKey {
				context_json,
				response_tx,
			} => {
				let _ = response_tx.send(cache_key_code(&context_json, &mut context));
			}
			RuntimeCommand::Render {
				context_json,
				response_tx,
			} => {
				let _ = response_tx.send(render_code(&context_json, &mut context));
			}
		}
	}
}

/// Evaluates the bundle and checks that it defines `render`.
fn load_bundle(bundle: &Bundle, context: &mut Context) -> RenderResult<()> {
	context
		.eval(Source::from_bytes(bundle.source()))
		.map_err(|e| RenderError::invalid_bundle(bundle.project(), js_error_to_string(&e, context)))?;

	let check = context
		.eval(Source::from_bytes(BUNDLE_CHECK))
		.map_err(|e| RenderError::invalid_bundle(bundle.project(), js_error_to_string(&e, context)))?;
	if js_value_to_string(&check, context)? != "true" {
		return Err(RenderError::invalid_bundle(
			bundle.project(),
			"bundle does not define a global `render(context)` function",
		));
	}
	Ok(())
}

fn cache_key_code(context_json: &str, context: &mut Context) -> RenderResult<Option<String>> {
	let script = format!(
		r#"
		(function() {{
			if (typeof serverCacheKey !== 'function') {{
				return 'null';
			}}
			var key = serverCacheKey({context_json});
			return JSON.stringify(key === undefined || key === null ? null : String(key));
		}})()
		"#
	);
	let json = eval_to_string(&script, context)?;
	serde_json::from_str(&json)
		.map_err(|e| RenderError::Render(format!("invalid cache key: {e}")))
}

fn render_code(context_json: &str, context: &mut Context) -> RenderResult<JsRenderOutput> {
	let script = format!(
		r#"
		(function() {{
			var context = {context_json};
			var output = render(context);
			var chunks = Array.isArray(output) ? output : [output];
			return JSON.stringify({{
				chunks: chunks.map(function(chunk) {{ return String(chunk); }}),
				initialState: context.initialState === undefined ? null : context.initialState,
				headData: context.headData || null
			}});
		}})()
		"#
	);
	let json = eval_to_string(&script, context)?;
	serde_json::from_str(&json)
		.map_err(|e| RenderError::Render(format!("invalid render output: {e}")))
}

fn eval_to_string(code: &str, context: &mut Context) -> RenderResult<String> {
	let result = context
		.eval(Source::from_bytes(code))
		.map_err(|e| RenderError::Render(js_error_to_string(&e, context)))?;
	js_value_to_string(&result, context)
}

/// Convert `JsValue` to String
fn js_value_to_string(value: &JsValue, context: &mut Context) -> RenderResult<String> {
	value
		.to_string(context)
		.map(|s| s.to_std_string_escaped())
		.map_err(|e| RenderError::Render(js_error_to_string(&e, context)))
}

/// Convert `JsError` to String
fn js_error_to_string(error: &JsError, context: &mut Context) -> String {
	error
		.to_opaque(context)
		.to_string(context)
		.map(|s| s.to_std_string_escaped())
		.unwrap_or_else(|_| "Unknown JavaScript error".to_string())
}

/// Renderer executing a JavaScript bundle.
pub struct JsBundleRenderer {
	project: String,
	runtime: Arc<JsRuntime>,
	cache: RenderCache,
}

impl JsBundleRenderer {
	/// Loads `bundle` into a fresh runtime.
	///
	/// # Errors
	///
	/// [`RenderError::InvalidBundle`] when the bundle fails to evaluate or
	/// does not define `render`, [`RenderError::Runtime`] when the runtime
	/// thread cannot start.
	pub fn new(bundle: &Bundle, options: &RendererOptions) -> RenderResult<Self> {
		let runtime = JsRuntime::spawn(bundle)?;
		tracing::debug!(project = bundle.project(), len = bundle.len(), "loaded JavaScript bundle");
		Ok(Self {
			project: bundle.project().to_string(),
			runtime: Arc::new(runtime),
			cache: RenderCache::new(&options.cache),
		})
	}

	/// The render cache of this renderer.
	pub fn cache(&self) -> &RenderCache {
		&self.cache
	}

	async fn render_chunks(
		project: String,
		runtime: Arc<JsRuntime>,
		cache: RenderCache,
		context: RenderContext,
	) -> RenderResult<Vec<Bytes>> {
		let context_json = context.to_json().to_string();

		let key = if cache.is_enabled() {
			runtime.cache_key(context_json.clone()).await?
		} else {
			None
		};

		if let Some(key) = key.as_deref()
			&& let Some(hit) = cache.get(key).await
		{
			tracing::trace!(project, key, "render cache hit");
			context.record(hit.output.clone());
			return Ok(hit.chunks.clone());
		}

		let rendered = runtime.render(context_json).await?;
		let render = CachedRender {
			chunks: rendered.chunks.into_iter().map(Bytes::from).collect(),
			output: RenderOutput {
				initial_state: rendered.initial_state,
				head_data: rendered.head_data.unwrap_or_default(),
			},
		};
		context.record(render.output.clone());

		let chunks = render.chunks.clone();
		if let Some(key) = key {
			cache.insert(key, render).await;
		}
		Ok(chunks)
	}
}

impl BundleRenderer for JsBundleRenderer {
	fn render_to_stream(&self, context: RenderContext) -> RenderStream {
		let render = Self::render_chunks(
			self.project.clone(),
			Arc::clone(&self.runtime),
			self.cache.clone(),
			context,
		);

		stream::once(render)
			.flat_map(|result| match result {
				Ok(chunks) => stream::iter(chunks.into_iter().map(Ok)).left_stream(),
				Err(e) => stream::iter(vec![Err(e)]).right_stream(),
			})
			.boxed()
	}
}

/// Factory producing [`JsBundleRenderer`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsRendererFactory;

impl JsRendererFactory {
	/// Creates the factory.
	pub fn new() -> Self {
		Self
	}
}

impl RendererFactory for JsRendererFactory {
	fn create(
		&self,
		bundle: &Bundle,
		options: &RendererOptions,
	) -> RenderResult<Arc<dyn BundleRenderer>> {
		Ok(Arc::new(JsBundleRenderer::new(bundle, options)?))
	}
}

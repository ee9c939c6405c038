//! Development provider fed by the build watcher.
//!
//! The watcher publishes one [`BundleUpdate`] per completed build. A single
//! background task applies updates in arrival order; request handlers only
//! ever read the registry.

use crate::error::BundleResult;
use crate::provider::{BundleProvider, RendererState, Resolution};
use crate::registry::RendererRegistry;
use async_trait::async_trait;
use bundle_ssr_conf::RendererOptions;
use bundle_ssr_renderer::{Bundle, RenderError, Renderer, RendererFactory};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Errors and warnings reported by one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileDiagnostics {
	/// Build errors.
	pub errors: Vec<String>,
	/// Build warnings.
	pub warnings: Vec<String>,
}

impl CompileDiagnostics {
	/// Whether the build reported nothing.
	pub fn is_clean(&self) -> bool {
		self.errors.is_empty() && self.warnings.is_empty()
	}
}

/// Result of one build of a project's server bundle.
#[derive(Debug, Clone)]
pub struct BundleUpdate {
	/// Project that was rebuilt.
	pub project: String,
	/// Emitted bundle source, if the build produced one.
	pub bundle: Option<Arc<str>>,
	/// Diagnostics of the build.
	pub diagnostics: CompileDiagnostics,
}

impl BundleUpdate {
	/// A build that emitted `bundle`.
	pub fn new(project: impl Into<String>, bundle: impl Into<Arc<str>>) -> Self {
		Self {
			project: project.into(),
			bundle: Some(bundle.into()),
			diagnostics: CompileDiagnostics::default(),
		}
	}

	/// A build that emitted nothing.
	pub fn failed(project: impl Into<String>, diagnostics: CompileDiagnostics) -> Self {
		Self {
			project: project.into(),
			bundle: None,
			diagnostics,
		}
	}

	/// Attaches build diagnostics.
	pub fn with_diagnostics(mut self, diagnostics: CompileDiagnostics) -> Self {
		self.diagnostics = diagnostics;
		self
	}
}

/// Swaps a project's renderer on every rebuild.
///
/// Resolves to [`Resolution::Pending`] until the first bundle has been
/// applied. A bundle the engine rejects is logged and dropped; the previous
/// renderer stays published.
#[derive(Clone)]
pub struct WatchedBundleProvider {
	registry: Arc<RendererRegistry>,
	factory: Arc<dyn RendererFactory>,
	options: RendererOptions,
}

impl WatchedBundleProvider {
	/// Creates a provider publishing into `registry`.
	pub fn new(
		registry: Arc<RendererRegistry>,
		factory: Arc<dyn RendererFactory>,
		options: RendererOptions,
	) -> Self {
		Self {
			registry,
			factory,
			options,
		}
	}

	/// Registry this provider publishes into.
	pub fn registry(&self) -> &Arc<RendererRegistry> {
		&self.registry
	}

	/// Applies every update of `updates` in order until the stream ends.
	pub fn spawn<S>(&self, updates: S) -> JoinHandle<()>
	where
		S: Stream<Item = BundleUpdate> + Send + 'static,
	{
		let provider = self.clone();
		tokio::spawn(async move {
			let mut updates = std::pin::pin!(updates);
			while let Some(update) = updates.next().await {
				provider.apply_update(update).await;
			}
			tracing::debug!("Bundle update stream closed");
		})
	}

	/// Spawns the update loop behind a bounded channel.
	///
	/// The loop stops once every sender is dropped.
	pub fn spawn_with_channel(&self, capacity: usize) -> (mpsc::Sender<BundleUpdate>, JoinHandle<()>) {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		let handle = self.spawn(ReceiverStream::new(rx));
		(tx, handle)
	}

	/// Applies one build result.
	///
	/// Returns the newly published renderer, if any.
	pub async fn apply_update(&self, update: BundleUpdate) -> Option<Arc<Renderer>> {
		let BundleUpdate {
			project,
			bundle,
			diagnostics,
		} = update;

		for error in &diagnostics.errors {
			tracing::error!(project = %project, "{error}");
		}
		for warning in &diagnostics.warnings {
			tracing::warn!(project = %project, "{warning}");
		}

		let Some(source) = bundle else {
			tracing::debug!(project = %project, "Build emitted no server bundle");
			return None;
		};

		let bundle = Bundle::new(project.clone(), source);
		let generation = self.registry.next_generation(&project);
		match self.build(bundle, generation).await {
			Ok(renderer) => {
				let renderer = Arc::new(renderer);
				let previous = self.registry.replace(renderer.clone());
				tracing::info!(
					project = %project,
					generation,
					replaced = previous.is_some(),
					"Server bundle updated"
				);
				Some(renderer)
			}
			Err(error) => {
				tracing::error!(
					project = %project,
					error = %error,
					"Failed to load updated server bundle, keeping previous renderer"
				);
				None
			}
		}
	}

	async fn build(&self, bundle: Bundle, generation: u64) -> Result<Renderer, RenderError> {
		let factory = self.factory.clone();
		let options = self.options.clone();
		tokio::task::spawn_blocking(move || {
			Renderer::build(factory.as_ref(), &bundle, &options, generation)
		})
		.await
		.map_err(|e| RenderError::Runtime(format!("renderer build task failed: {e}")))?
	}
}

#[async_trait]
impl BundleProvider for WatchedBundleProvider {
	async fn resolve(&self, project: &str) -> BundleResult<Resolution> {
		Ok(match self.registry.get(project) {
			Some(renderer) => Resolution::Ready(renderer),
			None => Resolution::Pending,
		})
	}

	fn state(&self, project: &str) -> RendererState {
		self.registry.state(project)
	}
}

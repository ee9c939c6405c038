//! Production provider: one bundle read from disk, kept for the process lifetime.

use crate::error::{BundleError, BundleResult};
use crate::provider::{BundleProvider, RendererState, Resolution};
use crate::registry::RendererRegistry;
use async_trait::async_trait;
use bundle_ssr_conf::{RendererOptions, ServerBuildConfig};
use bundle_ssr_renderer::{Bundle, RenderError, Renderer, RendererFactory};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Loads `<output.path>/<output.filename>` on first access.
///
/// Concurrent first requests for the same project read the artifact once:
/// loads are serialized and the registry is checked again under the lock.
/// A failed load publishes nothing, so the next request tries again.
///
/// The artifact is read with `tokio::fs` and the renderer is built on the
/// blocking pool, so waiting requests never hold up their executor.
pub struct StaticBundleProvider {
	registry: Arc<RendererRegistry>,
	factory: Arc<dyn RendererFactory>,
	server_build: ServerBuildConfig,
	options: RendererOptions,
	load_lock: Mutex<()>,
}

impl StaticBundleProvider {
	/// Creates a provider publishing into `registry`.
	pub fn new(
		registry: Arc<RendererRegistry>,
		factory: Arc<dyn RendererFactory>,
		server_build: ServerBuildConfig,
		options: RendererOptions,
	) -> Self {
		Self {
			registry,
			factory,
			server_build,
			options,
			load_lock: Mutex::new(()),
		}
	}

	/// Registry this provider publishes into.
	pub fn registry(&self) -> &Arc<RendererRegistry> {
		&self.registry
	}

	/// Loads the renderer of `project` ahead of the first request.
	pub async fn preload(&self, project: &str) -> BundleResult<Arc<Renderer>> {
		if let Some(renderer) = self.registry.get(project) {
			return Ok(renderer);
		}

		let _guard = self.load_lock.lock().await;
		if let Some(renderer) = self.registry.get(project) {
			return Ok(renderer);
		}

		let path = self.server_build.bundle_path(project);
		let source = tokio::fs::read_to_string(&path)
			.await
			.map_err(|source| BundleError::Read {
				project: project.to_string(),
				path: path.clone(),
				source,
			})?;
		let bytes = source.len();
		let generation = self.registry.next_generation(project);
		let renderer = Arc::new(self.build(Bundle::new(project, source), generation).await?);

		tracing::info!(
			project,
			path = %path.display(),
			bytes,
			"Loaded server bundle"
		);

		self.registry.replace(renderer.clone());
		Ok(renderer)
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
impl BundleProvider for StaticBundleProvider {
	async fn resolve(&self, project: &str) -> BundleResult<Resolution> {
		self.preload(project).await.map(Resolution::Ready)
	}

	fn state(&self, project: &str) -> RendererState {
		self.registry.state(project)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bundle_ssr_renderer::{BundleRenderer, RenderContext, RenderResult, RenderStream};
	use bytes::Bytes;
	use futures::StreamExt;
	use rstest::rstest;
	use std::fs;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::{Duration, Instant};
	use tempfile::TempDir;

	struct SourceRenderer(String);

	impl BundleRenderer for SourceRenderer {
		fn render_to_stream(&self, _context: RenderContext) -> RenderStream {
			futures::stream::iter([Ok(Bytes::from(self.0.clone()))]).boxed()
		}
	}

	#[derive(Default)]
	struct CountingFactory {
		created: AtomicUsize,
	}

	impl RendererFactory for CountingFactory {
		fn create(
			&self,
			bundle: &Bundle,
			_options: &RendererOptions,
		) -> RenderResult<Arc<dyn BundleRenderer>> {
			if bundle.source().contains("syntax error") {
				return Err(RenderError::invalid_bundle(bundle.project(), "unexpected token"));
			}
			self.created.fetch_add(1, Ordering::SeqCst);
			Ok(Arc::new(SourceRenderer(bundle.source().to_string())))
		}
	}

	/// Stands in for an engine that takes a while to evaluate a large bundle.
	struct SlowFactory(Duration);

	impl RendererFactory for SlowFactory {
		fn create(
			&self,
			bundle: &Bundle,
			_options: &RendererOptions,
		) -> RenderResult<Arc<dyn BundleRenderer>> {
			std::thread::sleep(self.0);
			Ok(Arc::new(SourceRenderer(bundle.source().to_string())))
		}
	}

	fn provider(dir: &TempDir, factory: Arc<dyn RendererFactory>) -> StaticBundleProvider {
		StaticBundleProvider::new(
			Arc::new(RendererRegistry::new()),
			factory,
			ServerBuildConfig::new(dir.path(), "[name].server.js"),
			RendererOptions::default(),
		)
	}

	#[rstest]
	#[tokio::test]
	async fn test_resolve_loads_bundle_once() {
		// Arrange
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("shop.server.js"), "shop bundle").unwrap();
		let factory = Arc::new(CountingFactory::default());
		let provider = provider(&dir, factory.clone());

		// Act
		let first = provider.resolve("shop").await.unwrap();
		fs::remove_file(dir.path().join("shop.server.js")).unwrap();
		let second = provider.resolve("shop").await.unwrap();

		// Assert
		let first = first.renderer().unwrap();
		let second = second.renderer().unwrap();
		assert!(Arc::ptr_eq(first, second));
		assert_eq!(first.generation(), 1);
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
		assert_eq!(provider.state("shop"), RendererState::Ready { generation: 1 });
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_bundle_fails_and_stays_uninitialized() {
		// Arrange
		let dir = TempDir::new().unwrap();
		let provider = provider(&dir, Arc::new(CountingFactory::default()));

		// Act
		let result = provider.resolve("shop").await;

		// Assert
		match result {
			Err(BundleError::Read { project, path, .. }) => {
				assert_eq!(project, "shop");
				assert_eq!(path, dir.path().join("shop.server.js"));
			}
			other => panic!("expected read error, got {other:?}"),
		}
		assert_eq!(provider.state("shop"), RendererState::Uninitialized);
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_load_is_retried() {
		// Arrange
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("shop.server.js");
		fs::write(&path, "syntax error").unwrap();
		let provider = provider(&dir, Arc::new(CountingFactory::default()));

		// Act
		let failed = provider.resolve("shop").await;
		fs::write(&path, "shop bundle").unwrap();
		let retried = provider.resolve("shop").await;

		// Assert
		assert!(matches!(
			failed,
			Err(BundleError::Renderer(RenderError::InvalidBundle { .. }))
		));
		assert!(retried.unwrap().is_ready());
	}

	#[rstest]
	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_first_requests_build_one_renderer() {
		// Arrange
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("shop.server.js"), "shop bundle").unwrap();
		let factory = Arc::new(CountingFactory::default());
		let provider = Arc::new(provider(&dir, factory.clone()));

		// Act
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let provider = provider.clone();
				tokio::spawn(async move { provider.resolve("shop").await.unwrap().is_ready() })
			})
			.collect();

		// Assert
		for handle in handles {
			assert!(handle.await.unwrap());
		}
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_resolved_renderer_renders_bundle() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("blog.server.js"), "<p>blog</p>").unwrap();
		let provider = provider(&dir, Arc::new(CountingFactory::default()));

		let resolution = provider.resolve("blog").await.unwrap();
		let chunks: Vec<_> = resolution
			.renderer()
			.unwrap()
			.render_to_stream(RenderContext::new("/"))
			.collect()
			.await;

		assert_eq!(chunks, vec![Ok(Bytes::from("<p>blog</p>"))]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_first_load_leaves_executor_free() {
		// Arrange
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("shop.server.js"), "shop bundle").unwrap();
		let provider = provider(&dir, Arc::new(SlowFactory(Duration::from_millis(500))));
		let started = Instant::now();
		let timer = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;
			started.elapsed()
		});

		// Act
		let resolution = provider.resolve("shop").await.unwrap();

		// Assert
		assert!(resolution.is_ready());
		let tick = timer.await.unwrap();
		assert!(tick < Duration::from_millis(100), "executor blocked for {tick:?}");
	}
}

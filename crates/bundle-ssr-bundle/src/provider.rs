//! Provider contract.

use crate::error::BundleResult;
use async_trait::async_trait;
use bundle_ssr_renderer::Renderer;
use std::sync::Arc;

/// Outcome of resolving a project's renderer.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// The renderer to use for this request.
	Ready(Arc<Renderer>),
	/// No renderer exists yet; the bundle is still being built.
	Pending,
}

impl Resolution {
	/// The renderer, if ready.
	pub fn renderer(&self) -> Option<&Arc<Renderer>> {
		match self {
			Self::Ready(renderer) => Some(renderer),
			Self::Pending => None,
		}
	}

	/// Whether a renderer is available.
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready(_))
	}
}

/// Lifecycle of a project's renderer.
///
/// `Uninitialized -> Ready`, and `Ready -> Ready` on every replacement.
/// A failed load leaves the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
	/// No renderer has been built yet.
	Uninitialized,
	/// A renderer is published.
	Ready {
		/// Generation of the published renderer.
		generation: u64,
	},
}

/// Resolves the renderer of a project.
#[async_trait]
pub trait BundleProvider: Send + Sync {
	/// Returns the current renderer of `project`, or [`Resolution::Pending`].
	///
	/// # Errors
	///
	/// Fails when initializing the renderer fails; the error belongs to the
	/// caller that triggered the initialization.
	async fn resolve(&self, project: &str) -> BundleResult<Resolution>;

	/// Current lifecycle state of `project`.
	fn state(&self, project: &str) -> RendererState;
}

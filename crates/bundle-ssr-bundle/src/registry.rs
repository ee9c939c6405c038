//! Mapping from project name to its published renderer.

use crate::provider::RendererState;
use bundle_ssr_renderer::Renderer;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of published renderers.
///
/// Readers clone the `Arc` of the current renderer and keep using it even
/// if it is replaced meanwhile. A replacement publishes a fully built
/// renderer in one write, so no reader sees a partial one.
#[derive(Debug, Default)]
pub struct RendererRegistry {
	renderers: RwLock<HashMap<String, Arc<Renderer>>>,
}

impl RendererRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current renderer of `project`.
	pub fn get(&self, project: &str) -> Option<Arc<Renderer>> {
		self.renderers.read().get(project).cloned()
	}

	/// Publishes `renderer`, returning the one it replaces.
	pub fn replace(&self, renderer: Arc<Renderer>) -> Option<Arc<Renderer>> {
		let project = renderer.project().to_string();
		self.renderers.write().insert(project, renderer)
	}

	/// Removes the renderer of `project`.
	pub fn remove(&self, project: &str) -> Option<Arc<Renderer>> {
		self.renderers.write().remove(project)
	}

	/// Generation the next renderer of `project` should carry.
	pub fn next_generation(&self, project: &str) -> u64 {
		self.renderers
			.read()
			.get(project)
			.map_or(1, |renderer| renderer.generation() + 1)
	}

	/// Lifecycle state of `project`.
	pub fn state(&self, project: &str) -> RendererState {
		match self.renderers.read().get(project) {
			Some(renderer) => RendererState::Ready {
				generation: renderer.generation(),
			},
			None => RendererState::Uninitialized,
		}
	}

	/// Names of projects with a published renderer.
	pub fn projects(&self) -> Vec<String> {
		let mut projects: Vec<String> = self.renderers.read().keys().cloned().collect();
		projects.sort();
		projects
	}

	/// Number of published renderers.
	pub fn len(&self) -> usize {
		self.renderers.read().len()
	}

	/// Whether no renderer is published.
	pub fn is_empty(&self) -> bool {
		self.renderers.read().is_empty()
	}
}

//! Server bundle artifact.

use std::fmt;
use std::sync::Arc;

/// A serialized, server-renderable application produced by the build step.
///
/// The source is opaque to this crate and cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct Bundle {
	project: String,
	source: Arc<str>,
}

impl Bundle {
	/// Creates a bundle for `project`.
	pub fn new(project: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
		Self {
			project: project.into(),
			source: source.into(),
		}
	}

	/// Project the bundle belongs to.
	pub fn project(&self) -> &str {
		&self.project
	}

	/// Bundle source text.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Size of the source in bytes.
	pub fn len(&self) -> usize {
		self.source.len()
	}

	/// Whether the source is empty.
	pub fn is_empty(&self) -> bool {
		self.source.is_empty()
	}
}

// Bundles can be megabytes of minified code; keep them out of logs.
impl fmt::Debug for Bundle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bundle")
			.field("project", &self.project)
			.field("len", &self.source.len())
			.finish()
	}
}

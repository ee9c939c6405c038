//! Per-request render context.

use bundle_ssr_template::HeadData;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Values the renderer produces while rendering one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
	/// Application state embedded for client-side hydration.
	pub initial_state: Option<Value>,
	/// Head overrides for title, keywords and description.
	pub head_data: HeadData,
}

/// Input and output record of one render.
///
/// The URL and metadata are fixed at construction. The output slots are
/// shared between clones, so the stream writer holding one clone observes
/// what the renderer wrote through another.
#[derive(Debug, Clone)]
pub struct RenderContext {
	url: String,
	metadata: Map<String, Value>,
	output: Arc<Mutex<RenderOutput>>,
}

impl RenderContext {
	/// Creates a context for `url` without metadata.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			metadata: Map::new(),
			output: Arc::new(Mutex::new(RenderOutput::default())),
		}
	}

	/// Adds a request-derived metadata field.
	///
	/// The key `url` is reserved for the target URL and is ignored.
	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		let key = key.into();
		if key != "url" {
			self.metadata.insert(key, value.into());
		}
		self
	}

	/// Target URL of the request.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Request-derived metadata.
	pub fn metadata(&self) -> &Map<String, Value> {
		&self.metadata
	}

	/// Stores the initial state.
	pub fn set_initial_state(&self, state: Value) {
		self.output.lock().initial_state = Some(state);
	}

	/// Stores the head overrides.
	pub fn set_head_data(&self, head_data: HeadData) {
		self.output.lock().head_data = head_data;
	}

	/// Replaces both output slots.
	pub fn record(&self, output: RenderOutput) {
		*self.output.lock() = output;
	}

	/// The initial state, if the renderer set one.
	pub fn initial_state(&self) -> Option<Value> {
		self.output.lock().initial_state.clone()
	}

	/// The head overrides set so far.
	pub fn head_data(&self) -> HeadData {
		self.output.lock().head_data.clone()
	}

	/// Snapshot of both output slots.
	pub fn output(&self) -> RenderOutput {
		self.output.lock().clone()
	}

	/// The input side as a JSON object: `url` plus the metadata fields.
	pub fn to_json(&self) -> Value {
		let mut object = self.metadata.clone();
		object.insert("url".to_string(), Value::String(self.url.clone()));
		Value::Object(object)
	}
}

//! Inbound request view.

use http::HeaderMap;

/// The parts of an HTTP request a render depends on.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
	url: String,
	headers: HeaderMap,
}

impl RenderRequest {
	/// Creates a request for `url` without headers.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			headers: HeaderMap::new(),
		}
	}

	/// Replaces the headers.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Request target: path plus query, as sent by the client.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Request headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}
}

impl<B> From<&http::Request<B>> for RenderRequest {
	fn from(request: &http::Request<B>) -> Self {
		let url = request
			.uri()
			.path_and_query()
			.map_or_else(|| request.uri().path().to_string(), |pq| pq.as_str().to_string());
		Self {
			url,
			headers: request.headers().clone(),
		}
	}
}

//! Bounded render-output cache.

use crate::context::RenderOutput;
use bundle_ssr_conf::CacheOptions;
use bytes::Bytes;
use moka::future::Cache;
use std::sync::Arc;

/// A cached render: the chunks and the context outputs that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRender {
	/// Rendered chunks in order.
	pub chunks: Vec<Bytes>,
	/// Initial state and head data recorded during the render.
	pub output: RenderOutput,
}

/// Render-output cache bounded by entry count and time-to-live.
///
/// Shared across all requests of one renderer. Which entry is evicted is
/// left to the cache; callers must not rely on an order.
#[derive(Clone)]
pub struct RenderCache {
	inner: Option<Cache<String, Arc<CachedRender>>>,
}

impl RenderCache {
	/// Builds a cache from the configured bounds, or a disabled one.
	pub fn new(options: &CacheOptions) -> Self {
		if !options.enabled {
			return Self::disabled();
		}
		let inner = Cache::builder()
			.max_capacity(options.max_entries)
			.time_to_live(options.ttl())
			.build();
		Self { inner: Some(inner) }
	}

	/// A cache that stores nothing.
	pub fn disabled() -> Self {
		Self { inner: None }
	}

	/// Whether entries are stored.
	pub fn is_enabled(&self) -> bool {
		self.inner.is_some()
	}

	/// Looks up `key`.
	pub async fn get(&self, key: &str) -> Option<Arc<CachedRender>> {
		match &self.inner {
			Some(cache) => cache.get(key).await,
			None => None,
		}
	}

	/// Stores a render under `key`.
	pub async fn insert(&self, key: String, render: CachedRender) {
		if let Some(cache) = &self.inner {
			cache.insert(key, Arc::new(render)).await;
		}
	}

	/// Approximate number of live entries.
	pub fn entry_count(&self) -> u64 {
		self.inner.as_ref().map_or(0, |cache| cache.entry_count())
	}

	/// Applies pending evictions and bookkeeping.
	pub async fn run_pending_tasks(&self) {
		if let Some(cache) = &self.inner {
			cache.run_pending_tasks().await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bundle_ssr_template::HeadData;
	use rstest::rstest;
	use serde_json::json;

	fn sample() -> CachedRender {
		CachedRender {
			chunks: vec![Bytes::from_static(b"<p>"), Bytes::from_static(b"</p>")],
			output: RenderOutput {
				initial_state: Some(json!({"n": 1})),
				head_data: HeadData::new().title("t"),
			},
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_and_get() {
		let cache = RenderCache::new(&CacheOptions::default());

		cache.insert("/".to_string(), sample()).await;

		assert_eq!(cache.get("/").await.as_deref(), Some(&sample()));
		assert!(cache.get("/other").await.is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_disabled_cache_stores_nothing() {
		let cache = RenderCache::new(&CacheOptions::disabled());

		cache.insert("/".to_string(), sample()).await;

		assert!(!cache.is_enabled());
		assert!(cache.get("/").await.is_none());
		assert_eq!(cache.entry_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_capacity_is_bounded() {
		// Arrange
		let options = CacheOptions {
			enabled: true,
			max_entries: 2,
			ttl_secs: 60,
		};
		let cache = RenderCache::new(&options);

		// Act
		for i in 0..10 {
			cache.insert(format!("/{i}"), sample()).await;
		}
		cache.run_pending_tasks().await;

		// Assert
		assert!(cache.entry_count() <= 2);
	}

	#[rstest]
	#[tokio::test]
	async fn test_entries_expire() {
		let options = CacheOptions {
			enabled: true,
			max_entries: 10,
			ttl_secs: 1,
		};
		let cache = RenderCache::new(&options);
		cache.insert("/".to_string(), sample()).await;

		tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

		assert!(cache.get("/").await.is_none());
	}
}

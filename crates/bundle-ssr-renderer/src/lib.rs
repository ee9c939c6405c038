//! Render engine for bundle-ssr.
//!
//! A [`Renderer`] wraps exactly one [`Bundle`] and turns a per-request
//! [`RenderContext`] into a lazy stream of HTML byte chunks. The engine that
//! actually executes the bundle sits behind the [`BundleRenderer`] trait and
//! is built by a [`RendererFactory`]; with the `js` feature
//! [`JsRendererFactory`] runs JavaScript bundles in an embedded ECMAScript
//! engine.
//!
//! Render output may be cached in a [`RenderCache`] bounded by entry count
//! and time-to-live. The cache key is chosen by the engine.
//!
//! ## Example
//!
//! ```
//! use bundle_ssr_renderer::{BundleRenderer, RenderContext, RenderStream};
//! use bytes::Bytes;
//! use futures::StreamExt;
//!
//! struct Hello;
//!
//! impl BundleRenderer for Hello {
//!     fn render_to_stream(&self, context: RenderContext) -> RenderStream {
//!         let html = format!("<p>{}</p>", context.url());
//!         futures::stream::iter([Ok(Bytes::from(html))]).boxed()
//!     }
//! }
//! ```

pub mod bundle;
pub mod cache;
pub mod context;
pub mod engine;
pub mod error;

#[cfg(feature = "js")]
pub mod js;

pub use bundle::Bundle;
pub use cache::{CachedRender, RenderCache};
pub use context::{RenderContext, RenderOutput};
pub use engine::{BundleRenderer, RenderStream, Renderer, RendererFactory};
pub use error::{RenderError, RenderResult};

#[cfg(feature = "js")]
pub use js::{JsBundleRenderer, JsRendererFactory};

//! # bundle-ssr
//!
//! Streaming server-side rendering for pre-built application bundles.
//!
//! The adapter splits an HTML template at its app marker, renders the
//! request with the project's current bundle and streams
//! `head + rendered chunks + tail` to the response. Along the way it can
//! fill the head's title, keywords and description placeholders and embeds
//! the application's initial state for client-side hydration.
//!
//! ## Crates
//!
//! - [`conf`]: settings, render mode and environment overrides
//! - [`template`]: template splitting, head injection and inline scripts
//! - [`renderer`]: render engine traits, render cache and the JavaScript
//!   bundle renderer
//! - [`bundle`]: production and development bundle providers
//! - [`stream`]: the streaming response writer and response sinks
//!
//! ## Feature Flags
//!
//! - `js` (default): [`renderer::JsBundleRenderer`], which evaluates
//!   JavaScript bundles with an embedded ECMAScript engine
//!
//! ## Example
//!
//! ```no_run
//! use bundle_ssr::renderer::JsRendererFactory;
//! use bundle_ssr::{RenderRequest, SsrAdapter, SsrSettings};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SsrSettings::from_file("ssr.toml")?.with_env_overrides()?;
//! let adapter = Arc::new(SsrAdapter::production(settings, Arc::new(JsRendererFactory::new()))?);
//!
//! let template = std::fs::read_to_string("index.html")?;
//! let (body, _task) = adapter.spawn_render(RenderRequest::new("/"), template);
//! // hand `body` to hyper as the response body
//! # drop(body);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod request;

pub use bundle_ssr_bundle as bundle;
pub use bundle_ssr_conf as conf;
pub use bundle_ssr_renderer as renderer;
pub use bundle_ssr_stream as stream;
pub use bundle_ssr_template as template;

pub use adapter::{ContextHandler, RenderOutcome, SsrAdapter};
pub use error::{SsrError, SsrResult};
pub use request::RenderRequest;

pub use bundle_ssr_bundle::{BundleProvider, BundleUpdate, CompileDiagnostics, Resolution};
pub use bundle_ssr_conf::{HeadDefaults, OnRenderError, RenderMode, SsrSettings};
pub use bundle_ssr_renderer::{RenderContext, RendererFactory};
pub use bundle_ssr_stream::{BufferSink, ChannelSink, ResponseBody, ResponseSink, WriteOutcome};
pub use bundle_ssr_template::HeadData;

//! Bundle providers for bundle-ssr.
//!
//! A provider resolves the current [`Renderer`](bundle_ssr_renderer::Renderer)
//! of a project:
//!
//! - [`StaticBundleProvider`] (production) reads the bundle artifact from
//!   disk on first access and keeps the renderer for the process lifetime.
//! - [`WatchedBundleProvider`] (development) consumes a stream of
//!   [`BundleUpdate`]s from the build watcher and swaps the renderer on every
//!   rebuild. Until the first bundle arrives it resolves to
//!   [`Resolution::Pending`].
//!
//! Both publish renderers through a shared [`RendererRegistry`], which the
//! composing application owns and injects.

pub mod error;
pub mod provider;
pub mod registry;
pub mod static_provider;
pub mod watched;

pub use error::{BundleError, BundleResult};
pub use provider::{BundleProvider, RendererState, Resolution};
pub use registry::RendererRegistry;
pub use static_provider::StaticBundleProvider;
pub use watched::{BundleUpdate, CompileDiagnostics, WatchedBundleProvider};

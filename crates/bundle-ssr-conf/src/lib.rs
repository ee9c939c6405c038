//! Settings for the bundle-ssr rendering adapter.
//!
//! Settings are read from a TOML document and can be overridden from the
//! environment:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `BUNDLE_SSR_ENV` | Render mode (`development` / `production`) |
//! | `NODE_ENV` | Fallback for the render mode when `BUNDLE_SSR_ENV` is unset |
//! | `BUNDLE_SSR_PROJECT` | Project name |
//!
//! ## Example
//!
//! ```
//! use bundle_ssr_conf::{RenderMode, SsrSettings};
//!
//! let settings = SsrSettings::from_toml_str(
//!     r#"
//!     project_name = "shop"
//!     mode = "development"
//!
//!     [server_build.output]
//!     path = "dist/server"
//!     filename = "[name].bundle.js"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.mode, RenderMode::Development);
//! assert_eq!(settings.app_marker, "{{ APP }}");
//! assert_eq!(
//!     settings.server_build.bundle_path("shop"),
//!     std::path::PathBuf::from("dist/server/shop.bundle.js")
//! );
//! ```

pub mod error;
pub mod head;
pub mod mode;
pub mod settings;

pub use error::{ConfError, ConfResult};
pub use head::HeadDefaults;
pub use mode::RenderMode;
pub use settings::{
	CacheOptions, DEFAULT_APP_MARKER, OnRenderError, OutputConfig, RendererOptions,
	ServerBuildConfig, SsrSettings,
};

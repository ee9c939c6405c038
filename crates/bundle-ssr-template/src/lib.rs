//! Template handling for bundle-ssr.
//!
//! - [`split`](split::split): cuts an HTML template at the application marker
//!   into a head and a tail fragment, with [`TemplateSplitter`] memoizing the
//!   last split.
//! - [`inject`](head::inject): substitutes the SEO placeholders of the head
//!   fragment from per-request [`HeadData`] layered over [`HeadDefaults`].
//! - [`state_script`](script::state_script) and
//!   [`redirect_script`](script::redirect_script): inline scripts written into
//!   the response, with JSON escaped for safe embedding.
//!
//! ```
//! use bundle_ssr_template::{HeadData, HeadDefaults, inject, split};
//!
//! let parts = split("<title>{{ _VueSSR_Title }}</title>{{ APP }}</body>", "{{ APP }}").unwrap();
//! assert_eq!(parts.tail(), "</body>");
//!
//! let head = inject(
//!     parts.head(),
//!     &HeadData::new().title("Cart"),
//!     &HeadDefaults::new().base_title(" - Shop"),
//! );
//! assert_eq!(head, "<title>Cart - Shop</title>");
//! ```

pub mod error;
pub mod head;
pub mod script;
pub mod split;

pub use bundle_ssr_conf::HeadDefaults;
pub use error::{TemplateError, TemplateResult};
pub use head::{DESCRIPTION_PLACEHOLDER, HeadData, KEYWORDS_PLACEHOLDER, TITLE_PLACEHOLDER, inject};
pub use script::{INITIAL_STATE_VAR, escape_json_for_script, redirect_script, state_script};
pub use split::{TemplateSplit, TemplateSplitter, split};

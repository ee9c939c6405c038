//! SEO head injection.

use bundle_ssr_conf::HeadDefaults;
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the page title.
pub const TITLE_PLACEHOLDER: &str = "{{ _VueSSR_Title }}";

/// Placeholder replaced by the page keywords.
pub const KEYWORDS_PLACEHOLDER: &str = "{{ _VueSSR_Keywords }}";

/// Placeholder replaced by the page description.
pub const DESCRIPTION_PLACEHOLDER: &str = "{{ _VueSSR_Description }}";

/// Per-request head overrides filled in by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadData {
	/// Title override.
	pub title: Option<String>,
	/// Keywords override.
	pub keywords: Option<String>,
	/// Description override.
	pub description: Option<String>,
}

impl HeadData {
	/// Creates head data without overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the title override.
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Sets the keywords override.
	pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
		self.keywords = Some(keywords.into());
		self
	}

	/// Sets the description override.
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Returns `true` when no override is set.
	pub fn is_empty(&self) -> bool {
		self.title.is_none() && self.keywords.is_none() && self.description.is_none()
	}
}

/// Substitutes the title, keywords and description placeholders of a head
/// fragment.
///
/// Each placeholder's first occurrence becomes
/// `(per-request value or default) + base`; later occurrences and unknown
/// placeholders are left as they are.
pub fn inject(fragment: &str, head_data: &HeadData, defaults: &HeadDefaults) -> String {
	let substitutions = [
		(
			TITLE_PLACEHOLDER,
			head_data.title.as_deref(),
			defaults.title.as_str(),
			defaults.base_title.as_str(),
		),
		(
			KEYWORDS_PLACEHOLDER,
			head_data.keywords.as_deref(),
			defaults.keywords.as_str(),
			defaults.base_keywords.as_str(),
		),
		(
			DESCRIPTION_PLACEHOLDER,
			head_data.description.as_deref(),
			defaults.description.as_str(),
			defaults.base_description.as_str(),
		),
	];

	// Positions are taken from the original fragment so that substituted
	// values are never scanned for placeholders themselves.
	let mut found: Vec<(usize, &str, String)> = substitutions
		.into_iter()
		.filter_map(|(placeholder, value, default, base)| {
			fragment.find(placeholder).map(|at| {
				(
					at,
					placeholder,
					format!("{}{}", value.unwrap_or(default), base),
				)
			})
		})
		.collect();
	found.sort_by_key(|(at, _, _)| *at);

	let mut html = String::with_capacity(fragment.len() + 64);
	let mut cursor = 0;
	for (at, placeholder, replacement) in found {
		html.push_str(&fragment[cursor..at]);
		html.push_str(&replacement);
		cursor = at + placeholder.len();
	}
	html.push_str(&fragment[cursor..]);
	html
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const FRAGMENT: &str = concat!(
		"<head><title>{{ _VueSSR_Title }}</title>",
		"<meta name=\"keywords\" content=\"{{ _VueSSR_Keywords }}\">",
		"<meta name=\"description\" content=\"{{ _VueSSR_Description }}\">",
		"</head>"
	);

	#[rstest]
	fn test_inject_title_override_plus_base() {
		let defaults = HeadDefaults::new().base_title("Site");

		let html = inject(TITLE_PLACEHOLDER, &HeadData::new().title("A"), &defaults);

		assert_eq!(html, "ASite");
	}

	#[rstest]
	fn test_inject_falls_back_to_defaults() {
		// Arrange
		let defaults = HeadDefaults::new()
			.title("Home")
			.base_title(" | Shop")
			.keywords("shop")
			.base_keywords(",store")
			.description("Buy things")
			.base_description(".");

		// Act
		let html = inject(FRAGMENT, &HeadData::new(), &defaults);

		// Assert
		assert_eq!(
			html,
			concat!(
				"<head><title>Home | Shop</title>",
				"<meta name=\"keywords\" content=\"shop,store\">",
				"<meta name=\"description\" content=\"Buy things.\">",
				"</head>"
			)
		);
	}

	#[rstest]
	fn test_inject_mixed_overrides() {
		let defaults = HeadDefaults::new().title("Home").keywords("default");
		let data = HeadData::new().keywords("cart").description("Your cart");

		let html = inject(FRAGMENT, &data, &defaults);

		assert!(html.contains("<title>Home</title>"));
		assert!(html.contains("content=\"cart\""));
		assert!(html.contains("content=\"Your cart\""));
	}

	#[rstest]
	fn test_inject_replaces_first_occurrence_only() {
		let fragment = "{{ _VueSSR_Title }}/{{ _VueSSR_Title }}";

		let html = inject(fragment, &HeadData::new().title("T"), &HeadDefaults::new());

		assert_eq!(html, "T/{{ _VueSSR_Title }}");
	}

	#[rstest]
	fn test_inject_leaves_unknown_placeholders() {
		let fragment = "<title>{{ _VueSSR_Title }}</title>{{ _VueSSR_Author }}";

		let html = inject(fragment, &HeadData::new().title("T"), &HeadDefaults::new());

		assert_eq!(html, "<title>T</title>{{ _VueSSR_Author }}");
	}

	#[rstest]
	fn test_inject_does_not_expand_values_as_placeholders() {
		let data = HeadData::new().title(KEYWORDS_PLACEHOLDER).keywords("k");

		let html = inject("<t>{{ _VueSSR_Title }}</t>", &data, &HeadDefaults::new());

		assert_eq!(html, "<t>{{ _VueSSR_Keywords }}</t>");
	}

	#[rstest]
	fn test_head_data_deserializes_partial_object() {
		let data: HeadData = serde_json::from_str(r#"{"title":"Docs"}"#).unwrap();

		assert_eq!(data, HeadData::new().title("Docs"));
		assert!(!data.is_empty());
		assert!(HeadData::new().is_empty());
	}
}

//! Process-wide defaults for head injection.

use serde::{Deserialize, Serialize};

/// Default SEO values used when injecting the template head.
///
/// For each of title, keywords and description the injected value is
/// `(per-request override or default) + base`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadDefaults {
	/// Title used when the request supplies none.
	pub title: String,
	/// Keywords used when the request supplies none.
	pub keywords: String,
	/// Description used when the request supplies none.
	pub description: String,
	/// Suffix always appended to the title.
	pub base_title: String,
	/// Suffix always appended to the keywords.
	pub base_keywords: String,
	/// Suffix always appended to the description.
	pub base_description: String,
}

impl HeadDefaults {
	/// Creates empty defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the default title.
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	/// Sets the default keywords.
	pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
		self.keywords = keywords.into();
		self
	}

	/// Sets the default description.
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Sets the title suffix.
	pub fn base_title(mut self, base_title: impl Into<String>) -> Self {
		self.base_title = base_title.into();
		self
	}

	/// Sets the keywords suffix.
	pub fn base_keywords(mut self, base_keywords: impl Into<String>) -> Self {
		self.base_keywords = base_keywords.into();
		self
	}

	/// Sets the description suffix.
	pub fn base_description(mut self, base_description: impl Into<String>) -> Self {
		self.base_description = base_description.into();
		self
	}
}

//! Splitting a template at the application marker.

use crate::error::{TemplateError, TemplateResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// A template cut at its application marker.
///
/// Invariant: `head + marker + tail` equals the source template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSplit {
	head: String,
	tail: String,
	marker: String,
}

impl TemplateSplit {
	/// Text before the marker.
	pub fn head(&self) -> &str {
		&self.head
	}

	/// Text after the marker.
	pub fn tail(&self) -> &str {
		&self.tail
	}

	/// The marker the template was split at.
	pub fn marker(&self) -> &str {
		&self.marker
	}
}

/// Splits `template` at the first occurrence of `marker`.
///
/// # Errors
///
/// [`TemplateError::MarkerNotFound`] when the marker does not occur and
/// [`TemplateError::EmptyMarker`] when it is empty.
pub fn split(template: &str, marker: &str) -> TemplateResult<TemplateSplit> {
	if marker.is_empty() {
		return Err(TemplateError::EmptyMarker);
	}

	let (head, tail) = template
		.split_once(marker)
		.ok_or_else(|| TemplateError::MarkerNotFound {
			marker: marker.to_string(),
		})?;

	Ok(TemplateSplit {
		head: head.to_string(),
		tail: tail.to_string(),
		marker: marker.to_string(),
	})
}

#[derive(Debug)]
struct LastSplit {
	template: String,
	split: Arc<TemplateSplit>,
}

/// Memoizes the split of the most recently seen template.
///
/// A template is re-split only when its text (or the marker) differs by
/// value from the previous call.
#[derive(Debug, Default)]
pub struct TemplateSplitter {
	last: Mutex<Option<LastSplit>>,
}

impl TemplateSplitter {
	/// Creates an empty splitter.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the split of `template`, reusing the previous one when equal.
	pub fn split(&self, template: &str, marker: &str) -> TemplateResult<Arc<TemplateSplit>> {
		let mut last = self.last.lock();

		if let Some(cached) = last.as_ref()
			&& cached.template == template
			&& cached.split.marker() == marker
		{
			return Ok(Arc::clone(&cached.split));
		}

		let parts = Arc::new(split(template, marker)?);
		tracing::debug!(
			marker,
			head_len = parts.head().len(),
			tail_len = parts.tail().len(),
			"split template"
		);
		*last = Some(LastSplit {
			template: template.to_string(),
			split: Arc::clone(&parts),
		});
		Ok(parts)
	}

	/// Drops the memoized split.
	pub fn clear(&self) {
		*self.last.lock() = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const MARKER: &str = "{{ APP }}";

	#[rstest]
	fn test_split_basic() {
		let parts = split("<html><body>{{ APP }}</body></html>", MARKER).unwrap();

		assert_eq!(parts.head(), "<html><body>");
		assert_eq!(parts.tail(), "</body></html>");
		assert_eq!(parts.marker(), MARKER);
	}

	#[rstest]
	fn test_split_uses_first_occurrence() {
		let parts = split("a{{ APP }}b{{ APP }}c", MARKER).unwrap();

		assert_eq!(parts.head(), "a");
		assert_eq!(parts.tail(), "b{{ APP }}c");
	}

	#[rstest]
	#[case("{{ APP }}", "", "")]
	#[case("{{ APP }}tail", "", "tail")]
	#[case("head{{ APP }}", "head", "")]
	fn test_split_marker_at_edges(#[case] template: &str, #[case] head: &str, #[case] tail: &str) {
		let parts = split(template, MARKER).unwrap();

		assert_eq!(parts.head(), head);
		assert_eq!(parts.tail(), tail);
	}

	#[rstest]
	fn test_split_missing_marker() {
		let err = split("<html></html>", MARKER).unwrap_err();

		assert_eq!(
			err,
			TemplateError::MarkerNotFound {
				marker: MARKER.to_string()
			}
		);
	}

	#[rstest]
	fn test_split_empty_marker() {
		assert_eq!(split("abc", "").unwrap_err(), TemplateError::EmptyMarker);
	}

	#[rstest]
	fn test_split_multibyte() {
		let parts = split("日本語{{ APP }}テキスト", MARKER).unwrap();

		assert_eq!(parts.head(), "日本語");
		assert_eq!(parts.tail(), "テキスト");
	}

	#[rstest]
	fn test_splitter_reuses_split_for_equal_template() {
		// Arrange
		let splitter = TemplateSplitter::new();
		let template = String::from("<p>{{ APP }}</p>");
		let same_text = template.clone();

		// Act
		let first = splitter.split(&template, MARKER).unwrap();
		let second = splitter.split(&same_text, MARKER).unwrap();

		// Assert
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[rstest]
	fn test_splitter_resplits_changed_template() {
		let splitter = TemplateSplitter::new();

		let first = splitter.split("<p>{{ APP }}</p>", MARKER).unwrap();
		let second = splitter.split("<div>{{ APP }}</div>", MARKER).unwrap();

		assert!(!Arc::ptr_eq(&first, &second));
		assert_eq!(second.head(), "<div>");
	}

	#[rstest]
	fn test_splitter_resplits_changed_marker() {
		let splitter = TemplateSplitter::new();

		let first = splitter.split("a<!--x-->b{{ APP }}c", MARKER).unwrap();
		let second = splitter.split("a<!--x-->b{{ APP }}c", "<!--x-->").unwrap();

		assert_eq!(first.head(), "a<!--x-->b");
		assert_eq!(second.head(), "a");
	}

	#[rstest]
	fn test_splitter_error_keeps_previous() {
		let splitter = TemplateSplitter::new();
		let first = splitter.split("<p>{{ APP }}</p>", MARKER).unwrap();

		assert!(splitter.split("<p></p>", MARKER).is_err());
		let again = splitter.split("<p>{{ APP }}</p>", MARKER).unwrap();

		assert!(Arc::ptr_eq(&first, &again));
	}

	#[rstest]
	fn test_splitter_clear() {
		let splitter = TemplateSplitter::new();
		let first = splitter.split("<p>{{ APP }}</p>", MARKER).unwrap();

		splitter.clear();
		let second = splitter.split("<p>{{ APP }}</p>", MARKER).unwrap();

		assert!(!Arc::ptr_eq(&first, &second));
		assert_eq!(first, second);
	}
}

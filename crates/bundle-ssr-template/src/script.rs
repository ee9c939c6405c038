//! Inline scripts embedded in the rendered response.

use serde::Serialize;

/// Global variable holding the serialized initial state on the client.
pub const INITIAL_STATE_VAR: &str = "__INITIAL_STATE__";

/// Escapes serialized JSON for embedding inside an inline `<script>` tag.
///
/// `<`, `>` and `/` are written as unicode escapes so the payload can
/// neither close the script element nor open a comment, and U+2028/U+2029
/// are escaped because they terminate lines in older JavaScript parsers.
/// The result is still valid JSON with the same value.
pub fn escape_json_for_script(json: &str) -> String {
	let mut escaped = String::with_capacity(json.len());
	for c in json.chars() {
		match c {
			'<' => escaped.push_str("\\u003C"),
			'>' => escaped.push_str("\\u003E"),
			'/' => escaped.push_str("\\u002F"),
			'\u{2028}' => escaped.push_str("\\u2028"),
			'\u{2029}' => escaped.push_str("\\u2029"),
			other => escaped.push(other),
		}
	}
	escaped
}

/// Renders the script tag that hands `state` to the client for hydration.
///
/// ```
/// use bundle_ssr_template::state_script;
///
/// let script = state_script(&serde_json::json!({"a": 1})).unwrap();
/// assert_eq!(script, r#"<script>window.__INITIAL_STATE__={"a":1}</script>"#);
/// ```
pub fn state_script(state: &impl Serialize) -> Result<String, serde_json::Error> {
	let json = serde_json::to_string(state)?;
	Ok(format!(
		"<script>window.{}={}</script>",
		INITIAL_STATE_VAR,
		escape_json_for_script(&json)
	))
}

/// Renders the script that sends the client to `path` after a failed render.
pub fn redirect_script(path: &str) -> String {
	// A string always serializes.
	let location = serde_json::to_string(path).unwrap_or_else(|_| "\"/\"".to_string());
	format!(
		"<script>window.location.replace({})</script>",
		escape_json_for_script(&location)
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("</script>", "\\u003C\\u002Fscript\\u003E")]
	#[case("<!--", "\\u003C!--")]
	#[case("a\u{2028}b\u{2029}c", "a\\u2028b\\u2029c")]
	#[case(r#"{"name":"test"}"#, r#"{"name":"test"}"#)]
	fn test_escape_json_for_script(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(escape_json_for_script(input), expected);
	}

	#[rstest]
	fn test_escaped_json_keeps_value() {
		// Arrange
		let value = json!({"html": "</script><script>alert(1)</script>", "sep": "\u{2028}"});
		let raw = serde_json::to_string(&value).unwrap();

		// Act
		let escaped = escape_json_for_script(&raw);

		// Assert
		let parsed: serde_json::Value = serde_json::from_str(&escaped).unwrap();
		assert_eq!(parsed, value);
		assert!(!escaped.contains("</"));
	}

	#[rstest]
	fn test_state_script_escapes_payload() {
		let script = state_script(&json!({"user": "</script><img onerror=x>"})).unwrap();

		assert!(script.starts_with("<script>window.__INITIAL_STATE__="));
		assert!(script.ends_with("</script>"));
		assert_eq!(script.matches("</script>").count(), 1);
	}

	#[rstest]
	fn test_redirect_script() {
		assert_eq!(
			redirect_script("/error"),
			"<script>window.location.replace(\"\\u002Ferror\")</script>"
		);
	}

	#[rstest]
	fn test_redirect_script_cannot_break_out() {
		let script = redirect_script("\");alert(1)//</script>");

		assert_eq!(script.matches("</script>").count(), 1);
		assert!(script.contains("\\\");alert(1)"));
	}
}

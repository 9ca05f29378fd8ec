use thiserror::Error;
use wasm_bindgen::JsValue;

/// Why a navigation was abandoned.
///
/// These never escape [`Navigator::navigate`](`crate::navigator::Navigator::navigate`), which logs them instead,
/// but they are returned by the individual building blocks.
#[derive(Debug, Error)]
pub enum NavigationError {
	/// The server answered with a non-success status.
	#[error("Failed to load: {status_text} (HTTP {status})")]
	Fetch { status: u16, status_text: String },

	/// `fetch` itself rejected, e.g. due to a network or CORS failure.
	#[error("Request failed: {0:?}")]
	Transport(JsValue),

	/// Passed through from [***DOMParser***](https://developer.mozilla.org/en-US/docs/Web/API/DOMParser) or from reading the response body.
	#[error("Failed to parse response: {0:?}")]
	Parse(JsValue),

	#[error("No element matches {selector:?}")]
	MissingElement { selector: String },

	/// A DOM call threw.
	#[error("DOM operation failed: {0:?}")]
	Dom(JsValue),

	#[error("No browser window available")]
	NoWindow,
}

/// Rejections of a JavaScript configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("Missing required option `{0}`")]
	Missing(&'static str),

	#[error("Option `{name}` must be {expected}")]
	Invalid { name: &'static str, expected: &'static str },

	#[error("Configuration must be an object")]
	NotAnObject,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fetch_message_contains_status_text() {
		let error = NavigationError::Fetch {
			status: 404,
			status_text: "Not Found".to_owned(),
		};
		let message = error.to_string();
		assert!(message.contains("Not Found"), "{}", message);
		assert!(message.contains("404"), "{}", message);
	}

	#[test]
	fn config_messages_name_the_option() {
		assert_eq!(ConfigError::Missing("linkClass").to_string(), "Missing required option `linkClass`");
		assert_eq!(
			ConfigError::Invalid {
				name: "dontReload",
				expected: "an array of strings"
			}
			.to_string(),
			"Option `dontReload` must be an array of strings"
		);
	}
}

//! Navigation options.

use crate::error::ConfigError;
use core::time::Duration;
use js_sys::{Array, Reflect};
use wasm_bindgen::JsValue;

/// The fade duration used unless configured otherwise.
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(500);

/// Everything a [`Navigator`](`crate::navigator::Navigator`) is set up with.
///
/// The navigator takes ownership, so this can't change once navigation is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfiguration {
	/// Selects the swapped region, in the live document as well as in fetched ones.
	pub content_selector: String,
	pub loading_indicator_selector: String,
	/// Clicks inside an element with this class are soft navigations.
	pub trigger_class: String,
	/// Scripts that are never removed and are restored if missing.
	pub retained_script_urls: Vec<String>,
	pub retained_stylesheet_urls: Vec<String>,
	pub retained_preload_urls: Vec<String>,
	pub fade_duration: Duration,
	/// Whether a failed navigation falls back to a full page load of its URL.
	pub fallback_to_full_load: bool,
	/// Whether starting navigation attaches `{ url }` state to the current history entry,
	/// so that returning to it is replayed too.
	pub seed_history_state: bool,
}
impl NavigationConfiguration {
	#[must_use]
	pub fn new(content_selector: impl Into<String>, loading_indicator_selector: impl Into<String>, trigger_class: impl Into<String>) -> Self {
		Self {
			content_selector: content_selector.into(),
			loading_indicator_selector: loading_indicator_selector.into(),
			trigger_class: trigger_class.into(),
			retained_script_urls: Vec::new(),
			retained_stylesheet_urls: Vec::new(),
			retained_preload_urls: Vec::new(),
			fade_duration: DEFAULT_FADE_DURATION,
			fallback_to_full_load: false,
			seed_history_state: true,
		}
	}

	#[must_use]
	pub fn retain_scripts<I: IntoIterator<Item = S>, S: Into<String>>(mut self, urls: I) -> Self {
		self.retained_script_urls.extend(urls.into_iter().map(Into::into));
		self
	}

	#[must_use]
	pub fn retain_stylesheets<I: IntoIterator<Item = S>, S: Into<String>>(mut self, urls: I) -> Self {
		self.retained_stylesheet_urls.extend(urls.into_iter().map(Into::into));
		self
	}

	#[must_use]
	pub fn retain_preloads<I: IntoIterator<Item = S>, S: Into<String>>(mut self, urls: I) -> Self {
		self.retained_preload_urls.extend(urls.into_iter().map(Into::into));
		self
	}

	#[must_use]
	pub fn with_fade_duration(mut self, fade_duration: Duration) -> Self {
		self.fade_duration = fade_duration;
		self
	}

	#[must_use]
	pub fn with_fallback_to_full_load(mut self, fallback_to_full_load: bool) -> Self {
		self.fallback_to_full_load = fallback_to_full_load;
		self
	}

	#[must_use]
	pub fn with_seed_history_state(mut self, seed_history_state: bool) -> Self {
		self.seed_history_state = seed_history_state;
		self
	}

	/// Reads a JavaScript options object of the form
	///
	/// ```js
	/// {
	/// 	fadeElement: "#content",
	/// 	loadingElement: "#loading",
	/// 	linkClass: "dynamic-link",
	/// 	dontReload: ["/js/vendor.js"],   // optional
	/// 	dontReloadCSS: [],                // optional
	/// 	dontReloadPreload: [],            // optional
	/// 	fadeDuration: 500,                // optional, milliseconds
	/// 	fallbackToFullLoad: false,        // optional
	/// 	seedHistoryState: true,           // optional
	/// }
	/// ```
	///
	/// # Errors
	///
	/// Iff a required option is missing or any option has the wrong type.
	pub fn from_js(options: &JsValue) -> Result<Self, ConfigError> {
		if !options.is_object() {
			return Err(ConfigError::NotAnObject);
		}

		let mut config = Self::new(
			required_string(options, "fadeElement")?,
			required_string(options, "loadingElement")?,
			required_string(options, "linkClass")?,
		);
		config.retained_script_urls = string_list(options, "dontReload")?;
		config.retained_stylesheet_urls = string_list(options, "dontReloadCSS")?;
		config.retained_preload_urls = string_list(options, "dontReloadPreload")?;

		if let Some(millis) = optional(options, "fadeDuration") {
			let fade_duration = millis
				.as_f64()
				.filter(|millis| millis.is_finite() && *millis >= 0.)
				.and_then(|millis| Duration::try_from_secs_f64(millis / 1000.).ok());
			match fade_duration {
				Some(fade_duration) => config.fade_duration = fade_duration,
				None => {
					return Err(ConfigError::Invalid {
						name: "fadeDuration",
						expected: "a non-negative number of milliseconds",
					})
				}
			}
		}
		if let Some(value) = optional(options, "fallbackToFullLoad") {
			config.fallback_to_full_load = boolean(&value, "fallbackToFullLoad")?;
		}
		if let Some(value) = optional(options, "seedHistoryState") {
			config.seed_history_state = boolean(&value, "seedHistoryState")?;
		}

		Ok(config)
	}
}

/// [`None`] for `undefined` and `null`.
fn optional(options: &JsValue, name: &'static str) -> Option<JsValue> {
	Reflect::get(options, &JsValue::from_str(name)).ok().filter(|value| !value.is_undefined() && !value.is_null())
}

fn required_string(options: &JsValue, name: &'static str) -> Result<String, ConfigError> {
	optional(options, name)
		.ok_or(ConfigError::Missing(name))?
		.as_string()
		.ok_or(ConfigError::Invalid { name, expected: "a string" })
}

fn string_list(options: &JsValue, name: &'static str) -> Result<Vec<String>, ConfigError> {
	let invalid = ConfigError::Invalid {
		name,
		expected: "an array of strings",
	};
	let value = match optional(options, name) {
		Some(value) => value,
		None => return Ok(Vec::new()),
	};
	if !Array::is_array(&value) {
		return Err(invalid);
	}
	Array::from(&value).iter().map(|item| item.as_string().ok_or_else(|| invalid.clone())).collect()
}

fn boolean(value: &JsValue, name: &'static str) -> Result<bool, ConfigError> {
	value.as_bool().ok_or(ConfigError::Invalid { name, expected: "a boolean" })
}

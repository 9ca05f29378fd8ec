//! `{ url }` history state.

use crate::error::NavigationError;
use js_sys::{Object, Reflect};
use tracing::trace;
use wasm_bindgen::JsValue;
use web_sys::Window;

const URL_KEY: &str = "url";

/// Creates the state object attached to pushed history entries.
pub fn state_for(url: &str) -> Result<JsValue, NavigationError> {
	let state = Object::new();
	Reflect::set(&state, &JsValue::from_str(URL_KEY), &JsValue::from_str(url)).map_err(NavigationError::Dom)?;
	Ok(state.into())
}

/// The `url` carried by a history state, if `state` is an object with a string `url`.
#[must_use]
pub fn url_of(state: &JsValue) -> Option<String> {
	if !state.is_object() {
		return None;
	}
	Reflect::get(state, &JsValue::from_str(URL_KEY)).ok()?.as_string()
}

/// Adds exactly one history entry for `url`.
pub fn push(window: &Window, url: &str) -> Result<(), NavigationError> {
	let history = window.history().map_err(NavigationError::Dom)?;
	history.push_state_with_url(&state_for(url)?, "", Some(url)).map_err(NavigationError::Dom)
}

/// Attaches `{ url: location.href }` to the current entry unless it already carries a URL.
///
/// Does not add an entry.
pub fn seed(window: &Window) -> Result<(), NavigationError> {
	let history = window.history().map_err(NavigationError::Dom)?;
	if url_of(&history.state().map_err(NavigationError::Dom)?).is_some() {
		return Ok(());
	}
	let href = window.location().href().map_err(NavigationError::Dom)?;
	trace!("Seeding the current history entry.");
	history.replace_state(&state_for(&href)?, "").map_err(NavigationError::Dom)
}

//! Resource identity.
//!
//! Scripts, stylesheets and preloads are matched by URL, so two spellings of the same address
//! (relative vs. absolute, reordered query, trailing slash, fragment) have to compare equal.

use tracing::warn;
use web_sys::Url;

use crate::redact::loggable_url;

/// Resolves `raw` against `base` and normalizes the result:
///
/// - the fragment is dropped,
/// - query parameters are sorted by name (stable for repeated names),
/// - a trailing `/` is removed from any path other than the root.
///
/// Inputs that can't be parsed as URLs are compared by their trimmed text instead.
#[must_use]
pub fn normalize_url(raw: &str, base: &str) -> String {
	let raw = raw.trim();
	let url = match Url::new_with_base(raw, base) {
		Ok(url) => url,
		Err(error) => {
			warn!("Could not parse resource URL {:?}; Comparing it verbatim: {:?}", loggable_url(raw), error);
			return raw.to_owned();
		}
	};

	url.set_hash("");
	if let Err(error) = url.search_params().sort() {
		warn!("Could not sort the query of {:?}; Comparing it unsorted: {:?}", loggable_url(raw), error);
	}
	let path = url.pathname();
	let trimmed = trim_trailing_slash(&path);
	if trimmed.len() != path.len() {
		url.set_pathname(trimmed);
	}
	url.href()
}

/// Resolves `raw` against `base` without normalizing it, so it can be copied into another document.
#[must_use]
pub fn absolute_url(raw: &str, base: &str) -> String {
	match Url::new_with_base(raw.trim(), base) {
		Ok(url) => url.href(),
		Err(_) => raw.to_owned(),
	}
}

/// Whether `href`, resolved against `base`, points to the same origin as `base`.
#[must_use]
pub fn is_same_origin(href: &str, base: &str) -> bool {
	match (Url::new_with_base(href, base), Url::new(base)) {
		(Ok(target), Ok(base)) => target.origin() == base.origin(),
		_ => false,
	}
}

fn trim_trailing_slash(path: &str) -> &str {
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		&path[..path.len().min(1)]
	} else {
		trimmed
	}
}

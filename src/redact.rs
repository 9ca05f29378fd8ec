//! URL shortening for log output.

/// Returns `url` as it may appear in log messages.
///
/// Unless the `dangerous-logging` feature is enabled, everything from the first `?` or `#` on is cut off,
/// since query strings and fragments frequently carry tokens, search terms or other personal data.
#[must_use]
pub fn loggable_url(url: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		return url;
	}
	match url.find(|c| c == '?' || c == '#') {
		Some(end) => &url[..end],
		None => url,
	}
}

//! Retrieving and parsing the navigation target.

use crate::{error::NavigationError, identity::absolute_url, redact::loggable_url};
use tracing::{debug, instrument};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, DomParser, Headers, Request, RequestInit, Response, SupportedType, Window};

/// Sent with every request so that servers can tell soft navigations from full page loads.
pub const REQUESTED_WITH_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// A parsed page, together with the URL its relative references resolve against.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
	document: Document,
	url: String,
}
impl FetchedDocument {
	/// Parses `html` as a full HTML document loaded from `url`.
	///
	/// `url` should be absolute.
	pub fn parse(html: &str, url: &str) -> Result<Self, NavigationError> {
		let parser = DomParser::new().map_err(NavigationError::Parse)?;
		let document = parser.parse_from_string(html, SupportedType::TextHtml).map_err(NavigationError::Parse)?;
		Ok(Self {
			document,
			url: url.to_owned(),
		})
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	#[must_use]
	pub fn url(&self) -> &str {
		&self.url
	}
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
	window: Window,
}
impl PageFetcher {
	#[must_use]
	pub fn new(window: Window) -> Self {
		Self { window }
	}

	/// `GET`s `url` (relative to the current page) and parses the response body as HTML.
	///
	/// # Errors
	///
	/// - [`NavigationError::Transport`] if the request couldn't be made at all,
	/// - [`NavigationError::Fetch`] for any non-2xx status,
	/// - [`NavigationError::Parse`] if the body can't be read or parsed.
	#[instrument(skip(self, url), fields(url = loggable_url(url)))]
	pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, NavigationError> {
		let headers = Headers::new().map_err(NavigationError::Dom)?;
		headers.set(REQUESTED_WITH_HEADER.0, REQUESTED_WITH_HEADER.1).map_err(NavigationError::Dom)?;
		let init = RequestInit::new();
		init.set_method("GET");
		init.set_headers(&headers);
		let request = Request::new_with_str_and_init(url, &init).map_err(NavigationError::Transport)?;

		let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
			.await
			.map_err(NavigationError::Transport)?
			.dyn_into()
			.map_err(NavigationError::Transport)?;
		if !response.ok() {
			return Err(NavigationError::Fetch {
				status: response.status(),
				status_text: response.status_text(),
			});
		}

		let text = JsFuture::from(response.text().map_err(NavigationError::Parse)?)
			.await
			.map_err(NavigationError::Parse)?
			.as_string()
			.unwrap_or_default();
		debug!("Received {} byte(s) with status {}.", text.len(), response.status());

		// Redirects change the base relative references in the body resolve against.
		let base = match response.url() {
			response_url if !response_url.is_empty() => response_url,
			_ => absolute_url(url, &self.window.location().href().map_err(NavigationError::Dom)?),
		};
		FetchedDocument::parse(&text, &base)
	}
}

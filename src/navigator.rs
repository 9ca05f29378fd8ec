//! Orchestration of a single soft navigation.

use crate::{
	config::NavigationConfiguration,
	error::NavigationError,
	fetch::{FetchedDocument, PageFetcher},
	history,
	identity::{absolute_url, normalize_url},
	listeners::Listeners,
	reconcile::{collect_scripts, document_base, elements, reconcile_head_links, reconcile_scripts, rescue_retained_scripts, ResourceKind},
	redact::loggable_url,
	sync::synchronize,
	transition::{LoadingIndicator, TransitionController, TransitionState},
};
use core::{
	cell::Cell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Window};

/// One requested navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
	pub url: String,
	/// Set for back/forward navigations, whose history entry already exists.
	pub is_history_replay: bool,
}
impl NavigationRequest {
	#[must_use]
	pub fn new(url: impl Into<String>, is_history_replay: bool) -> Self {
		Self {
			url: url.into(),
			is_history_replay,
		}
	}
}

/// Soft navigation for one page.
///
/// Cheap to clone; clones drive the same content region.
///
/// # Overlapping navigations
///
/// Each navigation takes a new generation number when it starts.
/// Whenever a navigation resumes after waiting (on the network or on the fade-out),
/// it gives up silently if a newer navigation has started in the meantime.
/// Since nothing is awaited between the end of the fade-out and the history push,
/// the DOM and history are only ever changed by the newest navigation.
#[derive(Debug, Clone)]
pub struct Navigator {
	inner: Rc<Inner>,
}

#[derive(Debug)]
struct Inner {
	config: NavigationConfiguration,
	retained: Retained,
	window: Window,
	document: Document,
	content: HtmlElement,
	loading: LoadingIndicator,
	transition: TransitionController,
	fetcher: PageFetcher,
	full_load: FullLoad,
	generation: Cell<u64>,
}

/// Leaves the page for a failed navigation's URL.
struct FullLoad(Box<dyn Fn(&str) -> Result<(), JsValue>>);
impl Debug for FullLoad {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("FullLoad")
	}
}

/// Normalized retention lists.
#[derive(Debug)]
struct Retained {
	scripts: Vec<String>,
	stylesheets: Vec<String>,
	preloads: Vec<String>,
}

enum Outcome {
	Completed,
	Superseded,
}

impl Navigator {
	/// Resolves the configured elements in the current document.
	///
	/// This does not intercept anything yet; see [`start`](`Navigator::start`).
	///
	/// # Errors
	///
	/// Iff there is no window or either selector matches no HTML element.
	pub fn new(config: NavigationConfiguration) -> Result<Self, NavigationError> {
		let location = web_sys::window().ok_or(NavigationError::NoWindow)?.location();
		Self::with_full_load(config, move |url| location.set_href(url))
	}

	/// Like [`new`](`Navigator::new`), but failed navigations fall back to `full_load` instead of assigning `location.href`.
	///
	/// `full_load` is only called if [`NavigationConfiguration::fallback_to_full_load`] is set.
	///
	/// # Errors
	///
	/// Iff there is no window or either selector matches no HTML element.
	pub fn with_full_load(
		config: NavigationConfiguration,
		full_load: impl Fn(&str) -> Result<(), JsValue> + 'static,
	) -> Result<Self, NavigationError> {
		let window = web_sys::window().ok_or(NavigationError::NoWindow)?;
		let document = window.document().ok_or(NavigationError::NoWindow)?;
		let content = find_html_element(&document, &config.content_selector)?;
		let loading = LoadingIndicator::new(find_html_element(&document, &config.loading_indicator_selector)?);

		let base = document_base(&document)?;
		let normalize_all = |urls: &[String]| urls.iter().map(|url| normalize_url(url, &base)).collect();
		let retained = Retained {
			scripts: normalize_all(&config.retained_script_urls),
			stylesheets: normalize_all(&config.retained_stylesheet_urls),
			preloads: normalize_all(&config.retained_preload_urls),
		};

		Ok(Self {
			inner: Rc::new(Inner {
				transition: TransitionController::new(window.clone(), content.clone(), config.fade_duration),
				fetcher: PageFetcher::new(window.clone()),
				full_load: FullLoad(Box::new(full_load)),
				config,
				retained,
				window,
				document,
				content,
				loading,
				generation: Cell::new(0),
			}),
		})
	}

	/// Creates a [`Navigator`] and [`start`](`Navigator::start`)s it.
	pub fn configure(config: NavigationConfiguration) -> Result<Listeners, NavigationError> {
		Self::new(config)?.start()
	}

	/// Starts intercepting link clicks and history traversal until the returned [`Listeners`] are dropped.
	pub fn start(&self) -> Result<Listeners, NavigationError> {
		Listeners::register(self.clone())
	}

	#[must_use]
	pub fn config(&self) -> &NavigationConfiguration {
		&self.inner.config
	}

	#[must_use]
	pub fn transition(&self) -> &TransitionController {
		&self.inner.transition
	}

	#[must_use]
	pub fn loading_indicator(&self) -> &LoadingIndicator {
		&self.inner.loading
	}

	pub(crate) fn window(&self) -> &Window {
		&self.inner.window
	}

	pub(crate) fn document(&self) -> &Document {
		&self.inner.document
	}

	/// Fetches `url` and swaps it in.
	///
	/// `url` is resolved against the current location first, so the history entry stays valid from anywhere.
	/// Failures are logged, not returned. On failure the content region is left as it was and no history entry is added.
	pub async fn navigate(&self, url: &str, is_history_replay: bool) {
		let request = NavigationRequest::new(self.resolve(url), is_history_replay);
		let in_flight = self.begin();
		let page = self.inner.fetcher.fetch(&request.url).await;
		self.finish(in_flight, &request, page).await;
	}

	/// Like [`navigate`](`Navigator::navigate`), but with an already available fetch result.
	pub async fn present(&self, request: &NavigationRequest, page: Result<FetchedDocument, NavigationError>) {
		let request = NavigationRequest::new(self.resolve(&request.url), request.is_history_replay);
		let in_flight = self.begin();
		self.finish(in_flight, &request, page).await;
	}

	fn resolve(&self, url: &str) -> String {
		match self.inner.window.location().href() {
			Ok(page_url) => absolute_url(url, &page_url),
			Err(error) => {
				warn!("Could not read the current location, using {:?} as is: {:?}", loggable_url(url), error);
				url.to_owned()
			}
		}
	}

	fn begin(&self) -> InFlight<'_> {
		let generation = self.inner.generation.get().wrapping_add(1);
		self.inner.generation.set(generation);
		if let Err(error) = self.inner.loading.show() {
			error!("Failed to show the loading indicator: {}", error);
		}
		InFlight {
			inner: &self.inner,
			generation,
		}
	}

	#[instrument(skip(self, in_flight, request, page), fields(url = loggable_url(&request.url), replay = request.is_history_replay))]
	async fn finish(&self, in_flight: InFlight<'_>, request: &NavigationRequest, page: Result<FetchedDocument, NavigationError>) {
		match self.swap(&in_flight, request, page).await {
			Ok(Outcome::Completed) => info!("Navigated."),
			Ok(Outcome::Superseded) => debug!("Superseded by a newer navigation."),
			Err(error) => {
				error!("Navigation failed: {}", error);
				if self.inner.config.fallback_to_full_load && in_flight.is_current() {
					warn!("Falling back to a full page load.");
					if let Err(error) = (self.inner.full_load.0)(&request.url) {
						error!("Full page load failed too: {:?}", error);
					}
				}
			}
		}
	}

	async fn swap(&self, in_flight: &InFlight<'_>, request: &NavigationRequest, page: Result<FetchedDocument, NavigationError>) -> Result<Outcome, NavigationError> {
		if !in_flight.is_current() {
			return Ok(Outcome::Superseded);
		}
		let page = page?;

		let inner = &*self.inner;
		let incoming = page.document();
		let selector = &inner.config.content_selector;
		let incoming_region = incoming
			.query_selector(selector)
			.map_err(NavigationError::Dom)?
			.ok_or_else(|| NavigationError::MissingElement { selector: selector.clone() })?;
		let incoming_scripts = collect_scripts(incoming, page.url())?;

		inner.transition.fade_out().await?;
		if !in_flight.is_current() {
			return Ok(Outcome::Superseded);
		}
		// No more suspension points past here.

		reconcile_head_links(&inner.document, incoming, page.url(), ResourceKind::Stylesheet, &inner.retained.stylesheets)?;
		reconcile_head_links(&inner.document, incoming, page.url(), ResourceKind::Preload, &inner.retained.preloads)?;

		rescue_retained_scripts(&inner.document, &inner.content, &inner.retained.scripts)?;
		// These run once, through script reconciliation.
		for script in elements(&incoming_region.query_selector_all("script").map_err(NavigationError::Dom)?) {
			script.remove();
		}
		inner.content.set_inner_html(&incoming_region.inner_html());

		reconcile_scripts(&inner.document, &incoming_scripts, &inner.retained.scripts)?;
		inner.transition.fade_in()?;
		synchronize(&inner.document, incoming)?;

		if !request.is_history_replay {
			history::push(&inner.window, &request.url)?;
		}
		Ok(Outcome::Completed)
	}
}

fn find_html_element(document: &Document, selector: &str) -> Result<HtmlElement, NavigationError> {
	document
		.query_selector(selector)
		.map_err(NavigationError::Dom)?
		.and_then(|element| element.dyn_into::<HtmlElement>().ok())
		.ok_or_else(|| NavigationError::MissingElement { selector: selector.to_owned() })
}

/// Held for the duration of one navigation.
///
/// When the newest navigation ends, however it ends, this hides the loading indicator and makes sure the content region isn't left faded out.
#[must_use]
struct InFlight<'a> {
	inner: &'a Inner,
	generation: u64,
}
impl InFlight<'_> {
	fn is_current(&self) -> bool {
		self.inner.generation.get() == self.generation
	}
}
impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		if !self.is_current() {
			return;
		}
		if let Err(error) = self.inner.loading.hide() {
			error!("Failed to hide the loading indicator: {}", error);
		}
		match self.inner.transition.state() {
			TransitionState::FadingOut | TransitionState::Hidden => {
				if let Err(error) = self.inner.transition.fade_in() {
					error!("Failed to restore the content region: {}", error);
				}
			}
			TransitionState::Visible | TransitionState::FadingIn => (),
		}
	}
}

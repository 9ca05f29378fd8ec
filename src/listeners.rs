//! The click and `popstate` listeners that feed a [`Navigator`].

use crate::{error::NavigationError, history, identity::is_same_origin, navigator::Navigator, redact::loggable_url};
use tracing::{error, instrument, trace};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, MouseEvent, Node, PopStateEvent, Window};

/// Active navigation interception.
///
/// Both listeners are removed when this is dropped or [`stop`](`Listeners::stop`)ped.
/// Navigations already in flight still complete.
#[must_use = "Dropping `Listeners` stops intercepting navigation right away."]
#[derive(Debug)]
pub struct Listeners {
	navigator: Navigator,
	document: Document,
	window: Window,
	on_click: Closure<dyn FnMut(Event)>,
	on_popstate: Closure<dyn FnMut(Event)>,
}
impl Listeners {
	#[instrument(skip(navigator))]
	pub(crate) fn register(navigator: Navigator) -> Result<Self, NavigationError> {
		let document = navigator.document().clone();
		let window = navigator.window().clone();

		if navigator.config().seed_history_state {
			history::seed(&window)?;
		}

		let on_click = {
			let navigator = navigator.clone();
			Closure::wrap(Box::new(move |event: Event| {
				let page_url = match navigator.window().location().href() {
					Ok(page_url) => page_url,
					Err(error) => {
						error!("Could not read the current location: {:?}", error);
						return;
					}
				};
				if let Some(href) = intercepted_href(&event, &navigator.config().trigger_class, &page_url) {
					event.prevent_default();
					trace!("Intercepted click on link to {:?}.", loggable_url(&href));
					let navigator = navigator.clone();
					spawn_local(async move { navigator.navigate(&href, false).await });
				}
			}) as Box<dyn FnMut(Event)>)
		};

		let on_popstate = {
			let navigator = navigator.clone();
			Closure::wrap(Box::new(move |event: Event| {
				let url = match event.dyn_ref::<PopStateEvent>().and_then(|event| history::url_of(&event.state())) {
					Some(url) => url,
					None => {
						trace!("Ignoring history traversal without URL state.");
						return;
					}
				};
				let navigator = navigator.clone();
				spawn_local(async move { navigator.navigate(&url, true).await });
			}) as Box<dyn FnMut(Event)>)
		};

		let listeners = Self {
			navigator,
			document,
			window,
			on_click,
			on_popstate,
		};
		// If the second registration fails, dropping `listeners` unregisters the first.
		listeners
			.document
			.add_event_listener_with_callback("click", listeners.on_click.as_ref().unchecked_ref())
			.map_err(NavigationError::Dom)?;
		listeners
			.window
			.add_event_listener_with_callback("popstate", listeners.on_popstate.as_ref().unchecked_ref())
			.map_err(NavigationError::Dom)?;
		Ok(listeners)
	}

	#[must_use]
	pub fn navigator(&self) -> &Navigator {
		&self.navigator
	}

	/// Stops intercepting navigation.
	pub fn stop(self) {
		drop(self);
	}
}
impl Drop for Listeners {
	fn drop(&mut self) {
		if let Err(error) = self
			.document
			.remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref())
		{
			error!("Failed to remove click listener: {:?}", error);
		}
		if let Err(error) = self
			.window
			.remove_event_listener_with_callback("popstate", self.on_popstate.as_ref().unchecked_ref())
		{
			error!("Failed to remove popstate listener: {:?}", error);
		}
		trace!("Stopped intercepting navigation.");
	}
}

/// The `href` to soft-navigate to for `event`, if it should be intercepted at all.
///
/// That's the case for unmodified primary-button clicks inside an element with `trigger_class`
/// that links to the same origin as `page_url` and wouldn't open elsewhere or download.
#[must_use]
pub fn intercepted_href(event: &Event, trigger_class: &str, page_url: &str) -> Option<String> {
	if event.default_prevented() {
		return None;
	}
	if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
		if mouse.button() != 0 || mouse.ctrl_key() || mouse.meta_key() || mouse.shift_key() || mouse.alt_key() {
			return None;
		}
	}

	let node = event.target()?.dyn_into::<Node>().ok()?;
	let element = match node.dyn_ref::<Element>() {
		Some(element) => element.clone(),
		None => node.parent_element()?,
	};
	let link = closest_with_class(element, trigger_class)?;

	if link.has_attribute("download") {
		return None;
	}
	if let Some(target) = link.get_attribute("target") {
		if !target.is_empty() && !target.eq_ignore_ascii_case("_self") {
			return None;
		}
	}
	let href = link.get_attribute("href")?;
	if is_same_origin(&href, page_url) {
		Some(href)
	} else {
		None
	}
}

fn closest_with_class(element: Element, class: &str) -> Option<Element> {
	let mut current = Some(element);
	while let Some(element) = current {
		if element.class_list().contains(class) {
			return Some(element);
		}
		current = element.parent_element();
	}
	None
}

use core::time::Duration;
use js_sys::{Object, Reflect};
use softnav_dom::{history, listeners::intercepted_href, NavigationConfiguration, Navigator};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Event, EventTarget, HtmlElement, MouseEvent, MouseEventInit, PopStateEvent, PopStateEventInit};

wasm_bindgen_test_configure!(run_in_browser);

mod web_support_;
use web_support_::{document, fixture, init_logging, page_url, yield_now};

const PAGE: &str = r#"<div id="softnav-content"><p>Old</p></div><div id="softnav-loading" style="display: none"></div>"#;

/// Dispatches `event` (or a plain click) on `target` and reports what a listener after ours observed.
///
/// The default action is always prevented afterwards, so the test page never navigates away.
fn observe_click(target: &EventTarget, event: Option<Event>, observe: impl Fn(&Event) -> Option<String> + 'static) -> Option<Option<String>> {
	let observed = Rc::new(RefCell::new(None));
	let recorder = {
		let observed = Rc::clone(&observed);
		Closure::wrap(Box::new(move |event: Event| {
			*observed.borrow_mut() = Some(observe(&event));
			event.prevent_default();
		}) as Box<dyn FnMut(Event)>)
	};
	document()
		.add_event_listener_with_callback("click", recorder.as_ref().unchecked_ref())
		.unwrap();

	match event {
		Some(event) => {
			target.dispatch_event(&event).unwrap();
		}
		None => target.dyn_ref::<HtmlElement>().unwrap().click(),
	}

	document()
		.remove_event_listener_with_callback("click", recorder.as_ref().unchecked_ref())
		.unwrap();
	let result = observed.borrow_mut().take();
	result
}

fn intercepted(html: &str, target_id: &str, event: Option<Event>) -> Option<String> {
	init_logging();
	fixture(html);
	let target: EventTarget = document().get_element_by_id(target_id).unwrap().into();
	observe_click(&target, event, |event| intercepted_href(event, "softnav-link", &page_url())).expect("Click was not observed.")
}

fn mouse_click(configure: impl FnOnce(&MouseEventInit)) -> Event {
	let init = MouseEventInit::new();
	init.set_bubbles(true);
	init.set_cancelable(true);
	configure(&init);
	MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap().into()
}

#[wasm_bindgen_test]
fn plain_click_on_marked_link() {
	assert_eq!(
		intercepted(r#"<a id="link" class="softnav-link" href="/softnav-test/page">Go</a>"#, "link", None).as_deref(),
		Some("/softnav-test/page")
	);
}

#[wasm_bindgen_test]
fn click_inside_marked_link() {
	assert_eq!(
		intercepted(
			r#"<a class="softnav-link" href="/softnav-test/page"><span><b id="inner">Go</b></span></a>"#,
			"inner",
			None
		)
		.as_deref(),
		Some("/softnav-test/page")
	);
}

#[wasm_bindgen_test]
fn click_on_text_node() {
	init_logging();
	fixture(r#"<a id="link" class="softnav-link" href="/softnav-test/text">Text</a>"#);
	let text: EventTarget = document().get_element_by_id("link").unwrap().first_child().unwrap().into();

	let observed = observe_click(&text, Some(mouse_click(|_| ())), |event| intercepted_href(event, "softnav-link", &page_url()));
	assert_eq!(observed, Some(Some("/softnav-test/text".to_owned())));
}

#[wasm_bindgen_test]
fn unmarked_link_is_ignored() {
	assert_eq!(intercepted(r#"<a id="link" href="/softnav-test/page">Go</a>"#, "link", None), None);
}

#[wasm_bindgen_test]
fn modified_clicks_are_ignored() {
	let html = r#"<a id="link" class="softnav-link" href="/softnav-test/page">Go</a>"#;
	assert_eq!(intercepted(html, "link", Some(mouse_click(|init| init.set_ctrl_key(true)))), None);
	assert_eq!(intercepted(html, "link", Some(mouse_click(|init| init.set_meta_key(true)))), None);
	assert_eq!(intercepted(html, "link", Some(mouse_click(|init| init.set_shift_key(true)))), None);
	assert_eq!(intercepted(html, "link", Some(mouse_click(|init| init.set_alt_key(true)))), None);
	assert_eq!(intercepted(html, "link", Some(mouse_click(|init| init.set_button(1)))), None);
	assert!(intercepted(html, "link", Some(mouse_click(|_| ()))).is_some());
}

#[wasm_bindgen_test]
fn links_opening_elsewhere_are_ignored() {
	assert_eq!(
		intercepted(r#"<a id="link" class="softnav-link" href="/softnav-test/page" target="_blank">Go</a>"#, "link", None),
		None
	);
	assert_eq!(
		intercepted(r#"<a id="link" class="softnav-link" href="/softnav-test/file.zip" download>Go</a>"#, "link", None),
		None
	);
	assert_eq!(
		intercepted(r#"<a id="link" class="softnav-link" href="https://example.com/">Go</a>"#, "link", None),
		None
	);
	assert!(intercepted(r#"<a id="link" class="softnav-link" href="/softnav-test/page" target="_self">Go</a>"#, "link", None).is_some());
}

#[wasm_bindgen_test]
fn started_listeners_intercept_until_stopped() {
	init_logging();
	fixture(PAGE);
	let listeners = Navigator::configure(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link").with_fade_duration(Duration::from_millis(0))).unwrap();

	let link = document().create_element("a").unwrap();
	link.set_class_name("softnav-link");
	link.set_attribute("href", "#softnav-fragment").unwrap();
	document().get_element_by_id("softnav-content").unwrap().append_child(&link).unwrap();
	let link: EventTarget = link.into();

	assert_eq!(observe_click(&link, None, |event| Some(event.default_prevented().to_string())), Some(Some("true".to_owned())));

	listeners.stop();
	assert_eq!(observe_click(&link, None, |event| Some(event.default_prevented().to_string())), Some(Some("false".to_owned())));
}

fn pop_state(state: &JsValue) -> PopStateEvent {
	let init = PopStateEventInit::new();
	init.set_state(state);
	PopStateEvent::new_with_event_init_dict("popstate", &init).unwrap()
}

fn url_state(url: &str) -> JsValue {
	let state = Object::new();
	Reflect::set(&state, &JsValue::from_str("url"), &JsValue::from_str(url)).unwrap();
	state.into()
}

#[wasm_bindgen_test]
async fn popstate_with_url_starts_navigation() {
	init_logging();
	fixture(PAGE);
	let listeners = Navigator::configure(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link")).unwrap();

	window().unwrap().dispatch_event(&pop_state(&url_state("/softnav-test/back"))).unwrap();
	yield_now().await;

	assert!(listeners.navigator().loading_indicator().is_visible().unwrap());
}

#[wasm_bindgen_test]
async fn popstate_without_url_is_ignored() {
	init_logging();
	fixture(PAGE);
	let listeners = Navigator::configure(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link")).unwrap();

	window().unwrap().dispatch_event(&pop_state(&JsValue::NULL)).unwrap();
	window().unwrap().dispatch_event(&pop_state(&Object::new().into())).unwrap();
	yield_now().await;

	assert!(!listeners.navigator().loading_indicator().is_visible().unwrap());
}

#[wasm_bindgen_test]
async fn stopped_listeners_ignore_popstate() {
	init_logging();
	fixture(PAGE);
	let listeners = Navigator::configure(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link")).unwrap();
	let navigator = listeners.navigator().clone();
	listeners.stop();

	window().unwrap().dispatch_event(&pop_state(&url_state("/softnav-test/back"))).unwrap();
	yield_now().await;

	assert!(!navigator.loading_indicator().is_visible().unwrap());
}

#[wasm_bindgen_test]
fn start_seeds_current_history_entry() {
	init_logging();
	fixture(PAGE);
	let history_api = window().unwrap().history().unwrap();
	history_api.replace_state(&JsValue::NULL, "").unwrap();
	let length = history_api.length().unwrap();

	let navigator = Navigator::new(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link")).unwrap();
	let listeners = navigator.start().unwrap();

	assert_eq!(history::url_of(&history_api.state().unwrap()), Some(page_url()));
	assert_eq!(history_api.length().unwrap(), length);
	listeners.stop();
}

#[wasm_bindgen_test]
fn seeding_can_be_disabled() {
	init_logging();
	fixture(PAGE);
	let history_api = window().unwrap().history().unwrap();
	history_api.replace_state(&JsValue::NULL, "").unwrap();

	let listeners = Navigator::configure(NavigationConfiguration::new("#softnav-content", "#softnav-loading", "softnav-link").with_seed_history_state(false)).unwrap();

	assert!(history_api.state().unwrap().is_null());
	listeners.stop();
}

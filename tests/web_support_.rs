#![allow(dead_code)]

use core::time::Duration;
use js_sys::Promise;
use softnav_dom::{
	fetch::FetchedDocument,
	identity::normalize_url,
	reconcile::{collect_head_links, collect_scripts, ResourceKind},
};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Document, HtmlElement};

static LOG_INITIALIZED: Once = Once::new();

pub fn init_logging() {
	//TODO: Fail on Warning or Error.
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);
}

pub fn document() -> Document {
	window().unwrap().document().unwrap()
}

pub fn page_url() -> String {
	window().unwrap().location().href().unwrap()
}

pub fn absolute(url: &str) -> String {
	normalize_url(url, &page_url())
}

/// Replaces the test fixture.
///
/// It lives in its own container so that the test runner's output isn't touched.
pub fn fixture(html: &str) -> HtmlElement {
	let document = document();
	let container = match document.get_element_by_id("softnav-fixture") {
		Some(container) => container,
		None => {
			let container = document.create_element("div").unwrap();
			container.set_id("softnav-fixture");
			document.body().unwrap().append_child(&container).unwrap();
			container
		}
	};
	container.set_inner_html(html);
	container.dyn_into().unwrap()
}

pub fn set_head(html: &str) {
	document().head().unwrap().set_inner_html(html);
}

/// Removes every script element, including the test runner's (which have already run).
pub fn remove_scripts() {
	let scripts = document().query_selector_all("script").unwrap();
	for i in 0..scripts.length() {
		scripts.item(i).unwrap().dyn_into::<web_sys::Element>().unwrap().remove();
	}
}

pub fn parse(html: &str) -> FetchedDocument {
	FetchedDocument::parse(html, &page_url()).unwrap()
}

pub fn script_urls() -> Vec<Option<String>> {
	collect_scripts(&document(), &page_url()).unwrap().into_iter().map(|script| script.url).collect()
}

pub fn head_link_urls(kind: ResourceKind) -> Vec<String> {
	collect_head_links(&document(), kind, &page_url())
		.unwrap()
		.into_iter()
		.filter_map(|link| link.url)
		.collect()
}

/// Lets already scheduled tasks and microtasks run.
pub async fn yield_now() {
	JsFuture::from(Promise::resolve(&wasm_bindgen::JsValue::UNDEFINED)).await.unwrap();
}

pub async fn sleep(duration: Duration) {
	let promise = Promise::new(&mut |resolve, _reject| {
		window()
			.unwrap()
			.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, duration.as_millis() as i32)
			.unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

//! Keeps the live document's scripts, stylesheets and preload links in line with an incoming document.
//!
//! Resources are identified by their [normalized](`crate::identity::normalize_url`) URL.
//! Which elements to remove and insert is decided by [`plan::plan`]; this module only reads and writes the DOM.

pub mod plan;

use crate::{
	error::NavigationError,
	identity::{absolute_url, normalize_url},
	redact::loggable_url,
};
use plan::Insertion;
use tracing::{debug, instrument, trace};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlScriptElement, Node, NodeList};

/// The three kinds of reconciled resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	Script,
	Stylesheet,
	Preload,
}
impl ResourceKind {
	#[must_use]
	pub fn selector(self) -> &'static str {
		match self {
			ResourceKind::Script => "script",
			ResourceKind::Stylesheet => r#"link[rel~="stylesheet"][href]"#,
			ResourceKind::Preload => r#"link[rel~="preload"][href]"#,
		}
	}

	#[must_use]
	pub fn url_attribute(self) -> &'static str {
		match self {
			ResourceKind::Script => "src",
			ResourceKind::Stylesheet | ResourceKind::Preload => "href",
		}
	}

	/// Inline scripts have side effects on insertion and no identity, so they are replaced on every navigation.
	#[must_use]
	pub fn reruns_inline(self) -> bool {
		self == ResourceKind::Script
	}

	fn link_rel(self) -> &'static str {
		match self {
			ResourceKind::Script => unreachable!("Scripts aren't links."),
			ResourceKind::Stylesheet => "stylesheet",
			ResourceKind::Preload => "preload",
		}
	}

	/// Creates a live copy of `source` for insertion into `document`.
	fn adopt(self, document: &Document, source: &Resource) -> Result<Node, NavigationError> {
		let element: Element = match self {
			ResourceKind::Script => recreate_script(document, &source.element)?.into(),
			ResourceKind::Stylesheet | ResourceKind::Preload => document
				.import_node_with_deep(&source.element, true)
				.map_err(NavigationError::Dom)?
				.unchecked_into(),
		};
		// Relative URLs would otherwise resolve against the page being navigated away from.
		if let Some(absolute) = &source.absolute {
			element.set_attribute(self.url_attribute(), absolute).map_err(NavigationError::Dom)?;
		}
		Ok(element.into())
	}

	/// Creates a retained resource that neither document contains, from its URL alone.
	fn create(self, document: &Document, url: &str) -> Result<Node, NavigationError> {
		if self == ResourceKind::Script {
			let script = create_script(document)?;
			script.set_src(url);
			script.set_async(false);
			return Ok(script.into());
		}

		let link = document.create_element("link").map_err(NavigationError::Dom)?;
		link.set_attribute("rel", self.link_rel()).map_err(NavigationError::Dom)?;
		link.set_attribute("href", url).map_err(NavigationError::Dom)?;
		Ok(link.into())
	}
}

/// An element carrying a reconciled resource.
#[derive(Debug, Clone)]
pub struct Resource {
	pub element: Element,
	/// Normalized URL, [`None`] for inline resources.
	pub url: Option<String>,
	/// The URL as written, resolved against its document's base.
	pub absolute: Option<String>,
}
impl Resource {
	fn new(element: Element, kind: ResourceKind, base: &str) -> Self {
		let raw = element.get_attribute(kind.url_attribute()).filter(|raw| !raw.trim().is_empty());
		Self {
			url: raw.as_deref().map(|raw| normalize_url(raw, base)),
			absolute: raw.as_deref().map(|raw| absolute_url(raw, base)),
			element,
		}
	}

	#[must_use]
	pub fn url(&self) -> Option<&str> {
		self.url.as_deref()
	}
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub removed: usize,
	pub inserted: usize,
}
impl ReconcileReport {
	#[must_use]
	pub fn mutations(self) -> usize {
		self.removed + self.inserted
	}
}

/// The base URL relative resource URLs in `document` resolve against.
pub fn document_base(document: &Document) -> Result<String, NavigationError> {
	match document.base_uri().map_err(NavigationError::Dom)? {
		Some(base) => Ok(base),
		None => document.url().map_err(NavigationError::Dom),
	}
}

/// All `<script>` elements of `document`, in document order.
pub fn collect_scripts(document: &Document, base: &str) -> Result<Vec<Resource>, NavigationError> {
	let list = document.query_selector_all(ResourceKind::Script.selector()).map_err(NavigationError::Dom)?;
	Ok(collect(&list, ResourceKind::Script, base))
}

/// All links of `kind` inside `document`'s `<head>`, in document order.
///
/// # Panics
///
/// Iff `kind` is [`ResourceKind::Script`].
pub fn collect_head_links(document: &Document, kind: ResourceKind, base: &str) -> Result<Vec<Resource>, NavigationError> {
	assert_ne!(kind, ResourceKind::Script, "Scripts are collected document-wide.");
	let head = match document.head() {
		Some(head) => head,
		None => return Ok(Vec::new()),
	};
	let list = head.query_selector_all(kind.selector()).map_err(NavigationError::Dom)?;
	Ok(collect(&list, kind, base))
}

fn collect(list: &NodeList, kind: ResourceKind, base: &str) -> Vec<Resource> {
	elements(list).into_iter().map(|element| Resource::new(element, kind, base)).collect()
}

/// The [`Element`]s in `list`, in order.
pub(crate) fn elements(list: &NodeList) -> Vec<Element> {
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// Reconciles the stylesheet or preload links in `document`'s `<head>` against those of `incoming`'s `<head>`.
///
/// `incoming_base` is the URL `incoming` was loaded from and `retained` must already be normalized.
///
/// # Panics
///
/// Iff `kind` is [`ResourceKind::Script`].
#[instrument(skip(document, incoming, incoming_base, retained))]
pub fn reconcile_head_links(
	document: &Document,
	incoming: &Document,
	incoming_base: &str,
	kind: ResourceKind,
	retained: &[String],
) -> Result<ReconcileReport, NavigationError> {
	let head = document.head().ok_or_else(|| NavigationError::MissingElement { selector: "head".to_owned() })?;
	let current = collect_head_links(document, kind, &document_base(document)?)?;
	let incoming = collect_head_links(incoming, kind, incoming_base)?;
	apply(document, &head, kind, &current, &incoming, retained)
}

/// Reconciles all of `document`'s scripts against `incoming`, appending new ones to `<body>` in order.
///
/// `incoming` is taken as collected list since the incoming document's content region is stripped of its scripts before the swap.
/// Retained scripts inside the live content region have to be [rescued](`rescue_retained_scripts`) before that region is replaced,
/// or they are recreated here and run a second time.
#[instrument(skip(document, incoming, retained))]
pub fn reconcile_scripts(document: &Document, incoming: &[Resource], retained: &[String]) -> Result<ReconcileReport, NavigationError> {
	let body = document.body().ok_or_else(|| NavigationError::MissingElement { selector: "body".to_owned() })?;
	let current = collect_scripts(document, &document_base(document)?)?;
	apply(document, &body, ResourceKind::Script, &current, incoming, retained)
}

/// Moves retained external scripts out of `region` to the end of `<body>`, so that replacing `region`'s content doesn't remove them.
///
/// Moving a script that has already run doesn't run it again.
pub fn rescue_retained_scripts(document: &Document, region: &Element, retained: &[String]) -> Result<usize, NavigationError> {
	if retained.is_empty() {
		return Ok(0);
	}
	let body = document.body().ok_or_else(|| NavigationError::MissingElement { selector: "body".to_owned() })?;
	let base = document_base(document)?;
	let list = region.query_selector_all("script[src]").map_err(NavigationError::Dom)?;

	let mut moved = 0;
	for script in collect(&list, ResourceKind::Script, &base) {
		if script.url().map_or(false, |url| retained.iter().any(|retained| retained == url)) {
			body.append_child(&script.element).map_err(NavigationError::Dom)?;
			moved += 1;
		}
	}
	if moved > 0 {
		debug!("Moved {} retained script(s) out of the content region.", moved);
	}
	Ok(moved)
}

fn apply(
	document: &Document,
	parent: &Node,
	kind: ResourceKind,
	current: &[Resource],
	incoming: &[Resource],
	retained: &[String],
) -> Result<ReconcileReport, NavigationError> {
	let current_urls: Vec<_> = current.iter().map(Resource::url).collect();
	let incoming_urls: Vec<_> = incoming.iter().map(Resource::url).collect();
	let retained_urls: Vec<_> = retained.iter().map(String::as_str).collect();
	let plan = plan::plan(&current_urls, &incoming_urls, &retained_urls, kind.reruns_inline());

	for &i in &plan.remove {
		trace!("Removing {:?} {:?}", kind, current[i].url().map(loggable_url));
		current[i].element.remove();
	}

	for insertion in &plan.insert {
		let node = match *insertion {
			Insertion::Incoming(i) => kind.adopt(document, &incoming[i])?,
			Insertion::Retained(i) => {
				trace!("Restoring retained {:?} {:?}", kind, loggable_url(&retained[i]));
				kind.create(document, &retained[i])?
			}
		};
		parent.append_child(&node).map_err(NavigationError::Dom)?;
	}

	let report = ReconcileReport {
		removed: plan.remove.len(),
		inserted: plan.insert.len(),
	};
	debug!("Reconciled {:?}: {:?}", kind, report);
	Ok(report)
}

fn create_script(document: &Document) -> Result<HtmlScriptElement, NavigationError> {
	document
		.create_element("script")
		.map_err(NavigationError::Dom)?
		.dyn_into::<HtmlScriptElement>()
		.map_err(|element| NavigationError::Dom(element.into()))
}

/// Scripts that were parsed elsewhere or cloned never run, so each one is rebuilt from scratch.
fn recreate_script(document: &Document, source: &Element) -> Result<HtmlScriptElement, NavigationError> {
	let script = create_script(document)?;
	for name in source.get_attribute_names().iter() {
		let name = match name.as_string() {
			Some(name) => name,
			None => continue,
		};
		if let Some(value) = source.get_attribute(&name) {
			script.set_attribute(&name, &value).map_err(NavigationError::Dom)?;
		}
	}
	script.set_text_content(source.text_content().as_deref());

	// Dynamically inserted external scripts default to `async`, which would break execution order.
	if script.has_attribute("src") && !source.has_attribute("async") {
		script.set_async(false);
	}
	Ok(script)
}

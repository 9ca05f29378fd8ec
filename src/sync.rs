//! Title and meta tag synchronization.

use crate::{error::NavigationError, reconcile::elements};
use tracing::{debug, instrument};
use web_sys::Document;

/// The meta tags replaced wholesale on each navigation.
pub const SYNCHRONIZED_META: &str = r#"meta[name="description"], meta[name="keywords"]"#;

/// Replaces `document`'s description and keywords meta tags with `incoming`'s
/// and takes over `incoming`'s title, if it has one.
#[instrument(skip(document, incoming))]
pub fn synchronize(document: &Document, incoming: &Document) -> Result<(), NavigationError> {
	let head = document.head().ok_or_else(|| NavigationError::MissingElement { selector: "head".to_owned() })?;

	let stale = elements(&document.query_selector_all(SYNCHRONIZED_META).map_err(NavigationError::Dom)?);
	for meta in &stale {
		meta.remove();
	}

	let fresh = elements(&incoming.query_selector_all(SYNCHRONIZED_META).map_err(NavigationError::Dom)?);
	for meta in &fresh {
		let meta = document.import_node_with_deep(meta, true).map_err(NavigationError::Dom)?;
		head.append_child(&meta).map_err(NavigationError::Dom)?;
	}
	debug!("Replaced {} meta tag(s) with {}.", stale.len(), fresh.len());

	if let Some(title) = incoming.query_selector("title").map_err(NavigationError::Dom)? {
		document.set_title(&title.text_content().unwrap_or_default());
	}
	Ok(())
}

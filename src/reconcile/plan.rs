//! The DOM-free half of resource reconciliation.
//!
//! Each resource list entry is `Some(url)` for an external resource (with `url` already normalized)
//! or `None` for an inline one.

use hashbrown::HashSet;

/// Where an inserted resource comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
	/// Index into the incoming resource list.
	Incoming(usize),
	/// Index into the retention list. Used only for retained URLs the incoming document lacks.
	Retained(usize),
}

/// The delta between the live resources and the wanted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
	/// Indices into the current resource list, ascending.
	pub remove: Vec<usize>,
	/// In insertion order: retention repairs first, then additions in incoming order.
	pub insert: Vec<Insertion>,
}
impl Plan {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.remove.is_empty() && self.insert.is_empty()
	}
}

/// Computes which `current` resources to remove and what to insert so that afterwards exactly
/// the URLs of `incoming` and `retained` are present.
///
/// If `rerun_inline` is set, every current inline resource is removed and every incoming inline
/// resource inserted, since inline code has no identity to deduplicate by.
/// Otherwise inline entries are left alone on both sides.
///
/// Duplicate URLs are never removed just for being duplicates, and each missing URL is inserted once.
#[must_use]
pub fn plan(current: &[Option<&str>], incoming: &[Option<&str>], retained: &[&str], rerun_inline: bool) -> Plan {
	let incoming_urls: HashSet<&str> = incoming.iter().copied().flatten().collect();
	let retained_urls: HashSet<&str> = retained.iter().copied().collect();

	let mut result = Plan::default();
	let mut present = HashSet::with_capacity(current.len());
	for (i, entry) in current.iter().enumerate() {
		match *entry {
			Some(url) if incoming_urls.contains(url) || retained_urls.contains(url) => {
				present.insert(url);
			}
			Some(_) => result.remove.push(i),
			None if rerun_inline => result.remove.push(i),
			None => (),
		}
	}

	for (i, &url) in retained.iter().enumerate() {
		if !incoming_urls.contains(url) && present.insert(url) {
			result.insert.push(Insertion::Retained(i));
		}
	}

	for (i, entry) in incoming.iter().enumerate() {
		match *entry {
			Some(url) => {
				if present.insert(url) {
					result.insert.push(Insertion::Incoming(i));
				}
			}
			None if rerun_inline => result.insert.push(Insertion::Incoming(i)),
			None => (),
		}
	}

	result
}

#![doc(html_root_url = "https://docs.rs/softnav-dom/0.0.1")]
#![warn(clippy::pedantic)]
//! Soft navigation: same-origin link clicks fetch the target page and swap one content region in place,
//! while scripts, stylesheets, preloads, meta tags, the title and the browser history follow along.
//!
//! Start with [`Navigator::configure`].
//!
//! Logging is done through [`tracing`]. Install a subscriber (for example [`tracing-wasm`](https://docs.rs/tracing-wasm)) to see it.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod identity;
pub mod listeners;
pub mod navigator;
pub mod reconcile;
pub mod redact;
pub mod sync;
pub mod transition;

pub use config::NavigationConfiguration;
pub use error::{ConfigError, NavigationError};
pub use listeners::Listeners;
pub use navigator::{NavigationRequest, Navigator};

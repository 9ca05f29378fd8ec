//! Fade transition of the content region and the loading indicator.

use crate::error::NavigationError;
use core::{cell::Cell, convert::TryFrom, time::Duration};
use js_sys::Promise;
use std::rc::Rc;
use tracing::{instrument, trace, warn};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlElement, Window};

/// Where the content region is in its fade cycle.
///
/// `Visible → FadingOut → Hidden → FadingIn → Visible`, with the content swap happening only while [`Hidden`](`TransitionState::Hidden`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
	Visible,
	FadingOut,
	Hidden,
	FadingIn,
}

/// Drives the opacity transition of the content region.
///
/// Clones share their state.
#[derive(Debug, Clone)]
pub struct TransitionController {
	window: Window,
	element: HtmlElement,
	duration: Duration,
	state: Rc<Cell<TransitionState>>,
}
impl TransitionController {
	#[must_use]
	pub fn new(window: Window, element: HtmlElement, duration: Duration) -> Self {
		Self {
			window,
			element,
			duration,
			state: Rc::new(Cell::new(TransitionState::Visible)),
		}
	}

	#[must_use]
	pub fn state(&self) -> TransitionState {
		self.state.get()
	}

	#[must_use]
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Starts fading out and resolves once the transition has had its full duration.
	///
	/// Returns immediately if the region is already hidden.
	/// If [`fade_in`](`TransitionController::fade_in`) is called while this is pending, the state is left as it set it.
	#[instrument(skip(self))]
	pub async fn fade_out(&self) -> Result<(), NavigationError> {
		if self.state.get() == TransitionState::Hidden {
			return Ok(());
		}

		let style = self.element.style();
		style
			.set_property("transition", &format!("opacity {}ms", self.duration.as_millis()))
			.map_err(NavigationError::Dom)?;
		style.set_property("opacity", "0").map_err(NavigationError::Dom)?;
		self.state.set(TransitionState::FadingOut);

		sleep(&self.window, self.duration).await?;

		if self.state.get() == TransitionState::FadingOut {
			self.state.set(TransitionState::Hidden);
		}
		trace!("Fade-out finished in state {:?}.", self.state.get());
		Ok(())
	}

	/// Makes the region opaque again right away.
	///
	/// The state settles to [`Visible`](`TransitionState::Visible`) in the background once the transition duration has passed.
	#[instrument(skip(self))]
	pub fn fade_in(&self) -> Result<(), NavigationError> {
		let style = self.element.style();
		style
			.set_property("transition", &format!("opacity {}ms", self.duration.as_millis()))
			.map_err(NavigationError::Dom)?;
		style.set_property("opacity", "1").map_err(NavigationError::Dom)?;
		self.state.set(TransitionState::FadingIn);

		let window = self.window.clone();
		let state = Rc::clone(&self.state);
		let duration = self.duration;
		spawn_local(async move {
			if let Err(error) = sleep(&window, duration).await {
				warn!("Fade-in timer failed: {}", error);
			}
			if state.get() == TransitionState::FadingIn {
				state.set(TransitionState::Visible);
			}
		});
		Ok(())
	}
}

/// Shows and hides the loading indicator through its `display` style.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
	element: HtmlElement,
}
impl LoadingIndicator {
	#[must_use]
	pub fn new(element: HtmlElement) -> Self {
		Self { element }
	}

	pub fn show(&self) -> Result<(), NavigationError> {
		self.element.style().set_property("display", "block").map_err(NavigationError::Dom)
	}

	pub fn hide(&self) -> Result<(), NavigationError> {
		self.element.style().set_property("display", "none").map_err(NavigationError::Dom)
	}

	pub fn is_visible(&self) -> Result<bool, NavigationError> {
		Ok(self.element.style().get_property_value("display").map_err(NavigationError::Dom)? != "none")
	}
}

/// Resolves after `duration`, using the window's timer.
pub(crate) async fn sleep(window: &Window, duration: Duration) -> Result<(), NavigationError> {
	let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
	let mut scheduled = Ok(0);
	let promise = Promise::new(&mut |resolve, _reject| {
		scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
	});
	scheduled.map_err(NavigationError::Dom)?;
	JsFuture::from(promise).await.map_err(NavigationError::Dom)?;
	Ok(())
}

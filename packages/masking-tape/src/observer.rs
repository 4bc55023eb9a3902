use std::collections::BTreeMap;

use crate::{
	source::{
		CaptureEvent, CaptureEvents, CaptureSignal, SurfaceDirectory, resolve_capture_surface,
	},
	state::{CaptureState, SurfaceId},
};

type OnChange = Box<dyn FnMut(CaptureEvent)>;

/// Tracks whether the most relevant surface is being captured.
///
/// The observer is bound to the UI thread: it is `!Send`, and events only reach `on_change` from
/// [`CaptureStateObserver::dispatch_pending`]. Its subscription lives exactly as long as the
/// observer stays attached and is closed on [`CaptureStateObserver::detach`] or drop.
pub struct CaptureStateObserver {
	tracked: Option<SurfaceId>,
	state: CaptureState,
	events: Option<CaptureEvents>,
	on_change: OnChange,
}
impl CaptureStateObserver {
	/// Seeds the state synchronously through `on_initial`, then keeps the subscription open for
	/// [`Self::dispatch_pending`].
	///
	/// An unresolvable surface or a signal-less source seeds `false`; attaching never fails.
	pub fn attach(
		signal: &dyn CaptureSignal,
		directory: &dyn SurfaceDirectory,
		on_initial: impl FnOnce(bool),
		on_change: impl FnMut(CaptureEvent) + 'static,
	) -> Self {
		let on_change: OnChange = Box::new(on_change);

		if !signal.has_signal() {
			tracing::debug!("No capture signal on this platform; seeding uncaptured.");

			on_initial(false);

			return Self { tracked: None, state: CaptureState::seeded(false), events: None, on_change };
		}

		// Subscribe, drop what is already queued, then read the seed. Anything published after
		// the drain stays queued and is re-applied by `dispatch_pending`.
		let events = signal.subscribe();
		let tracked = resolve_capture_surface(directory);
		let mut superseded = 0_usize;

		if let Some(events) = events.as_ref() {
			while events.try_next().is_some() {
				superseded += 1;
			}
		}

		let seed = match tracked {
			Some(surface) => signal.is_captured(surface).unwrap_or(false),
			None => {
				tracing::debug!("No rendering surface resolved at attach; seeding uncaptured.");

				false
			},
		};

		tracing::debug!(
			surface = ?tracked,
			seed,
			superseded,
			subscribed = events.is_some(),
			"Capture observer attached."
		);

		on_initial(seed);

		Self { tracked, state: CaptureState::seeded(seed), events, on_change }
	}

	/// Applies every queued event in order, invoking `on_change` once per event for the tracked
	/// surface. Returns how many events were applied.
	pub fn dispatch_pending(&mut self) -> usize {
		let Some(events) = self.events.as_ref() else {
			return 0;
		};
		let mut applied = 0;

		while let Some(event) = events.try_next() {
			if self.tracked.is_some_and(|surface| surface != event.surface) {
				continue;
			}

			self.state.apply(event.is_captured);
			(self.on_change)(event);

			applied += 1;
		}

		if applied > 0 {
			tracing::debug!(
				applied,
				is_captured = self.state.is_captured,
				"Applied capture changes."
			);
		}

		applied
	}

	/// Closes the subscription. Calling it again is a no-op.
	pub fn detach(&mut self) {
		if self.events.take().is_some() {
			tracing::debug!(surface = ?self.tracked, "Capture observer detached.");
		}
	}

	#[must_use]
	pub fn is_subscribed(&self) -> bool {
		self.events.is_some()
	}

	#[must_use]
	pub fn state(&self) -> CaptureState {
		self.state
	}

	#[must_use]
	pub fn is_captured(&self) -> bool {
		self.state.is_captured
	}

	#[must_use]
	pub fn tracked_surface(&self) -> Option<SurfaceId> {
		self.tracked
	}
}

impl Drop for CaptureStateObserver {
	fn drop(&mut self) {
		self.detach();
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObserverHandle(u64);

/// Owns the observers of attached components, keyed by the handle returned at attach.
///
/// Bindings refer to observers through an [`ObserverHandle`] lookup rather than owning them, so
/// an observer's lifetime is exactly the span between [`Self::attach`] and [`Self::detach`].
#[derive(Default)]
pub struct ObserverRegistry {
	observers: BTreeMap<ObserverHandle, CaptureStateObserver>,
	next: u64,
}
impl ObserverRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attach(
		&mut self,
		signal: &dyn CaptureSignal,
		directory: &dyn SurfaceDirectory,
		on_initial: impl FnOnce(bool),
		on_change: impl FnMut(CaptureEvent) + 'static,
	) -> ObserverHandle {
		let handle = ObserverHandle(self.next);

		self.next = self.next.wrapping_add(1);

		let observer = CaptureStateObserver::attach(signal, directory, on_initial, on_change);

		self.observers.insert(handle, observer);

		handle
	}

	/// Detaches and drops the observer. Returns `false` when the handle was already detached.
	pub fn detach(&mut self, handle: ObserverHandle) -> bool {
		match self.observers.remove(&handle) {
			Some(mut observer) => {
				observer.detach();

				true
			},
			None => false,
		}
	}

	#[must_use]
	pub fn get(&self, handle: ObserverHandle) -> Option<&CaptureStateObserver> {
		self.observers.get(&handle)
	}

	#[must_use]
	pub fn state(&self, handle: ObserverHandle) -> Option<CaptureState> {
		self.get(handle).map(CaptureStateObserver::state)
	}

	/// Drains pending events for every attached observer.
	pub fn dispatch_pending(&mut self) -> usize {
		self.observers.values_mut().map(CaptureStateObserver::dispatch_pending).sum()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.observers.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.observers.is_empty()
	}
}

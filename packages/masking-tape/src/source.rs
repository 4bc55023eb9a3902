//! Collaborators the observer reads capture state from.
//!
//! Platform integrations feed a [`CaptureBroadcaster`] from their native capture-change callback
//! (for example `UIScreen.capturedDidChangeNotification`) and hand it to observers as a
//! [`CaptureSignal`]. Platforms without such a callback use [`NoCaptureSignal`].

use std::{
	collections::HashMap,
	fmt,
	sync::{
		Arc, Mutex, MutexGuard, PoisonError, Weak,
		mpsc::{Receiver, Sender, TryRecvError, channel},
	},
};

use crate::state::SurfaceId;

/// A single capture-state change for one surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CaptureEvent {
	pub surface: SurfaceId,
	pub is_captured: bool,
}

/// A live subscription to capture-change events.
///
/// Dropping the stream closes the subscription; the publishing side notices on its next send.
#[derive(Debug)]
pub struct CaptureEvents {
	rx: Receiver<CaptureEvent>,
	open: Arc<()>,
}
impl CaptureEvents {
	#[must_use]
	pub fn new(rx: Receiver<CaptureEvent>) -> Self {
		Self { rx, open: Arc::new(()) }
	}

	/// Liveness token that expires once this stream is dropped.
	#[must_use]
	pub fn liveness(&self) -> Weak<()> {
		Arc::downgrade(&self.open)
	}

	/// Returns the next queued event without blocking.
	pub fn try_next(&self) -> Option<CaptureEvent> {
		match self.rx.try_recv() {
			Ok(event) => Some(event),
			Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
		}
	}
}

pub trait CaptureSignal {
	/// Whether this source ever publishes events. Signal-less sources are never subscribed to.
	fn has_signal(&self) -> bool {
		true
	}

	/// Synchronous read of a surface's current capture flag.
	fn is_captured(&self, surface: SurfaceId) -> Option<bool>;

	/// Opens a new subscription, or `None` when the source has no signal.
	fn subscribe(&self) -> Option<CaptureEvents>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SurfaceActivation {
	ForegroundActive,
	ForegroundInactive,
	Background,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SurfaceInfo {
	pub id: SurfaceId,
	pub activation: SurfaceActivation,
}

pub trait SurfaceDirectory {
	fn surfaces(&self) -> Vec<SurfaceInfo>;
}

impl SurfaceDirectory for [SurfaceInfo] {
	fn surfaces(&self) -> Vec<SurfaceInfo> {
		self.to_vec()
	}
}

impl SurfaceDirectory for Vec<SurfaceInfo> {
	fn surfaces(&self) -> Vec<SurfaceInfo> {
		self.clone()
	}
}

/// Picks the surface whose capture state matters most: foreground-active first, then
/// foreground-inactive, then whatever comes first.
#[must_use]
pub fn resolve_capture_surface(directory: &dyn SurfaceDirectory) -> Option<SurfaceId> {
	let surfaces = directory.surfaces();
	let with =
		|activation: SurfaceActivation| surfaces.iter().find(|info| info.activation == activation);

	with(SurfaceActivation::ForegroundActive)
		.or_else(|| with(SurfaceActivation::ForegroundInactive))
		.or_else(|| surfaces.first())
		.map(|info| info.id)
}

/// Source for platforms that expose no capture-change signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCaptureSignal;

impl CaptureSignal for NoCaptureSignal {
	fn has_signal(&self) -> bool {
		false
	}

	fn is_captured(&self, _surface: SurfaceId) -> Option<bool> {
		None
	}

	fn subscribe(&self) -> Option<CaptureEvents> {
		None
	}
}

type Wake = Arc<dyn Fn() + Send + Sync>;

struct Subscriber {
	tx: Sender<CaptureEvent>,
	open: Weak<()>,
}
impl Subscriber {
	fn is_open(&self) -> bool {
		self.open.strong_count() > 0
	}
}

#[derive(Default)]
struct BroadcasterInner {
	states: HashMap<SurfaceId, bool>,
	subscribers: Vec<Subscriber>,
	opened: u64,
	wake: Option<Wake>,
}

/// In-process capture signal fed by a platform callback.
///
/// Cloning shares the same state; publishing may happen from any thread while observers drain
/// their subscriptions on the UI thread.
#[derive(Clone, Default)]
pub struct CaptureBroadcaster {
	inner: Arc<Mutex<BroadcasterInner>>,
}
impl CaptureBroadcaster {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs a hook run after every publish, used to wake the UI thread (e.g. through an
	/// `EventLoopProxy`) so it can dispatch pending events.
	#[must_use]
	pub fn with_wake(self, wake: impl Fn() + Send + Sync + 'static) -> Self {
		self.lock().wake = Some(Arc::new(wake));

		self
	}

	/// Records the new flag for `surface` and fans the event out to every open subscription.
	pub fn publish(&self, surface: SurfaceId, is_captured: bool) {
		let wake = {
			let mut inner = self.lock();
			let event = CaptureEvent { surface, is_captured };

			inner.states.insert(surface, is_captured);
			inner.subscribers.retain(|sub| sub.is_open() && sub.tx.send(event).is_ok());

			tracing::debug!(
				surface = %surface,
				is_captured,
				subscribers = inner.subscribers.len(),
				"Published capture change."
			);

			inner.wake.clone()
		};

		if let Some(wake) = wake {
			wake();
		}
	}

	/// Subscriptions whose stream has not been dropped.
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		let mut inner = self.lock();

		inner.subscribers.retain(Subscriber::is_open);
		inner.subscribers.len()
	}

	/// Total subscriptions ever opened.
	#[must_use]
	pub fn subscriptions_opened(&self) -> u64 {
		self.lock().opened
	}

	fn lock(&self) -> MutexGuard<'_, BroadcasterInner> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl fmt::Debug for CaptureBroadcaster {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.lock();

		f.debug_struct("CaptureBroadcaster")
			.field("states", &inner.states)
			.field("subscribers", &inner.subscribers.len())
			.field("opened", &inner.opened)
			.finish()
	}
}

impl CaptureSignal for CaptureBroadcaster {
	fn is_captured(&self, surface: SurfaceId) -> Option<bool> {
		self.lock().states.get(&surface).copied()
	}

	fn subscribe(&self) -> Option<CaptureEvents> {
		let (tx, rx) = channel();
		let events = CaptureEvents::new(rx);
		let mut inner = self.lock();

		inner.subscribers.push(Subscriber { tx, open: events.liveness() });
		inner.opened = inner.opened.wrapping_add(1);

		Some(events)
	}
}

//! Test doubles for the platform collaborators.

use std::{cell::Cell, collections::BTreeSet};

use crate::{
	compositor::{
		ExclusionError, ExtractionError, ProtectedLayer, ProtectedLayerPrimitive, SurfaceExcluder,
	},
	render::Channel,
	source::{CaptureBroadcaster, CaptureEvents, CaptureSignal, SurfaceActivation, SurfaceInfo},
	state::SurfaceId,
};

pub(crate) fn surfaces(entries: &[(u64, SurfaceActivation)]) -> Vec<SurfaceInfo> {
	entries.iter().map(|&(id, activation)| SurfaceInfo { id: SurfaceId(id), activation }).collect()
}

/// Behaves like the platform: presented live, omitted from captures.
pub(crate) struct SimulatedLayer;

impl ProtectedLayer for SimulatedLayer {
	fn presents_in(&self, channel: Channel) -> bool {
		channel == Channel::Live
	}
}

pub(crate) struct SimulatedPrimitive;

impl ProtectedLayerPrimitive for SimulatedPrimitive {
	fn establish(&self) -> Result<Box<dyn ProtectedLayer>, ExtractionError> {
		Ok(Box::new(SimulatedLayer))
	}
}

pub(crate) struct FailingPrimitive;

impl ProtectedLayerPrimitive for FailingPrimitive {
	fn establish(&self) -> Result<Box<dyn ProtectedLayer>, ExtractionError> {
		Err(ExtractionError::MissingContainer { detail: String::from("no secure sublayer") })
	}
}

#[derive(Default)]
pub(crate) struct RecordingExcluder {
	pub calls: Vec<SurfaceId>,
	pub failing: BTreeSet<SurfaceId>,
}
impl RecordingExcluder {
	pub fn failing(surfaces: &[SurfaceId]) -> Self {
		Self { calls: Vec::new(), failing: surfaces.iter().copied().collect() }
	}
}

impl SurfaceExcluder for RecordingExcluder {
	fn exclude_from_capture(&mut self, surface: SurfaceId) -> Result<(), ExclusionError> {
		self.calls.push(surface);

		if self.failing.contains(&surface) {
			return Err(ExclusionError::Rejected { surface, code: 5 });
		}

		Ok(())
	}
}

/// Wraps a broadcaster and counts subscribe calls.
pub(crate) struct CountingSignal {
	broadcaster: CaptureBroadcaster,
	signal: bool,
	subscribes: Cell<usize>,
}
impl CountingSignal {
	pub fn with_signal() -> Self {
		Self { broadcaster: CaptureBroadcaster::new(), signal: true, subscribes: Cell::new(0) }
	}

	pub fn without_signal() -> Self {
		Self { signal: false, ..Self::with_signal() }
	}

	pub fn broadcaster(&self) -> &CaptureBroadcaster {
		&self.broadcaster
	}

	pub fn subscribe_calls(&self) -> usize {
		self.subscribes.get()
	}
}

impl CaptureSignal for CountingSignal {
	fn has_signal(&self) -> bool {
		self.signal
	}

	fn is_captured(&self, surface: SurfaceId) -> Option<bool> {
		self.broadcaster.is_captured(surface)
	}

	fn subscribe(&self) -> Option<CaptureEvents> {
		self.subscribes.set(self.subscribes.get() + 1);

		self.broadcaster.subscribe()
	}
}

/// Publishes a change right after answering a capture query, as a platform callback on another
/// thread could.
pub(crate) struct PublishOnRead {
	broadcaster: CaptureBroadcaster,
	surface: SurfaceId,
	next: bool,
	fired: Cell<bool>,
}
impl PublishOnRead {
	pub fn new(surface: SurfaceId, next: bool) -> Self {
		Self { broadcaster: CaptureBroadcaster::new(), surface, next, fired: Cell::new(false) }
	}

	pub fn broadcaster(&self) -> &CaptureBroadcaster {
		&self.broadcaster
	}
}

impl CaptureSignal for PublishOnRead {
	fn is_captured(&self, surface: SurfaceId) -> Option<bool> {
		let current = self.broadcaster.is_captured(surface);

		if !self.fired.replace(true) {
			self.broadcaster.publish(self.surface, self.next);
		}

		current
	}

	fn subscribe(&self) -> Option<CaptureEvents> {
		self.broadcaster.subscribe()
	}
}

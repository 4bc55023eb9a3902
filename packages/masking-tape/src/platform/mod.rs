//! Whole-surface capture exclusion for `winit` windows.

#[cfg(target_os = "macos")] mod appkit;
#[cfg(windows)] mod win32;

use std::{collections::BTreeMap, sync::Arc};

use winit::window::{Window, WindowId};

use crate::{
	compositor::{ExclusionError, SurfaceExcluder},
	source::{SurfaceActivation, SurfaceDirectory, SurfaceInfo},
	state::SurfaceId,
};

impl From<WindowId> for SurfaceId {
	fn from(id: WindowId) -> Self {
		Self(u64::from(id))
	}
}

/// Hides the whole window from screenshots, recordings, and screen sharing.
///
/// macOS sets `NSWindow.sharingType` to none; Windows sets `WDA_EXCLUDEFROMCAPTURE` display
/// affinity. Neither is ever lifted again.
pub fn exclude_window_from_capture(window: &Window) -> Result<(), ExclusionError> {
	#[cfg(target_os = "macos")]
	{
		appkit::exclude_window(window)
	}
	#[cfg(windows)]
	{
		win32::exclude_window(window)
	}
	#[cfg(not(any(target_os = "macos", windows)))]
	{
		let _ = window;

		Err(ExclusionError::Unsupported)
	}
}

#[must_use]
pub fn window_activation(
	focused: bool,
	visible: Option<bool>,
	minimized: Option<bool>,
) -> SurfaceActivation {
	if minimized == Some(true) || visible == Some(false) {
		SurfaceActivation::Background
	} else if focused {
		SurfaceActivation::ForegroundActive
	} else {
		SurfaceActivation::ForegroundInactive
	}
}

/// The host's windows, exposed as capture surfaces.
#[derive(Debug, Default)]
pub struct WindowSurfaces {
	windows: BTreeMap<SurfaceId, Arc<Window>>,
}
impl WindowSurfaces {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, window: Arc<Window>) -> SurfaceId {
		let surface = SurfaceId::from(window.id());

		self.windows.insert(surface, window);

		surface
	}

	pub fn remove(&mut self, surface: SurfaceId) -> Option<Arc<Window>> {
		self.windows.remove(&surface)
	}

	#[must_use]
	pub fn get(&self, surface: SurfaceId) -> Option<&Arc<Window>> {
		self.windows.get(&surface)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.windows.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.windows.is_empty()
	}
}

impl SurfaceDirectory for WindowSurfaces {
	fn surfaces(&self) -> Vec<SurfaceInfo> {
		self.windows
			.iter()
			.map(|(&id, window)| SurfaceInfo {
				id,
				activation: window_activation(
					window.has_focus(),
					window.is_visible(),
					window.is_minimized(),
				),
			})
			.collect()
	}
}

impl SurfaceExcluder for WindowSurfaces {
	fn exclude_from_capture(&mut self, surface: SurfaceId) -> Result<(), ExclusionError> {
		let window =
			self.windows.get(&surface).ok_or(ExclusionError::SurfaceNotFound { surface })?;

		exclude_window_from_capture(window)
	}
}

#[cfg(test)]
mod tests {
	use crate::compositor::{ExclusionError, SurfaceExcluder};
	use crate::platform::{WindowSurfaces, window_activation};
	use crate::source::{SurfaceActivation, SurfaceDirectory};
	use crate::state::SurfaceId;

	#[test]
	fn activation_from_window_flags() {
		assert_eq!(
			window_activation(true, Some(true), Some(false)),
			SurfaceActivation::ForegroundActive
		);
		assert_eq!(window_activation(true, None, None), SurfaceActivation::ForegroundActive);
		assert_eq!(
			window_activation(false, Some(true), None),
			SurfaceActivation::ForegroundInactive
		);
		assert_eq!(window_activation(true, Some(false), None), SurfaceActivation::Background);
		assert_eq!(window_activation(false, None, Some(true)), SurfaceActivation::Background);
	}

	#[test]
	fn unknown_surface_is_not_found() {
		let mut surfaces = WindowSurfaces::new();
		let err = surfaces.exclude_from_capture(SurfaceId(42)).unwrap_err();

		assert!(matches!(err, ExclusionError::SurfaceNotFound { surface: SurfaceId(42) }));
		assert!(surfaces.surfaces().is_empty());
		assert!(surfaces.is_empty());
	}
}

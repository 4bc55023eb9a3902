use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows_sys::Win32::{
	Foundation::{GetLastError, HWND},
	UI::WindowsAndMessaging::{SetWindowDisplayAffinity, WDA_EXCLUDEFROMCAPTURE},
};
use winit::window::Window;

use crate::{compositor::ExclusionError, state::SurfaceId};

pub(super) fn exclude_window(window: &Window) -> Result<(), ExclusionError> {
	let handle = window.window_handle()?;
	let RawWindowHandle::Win32(handle) = handle.as_raw() else {
		return Err(ExclusionError::Unsupported);
	};
	let hwnd = handle.hwnd.get() as HWND;

	// Fails on Windows builds older than 2004, which only know WDA_MONITOR.
	if unsafe { SetWindowDisplayAffinity(hwnd, WDA_EXCLUDEFROMCAPTURE) } == 0 {
		let code = unsafe { GetLastError() };

		return Err(ExclusionError::Rejected { surface: SurfaceId::from(window.id()), code });
	}

	Ok(())
}

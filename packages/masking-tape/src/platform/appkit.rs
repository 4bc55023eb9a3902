use objc::{msg_send, runtime::Object, sel, sel_impl};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::Window;

use crate::{compositor::ExclusionError, state::SurfaceId};

/// `NSWindowSharingNone`.
const NS_WINDOW_SHARING_NONE: usize = 0;

pub(super) fn exclude_window(window: &Window) -> Result<(), ExclusionError> {
	let handle = window.window_handle()?;
	let RawWindowHandle::AppKit(handle) = handle.as_raw() else {
		return Err(ExclusionError::Unsupported);
	};
	let ns_view = handle.ns_view.as_ptr() as *mut Object;
	let ns_window: *mut Object = unsafe { msg_send![ns_view, window] };

	if ns_window.is_null() {
		return Err(ExclusionError::SurfaceNotFound { surface: SurfaceId::from(window.id()) });
	}

	unsafe {
		let _: () = msg_send![ns_window, setSharingType: NS_WINDOW_SHARING_NONE];
	}

	Ok(())
}

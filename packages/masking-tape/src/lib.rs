//! Keep sensitive UI out of screenshots, recordings, mirroring, and screen shares while it stays
//! visible on the physical display.
//!
//! - [`Compositor`] wraps content so the live and captured channels can differ, using the finest
//!   [`ProtectionStrategy`] the host supports.
//! - [`CaptureStateObserver`] follows the platform capture signal for the most relevant surface.
//! - [`OverlayBinding`] shows a watermark in both channels, permanently or only while captured.

mod capability;
mod compositor;
mod config;
mod observer;
mod overlay;
mod platform;
mod render;
mod source;
mod state;
#[cfg(test)] mod testing;

pub use crate::capability::{
	HostCapabilities, Platform, ProtectionStrategy, host_capabilities, resolve,
};
pub use crate::compositor::{
	CompositionNode, Compositor, ExclusionError, ExtractionError, ProtectedLayer,
	ProtectedLayerPrimitive, SurfaceExcluder, UnavailablePrimitive,
};
pub use crate::config::{MaskingConfig, PlaceholderColor};
pub use crate::observer::{CaptureStateObserver, ObserverHandle, ObserverRegistry};
pub use crate::overlay::{OverlayBinding, WatermarkNode, should_show_overlay};
pub use crate::platform::{WindowSurfaces, exclude_window_from_capture, window_activation};
pub use crate::render::{Channel, Fill, Label, Renderer, Scene, SceneItem};
pub use crate::source::{
	CaptureBroadcaster, CaptureEvent, CaptureEvents, CaptureSignal, NoCaptureSignal,
	SurfaceActivation, SurfaceDirectory, SurfaceInfo, resolve_capture_surface,
};
pub use crate::state::{
	Alignment, CaptureState, ColorParseError, Rgb, Size, SizeProposal, SurfaceId,
};

pub fn masking_tape_version() -> &'static str {
	env!("CARGO_PKG_VERSION")
}

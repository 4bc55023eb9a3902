use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::config::MaskingConfig;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	Ios,
	TvOs,
	WatchOs,
	VisionOs,
	MacOs,
	Windows,
	Android,
	Linux,
	Other,
}
impl Platform {
	/// The platform this binary was compiled for.
	#[must_use]
	pub const fn host() -> Self {
		if cfg!(target_os = "ios") {
			Self::Ios
		} else if cfg!(target_os = "tvos") {
			Self::TvOs
		} else if cfg!(target_os = "watchos") {
			Self::WatchOs
		} else if cfg!(target_os = "visionos") {
			Self::VisionOs
		} else if cfg!(target_os = "macos") {
			Self::MacOs
		} else if cfg!(windows) {
			Self::Windows
		} else if cfg!(target_os = "android") {
			Self::Android
		} else if cfg!(target_os = "linux") {
			Self::Linux
		} else {
			Self::Other
		}
	}

	/// Whether the platform publishes a "capture in progress" signal.
	///
	/// macOS only exposes capture state behind the screen recording permission, so it is treated
	/// as signal-less.
	#[must_use]
	pub const fn has_capture_signal(self) -> bool {
		matches!(self, Self::Ios | Self::TvOs)
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProtectionStrategy {
	/// An individual subtree can be hidden from captures while its siblings stay visible.
	PerComponentExclusion,
	/// Only the whole enclosing surface can be hidden from captures.
	WholeSurfaceExclusion,
	/// No exclusion primitive; content passes through to captures.
	Unsupported,
}
impl ProtectionStrategy {
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::PerComponentExclusion => "per_component_exclusion",
			Self::WholeSurfaceExclusion => "whole_surface_exclusion",
			Self::Unsupported => "unsupported",
		}
	}
}

/// Maps a platform to the finest exclusion granularity it supports.
#[must_use]
pub const fn resolve(platform: Platform) -> ProtectionStrategy {
	match platform {
		Platform::Ios => ProtectionStrategy::PerComponentExclusion,
		Platform::MacOs | Platform::Windows | Platform::Android =>
			ProtectionStrategy::WholeSurfaceExclusion,
		// tvOS lays out its secure text field differently, so the secure layer is not reliable.
		Platform::TvOs | Platform::WatchOs | Platform::VisionOs | Platform::Linux | Platform::Other =>
			ProtectionStrategy::Unsupported,
	}
}

/// Static capabilities of the running process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostCapabilities {
	pub platform: Platform,
	pub strategy: ProtectionStrategy,
	pub capture_signal: bool,
}
impl HostCapabilities {
	#[must_use]
	pub const fn for_platform(platform: Platform) -> Self {
		Self { platform, strategy: resolve(platform), capture_signal: platform.has_capture_signal() }
	}

	#[must_use]
	pub fn from_config(config: &MaskingConfig) -> Self {
		Self::for_platform(config.platform.unwrap_or_else(Platform::host))
	}
}

/// Process-wide capabilities, resolved from the user config on first use.
pub fn host_capabilities() -> &'static HostCapabilities {
	static CAPABILITIES: OnceLock<HostCapabilities> = OnceLock::new();

	CAPABILITIES.get_or_init(|| {
		let capabilities = HostCapabilities::from_config(&MaskingConfig::load());

		tracing::info!(
			platform = ?capabilities.platform,
			strategy = capabilities.strategy.as_str(),
			capture_signal = capabilities.capture_signal,
			"Resolved capture protection capabilities."
		);

		capabilities
	})
}

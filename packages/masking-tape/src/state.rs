use std::{fmt, ops::Range, str::FromStr, time::Instant};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identity of a top-level rendering surface (a window or screen).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SurfaceId(pub u64);
impl SurfaceId {
	#[must_use]
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	#[must_use]
	pub const fn raw(self) -> u64 {
		self.0
	}
}

impl From<u64> for SurfaceId {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface#{}", self.0)
	}
}

/// Capture flag owned by a single observer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CaptureState {
	pub is_captured: bool,
	pub last_changed_at: Instant,
}
impl CaptureState {
	#[must_use]
	pub fn seeded(is_captured: bool) -> Self {
		Self { is_captured, last_changed_at: Instant::now() }
	}

	/// Applies a new flag, returning whether it differs from the previous one.
	pub(crate) fn apply(&mut self, is_captured: bool) -> bool {
		let changed = self.is_captured != is_captured;

		self.is_captured = is_captured;
		self.last_changed_at = Instant::now();

		changed
	}
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
	TopLeading,
	Top,
	TopTrailing,
	Leading,
	#[default]
	Center,
	Trailing,
	BottomLeading,
	Bottom,
	BottomTrailing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f32,
	pub height: f32,
}
impl Size {
	/// Smallest bounds a renderer may be asked to fit into.
	pub const COMPRESSED: Self = Self { width: 0.0, height: 0.0 };

	#[must_use]
	pub const fn new(width: f32, height: f32) -> Self {
		Self { width, height }
	}
}

/// A layout proposal where either dimension may be left open.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeProposal {
	pub width: Option<f32>,
	pub height: Option<f32>,
}
impl SizeProposal {
	pub const UNSPECIFIED: Self = Self { width: None, height: None };

	#[must_use]
	pub const fn new(width: Option<f32>, height: Option<f32>) -> Self {
		Self { width, height }
	}

	#[must_use]
	pub const fn is_unspecified(&self) -> bool {
		self.width.is_none() && self.height.is_none()
	}

	/// Fills open dimensions with the compressed size.
	#[must_use]
	pub fn bounds(&self) -> Size {
		Size {
			width: self.width.unwrap_or(Size::COMPRESSED.width),
			height: self.height.unwrap_or(Size::COMPRESSED.height),
		}
	}
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("invalid color {input:?}: expected \"#RRGGBB\"")]
pub struct ColorParseError {
	pub input: String,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}
impl Rgb {
	pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

	#[must_use]
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	#[must_use]
	pub fn hex_upper(self) -> String {
		format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
	}
}

impl FromStr for Rgb {
	type Err = ColorParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ColorParseError { input: s.to_owned() };
		let digits = s.strip_prefix('#').ok_or_else(err)?;

		if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
			return Err(err());
		}

		let channel = |range: Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| err());

		Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
	}
}

impl Serialize for Rgb {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.hex_upper())
	}
}

impl<'de> Deserialize<'de> for Rgb {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

use std::{
	fmt, fs,
	path::{Path, PathBuf},
	str::FromStr,
};

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
	capability::Platform,
	render::Fill,
	state::{Alignment, ColorParseError, Rgb},
};

const CONFIG_FILE_NAME: &str = "masking-tape.toml";

/// Captured-channel fallback used when no replacement is supplied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaceholderColor {
	Solid(Rgb),
	Clear,
}
impl PlaceholderColor {
	#[must_use]
	pub const fn fill(self) -> Fill {
		match self {
			Self::Solid(rgb) => Fill::Solid(rgb),
			Self::Clear => Fill::Clear,
		}
	}
}

impl Default for PlaceholderColor {
	fn default() -> Self {
		Self::Solid(Rgb::WHITE)
	}
}

impl fmt::Display for PlaceholderColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Solid(rgb) => f.write_str(&rgb.hex_upper()),
			Self::Clear => f.write_str("clear"),
		}
	}
}

impl FromStr for PlaceholderColor {
	type Err = ColorParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("clear") {
			return Ok(Self::Clear);
		}

		s.parse().map(Self::Solid)
	}
}

impl Serialize for PlaceholderColor {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for PlaceholderColor {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskingConfig {
	/// Overrides host platform detection.
	#[serde(default)]
	pub platform: Option<Platform>,
	#[serde(default)]
	pub placeholder: PlaceholderColor,
	#[serde(default)]
	pub alignment: Alignment,
	#[serde(default)]
	pub watermark_alignment: Alignment,
}
impl MaskingConfig {
	/// Reads the user config, falling back to defaults when it is missing or unreadable.
	#[must_use]
	pub fn load() -> Self {
		let Some(path) = Self::path() else {
			return Self::default();
		};

		if !path.exists() {
			return Self::default();
		}

		match Self::load_from(&path) {
			Ok(config) => config,
			Err(err) => {
				tracing::warn!(
					error = %format!("{err:#}"),
					path = %path.display(),
					"Ignoring unreadable masking-tape config."
				);

				Self::default()
			},
		}
	}

	pub fn load_from(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.wrap_err_with(|| format!("failed to read config at {}", path.display()))?;

		Self::from_toml_str(&raw).wrap_err_with(|| format!("invalid config at {}", path.display()))
	}

	pub fn from_toml_str(raw: &str) -> Result<Self> {
		toml::from_str(raw).wrap_err("failed to parse masking-tape TOML")
	}

	#[must_use]
	pub fn path() -> Option<PathBuf> {
		let dirs = ProjectDirs::from("ink", "hack", "masking-tape")?;

		Some(dirs.config_dir().join(CONFIG_FILE_NAME))
	}
}

#[cfg(test)]
mod tests {
	use std::{fs, path::PathBuf};

	use crate::capability::Platform;
	use crate::config::{MaskingConfig, PlaceholderColor};
	use crate::render::Fill;
	use crate::state::{Alignment, Rgb};

	#[test]
	fn empty_toml_is_default() {
		let config = MaskingConfig::from_toml_str("").unwrap();

		assert_eq!(config, MaskingConfig::default());
		assert_eq!(config.placeholder.fill(), Fill::Solid(Rgb::WHITE));
		assert_eq!(config.alignment, Alignment::Center);
	}

	#[test]
	fn parses_every_field() {
		let config = MaskingConfig::from_toml_str(
			r##"
platform = "ios"
placeholder = "#202124"
alignment = "top_leading"
watermark_alignment = "bottom_trailing"
"##,
		)
		.unwrap();

		assert_eq!(config.platform, Some(Platform::Ios));
		assert_eq!(config.placeholder, PlaceholderColor::Solid(Rgb::new(0x20, 0x21, 0x24)));
		assert_eq!(config.alignment, Alignment::TopLeading);
		assert_eq!(config.watermark_alignment, Alignment::BottomTrailing);
	}

	#[test]
	fn clear_placeholder_and_bad_colors() {
		let clear = MaskingConfig::from_toml_str(r#"placeholder = "clear""#).unwrap();

		assert_eq!(clear.placeholder, PlaceholderColor::Clear);
		assert!(MaskingConfig::from_toml_str(r#"placeholder = "white""#).is_err());
		assert!(MaskingConfig::from_toml_str(r#"platform = "amiga""#).is_err());
	}

	#[test]
	fn serializes_back_to_toml() {
		let config = MaskingConfig {
			platform: Some(Platform::MacOs),
			placeholder: PlaceholderColor::Clear,
			..MaskingConfig::default()
		};
		let raw = toml::to_string(&config).unwrap();

		assert!(raw.contains(r#"platform = "macos""#));
		assert!(raw.contains(r#"placeholder = "clear""#));
		assert_eq!(MaskingConfig::from_toml_str(&raw).unwrap(), config);
	}

	#[test]
	fn load_from_reports_missing_file() {
		let path = PathBuf::from("/nonexistent/masking-tape/masking-tape.toml");
		let err = MaskingConfig::load_from(&path).unwrap_err();

		assert!(format!("{err:#}").contains("failed to read config"));
	}

	#[test]
	fn load_from_reads_file() {
		let path = std::env::temp_dir()
			.join(format!("masking-tape-config-{}.toml", std::process::id()));

		fs::write(&path, "watermark_alignment = \"top\"\n").unwrap();

		let config = MaskingConfig::load_from(&path).unwrap();

		fs::remove_file(&path).unwrap();

		assert_eq!(config.watermark_alignment, Alignment::Top);
	}
}

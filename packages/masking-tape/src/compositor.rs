use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
	capability::{HostCapabilities, ProtectionStrategy, host_capabilities},
	config::MaskingConfig,
	render::{Channel, Fill, Renderer, Scene},
	state::{Alignment, Size, SizeProposal, SurfaceId},
};

#[derive(Debug, Error)]
pub enum ExtractionError {
	#[error("protected layer primitive is not available on this platform")]
	Unavailable,

	#[error("secure container missing from platform view hierarchy: {detail}")]
	MissingContainer { detail: String },
}

#[derive(Debug, Error)]
pub enum ExclusionError {
	#[error("surface capture exclusion is not supported on this platform")]
	Unsupported,

	#[error("no surface registered for {surface}")]
	SurfaceNotFound { surface: SurfaceId },

	#[error("window handle unavailable: {0}")]
	Handle(#[from] raw_window_handle::HandleError),

	#[error("platform rejected capture exclusion for {surface} (code {code})")]
	Rejected { surface: SurfaceId, code: u32 },
}

/// A platform layer that is rendered live but omitted from captured output.
pub trait ProtectedLayer {
	/// Whether the platform presents this layer in `channel`.
	fn presents_in(&self, channel: Channel) -> bool;
}

/// Establishes protected layers; extraction depends on platform internals and may fail.
pub trait ProtectedLayerPrimitive {
	fn establish(&self) -> Result<Box<dyn ProtectedLayer>, ExtractionError>;
}

/// Primitive for hosts that never provide a protected layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailablePrimitive;

impl ProtectedLayerPrimitive for UnavailablePrimitive {
	fn establish(&self) -> Result<Box<dyn ProtectedLayer>, ExtractionError> {
		Err(ExtractionError::Unavailable)
	}
}

/// Marks a whole surface as excluded from capture. Marking is permanent for the surface.
pub trait SurfaceExcluder {
	fn exclude_from_capture(&mut self, surface: SurfaceId) -> Result<(), ExclusionError>;
}

enum Replacement {
	Placeholder,
	Custom(Box<dyn Renderer>),
	Blank,
}

/// Builds [`CompositionNode`]s for the host's protection strategy.
pub struct Compositor {
	strategy: ProtectionStrategy,
	primitive: Box<dyn ProtectedLayerPrimitive>,
	placeholder: Fill,
	alignment: Alignment,
}
impl Compositor {
	#[must_use]
	pub fn new(capabilities: HostCapabilities, primitive: Box<dyn ProtectedLayerPrimitive>) -> Self {
		Self {
			strategy: capabilities.strategy,
			primitive,
			placeholder: MaskingConfig::default().placeholder.fill(),
			alignment: Alignment::Center,
		}
	}

	/// Uses the process-wide host capabilities and the user config.
	#[must_use]
	pub fn for_host(primitive: Box<dyn ProtectedLayerPrimitive>) -> Self {
		let config = MaskingConfig::load();

		Self::new(*host_capabilities(), primitive)
			.with_placeholder(config.placeholder.fill())
			.with_alignment(config.alignment)
	}

	#[must_use]
	pub fn from_config(config: &MaskingConfig, primitive: Box<dyn ProtectedLayerPrimitive>) -> Self {
		Self::new(HostCapabilities::from_config(config), primitive)
			.with_placeholder(config.placeholder.fill())
			.with_alignment(config.alignment)
	}

	#[must_use]
	pub fn with_placeholder(mut self, placeholder: Fill) -> Self {
		self.placeholder = placeholder;
		self
	}

	#[must_use]
	pub fn with_alignment(mut self, alignment: Alignment) -> Self {
		self.alignment = alignment;
		self
	}

	#[must_use]
	pub fn strategy(&self) -> ProtectionStrategy {
		self.strategy
	}

	/// Hides `live` from captures using the host strategy, showing `replacement` (or the neutral
	/// placeholder) in its place where the platform allows it.
	pub fn protect(
		&self,
		live: impl Renderer + 'static,
		replacement: Option<Box<dyn Renderer>>,
	) -> CompositionNode {
		self.compose(live, replacement, self.strategy)
	}

	/// Hides `live` from captures without showing anything in its place.
	pub fn shield(&self, live: impl Renderer + 'static) -> CompositionNode {
		self.build(Box::new(live), Replacement::Blank, self.strategy)
	}

	pub fn compose(
		&self,
		live: impl Renderer + 'static,
		replacement: Option<Box<dyn Renderer>>,
		strategy: ProtectionStrategy,
	) -> CompositionNode {
		let replacement = match replacement {
			Some(renderer) => Replacement::Custom(renderer),
			None => Replacement::Placeholder,
		};

		self.build(Box::new(live), replacement, strategy)
	}

	fn build(
		&self,
		live_content: Box<dyn Renderer>,
		replacement: Replacement,
		strategy: ProtectionStrategy,
	) -> CompositionNode {
		let default_replacement = match replacement {
			Replacement::Blank => None,
			Replacement::Placeholder | Replacement::Custom(_) => Some(self.placeholder),
		};
		let (mode, captured_replacement) = match strategy {
			ProtectionStrategy::PerComponentExclusion => match self.primitive.establish() {
				Ok(layer) => {
					let replacement: Option<Box<dyn Renderer>> = match replacement {
						Replacement::Custom(renderer) => Some(renderer),
						Replacement::Placeholder => Some(Box::new(self.placeholder)),
						Replacement::Blank => None,
					};

					(Mode::Layered(layer), replacement)
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Protected layer unavailable; rendering content unprotected."
					);

					(Mode::Passthrough, replacement.into_custom())
				},
			},
			ProtectionStrategy::WholeSurfaceExclusion => {
				let replacement = replacement.into_custom();

				if replacement.is_some() {
					tracing::debug!("Surface-wide exclusion ignores the captured replacement.");
				}

				(Mode::SurfaceShield(SurfaceShield::default()), replacement)
			},
			ProtectionStrategy::Unsupported => (Mode::Passthrough, replacement.into_custom()),
		};

		CompositionNode {
			live_content,
			captured_replacement,
			default_replacement,
			alignment: self.alignment,
			strategy,
			mode,
		}
	}
}

impl Replacement {
	fn into_custom(self) -> Option<Box<dyn Renderer>> {
		match self {
			Self::Custom(renderer) => Some(renderer),
			Self::Placeholder | Self::Blank => None,
		}
	}
}

#[derive(Debug, Default)]
struct SurfaceShield {
	current: Option<SurfaceId>,
	excluded: BTreeSet<SurfaceId>,
}
impl SurfaceShield {
	fn is_active(&self) -> bool {
		self.current.is_some_and(|surface| self.excluded.contains(&surface))
	}
}

enum Mode {
	/// Replacement beneath, protected live content above and fully covering it.
	Layered(Box<dyn ProtectedLayer>),
	SurfaceShield(SurfaceShield),
	Passthrough,
}

/// One protected region of the rendering tree.
pub struct CompositionNode {
	live_content: Box<dyn Renderer>,
	captured_replacement: Option<Box<dyn Renderer>>,
	/// What `update` restores when given no replacement; `None` for shielded nodes.
	default_replacement: Option<Fill>,
	alignment: Alignment,
	strategy: ProtectionStrategy,
	mode: Mode,
}
impl CompositionNode {
	/// The strategy that was requested at compose time.
	#[must_use]
	pub fn strategy(&self) -> ProtectionStrategy {
		self.strategy
	}

	/// The strategy actually in effect, after any fail-open fallback.
	#[must_use]
	pub fn effective_strategy(&self) -> ProtectionStrategy {
		match self.mode {
			Mode::Layered(_) => ProtectionStrategy::PerComponentExclusion,
			Mode::SurfaceShield(_) => ProtectionStrategy::WholeSurfaceExclusion,
			Mode::Passthrough => ProtectionStrategy::Unsupported,
		}
	}

	#[must_use]
	pub fn alignment(&self) -> Alignment {
		self.alignment
	}

	#[must_use]
	pub fn render(&self, channel: Channel) -> Scene {
		let mut scene = Scene::new();

		self.render_into(channel, &mut scene);

		scene
	}

	fn render_into(&self, channel: Channel, scene: &mut Scene) {
		match &self.mode {
			Mode::Layered(protected) =>
				if protected.presents_in(channel) {
					self.live_content.render(channel, scene);
				} else if let Some(replacement) = self.captured_replacement.as_ref() {
					let start = scene.len();
					let alignment = self.alignment;

					replacement.render(channel, scene);
					scene.restyle_from(start, |item| item.alignment = alignment);
				},
			Mode::SurfaceShield(shield) =>
				if channel == Channel::Live || !shield.is_active() {
					self.live_content.render(channel, scene);
				},
			Mode::Passthrough => self.live_content.render(channel, scene),
		}
	}

	/// Layout query. With no constraint at all the node defers to the content's natural size by
	/// returning `None`; otherwise the content is fitted to the constrained dimensions.
	#[must_use]
	pub fn size_that_fits(&self, proposal: SizeProposal) -> Option<Size> {
		if proposal.is_unspecified() {
			return None;
		}

		Some(self.live_content.fitted_size(proposal))
	}

	/// Called whenever the node joins a realized surface. Excludes each distinct surface once.
	pub fn join_surface(&mut self, surface: SurfaceId, excluder: &mut dyn SurfaceExcluder) {
		let Mode::SurfaceShield(shield) = &mut self.mode else {
			return;
		};

		if shield.current == Some(surface) {
			return;
		}

		shield.current = Some(surface);

		if shield.excluded.contains(&surface) {
			return;
		}

		match excluder.exclude_from_capture(surface) {
			Ok(()) => {
				shield.excluded.insert(surface);

				tracing::info!(surface = %surface, "Excluded surface from capture.");
			},
			Err(err) => tracing::warn!(
				error = %err,
				surface = %surface,
				"Failed to exclude surface from capture; content stays capturable."
			),
		}
	}

	/// Called when the node leaves its surface. Exclusion already applied stays in place.
	pub fn leave_surface(&mut self) {
		if let Mode::SurfaceShield(shield) = &mut self.mode {
			shield.current = None;
		}
	}

	/// Re-render with new content. The protected layer and surface marks are kept.
	///
	/// `replacement` is read as in [`Compositor::compose`]: `None` restores the default, which is
	/// the placeholder for protected nodes and nothing for shielded ones. The replacement is only
	/// rendered while a protected layer is in effect.
	pub fn update(
		&mut self,
		live: impl Renderer + 'static,
		replacement: Option<Box<dyn Renderer>>,
	) {
		self.live_content = Box::new(live);
		self.captured_replacement = match replacement {
			Some(renderer) => Some(renderer),
			None => self.default_replacement.map(|fill| Box::new(fill) as Box<dyn Renderer>),
		};
	}
}

impl Renderer for CompositionNode {
	fn render(&self, channel: Channel, scene: &mut Scene) {
		self.render_into(channel, scene);
	}

	fn fitted_size(&self, proposal: SizeProposal) -> Size {
		self.live_content.fitted_size(proposal)
	}
}

use std::borrow::Cow;

use crate::state::{Alignment, Rgb, Size, SizeProposal};

/// Which output a scene is produced for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Channel {
	/// What the physical display shows to the user.
	Live,
	/// What screenshots, recordings, mirroring, and screen shares receive.
	Captured,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneItem {
	pub content: Cow<'static, str>,
	pub alignment: Alignment,
	pub hit_testable: bool,
	pub accessibility_hidden: bool,
}
impl SceneItem {
	#[must_use]
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			content: content.into(),
			alignment: Alignment::Center,
			hit_testable: true,
			accessibility_hidden: false,
		}
	}
}

/// Ordered display list, back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	items: Vec<SceneItem>,
}
impl Scene {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, item: SceneItem) {
		self.items.push(item);
	}

	#[must_use]
	pub fn items(&self) -> &[SceneItem] {
		&self.items
	}

	#[must_use]
	pub fn contents(&self) -> Vec<&str> {
		self.items.iter().map(|item| item.content.as_ref()).collect()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub(crate) fn len(&self) -> usize {
		self.items.len()
	}

	/// Applies `f` to every item pushed since `start`.
	pub(crate) fn restyle_from(&mut self, start: usize, f: impl Fn(&mut SceneItem)) {
		self.items.iter_mut().skip(start).for_each(f);
	}
}

pub trait Renderer {
	fn render(&self, channel: Channel, scene: &mut Scene);

	/// Size this renderer wants for `proposal`. Open dimensions are free to take the natural size.
	fn fitted_size(&self, proposal: SizeProposal) -> Size {
		proposal.bounds()
	}
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
	fn render(&self, channel: Channel, scene: &mut Scene) {
		(**self).render(channel, scene);
	}

	fn fitted_size(&self, proposal: SizeProposal) -> Size {
		(**self).fitted_size(proposal)
	}
}

/// Text content with an intrinsic size.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	text: Cow<'static, str>,
	natural: Size,
}
impl Label {
	#[must_use]
	pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
		Self { text: text.into(), natural: Size::COMPRESSED }
	}

	#[must_use]
	pub fn with_natural_size(mut self, natural: Size) -> Self {
		self.natural = natural;
		self
	}
}

impl Renderer for Label {
	fn render(&self, _channel: Channel, scene: &mut Scene) {
		scene.push(SceneItem::new(self.text.clone()));
	}

	fn fitted_size(&self, proposal: SizeProposal) -> Size {
		let fit =
			|natural: f32, bound: Option<f32>| bound.map_or(natural, |bound| natural.min(bound));

		Size::new(
			fit(self.natural.width, proposal.width),
			fit(self.natural.height, proposal.height),
		)
	}
}

/// A flat fill covering its bounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fill {
	Solid(Rgb),
	Clear,
}

impl Renderer for Fill {
	fn render(&self, _channel: Channel, scene: &mut Scene) {
		let content = match self {
			Self::Solid(rgb) => Cow::Owned(format!("fill:{}", rgb.hex_upper())),
			Self::Clear => Cow::Borrowed("fill:clear"),
		};

		scene.push(SceneItem::new(content));
	}
}

#[cfg(test)]
mod tests {
	use crate::render::{Channel, Fill, Label, Renderer, Scene};
	use crate::state::{Rgb, Size, SizeProposal};

	#[test]
	fn leaf_renderers_ignore_channel() {
		let label = Label::new("4111 1111 1111 1111");
		let mut live = Scene::new();
		let mut captured = Scene::new();

		label.render(Channel::Live, &mut live);
		label.render(Channel::Captured, &mut captured);

		assert_eq!(live, captured);
		assert_eq!(live.contents(), vec!["4111 1111 1111 1111"]);
	}

	#[test]
	fn fill_renders_hex_or_clear() {
		let mut scene = Scene::new();

		Fill::Solid(Rgb::WHITE).render(Channel::Live, &mut scene);
		Fill::Clear.render(Channel::Live, &mut scene);

		assert_eq!(scene.contents(), vec!["fill:#FFFFFF", "fill:clear"]);
	}

	#[test]
	fn label_fits_inside_constrained_dimensions_only() {
		let label = Label::new("x").with_natural_size(Size::new(120.0, 40.0));

		assert_eq!(label.fitted_size(SizeProposal::new(Some(80.0), None)), Size::new(80.0, 40.0));
		assert_eq!(
			label.fitted_size(SizeProposal::new(Some(300.0), Some(300.0))),
			Size::new(120.0, 40.0)
		);
		assert_eq!(label.fitted_size(SizeProposal::UNSPECIFIED), Size::new(120.0, 40.0));
	}

	#[test]
	fn label_honors_zero_proposal() {
		let label = Label::new("x").with_natural_size(Size::new(120.0, 40.0));

		assert_eq!(label.fitted_size(SizeProposal::new(Some(0.0), None)), Size::new(0.0, 40.0));
		assert_eq!(label.fitted_size(SizeProposal::new(Some(0.0), Some(0.0))), Size::COMPRESSED);
	}
}

use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

use crate::{
	config::MaskingConfig,
	observer::{ObserverHandle, ObserverRegistry},
	render::{Channel, Renderer, Scene},
	source::{CaptureSignal, SurfaceDirectory},
	state::Alignment,
};

/// A watermark attached to a component, either permanent or shown only while captured.
///
/// The watermark is drawn as a plain layer, so it appears in the live and captured channels
/// alike. Reactive bindings look their observer up in an [`ObserverRegistry`] by handle.
pub struct OverlayBinding {
	always_visible: bool,
	alignment: Alignment,
	overlay: Box<dyn Renderer>,
	observer: Option<ObserverHandle>,
}
impl OverlayBinding {
	/// Shown only while the tracked surface is being captured.
	#[must_use]
	pub fn reactive(overlay: impl Renderer + 'static) -> Self {
		Self {
			always_visible: false,
			alignment: Alignment::Center,
			overlay: Box::new(overlay),
			observer: None,
		}
	}

	#[must_use]
	pub fn always_visible(overlay: impl Renderer + 'static) -> Self {
		Self { always_visible: true, ..Self::reactive(overlay) }
	}

	#[must_use]
	pub fn with_alignment(mut self, alignment: Alignment) -> Self {
		self.alignment = alignment;
		self
	}

	/// Applies the configured watermark alignment.
	#[must_use]
	pub fn configured(self, config: &MaskingConfig) -> Self {
		self.with_alignment(config.watermark_alignment)
	}

	#[must_use]
	pub fn is_always_visible(&self) -> bool {
		self.always_visible
	}

	#[must_use]
	pub fn alignment(&self) -> Alignment {
		self.alignment
	}

	#[must_use]
	pub fn observer(&self) -> Option<ObserverHandle> {
		self.observer
	}

	/// Component attach. Reactive bindings register exactly one observer; `on_visibility` gets
	/// the seeded visibility and then every flip driven by capture changes.
	pub fn attach(
		&mut self,
		observers: &mut ObserverRegistry,
		signal: &dyn CaptureSignal,
		directory: &dyn SurfaceDirectory,
		on_visibility: impl FnMut(bool) + 'static,
	) {
		if self.always_visible || self.observer.is_some() {
			return;
		}

		let visible = Rc::new(Cell::new(false));
		let hook = Rc::new(RefCell::new(on_visibility));
		let change_visible = Rc::clone(&visible);
		let change_hook = Rc::clone(&hook);
		let handle = observers.attach(
			signal,
			directory,
			|seed| {
				visible.set(seed);
				(&mut *hook.borrow_mut())(seed);
			},
			move |event| {
				if change_visible.replace(event.is_captured) != event.is_captured {
					(&mut *change_hook.borrow_mut())(event.is_captured);
				}
			},
		);

		tracing::debug!(observer = ?handle, "Watermark bound to capture observer.");

		self.observer = Some(handle);
	}

	/// Component detach. Safe to call repeatedly.
	pub fn detach(&mut self, observers: &mut ObserverRegistry) {
		if let Some(handle) = self.observer.take() {
			observers.detach(handle);
		}
	}
}

/// `always_visible || observed surface is captured`.
#[must_use]
pub fn should_show_overlay(binding: &OverlayBinding, observers: &ObserverRegistry) -> bool {
	binding.always_visible
		|| binding
			.observer
			.and_then(|handle| observers.state(handle))
			.is_some_and(|state| state.is_captured)
}

/// Content with a watermark layered on top.
pub struct WatermarkNode {
	content: Box<dyn Renderer>,
	binding: OverlayBinding,
}
impl WatermarkNode {
	#[must_use]
	pub fn new(content: impl Renderer + 'static, binding: OverlayBinding) -> Self {
		Self { content: Box::new(content), binding }
	}

	#[must_use]
	pub fn binding(&self) -> &OverlayBinding {
		&self.binding
	}

	pub fn binding_mut(&mut self) -> &mut OverlayBinding {
		&mut self.binding
	}

	#[must_use]
	pub fn render_with(&self, channel: Channel, observers: &ObserverRegistry) -> Scene {
		let mut scene = Scene::new();

		self.content.render(channel, &mut scene);

		if should_show_overlay(&self.binding, observers) {
			let start = scene.len();
			let alignment = self.binding.alignment;

			self.binding.overlay.render(channel, &mut scene);
			scene.restyle_from(start, |item| {
				item.alignment = alignment;
				item.hit_testable = false;
				item.accessibility_hidden = true;
			});
		}

		scene
	}
}

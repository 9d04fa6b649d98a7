//! View controller: applies configurations to the scene and turns user
//! input into route updates
//!
//! Rendering is one-way (configuration in, scene and form out) and never
//! writes the route. User input goes the other way: slider and text edits
//! commit immediately, while pan/zoom frames update the scene at once and are
//! forwarded, thresholded and debounced, to the [`RouteSink`].

pub mod form;
pub mod gesture;

pub use form::{advanced_modified, FormMirror};
pub use gesture::{Gesture, InteractionMode, TransformThreshold};

use std::sync::Arc;

use log::debug;

use crate::model::{ConfigUpdate, Configuration, Defaults, Kerning, ViewTransform};
use crate::rendering::Scene;
use crate::route::RouteSink;
use crate::Result;

/// Receives the raw transform on every gesture frame
pub type GestureObserver = Box<dyn Fn(&ViewTransform) + Send + Sync>;

pub struct ViewController {
    defaults: Arc<Defaults>,
    scene: Scene,
    form: FormMirror,
    mode: InteractionMode,
    threshold: TransformThreshold,
    observers: Vec<GestureObserver>,
    sink: Arc<dyn RouteSink>,
}

impl ViewController {
    pub fn new(defaults: Arc<Defaults>, scene: Scene, sink: Arc<dyn RouteSink>, epsilon: f64) -> Self {
        let form = FormMirror::new(&defaults.values);
        Self {
            defaults,
            scene,
            form,
            mode: InteractionMode::default(),
            threshold: TransformThreshold::new(epsilon),
            observers: Vec::new(),
            sink,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn form(&self) -> &FormMirror {
        &self.form
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Apply `config` to the scene and the form mirrors
    ///
    /// The applied transform becomes the threshold reference so a freshly
    /// loaded route is not echoed back.
    pub fn render(&mut self, config: &Configuration) -> Result<()> {
        self.scene.apply(config)?;
        self.form.reflect(config);
        self.threshold.reset(config.view);
        Ok(())
    }

    pub fn observe_gesture<F>(&mut self, observer: F)
    where
        F: Fn(&ViewTransform) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Feed one pan/zoom frame
    ///
    /// Returns the new raw transform, or `None` while text editing filters
    /// gestures out.
    pub fn apply_gesture(&mut self, gesture: Gesture) -> Option<ViewTransform> {
        if self.mode == InteractionMode::TextEdit {
            debug!("gesture filtered during text edit");
            return None;
        }
        let next = gesture.apply(self.scene.transform(), &self.defaults);
        self.scene.set_transform(next);
        for observer in &self.observers {
            observer(&next);
        }
        if self.threshold.admit(next) {
            self.sink.commit_debounced(ConfigUpdate::view(next.rounded(2)));
        }
        Some(next)
    }

    /// The dialog text took focus
    pub fn begin_text_edit(&mut self) {
        self.mode = InteractionMode::TextEdit;
    }

    /// Live typing inside the dialog box; committed on [`Self::end_text_edit`]
    pub fn edit_text(&mut self, text: &str) -> Result<()> {
        self.scene.set_text(text)?;
        self.form.text = text.to_string();
        Ok(())
    }

    /// The dialog text lost focus: re-enable gestures and commit the text
    pub fn end_text_edit(&mut self) {
        if self.mode == InteractionMode::TextEdit {
            self.mode = InteractionMode::Gesture;
            self.sink.commit(ConfigUpdate::text(self.scene.text()));
        }
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        let size = self.defaults.clamp_font_size(size);
        self.scene.set_font_size(size)?;
        self.form.set_font_size(size);
        self.sink.commit(ConfigUpdate::font_size(size));
        Ok(())
    }

    pub fn set_kerning(&mut self, kerning: Kerning) -> Result<()> {
        let kerning = self.defaults.clamp_kerning(kerning);
        self.scene.set_kerning(&kerning)?;
        self.form.set_kerning(kerning.clone());
        self.sink.commit(ConfigUpdate::kerning(kerning));
        Ok(())
    }

    pub fn set_alt_background(&mut self, on: bool) {
        self.form.alt_background = on;
        self.sync_overlay();
        self.sink.commit(ConfigUpdate::alt_background(on));
    }

    pub fn set_alt_background_opacity(&mut self, opacity: u8) {
        let opacity = opacity.min(100);
        self.form.alt_background_opacity = opacity;
        self.sync_overlay();
        self.sink.commit(ConfigUpdate::alt_background_opacity(opacity));
    }

    /// Open the advanced panel if `config` uses any advanced control
    pub fn init_advanced_controls(&mut self, config: &Configuration) {
        self.form.advanced_visible = advanced_modified(config, &self.defaults);
    }

    pub fn toggle_advanced_controls(&mut self) -> bool {
        self.form.toggle_advanced()
    }

    fn sync_overlay(&mut self) {
        let overlay = self
            .form
            .alt_background
            .then(|| self.form.alt_background_opacity as f64 / 100.0);
        self.scene.set_overlay(overlay);
    }
}

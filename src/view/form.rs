//! Form control mirrors: sliders, their labels and the advanced panel

use crate::model::{Configuration, Defaults, Kerning};

/// What the form controls currently display
#[derive(Debug, Clone, PartialEq)]
pub struct FormMirror {
    pub text: String,
    pub font_size: u32,
    pub font_size_label: String,
    pub kerning: Kerning,
    pub kerning_label: String,
    pub alt_background: bool,
    pub alt_background_opacity: u8,
    /// Whether the advanced controls are expanded
    pub advanced_visible: bool,
}

impl FormMirror {
    pub fn new(config: &Configuration) -> Self {
        let mut form = Self {
            text: String::new(),
            font_size: 0,
            font_size_label: String::new(),
            kerning: Kerning::default(),
            kerning_label: String::new(),
            alt_background: false,
            alt_background_opacity: 0,
            advanced_visible: false,
        };
        form.reflect(config);
        form
    }

    /// Show `config`; panel visibility is left alone
    pub fn reflect(&mut self, config: &Configuration) {
        self.text = config.text.clone();
        self.set_font_size(config.font_size);
        self.set_kerning(config.kerning.clone());
        self.alt_background = config.alt_background;
        self.alt_background_opacity = config.alt_background_opacity;
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size;
        self.font_size_label = size.to_string();
    }

    pub fn set_kerning(&mut self, kerning: Kerning) {
        self.kerning_label = kerning.label();
        self.kerning = kerning;
    }

    pub fn toggle_advanced(&mut self) -> bool {
        self.advanced_visible = !self.advanced_visible;
        self.advanced_visible
    }

    pub fn expander_label(&self) -> &'static str {
        if self.advanced_visible {
            "Less"
        } else {
            "More edit controls"
        }
    }
}

/// True when any advanced control differs from its default
pub fn advanced_modified(config: &Configuration, defaults: &Defaults) -> bool {
    let d = &defaults.values;
    config.kerning != d.kerning
        || config.alt_background != d.alt_background
        || config.alt_background_opacity != d.alt_background_opacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_updates_labels() {
        let config = Configuration {
            font_size: 31,
            kerning: Kerning::new("0.02"),
            ..Configuration::default()
        };
        let form = FormMirror::new(&config);
        assert_eq!(form.font_size_label, "31");
        assert_eq!(form.kerning_label, "0.020");
        assert_eq!(form.text, config.text);
    }

    #[test]
    fn advanced_panel_toggles() {
        let mut form = FormMirror::new(&Configuration::default());
        assert_eq!(form.expander_label(), "More edit controls");
        assert!(form.toggle_advanced());
        assert_eq!(form.expander_label(), "Less");
    }

    #[test]
    fn advanced_modified_checks_only_advanced_fields() {
        let d = Defaults::default();
        let mut config = d.values.clone();
        config.font_size = 40;
        assert!(!advanced_modified(&config, &d));
        config.alt_background = true;
        assert!(advanced_modified(&config, &d));
    }
}

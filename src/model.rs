//! Collage configuration model
//!
//! A [`Configuration`] is the single source of truth for what the scene
//! shows. Snapshots are never mutated in place: updates go through
//! [`Configuration::merged`], which returns a new snapshot that replaces the
//! old one as a whole.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pan/zoom transform of the backdrop layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    /// Zoom factor
    pub k: f64,
}

impl ViewTransform {
    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    /// Round every axis to `digits` fractional digits
    pub fn rounded(&self, digits: i32) -> Self {
        let factor = 10f64.powi(digits);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            x: round(self.x),
            y: round(self.y),
            k: round(self.k),
        }
    }

    /// True when any axis moved by more than `epsilon`
    pub fn differs_from(&self, other: &ViewTransform, epsilon: f64) -> bool {
        (self.x - other.x).abs() > epsilon
            || (self.y - other.y).abs() > epsilon
            || (self.k - other.k).abs() > epsilon
    }

    /// SVG `transform` attribute value
    pub fn to_svg_transform(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Letter-spacing in `em`, kept as the raw decimal string it arrived as
///
/// Equality and default comparison use the raw text; [`Kerning::label`]
/// gives the fixed-precision display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kerning(String);

impl Kerning {
    pub fn new(raw: impl Into<String>) -> Self {
        Kerning(raw.into())
    }

    pub fn from_em(value: f64) -> Self {
        Kerning(format!("{:.3}", value))
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the raw text is a finite decimal
    pub fn em(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// True when the spacing has no visible effect
    pub fn is_zero(&self) -> bool {
        self.em().map(|v| v == 0.0).unwrap_or(true)
    }

    /// Display form padded to three fractional digits
    pub fn label(&self) -> String {
        match self.em() {
            Some(v) => format!("{:.3}", v),
            None => self.0.clone(),
        }
    }
}

impl Default for Kerning {
    fn default() -> Self {
        Kerning::from_em(0.0)
    }
}

impl fmt::Display for Kerning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the collage shows that is worth sharing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Dialog text; may contain line breaks
    pub text: String,
    /// Font size in px
    pub font_size: u32,
    pub kerning: Kerning,
    /// Alternate background overlay toggle
    pub alt_background: bool,
    /// Overlay strength in percent, only meaningful with `alt_background`
    pub alt_background_opacity: u8,
    pub view: ViewTransform,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            text: "WHAT A HORRIBLE NIGHT TO HAVE A CURSE.".to_string(),
            font_size: 22,
            kerning: Kerning::default(),
            alt_background: false,
            alt_background_opacity: 50,
            view: ViewTransform::new(-1100.0, -150.0, 1.0),
        }
    }
}

impl Configuration {
    /// New snapshot with `update` applied over `self`
    pub fn merged(&self, update: &ConfigUpdate) -> Configuration {
        Configuration {
            text: update.text.clone().unwrap_or_else(|| self.text.clone()),
            font_size: update.font_size.unwrap_or(self.font_size),
            kerning: update.kerning.clone().unwrap_or_else(|| self.kerning.clone()),
            alt_background: update.alt_background.unwrap_or(self.alt_background),
            alt_background_opacity: update
                .alt_background_opacity
                .unwrap_or(self.alt_background_opacity),
            view: update.view.unwrap_or(self.view),
        }
    }
}

/// A partial field update destined for the route store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub text: Option<String>,
    pub font_size: Option<u32>,
    pub kerning: Option<Kerning>,
    pub alt_background: Option<bool>,
    pub alt_background_opacity: Option<u8>,
    pub view: Option<ViewTransform>,
}

impl ConfigUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn font_size(size: u32) -> Self {
        Self {
            font_size: Some(size),
            ..Default::default()
        }
    }

    pub fn kerning(kerning: Kerning) -> Self {
        Self {
            kerning: Some(kerning),
            ..Default::default()
        }
    }

    pub fn alt_background(on: bool) -> Self {
        Self {
            alt_background: Some(on),
            ..Default::default()
        }
    }

    pub fn alt_background_opacity(opacity: u8) -> Self {
        Self {
            alt_background_opacity: Some(opacity),
            ..Default::default()
        }
    }

    pub fn view(view: ViewTransform) -> Self {
        Self {
            view: Some(view),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }
}

/// The immutable defaults record shared by the codec and the view controller
///
/// Holds the default value of every field plus the bounds the sliders and
/// the zoom behaviour enforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub values: Configuration,
    /// Inclusive font size slider bounds
    pub font_size_range: (u32, u32),
    /// Inclusive kerning slider bounds in em
    pub kerning_range: (f64, f64),
    /// Inclusive zoom clamp
    pub scale_range: (f64, f64),
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            values: Configuration::default(),
            font_size_range: (10, 48),
            kerning_range: (-0.1, 0.5),
            scale_range: (1.0, 32.0),
        }
    }
}

impl Defaults {
    pub fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.scale_range.0, self.scale_range.1)
    }

    pub fn clamp_font_size(&self, size: u32) -> u32 {
        size.clamp(self.font_size_range.0, self.font_size_range.1)
    }

    pub fn scale_in_range(&self, k: f64) -> bool {
        k.is_finite() && k >= self.scale_range.0 && k <= self.scale_range.1
    }

    pub fn font_size_in_range(&self, size: u32) -> bool {
        size >= self.font_size_range.0 && size <= self.font_size_range.1
    }

    pub fn kerning_in_range(&self, kerning: &Kerning) -> bool {
        kerning
            .em()
            .map(|v| v >= self.kerning_range.0 && v <= self.kerning_range.1)
            .unwrap_or(false)
    }

    /// Clamp a kerning value into the slider range, keeping it raw when valid
    pub fn clamp_kerning(&self, kerning: Kerning) -> Kerning {
        match kerning.em() {
            Some(_) if self.kerning_in_range(&kerning) => kerning,
            Some(v) => Kerning::from_em(v.clamp(self.kerning_range.0, self.kerning_range.1)),
            None => self.values.kerning.clone(),
        }
    }
}

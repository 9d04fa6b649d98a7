//! The live collage scene
//!
//! A [`Scene`] is what is on screen: a pannable backdrop, an optional
//! darkening overlay and the dialog box holding the text. It is parameterized
//! by a [`Configuration`] but keeps its own state, and it is the scene (not
//! the configuration) that gets serialized for export.

use crate::model::{Configuration, Kerning, ViewTransform};
use crate::rendering::paint::{PaintCommand, Rgba, TextStyle};
use crate::{Error, Result};

const INK: Rgba = (255, 255, 255, 255);
const BOX_FILL: Rgba = (0, 0, 0, 255);
const LINE_HEIGHT: f64 = 1.25;
const BOX_PADDING: f64 = 16.0;
/// Average glyph advance of a monospace face, as a fraction of font size
const GLYPH_ADVANCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fixed geometry of the board
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub width: u32,
    pub height: u32,
    /// Where the dialog text lives; the scene cannot show text without it
    pub dialog_box: Option<BoxRect>,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            width: 512,
            height: 448,
            dialog_box: Some(BoxRect {
                x: 32.0,
                y: 288.0,
                width: 448.0,
                height: 128.0,
            }),
        }
    }
}

/// Text state of the dialog box anchor
#[derive(Debug, Clone, PartialEq)]
pub struct DialogText {
    pub text: String,
    pub font_size: u32,
    /// em, `None` when kerning is zero
    pub letter_spacing: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    layout: SceneLayout,
    font_family: String,
    dialog: Option<DialogText>,
    transform: ViewTransform,
    /// 0..=1, `None` hides the overlay
    overlay: Option<f64>,
}

impl Scene {
    pub fn new(layout: SceneLayout, font_family: impl Into<String>) -> Self {
        let dialog = layout.dialog_box.map(|_| DialogText {
            text: String::new(),
            font_size: 16,
            letter_spacing: None,
        });
        Self {
            layout,
            font_family: font_family.into(),
            dialog,
            transform: ViewTransform::new(0.0, 0.0, 1.0),
            overlay: None,
        }
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn has_anchor(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn dialog(&self) -> Option<&DialogText> {
        self.dialog.as_ref()
    }

    /// Text currently shown, empty without an anchor
    pub fn text(&self) -> &str {
        self.dialog.as_ref().map(|d| d.text.as_str()).unwrap_or_default()
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn overlay(&self) -> Option<f64> {
        self.overlay
    }

    /// Apply a whole configuration
    ///
    /// Fails before touching anything when the dialog anchor is missing.
    pub fn apply(&mut self, config: &Configuration) -> Result<()> {
        let dialog = self.anchor_mut()?;
        dialog.text = config.text.clone();
        dialog.font_size = config.font_size;
        dialog.letter_spacing = letter_spacing(&config.kerning);
        self.transform = config.view;
        self.overlay = config
            .alt_background
            .then(|| config.alt_background_opacity as f64 / 100.0);
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.anchor_mut()?.text = text.to_string();
        Ok(())
    }

    pub fn set_font_size(&mut self, font_size: u32) -> Result<()> {
        self.anchor_mut()?.font_size = font_size;
        Ok(())
    }

    pub fn set_kerning(&mut self, kerning: &Kerning) -> Result<()> {
        self.anchor_mut()?.letter_spacing = letter_spacing(kerning);
        Ok(())
    }

    pub fn set_overlay(&mut self, opacity: Option<f64>) {
        self.overlay = opacity.map(|o| o.clamp(0.0, 1.0));
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    fn anchor_mut(&mut self) -> Result<&mut DialogText> {
        self.dialog
            .as_mut()
            .ok_or(Error::MissingSceneAnchor("dialog text"))
    }

    /// Paint commands in back-to-front order
    pub fn paint_commands(&self) -> Vec<PaintCommand> {
        let (w, h) = (self.layout.width as f64, self.layout.height as f64);
        let mut commands = vec![PaintCommand::SolidRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            rgba: (0, 0, 0, 255),
            stroke: None,
        }];

        commands.push(PaintCommand::Group {
            class: "zoom-layer",
            transform: Some(self.transform.to_svg_transform()),
            children: backdrop(),
        });

        if let Some(opacity) = self.overlay {
            commands.push(PaintCommand::SolidRect {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
                rgba: (0, 0, 0, (opacity * 255.0).round() as u8),
                stroke: None,
            });
        }

        if let (Some(rect), Some(dialog)) = (self.layout.dialog_box, &self.dialog) {
            let style = TextStyle {
                font_family: self.font_family.clone(),
                font_size: dialog.font_size,
                letter_spacing: dialog.letter_spacing,
                line_height: LINE_HEIGHT,
                rgba: INK,
            };
            let advance = dialog.font_size as f64 * (GLYPH_ADVANCE + dialog.letter_spacing.unwrap_or(0.0));
            let inner = rect.width - BOX_PADDING * 2.0;
            let max_chars = if advance > 0.0 { (inner / advance).floor().max(1.0) as usize } else { usize::MAX };
            commands.push(PaintCommand::Group {
                class: "dialog",
                transform: None,
                children: vec![
                    PaintCommand::SolidRect {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height,
                        rgba: BOX_FILL,
                        stroke: Some((INK, 4.0)),
                    },
                    PaintCommand::Text {
                        x: rect.x + BOX_PADDING,
                        y: rect.y + BOX_PADDING + dialog.font_size as f64,
                        lines: wrap_text(&dialog.text, max_chars),
                        style,
                    },
                ],
            });
        }

        commands
    }

    /// Serialize to a self-contained SVG document
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.layout.width, self.layout.height);
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"board\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
        );
        for command in self.paint_commands() {
            command.write_svg(&mut out, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn letter_spacing(kerning: &Kerning) -> Option<f64> {
    if kerning.is_zero() {
        None
    } else {
        kerning.em()
    }
}

/// Break text into lines of at most `max_chars`, keeping explicit breaks
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut cur = String::new();
        for word in paragraph.split_whitespace() {
            if !cur.is_empty() && cur.chars().count() + word.chars().count() + 1 > max_chars {
                lines.push(std::mem::take(&mut cur));
            }
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
        lines.push(cur);
    }
    lines
}

/// Night landscape drawn in world coordinates under the zoom layer
fn backdrop() -> Vec<PaintCommand> {
    let mut art = vec![
        PaintCommand::SolidRect {
            x: 0.0,
            y: 0.0,
            width: 2400.0,
            height: 900.0,
            rgba: (16, 20, 64, 255),
            stroke: None,
        },
        PaintCommand::Circle {
            cx: 1420.0,
            cy: 250.0,
            r: 56.0,
            rgba: (240, 232, 176, 255),
        },
    ];
    for (i, (x, y)) in [(1160.0, 190.0), (1250.0, 320.0), (1330.0, 180.0), (1520.0, 210.0), (1580.0, 330.0), (1210.0, 250.0)]
        .into_iter()
        .enumerate()
    {
        art.push(PaintCommand::Circle {
            cx: x,
            cy: y,
            r: if i % 2 == 0 { 2.0 } else { 1.5 },
            rgba: (255, 255, 255, 200),
        });
    }
    art.push(PaintCommand::Path {
        d: "M0 560 Q 600 440 1200 540 T 2400 520 L 2400 900 L 0 900 Z".into(),
        rgba: (24, 48, 32, 255),
    });
    art.push(PaintCommand::Path {
        d: "M1180 540 L1180 400 L1200 400 L1200 380 L1220 380 L1220 400 L1260 400 L1260 330 \
            L1280 300 L1300 330 L1300 400 L1340 400 L1340 380 L1360 380 L1360 400 L1380 400 L1380 540 Z"
            .into(),
        rgba: (8, 8, 16, 255),
    });
    art.push(PaintCommand::SolidRect {
        x: 0.0,
        y: 600.0,
        width: 2400.0,
        height: 300.0,
        rgba: (40, 28, 20, 255),
        stroke: None,
    });
    art
}

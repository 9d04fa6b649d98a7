//! Paint primitives the scene is built from, and their SVG form

use std::fmt::Write;

pub type Rgba = (u8, u8, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    /// px
    pub font_size: u32,
    /// em; `None` leaves the font's own spacing
    pub letter_spacing: Option<f64>,
    pub line_height: f64,
    pub rgba: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rgba: Rgba,
        stroke: Option<(Rgba, f64)>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        rgba: Rgba,
    },
    Path {
        d: String,
        rgba: Rgba,
    },
    Text {
        x: f64,
        y: f64,
        lines: Vec<String>,
        style: TextStyle,
    },
    Group {
        class: &'static str,
        transform: Option<String>,
        children: Vec<PaintCommand>,
    },
}

impl PaintCommand {
    /// Append this command as SVG markup
    pub fn write_svg(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        // writing into a String cannot fail
        let _ = match self {
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
                stroke,
            } => {
                let stroke_attrs = match stroke {
                    Some((color, w)) => format!(
                        r#" stroke="{}" stroke-opacity="{}" stroke-width="{}""#,
                        hex(*color),
                        alpha(*color),
                        w
                    ),
                    None => String::new(),
                };
                writeln!(
                    out,
                    r#"{pad}<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" fill-opacity="{}"{stroke_attrs}/>"#,
                    hex(*rgba),
                    alpha(*rgba),
                )
            }
            PaintCommand::Circle { cx, cy, r, rgba } => writeln!(
                out,
                r#"{pad}<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}" fill-opacity="{}"/>"#,
                hex(*rgba),
                alpha(*rgba),
            ),
            PaintCommand::Path { d, rgba } => writeln!(
                out,
                r#"{pad}<path d="{d}" fill="{}" fill-opacity="{}"/>"#,
                hex(*rgba),
                alpha(*rgba),
            ),
            PaintCommand::Text { x, y, lines, style } => {
                let spacing = match style.letter_spacing {
                    Some(em) => format!(r#" letter-spacing="{}em""#, em),
                    None => String::new(),
                };
                let _ = writeln!(
                    out,
                    r#"{pad}<text class="dialog-text" x="{x}" y="{y}" font-family="{}" font-size="{}" fill="{}"{spacing} xml:space="preserve">"#,
                    escape_xml(&style.font_family),
                    style.font_size,
                    hex(style.rgba),
                );
                let step = style.font_size as f64 * style.line_height;
                for (i, line) in lines.iter().enumerate() {
                    let dy = if i == 0 { 0.0 } else { step };
                    let _ = writeln!(
                        out,
                        r#"{pad}  <tspan x="{x}" dy="{dy}">{}</tspan>"#,
                        escape_xml(line)
                    );
                }
                writeln!(out, "{pad}</text>")
            }
            PaintCommand::Group {
                class,
                transform,
                children,
            } => {
                let transform_attr = match transform {
                    Some(t) => format!(r#" transform="{}""#, t),
                    None => String::new(),
                };
                let _ = writeln!(out, r#"{pad}<g class="{class}"{transform_attr}>"#);
                for child in children {
                    child.write_svg(out, depth + 1);
                }
                writeln!(out, "{pad}</g>")
            }
        };
    }
}

/// Escape markup-significant characters
///
/// Other characters pass through untouched, so text that XML cannot carry
/// (control characters) still makes the serialized scene undecodable.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn hex((r, g, b, _): Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn alpha((_, _, _, a): Rgba) -> String {
    let a = a as f64 / 255.0;
    format!("{}", (a * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_serializes_fill_and_stroke() {
        let cmd = PaintCommand::SolidRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rgba: (255, 0, 0, 255),
            stroke: Some(((255, 255, 255, 255), 2.0)),
        };
        let mut out = String::new();
        cmd.write_svg(&mut out, 0);
        assert!(out.contains(r##"fill="#ff0000""##));
        assert!(out.contains(r#"fill-opacity="1""#));
        assert!(out.contains(r#"stroke-width="2""#));
    }

    #[test]
    fn text_escapes_and_splits_lines() {
        let cmd = PaintCommand::Text {
            x: 4.0,
            y: 20.0,
            lines: vec!["a < b".into(), "\"c\" & d".into()],
            style: TextStyle {
                font_family: "monospace".into(),
                font_size: 20,
                letter_spacing: Some(0.05),
                line_height: 1.25,
                rgba: (255, 255, 255, 255),
            },
        };
        let mut out = String::new();
        cmd.write_svg(&mut out, 1);
        assert!(out.contains("a &lt; b"));
        assert!(out.contains("&quot;c&quot; &amp; d"));
        assert!(out.contains(r#"letter-spacing="0.05em""#));
        assert!(out.contains(r#"dy="25""#));
    }

    #[test]
    fn group_nests_children() {
        let cmd = PaintCommand::Group {
            class: "zoom-layer",
            transform: Some("translate(1,2) scale(3)".into()),
            children: vec![PaintCommand::Circle {
                cx: 1.0,
                cy: 1.0,
                r: 1.0,
                rgba: (0, 0, 0, 128),
            }],
        };
        let mut out = String::new();
        cmd.write_svg(&mut out, 0);
        assert!(out.starts_with(r#"<g class="zoom-layer" transform="translate(1,2) scale(3)">"#));
        assert!(out.contains(r#"fill-opacity="0.502""#));
        assert!(out.trim_end().ends_with("</g>"));
    }
}

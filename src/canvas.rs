use askama::Template;

use crate::colors::Color;
use crate::error::{Error, Result};

/// Axis-aligned rectangle in pixel coordinates, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// True when there is nothing to draw: a non-positive or non-finite extent.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
            || !self.width().is_finite()
            || !self.height().is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    pub stroke_width: f32,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
        }
    }

    pub fn stroke(color: Color, stroke_width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width,
        }
    }
}

/// Drawing surface a widget renders onto.
pub trait Canvas {
    fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint);
    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint);
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    RoundRect {
        rect: Rect,
        rx: f32,
        ry: f32,
        paint: Paint,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        paint: Paint,
    },
    Rect {
        rect: Rect,
        paint: Paint,
    },
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        paint: Paint,
    },
}

/// Canvas that keeps every draw call, in order.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) {
        self.commands.push(DrawCommand::RoundRect {
            rect,
            rx,
            ry,
            paint: *paint,
        });
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            paint: *paint,
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect { rect, paint: *paint });
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Line {
            x0,
            y0,
            x1,
            y1,
            paint: *paint,
        });
    }
}

#[derive(Debug, Clone)]
enum SvgShape {
    Rect {
        x: String,
        y: String,
        w: String,
        h: String,
        rx: String,
        ry: String,
        fill: String,
        opacity: String,
    },
    Circle {
        cx: String,
        cy: String,
        r: String,
        fill: String,
        opacity: String,
    },
    Line {
        x1: String,
        y1: String,
        x2: String,
        y2: String,
        stroke: String,
        stroke_width: String,
        opacity: String,
    },
}

#[derive(Template)]
#[template(path = "thermometer.svg")]
struct SvgTemplate {
    width: u32,
    height: u32,
    shapes: Vec<SvgShape>,
}

fn px(value: f32) -> String {
    format!("{:.2}", value)
}

/// Canvas that builds an SVG document.
#[derive(Debug)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    shapes: Vec<SvgShape>,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<String> {
        SvgTemplate {
            width: self.width,
            height: self.height,
            shapes: self.shapes,
        }
        .render()
        .map_err(|e| Error::Render(format!("Failed to render SVG template: {}", e)))
    }

    fn push_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) {
        self.shapes.push(SvgShape::Rect {
            x: px(rect.left),
            y: px(rect.top),
            w: px(rect.width()),
            h: px(rect.height()),
            rx: px(rx),
            ry: px(ry),
            fill: paint.color.rgb_hex(),
            opacity: px(paint.color.opacity()),
        });
    }
}

impl Canvas for SvgCanvas {
    fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) {
        self.push_rect(rect, rx, ry, paint);
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        self.shapes.push(SvgShape::Circle {
            cx: px(cx),
            cy: px(cy),
            r: px(radius),
            fill: paint.color.rgb_hex(),
            opacity: px(paint.color.opacity()),
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.push_rect(rect, 0.0, 0.0, paint);
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint) {
        self.shapes.push(SvgShape::Line {
            x1: px(x0),
            y1: px(y0),
            x2: px(x1),
            y2: px(y1),
            stroke: paint.color.rgb_hex(),
            stroke_width: px(paint.stroke_width),
            opacity: px(paint.color.opacity()),
        });
    }
}

/// Convert SVG to PNG with the specified scale
pub fn svg_to_png(svg_data: &str, scale: f32) -> Result<Vec<u8>> {
    use tiny_skia::{Pixmap, Transform};

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_data, &opts)
        .map_err(|e| Error::Render(format!("Failed to parse SVG: {}", e)))?;

    let size = tree.size();
    let width = (size.width() * scale) as u32;
    let height = (size.height() * scale) as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("Failed to create {}x{} pixmap", width, height)))?;

    let transform = if scale != 1.0 {
        Transform::from_scale(scale, scale)
    } else {
        Transform::identity()
    };

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    tracing::debug!(width, height, "Rasterized gauge SVG");

    pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("Failed to encode PNG: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::parse("red").unwrap()
    }

    #[test]
    fn test_rect_emptiness() {
        assert!(!Rect::from_ltrb(0.0, 0.0, 10.0, 5.0).is_empty());
        assert!(Rect::from_ltrb(0.0, 5.0, 10.0, 5.0).is_empty());
        assert!(Rect::from_ltrb(0.0, 6.0, 10.0, 5.0).is_empty());
        assert!(Rect::from_ltrb(0.0, f32::NAN, 10.0, 5.0).is_empty());
        assert!(Rect::from_ltrb(0.0, f32::NEG_INFINITY, 10.0, 5.0).is_empty());
    }

    #[test]
    fn test_recording_canvas_keeps_order() {
        let mut canvas = RecordingCanvas::new();
        let paint = Paint::fill(red());
        canvas.draw_circle(1.0, 2.0, 3.0, &paint);
        canvas.draw_rect(Rect::from_ltrb(0.0, 0.0, 1.0, 1.0), &paint);

        let commands = canvas.take_commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], DrawCommand::Circle { radius, .. } if radius == 3.0));
        assert!(matches!(commands[1], DrawCommand::Rect { .. }));
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn test_svg_canvas_emits_shapes_in_order() {
        let mut canvas = SvgCanvas::new(40, 80);
        canvas.draw_round_rect(
            Rect::from_ltrb(10.0, 0.0, 30.0, 60.0),
            10.0,
            10.0,
            &Paint::fill(red()),
        );
        canvas.draw_circle(20.0, 60.0, 20.0, &Paint::fill(red()));
        canvas.draw_line(0.0, 5.0, 10.0, 5.0, &Paint::stroke(red(), 2.0));
        let svg = canvas.finish().unwrap();

        assert!(svg.contains(r#"width="40""#));
        assert!(svg.contains(r#"viewBox="0 0 40 80""#));
        let rect = svg.find("<rect").unwrap();
        let circle = svg.find("<circle").unwrap();
        let line = svg.find("<line").unwrap();
        assert!(rect < circle && circle < line);
        assert!(svg.contains(r#"rx="10.00""#));
        assert!(svg.contains(r#"r="20.00""#));
        assert!(svg.contains(r#"stroke-width="2.00""#));
        assert!(svg.contains("#FF0000"));
    }

    #[test]
    fn test_svg_to_png_produces_png() {
        let mut canvas = SvgCanvas::new(20, 30);
        canvas.draw_circle(10.0, 15.0, 8.0, &Paint::fill(red()));
        let svg = canvas.finish().unwrap();

        let png = svg_to_png(&svg, 2.0).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_svg_to_png_rejects_garbage() {
        assert!(matches!(svg_to_png("not svg", 1.0), Err(Error::Render(_))));
    }
}

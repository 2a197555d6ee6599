//! Thermometer gauge widget.
//!
//! The gauge is drawn as three layers, each a rounded tube sitting on a
//! circular bulb:
//! - outer: the border
//! - middle: the background
//! - inner: the fill, whose top edge tracks the current temperature
//!
//! A ruler of tick marks is drawn to the left of the tube.

use crate::canvas::{Canvas, Paint, Rect};
use crate::config::GaugeAttributes;

pub const MIN_TEMP: f32 = -30.0;
pub const MAX_TEMP: f32 = 50.0;
pub const RANGE_TEMP: f32 = MAX_TEMP - MIN_TEMP;
pub const DEFAULT_TEMP: f32 = 20.0;

/// Horizontal length of a tick mark.
pub const DEGREE_WIDTH: f32 = 20.0;
pub const DEGREE_STROKE_WIDTH: f32 = 2.0;
pub const TICK_DIVISIONS: u32 = 8;

// Gap between the outer and middle layers, then between middle and inner.
const MIDDLE_GAP: f32 = 5.0;
const INNER_GAP: f32 = 10.0;
// Margin trimmed from both ends of the fill's travel.
const EFFECT_MARGIN: f32 = 10.0;

/// A surface the host can draw and restyle.
pub trait Drawable {
    fn render(&self, canvas: &mut dyn Canvas, width: f32, height: f32);
    fn on_attributes_changed(&mut self, attributes: GaugeAttributes);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub circle_radius: f32,
    /// Half the tube width.
    pub rect_radius: f32,
    pub paint: Paint,
}

/// Geometry of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeLayout {
    pub center_x: f32,
    pub center_y: f32,
    pub outer_start_y: f32,
    pub middle_start_y: f32,
    pub effect_start_y: f32,
    pub effect_end_y: f32,
    pub effective_height: f32,
    pub inner_start_y: f32,
    pub outer_tube: Rect,
    pub middle_tube: Rect,
    /// `None` when the fill has no travel or no area.
    pub fill: Option<Rect>,
    /// Y of each tick mark, top to bottom. Empty when the fill has no travel.
    pub ticks: Vec<f32>,
    pub tick_start_x: f32,
    pub tick_end_x: f32,
}

#[derive(Debug, Clone)]
pub struct Thermometer {
    attributes: GaugeAttributes,
    outer: Layer,
    middle: Layer,
    inner: Layer,
    degree_paint: Paint,
    current_temp: f32,
    redraw_requested: bool,
}

impl Thermometer {
    pub fn new(attributes: GaugeAttributes) -> Self {
        let (outer, middle, inner, degree_paint) = derive_layers(&attributes);
        Self {
            attributes,
            outer,
            middle,
            inner,
            degree_paint,
            current_temp: DEFAULT_TEMP,
            redraw_requested: true,
        }
    }

    pub fn current_temperature(&self) -> f32 {
        self.current_temp
    }

    /// Stores `value` clamped to `[MIN_TEMP, MAX_TEMP]` and requests a redraw.
    /// NaN is treated as below range.
    pub fn set_current_temperature(&mut self, value: f32) {
        self.current_temp = if value.is_nan() {
            MIN_TEMP
        } else {
            value.clamp(MIN_TEMP, MAX_TEMP)
        };
        self.invalidate();
    }

    pub fn attributes(&self) -> &GaugeAttributes {
        &self.attributes
    }

    pub fn outer(&self) -> &Layer {
        &self.outer
    }

    pub fn middle(&self) -> &Layer {
        &self.middle
    }

    pub fn inner(&self) -> &Layer {
        &self.inner
    }

    pub fn degree_paint(&self) -> &Paint {
        &self.degree_paint
    }

    pub fn invalidate(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns whether a redraw was requested since the last call, and clears the request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::replace(&mut self.redraw_requested, false)
    }

    pub fn layout(&self, width: f32, height: f32) -> GaugeLayout {
        let center_x = width / 2.0;
        let center_y = height - self.outer.circle_radius;

        let outer_start_y = 0.0;
        let middle_start_y = outer_start_y + MIDDLE_GAP;

        let effect_start_y = middle_start_y + self.middle.rect_radius + EFFECT_MARGIN;
        let effect_end_y = center_y - self.outer.circle_radius - EFFECT_MARGIN;
        let effective_height = effect_end_y - effect_start_y;
        let inner_start_y =
            effect_start_y + (self.current_temp - MIN_TEMP) / RANGE_TEMP * effective_height;

        let tube = |layer: &Layer, top: f32| {
            Rect::from_ltrb(
                center_x - layer.rect_radius,
                top,
                center_x + layer.rect_radius,
                center_y,
            )
        };

        let has_travel = effective_height > 0.0 && effective_height.is_finite();
        let fill = Some(tube(&self.inner, inner_start_y)).filter(|r| has_travel && !r.is_empty());

        let ticks = if has_travel {
            let step = effective_height / TICK_DIVISIONS as f32;
            (0..=TICK_DIVISIONS)
                .map(|i| effect_start_y + step * i as f32)
                .collect()
        } else {
            Vec::new()
        };

        GaugeLayout {
            center_x,
            center_y,
            outer_start_y,
            middle_start_y,
            effect_start_y,
            effect_end_y,
            effective_height,
            inner_start_y,
            outer_tube: tube(&self.outer, outer_start_y),
            middle_tube: tube(&self.middle, middle_start_y),
            fill,
            ticks,
            tick_start_x: center_x - self.outer.rect_radius - DEGREE_WIDTH,
            tick_end_x: center_x - self.outer.rect_radius,
        }
    }
}

impl Default for Thermometer {
    fn default() -> Self {
        Self::new(GaugeAttributes::default())
    }
}

impl Drawable for Thermometer {
    fn render(&self, canvas: &mut dyn Canvas, width: f32, height: f32) {
        let layout = self.layout(width, height);
        let (cx, cy) = (layout.center_x, layout.center_y);

        for (layer, tube) in [
            (&self.outer, layout.outer_tube),
            (&self.middle, layout.middle_tube),
        ] {
            if !tube.is_empty() {
                canvas.draw_round_rect(tube, layer.rect_radius, layer.rect_radius, &layer.paint);
            }
            draw_bulb(canvas, cx, cy, layer);
        }

        if let Some(fill) = layout.fill {
            canvas.draw_rect(fill, &self.inner.paint);
        }
        draw_bulb(canvas, cx, cy, &self.inner);

        for &y in &layout.ticks {
            canvas.draw_line(layout.tick_start_x, y, layout.tick_end_x, y, &self.degree_paint);
        }

        tracing::trace!(
            temperature = self.current_temp,
            inner_start_y = layout.inner_start_y,
            ticks = layout.ticks.len(),
            "Rendered thermometer"
        );
    }

    fn on_attributes_changed(&mut self, attributes: GaugeAttributes) {
        let (outer, middle, inner, degree_paint) = derive_layers(&attributes);
        self.outer = outer;
        self.middle = middle;
        self.inner = inner;
        self.degree_paint = degree_paint;
        self.attributes = attributes;
        tracing::debug!(radius = self.attributes.radius, "Thermometer attributes changed");
        self.invalidate();
    }
}

fn draw_bulb(canvas: &mut dyn Canvas, cx: f32, cy: f32, layer: &Layer) {
    if layer.circle_radius > 0.0 && cx.is_finite() && cy.is_finite() {
        canvas.draw_circle(cx, cy, layer.circle_radius, &layer.paint);
    }
}

fn derive_layers(attributes: &GaugeAttributes) -> (Layer, Layer, Layer, Paint) {
    let outer = Layer {
        circle_radius: attributes.radius,
        // the tube is half as wide as the bulb
        rect_radius: attributes.radius / 2.0,
        paint: Paint::fill(attributes.outer_color),
    };
    let middle = Layer {
        circle_radius: outer.circle_radius - MIDDLE_GAP,
        rect_radius: outer.rect_radius - MIDDLE_GAP,
        paint: Paint::fill(attributes.middle_color),
    };
    let inner = Layer {
        circle_radius: middle.circle_radius - INNER_GAP,
        rect_radius: middle.rect_radius - INNER_GAP,
        paint: Paint::fill(attributes.inner_color),
    };
    let degree_paint = Paint::stroke(attributes.outer_color, DEGREE_STROKE_WIDTH);

    (outer, middle, inner, degree_paint)
}

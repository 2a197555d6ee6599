//! Host screen: a slider bound to a thermometer.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::canvas::{svg_to_png, SvgCanvas};
use crate::config::GaugeAttributes;
use crate::error::Result;
use crate::thermometer::{Drawable, Thermometer, DEFAULT_TEMP, MIN_TEMP};

pub const SLIDER_MAX: i32 = 80;

/// Slider positions start at `MIN_TEMP`, so position 0 is -30 and 80 is 50.
pub fn slider_to_temperature(position: i32) -> f32 {
    position.saturating_add(MIN_TEMP as i32) as f32
}

pub fn temperature_to_slider(temperature: f32) -> i32 {
    (temperature - MIN_TEMP).round() as i32
}

type PositionHandler = Box<dyn FnMut(i32) + Send + Sync>;

/// Horizontal slider with an integer position.
///
/// `max` is the range the UI offers; positions outside it are passed through unchanged.
pub struct Slider {
    position: i32,
    max: i32,
    handlers: Vec<PositionHandler>,
}

impl Slider {
    pub fn new(max: i32, position: i32) -> Self {
        Self {
            position,
            max,
            handlers: Vec::new(),
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Registers a handler called with every new position.
    pub fn on_position_changed(&mut self, handler: impl FnMut(i32) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
        for handler in &mut self.handlers {
            handler(position);
        }
    }
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("position", &self.position)
            .field("max", &self.max)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    pub temperature: f32,
    pub position: i32,
    #[serde(flatten)]
    pub attributes: GaugeAttributes,
}

/// A thermometer with a slider driving its temperature.
#[derive(Debug)]
pub struct HostScreen {
    thermometer: Arc<RwLock<Thermometer>>,
    slider: RwLock<Slider>,
}

impl HostScreen {
    pub fn new(attributes: GaugeAttributes) -> Self {
        let thermometer = Arc::new(RwLock::new(Thermometer::new(attributes)));
        let mut slider = Slider::new(SLIDER_MAX, temperature_to_slider(DEFAULT_TEMP));

        let bound = Arc::clone(&thermometer);
        slider.on_position_changed(move |position| {
            bound
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .set_current_temperature(slider_to_temperature(position));
        });

        Self {
            thermometer,
            slider: RwLock::new(slider),
        }
    }

    pub fn slide_to(&self, position: i32) {
        tracing::debug!(position, "Slider moved");
        self.slider
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_position(position);
    }

    pub fn slider_max(&self) -> i32 {
        self.slider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .max()
    }

    /// Sets the temperature directly, leaving the slider where it is.
    pub fn set_temperature(&self, value: f32) {
        self.thermometer_mut().set_current_temperature(value);
    }

    pub fn temperature(&self) -> f32 {
        self.thermometer().current_temperature()
    }

    pub fn restyle(&self, attributes: GaugeAttributes) {
        self.thermometer_mut().on_attributes_changed(attributes);
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        let position = self
            .slider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .position();
        let thermometer = self.thermometer();

        ScreenSnapshot {
            temperature: thermometer.current_temperature(),
            position,
            attributes: thermometer.attributes().clone(),
        }
    }

    /// Whether the widget asked for a redraw since the last call.
    pub fn take_redraw_request(&self) -> bool {
        self.thermometer_mut().take_redraw_request()
    }

    pub fn render_svg(&self, width: u32, height: u32) -> Result<String> {
        let mut canvas = SvgCanvas::new(width, height);
        {
            let mut thermometer = self.thermometer_mut();
            thermometer.take_redraw_request();
            thermometer.render(&mut canvas, width as f32, height as f32);
        }
        canvas.finish()
    }

    pub fn render_png(&self, width: u32, height: u32, scale: f32) -> Result<Vec<u8>> {
        let svg = self.render_svg(width, height)?;
        svg_to_png(&svg, scale)
    }

    fn thermometer(&self) -> RwLockReadGuard<'_, Thermometer> {
        self.thermometer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn thermometer_mut(&self) -> RwLockWriteGuard<'_, Thermometer> {
        self.thermometer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HostScreen {
    fn default() -> Self {
        Self::new(GaugeAttributes::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermometer::MAX_TEMP;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_slider_position_maps_to_temperature() {
        assert_eq!(slider_to_temperature(0), -30.0);
        assert_eq!(slider_to_temperature(50), 20.0);
        assert_eq!(slider_to_temperature(80), 50.0);
        assert_eq!(temperature_to_slider(20.0), 50);
        assert_eq!(slider_to_temperature(i32::MIN), i32::MIN as f32);
    }

    #[test]
    fn test_slider_notifies_every_handler() {
        let seen = Arc::new(AtomicI32::new(-1));
        let count = Arc::new(AtomicI32::new(0));
        let mut slider = Slider::new(SLIDER_MAX, 0);

        let s = Arc::clone(&seen);
        slider.on_position_changed(move |p| s.store(p, Ordering::SeqCst));
        let c = Arc::clone(&count);
        slider.on_position_changed(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        slider.set_position(42);
        assert_eq!(slider.position(), 42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_screen_starts_at_default_temperature() {
        let screen = HostScreen::default();
        let snapshot = screen.snapshot();
        assert_eq!(snapshot.temperature, 20.0);
        assert_eq!(snapshot.position, 50);
        assert_eq!(snapshot.attributes, GaugeAttributes::default());
        assert_eq!(screen.slider_max(), SLIDER_MAX);
    }

    #[test]
    fn test_slider_at_zero_sets_minimum() {
        let screen = HostScreen::default();
        screen.slide_to(0);
        assert_eq!(screen.temperature(), -30.0);
    }

    #[test]
    fn test_slider_outside_range_is_clamped_by_widget() {
        let screen = HostScreen::default();
        screen.slide_to(500);
        assert_eq!(screen.snapshot().position, 500);
        assert_eq!(screen.temperature(), MAX_TEMP);
        screen.slide_to(-10);
        assert_eq!(screen.temperature(), -30.0);
    }

    #[test]
    fn test_slide_requests_redraw_and_render_consumes_it() {
        let screen = HostScreen::default();
        screen.render_svg(120, 400).unwrap();
        assert!(!screen.take_redraw_request());

        screen.slide_to(10);
        assert!(screen.take_redraw_request());
        assert!(!screen.take_redraw_request());
    }

    #[test]
    fn test_render_svg_contains_gauge() {
        let screen = HostScreen::new(GaugeAttributes {
            radius: 60.0,
            ..GaugeAttributes::default()
        });
        let svg = screen.render_svg(120, 400).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line").count(), 9);
    }

    #[test]
    fn test_restyle_keeps_temperature() {
        let screen = HostScreen::default();
        screen.slide_to(70);
        screen.restyle(GaugeAttributes {
            radius: 35.0,
            ..GaugeAttributes::default()
        });
        let snapshot = screen.snapshot();
        assert_eq!(snapshot.temperature, 40.0);
        assert_eq!(snapshot.attributes.radius, 35.0);
    }

    #[test]
    fn test_snapshot_serializes_flat_camel_case() {
        let json = serde_json::to_value(HostScreen::default().snapshot()).unwrap();
        assert_eq!(json["temperature"], 20.0);
        assert_eq!(json["position"], 50);
        assert_eq!(json["radius"], 20.0);
        assert_eq!(json["outerColor"], "#888888");
        assert_eq!(json["innerColor"], "#FF0000");
    }
}

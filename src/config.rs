use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::error::{Error, Result};

pub const DEFAULT_RADIUS: f32 = 20.0;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WIDTH: u32 = 120;
pub const DEFAULT_HEIGHT: u32 = 400;

/// Style attributes of a gauge, read once before the widget is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GaugeAttributes {
    pub radius: f32,
    pub outer_color: Color,
    pub middle_color: Color,
    pub inner_color: Color,
}

impl Default for GaugeAttributes {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            outer_color: Color::from_argb(0xFF88_8888),
            middle_color: Color::from_argb(0xFFFF_FFFF),
            inner_color: Color::from_argb(0xFFFF_0000),
        }
    }
}

impl GaugeAttributes {
    pub fn from_json(json: &str) -> Result<Self> {
        let attrs: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse style attributes: {}", e)))?;
        attrs.validate()?;
        Ok(attrs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading style attributes from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Small positive radii are accepted even though they produce degenerate layers.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::Config(format!(
                "radius must be a positive number, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub style_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            style_path: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            style_path: lookup("THERMOMETER_STYLE").map(PathBuf::from),
            width: parse_var(&lookup, "THERMOMETER_WIDTH")?.unwrap_or(defaults.width),
            height: parse_var(&lookup, "THERMOMETER_HEIGHT")?.unwrap_or(defaults.height),
        })
    }

    pub fn gauge_attributes(&self) -> Result<GaugeAttributes> {
        match &self.style_path {
            Some(path) => GaugeAttributes::load(path),
            None => {
                tracing::info!("THERMOMETER_STYLE not set, using default style attributes");
                Ok(GaugeAttributes::default())
            }
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("{} has invalid value '{}': {}", key, raw, e)))
        })
        .transpose()
}

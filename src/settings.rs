use crate::mapper::model::{
    Color, Map, DEFAULT_FILL_COLOR, DEFAULT_LINE_WIDTH, DEFAULT_STROKE_COLOR,
};
use crate::mapper::ImageMapperProps;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Styling and sizing defaults for the image map plus logging switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperSettings {
    #[serde(default = "default_fill_color")]
    pub fill_color: Color,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Color,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    /// Highlight areas while hovered.
    #[serde(default)]
    pub active: bool,
    /// Width the area coordinates were authored against.
    #[serde(default)]
    pub img_width: Option<f32>,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_fill_color() -> Color {
    DEFAULT_FILL_COLOR
}

fn default_stroke_color() -> Color {
    DEFAULT_STROKE_COLOR
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            line_width: default_line_width(),
            width: None,
            height: None,
            active: false,
            img_width: None,
            debug_logging: false,
            log_file: None,
        }
    }
}

impl MapperSettings {
    /// Missing or empty files yield the defaults. Invalid values are repaired.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut settings = Self::load_unchecked(path)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Like [`MapperSettings::load`] but keeps invalid values as written, so
    /// callers can start logging before [`MapperSettings::sanitize`] reports them.
    pub fn load_unchecked(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }

    /// Replaces a non-positive line width and drops non-finite dimensions.
    pub fn sanitize(&mut self) {
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            tracing::warn!(
                line_width = self.line_width,
                "invalid line width in settings; using default"
            );
            self.line_width = default_line_width();
        }
        for dim in [&mut self.width, &mut self.height, &mut self.img_width] {
            if dim.is_some_and(|v| !v.is_finite()) {
                *dim = None;
            }
        }
    }

    pub fn to_props(&self, src: impl Into<String>, map: Map) -> ImageMapperProps {
        ImageMapperProps {
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            line_width: self.line_width,
            width: self.width,
            height: self.height,
            active: self.active,
            img_width: self.img_width,
            ..ImageMapperProps::new(src, map)
        }
    }
}

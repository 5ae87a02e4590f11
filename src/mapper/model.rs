use anyhow::{anyhow, bail, Context, Result};
use eframe::egui;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Straight (non-premultiplied) RGBA color, read from CSS color strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const DEFAULT_FILL_COLOR: Color = Color::rgba(255, 255, 255, 128);
pub const DEFAULT_STROKE_COLOR: Color = Color::rgba(0, 0, 0, 128);
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            _ => return None,
        };
        Some(color)
    }

    fn parse_hex(hex: &str) -> Result<Self> {
        let digit = |i: usize| -> Result<u8> {
            let c = hex
                .get(i..i + 1)
                .ok_or_else(|| anyhow!("truncated hex color #{hex}"))?;
            u8::from_str_radix(c, 16).with_context(|| format!("invalid hex digit in #{hex}"))
        };
        let pair = |i: usize| -> Result<u8> { Ok(digit(i)? * 16 + digit(i + 1)?) };
        match hex.len() {
            3 => Ok(Self::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            4 => Ok(Self::rgba(
                digit(0)? * 17,
                digit(1)? * 17,
                digit(2)? * 17,
                digit(3)? * 17,
            )),
            6 => Ok(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Ok(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            n => bail!("hex color #{hex} has {n} digits, expected 3, 4, 6 or 8"),
        }
    }

    fn parse_functional(name: &str, args: &str) -> Result<Self> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let channel = |s: &str| -> Result<u8> {
            let v: f32 = s
                .parse()
                .with_context(|| format!("invalid color channel '{s}'"))?;
            Ok(v.round().clamp(0.0, 255.0) as u8)
        };
        match (name, parts.as_slice()) {
            ("rgb", [r, g, b]) => Ok(Self::rgb(channel(r)?, channel(g)?, channel(b)?)),
            ("rgba", [r, g, b, a]) => {
                let alpha: f32 = a
                    .parse()
                    .with_context(|| format!("invalid alpha '{a}'"))?;
                Ok(Self::rgba(
                    channel(r)?,
                    channel(g)?,
                    channel(b)?,
                    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
                ))
            }
            _ => bail!(
                "unsupported color function {name}() with {} arguments",
                parts.len()
            ),
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(open) = s.find('(') {
            let args = s[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| anyhow!("unterminated color function '{s}'"))?;
            return Self::parse_functional(s[..open].trim(), args);
        }
        Self::named(&s).ok_or_else(|| anyhow!("unknown color '{s}'"))
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpha = f32::from(self.a) / 255.0;
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            (alpha * 1000.0).round() / 1000.0
        )
    }
}

impl From<Color> for egui::Color32 {
    fn from(color: Color) -> Self {
        egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

/// Reads an optional color where an empty string means "not set".
fn optional_color<'de, D>(deserializer: D) -> std::result::Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[serde(alias = "rectangle")]
    Rect,
    #[serde(alias = "circ")]
    Circle,
    #[serde(alias = "polygon")]
    Poly,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Rect => "rect",
            Shape::Circle => "circle",
            Shape::Poly => "poly",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clickable zone of the image, in original image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub shape: Shape,
    #[serde(default)]
    pub coords: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_fill_color: Option<Color>,
    #[serde(
        default,
        deserialize_with = "optional_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub fill_color: Option<Color>,
    #[serde(
        default,
        deserialize_with = "optional_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f32>,
}

impl Area {
    pub fn new(shape: Shape, coords: Vec<f32>) -> Self {
        Self {
            id: None,
            shape,
            coords,
            href: None,
            name: None,
            pre_fill_color: None,
            fill_color: None,
            stroke_color: None,
            line_width: None,
        }
    }

    pub fn rect(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(Shape::Rect, vec![left, top, right, bottom])
    }

    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self::new(Shape::Circle, vec![x, y, radius])
    }

    pub fn poly(coords: Vec<f32>) -> Self {
        Self::new(Shape::Poly, coords)
    }

    pub fn with_pre_fill(mut self, color: Color) -> Self {
        self.pre_fill_color = Some(color);
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Named, ordered collection of areas bound to one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl Map {
    pub fn new(name: impl Into<String>, areas: Vec<Area>) -> Self {
        Self {
            name: name.into(),
            areas,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("deserialize area map")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read area map {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("parse {}", path.display()))
    }
}

/// An area extended with its display-space coordinates and center point.
///
/// Built fresh for every dispatched event; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledArea {
    pub area: Area,
    pub scaled_coords: Vec<f32>,
    pub center: egui::Pos2,
}

impl std::ops::Deref for ScaledArea {
    type Target = Area;

    fn deref(&self) -> &Area {
        &self.area
    }
}

pub mod controller;
pub mod draw;
pub mod geometry;
pub mod input;
pub mod model;
pub mod render;
pub mod state;
pub mod surface;
pub mod widget;

pub use controller::{AreaEvent, ImageMapper, ImageMapperProps, MapperHandlers};
pub use model::{Area, Color, Map, ScaledArea, Shape};
pub use surface::{DisplayList, DrawingSurface};
pub use widget::{ImageMapperView, MapperResponse};

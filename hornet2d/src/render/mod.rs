mod sprite;
mod wgpu_backend;

pub use sprite::{Sprite, TextureHandle};
pub use wgpu_backend::{Frame, Renderer};

pub use crate::math::Vec2;

use crate::math::{Transform2D, Vec2};

/// Opaque handle used to reference textures owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Simple sprite combining a texture and transform metadata.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub transform: Transform2D,
    /// Multiplicative tint applied to the sampled texture color.
    pub tint: [f32; 4],
}

impl Sprite {
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            transform: Transform2D::default(),
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Scale the sprite so it renders at an exact pixel size on screen.
    ///
    /// The renderer multiplies the transform scale by the texture's pixel
    /// size, so the scale here is the desired size divided by the texture
    /// size.
    pub fn set_size_px(&mut self, size: Vec2, texture_size: Vec2) {
        self.transform.scale = Vec2::new(size.x / texture_size.x, size.y / texture_size.y);
    }
}

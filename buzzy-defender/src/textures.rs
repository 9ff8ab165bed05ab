use anyhow::Result;
use hornet2d::{EngineContext, TextureHandle};

const PLACEHOLDER_SIZE: u32 = 8;

/// The full set of round textures, loaded once per screen entry.
///
/// The `AssetManager` caches by path, so re-entering a screen after a
/// replay does not touch the disk again.
pub struct GameTextures {
    pub start_backdrop: TextureHandle,
    pub win_backdrop: TextureHandle,
    pub lose_backdrop: TextureHandle,
    pub background: TextureHandle,
    pub buzzy: TextureHandle,
    pub laser: TextureHandle,
    pub enemy_even: TextureHandle,
    pub enemy_odd: TextureHandle,
}

impl GameTextures {
    pub fn load(ctx: &mut EngineContext, assets_dir: &str) -> Result<Self> {
        Ok(Self {
            start_backdrop: load_or_placeholder(ctx, assets_dir, "start_screen.png", [18, 32, 58])?,
            win_backdrop: load_or_placeholder(ctx, assets_dir, "win_screen.png", [20, 64, 28])?,
            lose_backdrop: load_or_placeholder(ctx, assets_dir, "lose_screen.png", [72, 18, 18])?,
            background: load_or_placeholder(ctx, assets_dir, "background.png", [8, 10, 24])?,
            buzzy: load_or_placeholder(ctx, assets_dir, "buzzy.png", [250, 200, 40])?,
            laser: load_or_placeholder(ctx, assets_dir, "laser.png", [120, 220, 255])?,
            enemy_even: load_or_placeholder(ctx, assets_dir, "enemy_a.png", [200, 60, 60])?,
            enemy_odd: load_or_placeholder(ctx, assets_dir, "enemy_b.png", [130, 70, 200])?,
        })
    }

    /// Texture for an enemy based on the row it spawned in.
    pub fn enemy_for_row(&self, row: usize) -> TextureHandle {
        if row % 2 == 0 {
            self.enemy_even
        } else {
            self.enemy_odd
        }
    }
}

/// Load a texture from the assets directory, falling back to a generated
/// solid-color placeholder when the file is missing or unreadable. The
/// game stays playable without shipped art.
fn load_or_placeholder(
    ctx: &mut EngineContext,
    assets_dir: &str,
    file: &str,
    color: [u8; 3],
) -> Result<TextureHandle> {
    let path = format!("{assets_dir}/{file}");
    match ctx.load_texture(&path) {
        Ok(handle) => Ok(handle),
        Err(err) => {
            log::warn!("Failed to load texture '{path}': {err}. Using a solid-color placeholder.");
            let pixels = solid_rgba(color, PLACEHOLDER_SIZE);
            // Cache under the same key a successful load would use
            ctx.load_texture_from_rgba(&path, &pixels, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
        }
    }
}

fn solid_rgba(color: [u8; 3], size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..size * size {
        pixels.extend_from_slice(&[color[0], color[1], color[2], 255]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_rgba_fills_every_pixel() {
        let pixels = solid_rgba([10, 20, 30], 4);
        assert_eq!(pixels.len(), 4 * 4 * 4);
        for pixel in pixels.chunks_exact(4) {
            assert_eq!(pixel, [10, 20, 30, 255]);
        }
    }
}

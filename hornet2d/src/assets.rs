use std::collections::HashMap;

use crate::render::{Renderer, TextureHandle};

/// Manages cached textures keyed by path or caller-supplied key.
pub struct AssetManager {
    textures: HashMap<String, TextureHandle>,
}

impl AssetManager {
    /// Create a new asset manager with no cached assets.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    /// Load a texture from a file path, caching it if already loaded.
    ///
    /// Returns the texture handle. If the texture was previously loaded,
    /// returns the cached handle without reloading from disk.
    pub fn load_texture(
        &mut self,
        renderer: &mut Renderer,
        path: &str,
    ) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.textures.get(path) {
            return Ok(*handle);
        }

        let handle = renderer.load_texture_from_file(path)?;
        self.textures.insert(path.to_string(), handle);
        Ok(handle)
    }

    /// Load a texture from encoded image bytes, caching it by a given key.
    ///
    /// Useful for embedded assets.
    pub fn load_texture_from_bytes(
        &mut self,
        renderer: &mut Renderer,
        key: &str,
        bytes: &[u8],
    ) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.textures.get(key) {
            return Ok(*handle);
        }

        let handle = renderer.load_texture_from_bytes(bytes)?;
        self.textures.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Load a texture from raw RGBA8 pixels, caching it by a given key.
    ///
    /// Useful for procedurally generated textures, e.g. solid-color
    /// placeholders when an asset file is missing.
    pub fn load_texture_from_rgba(
        &mut self,
        renderer: &mut Renderer,
        key: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.textures.get(key) {
            return Ok(*handle);
        }

        let handle = renderer.load_texture_from_rgba(data, width, height)?;
        self.textures.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Get a cached texture handle by key, if it exists.
    pub fn get_texture(&self, key: &str) -> Option<TextureHandle> {
        self.textures.get(key).copied()
    }

    /// Check if a texture is already cached.
    pub fn has_texture(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

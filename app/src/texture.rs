//! Texture decoding via the `image` crate, mirroring
//! `original_source/src/video/texture.c`'s `stb_image`-backed store: decode
//! from bytes (never from a path the OS resolves directly, since assets
//! come through `Filesystem`), force RGBA, cache by path, `None` on any
//! failure rather than aborting.

use image::GenericImageView;
use platform::{Filesystem, TextureHandle, TextureImage, TextureStore};
use std::collections::HashMap;

struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

pub struct ImageStore<'fs> {
    fs: &'fs dyn Filesystem,
    textures: Vec<Texture>,
    names: Vec<String>,
    by_path: HashMap<String, TextureHandle>,
}

impl<'fs> ImageStore<'fs> {
    pub fn new(fs: &'fs dyn Filesystem) -> Self {
        Self { fs, textures: Vec::new(), names: Vec::new(), by_path: HashMap::new() }
    }
}

impl<'fs> TextureStore for ImageStore<'fs> {
    fn load(&mut self, path: &str) -> Option<TextureHandle> {
        if let Some(&handle) = self.by_path.get(path) {
            return Some(handle);
        }

        let bytes = self.fs.read(path)?;
        let decoded = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("failed to decode texture '{}': {}", path, err);
                return None;
            }
        };

        let (width, height) = decoded.dimensions();
        let rgba = decoded.to_rgba();
        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32
            })
            .collect();

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(Texture { width, height, pixels });
        self.names.push(path.to_string());
        self.by_path.insert(path.to_string(), handle);
        Some(handle)
    }

    fn get(&self, handle: TextureHandle) -> Option<TextureImage<'_>> {
        let texture = self.textures.get(handle.0 as usize)?;
        Some(TextureImage { width: texture.width, height: texture.height, pixels: &texture.pixels })
    }

    fn handle_of(&self, path: &str) -> Option<TextureHandle> {
        self.by_path.get(path).copied()
    }

    fn name_of(&self, handle: TextureHandle) -> Option<&str> {
        self.names.get(handle.0 as usize).map(String::as_str)
    }
}

use glam::{Vec2, Vec4};
use log::{info, warn};
use std::path::Path;

/// An RGBA image kept in memory for sampling
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    texels: Vec<[u8; 4]>,
}

impl Texture {
    pub fn from_rgba(width: u32, height: u32, texels: Vec<[u8; 4]>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != (width * height) as usize {
            return None;
        }
        Some(Texture {
            width,
            height,
            texels,
        })
    }

    /// Nearest-neighbour lookup with repeating UVs; v = 0 is the bottom row
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let u = uv.x.rem_euclid(1.0);
        let v = 1.0 - uv.y.rem_euclid(1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        let [r, g, b, a] = self.texels[(y * self.width + x) as usize];
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}

/// Reads an image file. Failures are logged and yield `None`.
pub fn load_texture(path: &Path) -> Option<Texture> {
    let image = match image::open(path) {
        Ok(image) => image.to_rgba8(),
        Err(err) => {
            warn!("failed to load texture {}: {}", path.display(), err);
            return None;
        }
    };
    let (width, height) = image.dimensions();
    let texels = image.pixels().map(|p| p.0).collect();
    let texture = Texture::from_rgba(width, height, texels);
    if texture.is_some() {
        info!("loaded texture {} ({}x{})", path.display(), width, height);
    } else {
        warn!("texture {} is empty", path.display());
    }
    texture
}

/// Textures used by the room
#[derive(Clone, Debug, Default)]
pub struct SceneTextures {
    pub wall: Option<Texture>,
    pub floor: Option<Texture>,
}

impl SceneTextures {
    pub fn load(dir: &Path) -> Self {
        SceneTextures {
            wall: load_texture(&dir.join("wall.png")),
            floor: load_texture(&dir.join("floor.png")),
        }
    }
}

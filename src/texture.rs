//! Textures and sampling.

use std::path::Path;

use image::RgbaImage;

use crate::error::AssetError;
use crate::math::{Color, Vec2};

/// Texel lookup used by [`Texture::sample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest texel; keeps block textures crisp.
    #[default]
    Nearest,
    Bilinear,
}

/// A named RGBA image with a sampling filter.
#[derive(Clone, Debug)]
pub struct Texture {
    name: String,
    image: RgbaImage,
    filter: FilterMode,
}

impl Texture {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
            filter: FilterMode::Nearest,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(Self::new(name, image))
    }

    /// A single-colour texture.
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: Color) -> Self {
        Self::new(name, RgbaImage::from_pixel(width, height, image::Rgba(color.to_rgba8())))
    }

    /// The 16x16 magenta and black checkerboard used when a texture cannot be loaded.
    pub fn missing() -> Self {
        let magenta = image::Rgba(Color::MAGENTA.to_rgba8());
        let black = image::Rgba(Color::BLACK.to_rgba8());
        let image = RgbaImage::from_fn(16, 16, |x, y| if (x / 8 + y / 8) % 2 == 0 { magenta } else { black });
        Self::new("missing", image)
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Copies a `width` x `height` region starting at (`x`, `y`) into a new texture.
    pub fn sub_texture(&self, name: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        let image = image::imageops::crop_imm(&self.image, x, y, width, height).to_image();
        Self {
            name: name.into(),
            image,
            filter: self.filter,
        }
    }

    /// True when any texel is neither fully opaque nor fully transparent.
    pub fn has_translucency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] > 0 && p.0[3] < 255)
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> Color {
        Color::from_rgba8(self.image.get_pixel(x, y).0)
    }

    /// Sample the texture at UV coordinates.
    ///
    /// # UV Coordinate Convention
    /// - (0,0) is the bottom-left corner; images are stored top-left first,
    ///   so V is flipped: `v_image = 1.0 - v`
    /// - Coordinates outside [0,1] clamp to the edge texel
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Color {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return Color::TRANSPARENT;
        }
        let u = uv.x.clamp(0.0, 1.0) * w as f32;
        let v = (1.0 - uv.y).clamp(0.0, 1.0) * h as f32;

        match self.filter {
            FilterMode::Nearest => {
                let x = (u as u32).min(w - 1);
                let y = (v as u32).min(h - 1);
                self.texel(x, y)
            }
            FilterMode::Bilinear => {
                let fx = (u - 0.5).max(0.0);
                let fy = (v - 0.5).max(0.0);
                let x0 = (fx as u32).min(w - 1);
                let y0 = (fy as u32).min(h - 1);
                let x1 = (x0 + 1).min(w - 1);
                let y1 = (y0 + 1).min(h - 1);
                let tx = fx - x0 as f32;
                let ty = fy - y0 as f32;
                let top = self.texel(x0, y0).lerp(self.texel(x1, y0), tx);
                let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), tx);
                top.lerp(bottom, ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_texture() -> Texture {
        // Top row red, bottom row blue.
        let image = RgbaImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        Texture::new("rows", image)
    }

    #[test]
    fn v_is_flipped() {
        let tex = two_row_texture();
        assert_eq!(tex.sample(Vec2::new(0.25, 0.9)), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(0.25, 0.1)), Color::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn edges_clamp_instead_of_wrapping() {
        let tex = two_row_texture();
        assert_eq!(tex.sample(Vec2::new(1.0, 0.0)), Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(tex.sample(Vec2::new(-3.0, 7.0)), Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn bilinear_blends_rows() {
        let tex = two_row_texture().with_filter(FilterMode::Bilinear);
        let mid = tex.sample(Vec2::new(0.5, 0.5));
        assert!(mid.r > 0.4 && mid.r < 0.6);
        assert!(mid.b > 0.4 && mid.b < 0.6);
    }

    #[test]
    fn sub_texture_crops() {
        let tex = two_row_texture().sub_texture("bottom", 0, 1, 2, 1);
        assert_eq!(tex.height(), 1);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.5)), Color::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn missing_placeholder_is_checkered() {
        let tex = Texture::missing();
        assert_eq!(tex.image().get_pixel(0, 0).0, [255, 0, 255, 255]);
        assert_eq!(tex.image().get_pixel(8, 0).0, [0, 0, 0, 255]);
    }
}

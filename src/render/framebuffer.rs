//! Colour and depth storage for one render target.
//!
//! Colours are stored as straight (non-premultiplied) RGBA8, row-major with
//! the origin at the top-left. Depth holds normalized device z: smaller is
//! closer, and a cleared buffer holds `+inf` so the first fragment always
//! passes.

use image::RgbaImage;

use crate::material::BlendMode;
use crate::math::Color;

pub struct FrameBuffer {
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// Creates a transparent buffer with cleared depth.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            color: vec![[0; 4]; len],
            depth: vec![f32::INFINITY; len],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Fills colour with `background` and resets depth to `+inf`.
    pub fn clear(&mut self, background: Color) {
        self.color.fill(background.to_rgba8());
        self.depth.fill(f32::INFINITY);
    }

    /// True when a fragment at `depth` would be visible at (x, y).
    ///
    /// Strictly-less: a fragment at equal depth loses to the one already
    /// stored. Out-of-bounds coordinates always fail.
    #[inline]
    pub fn depth_test(&self, x: u32, y: u32, depth: f32) -> bool {
        self.index(x, y).is_some_and(|i| depth < self.depth[i])
    }

    /// Writes colour and depth, either replacing the destination or
    /// compositing source-over it. No depth test is performed here.
    #[inline]
    pub fn write(&mut self, x: u32, y: u32, depth: f32, color: Color, blend: BlendMode) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        self.color[i] = match blend {
            BlendMode::Opaque => color.to_rgba8(),
            BlendMode::AlphaBlend => color.over(Color::from_rgba8(self.color[i])).to_rgba8(),
        };
        self.depth[i] = depth;
    }

    /// RGBA8 at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Stored depth at (x, y), or `None` when out of bounds.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Copies the colour buffer into an image.
    pub fn to_image(&self) -> RgbaImage {
        let raw: Vec<u8> = self.color.iter().flatten().copied().collect();
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_transparent_with_far_depth() {
        let fb = FrameBuffer::new(4, 2);
        assert_eq!(fb.pixel(3, 1), Some([0, 0, 0, 0]));
        assert_eq!(fb.depth(0, 0), Some(f32::INFINITY));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn depth_test_is_strict() {
        let mut fb = FrameBuffer::new(1, 1);
        assert!(fb.depth_test(0, 0, 0.5));
        fb.write(0, 0, 0.5, Color::WHITE, BlendMode::Opaque);
        assert!(!fb.depth_test(0, 0, 0.5));
        assert!(fb.depth_test(0, 0, 0.25));
        assert!(!fb.depth_test(1, 0, 0.0));
    }

    #[test]
    fn alpha_blend_composites_over_destination() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.clear(Color::rgb(0.0, 0.0, 1.0));
        fb.write(0, 0, 0.0, Color::new(1.0, 0.0, 0.0, 0.5), BlendMode::AlphaBlend);
        let [r, g, b, a] = fb.pixel(0, 0).unwrap();
        assert!((127..=128).contains(&r));
        assert_eq!(g, 0);
        assert!((127..=128).contains(&b));
        assert_eq!(a, 255);
    }

    #[test]
    fn to_image_preserves_layout() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.write(1, 0, 0.0, Color::rgb(1.0, 0.0, 0.0), BlendMode::Opaque);
        let image = fb.to_image();
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 0, 0, 0]);
    }
}

//! Frame-sequence textures built from vertical animation atlases.
//!
//! An atlas is a texture whose height is an exact multiple (greater than one)
//! of its width; each square stripe, top to bottom, is one frame.

use std::sync::Arc;

use crate::texture::Texture;

/// Frames per second used when a model does not say otherwise.
pub const DEFAULT_FRAME_RATE: f32 = 10.0;

/// An ordered set of frames played at a fixed rate.
#[derive(Clone, Debug)]
pub struct AnimatedTexture {
    frames: Vec<Arc<Texture>>,
    frame_rate: f32,
    looping: bool,
    current: usize,
    elapsed: f32,
}

impl AnimatedTexture {
    /// True when a `width` x `height` image is laid out as an animation atlas.
    pub fn is_atlas(width: u32, height: u32) -> bool {
        width > 0 && height > width && height % width == 0
    }

    /// Splits `atlas` into square frames, or returns `None` if it is not an atlas.
    pub fn from_atlas(atlas: &Texture) -> Option<Self> {
        let size = atlas.width();
        if !Self::is_atlas(size, atlas.height()) {
            return None;
        }
        let frames = (0..atlas.height() / size)
            .map(|i| {
                let name = format!("{}#{}", atlas.name(), i);
                Arc::new(atlas.sub_texture(name, 0, i * size, size, size))
            })
            .collect();
        Some(Self::new(frames))
    }

    /// Builds an animation from already separated frames.
    pub fn new(frames: Vec<Arc<Texture>>) -> Self {
        Self {
            frames,
            frame_rate: DEFAULT_FRAME_RATE,
            looping: true,
            current: 0,
            elapsed: 0.0,
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate.max(f32::EPSILON);
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn frames(&self) -> &[Arc<Texture>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Seconds each frame stays on screen.
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Total playback time of one pass, in seconds.
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration()
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn current_texture(&self) -> Option<&Arc<Texture>> {
        self.frames.get(self.current)
    }

    /// Jumps to `frame`, clamped to the last frame.
    pub fn set_frame(&mut self, frame: usize) {
        self.current = frame.min(self.frames.len().saturating_sub(1));
        self.elapsed = 0.0;
    }

    pub fn reset(&mut self) {
        self.set_frame(0);
    }

    /// Advances playback by `dt` seconds.
    ///
    /// Looping animations wrap to the first frame; others hold the last one.
    /// Non-finite or non-positive `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        let len = self.frames.len();
        if len < 2 || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let step = self.frame_duration();
        let total = self.elapsed + dt;
        let steps = (total / step).floor();
        if steps < 1.0 {
            self.elapsed = total;
            return;
        }

        let last = len - 1;
        if self.looping {
            // Reduce before converting so huge step counts cannot overflow.
            self.current = (self.current + (steps % len as f32) as usize) % len;
            self.elapsed = if total.is_finite() { total.rem_euclid(step) } else { 0.0 };
        } else if steps >= (last - self.current) as f32 {
            self.current = last;
            self.elapsed = 0.0;
        } else {
            self.current += steps as usize;
            self.elapsed = total.rem_euclid(step);
        }
    }
}

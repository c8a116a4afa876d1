//! Texture sampling used to seed cell states from an imported image.

use glam::Vec2;
use navmesh_config::{Channel, SamplingConfig};

use crate::types::CellState;

/// A 2D image that can be point-sampled by UV.
///
/// UVs are in [0,1]², with v = 0 at the bottom row of the image.
pub trait Texture {
    /// RGBA texel at `uv`, each channel in [0,1]
    fn sample(&self, uv: Vec2) -> [f32; 4];
}

/// Texel coordinates for `uv` in an image of `width` x `height` stored top row first.
fn texel_coords(uv: Vec2, width: u32, height: u32) -> (u32, u32) {
    let u = uv.x.clamp(0.0, 1.0);
    let v = uv.y.clamp(0.0, 1.0);
    // `as` saturates, NaN maps to 0
    let x = ((u * width as f32) as u32).min(width.saturating_sub(1));
    let y = (((1.0 - v) * height as f32) as u32).min(height.saturating_sub(1));
    (x, y)
}

/// RGBA float texture kept in CPU memory
/// Stores pixels as [f32; 4] in row-major order, top row first
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
}

impl CpuTexture {
    /// Create a texture filled with `color`
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![color; pixel_count],
        }
    }

    /// Create a transparent black texture
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0, 0.0, 0.0, 0.0])
    }

    /// Wrap existing row-major pixels. Returns None if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.pixels[index])
    }

    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels[index] = color;
    }
}

impl Texture for CpuTexture {
    fn sample(&self, uv: Vec2) -> [f32; 4] {
        if self.width == 0 || self.height == 0 {
            return [0.0; 4];
        }
        let (x, y) = texel_coords(uv, self.width, self.height);
        self.get_pixel(x, y).unwrap_or([0.0; 4])
    }
}

impl Texture for image::RgbaImage {
    fn sample(&self, uv: Vec2) -> [f32; 4] {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return [0.0; 4];
        }
        let (x, y) = texel_coords(uv, width, height);
        self.get_pixel(x, y).0.map(|c| c as f32 / 255.0)
    }
}

/// Decides the cell state for a sampled texel.
pub trait SamplePolicy {
    fn classify(&self, texel: [f32; 4]) -> CellState;
}

impl<F> SamplePolicy for F
where
    F: Fn([f32; 4]) -> CellState,
{
    fn classify(&self, texel: [f32; 4]) -> CellState {
        self(texel)
    }
}

/// Threshold on a single channel of the texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelThreshold {
    pub channel: Channel,
    pub threshold: f32,
    /// Values at or above the threshold are walkable when true, blocked when false
    pub walkable_above: bool,
}

impl Default for ChannelThreshold {
    fn default() -> Self {
        Self::from(&SamplingConfig::default())
    }
}

impl From<&SamplingConfig> for ChannelThreshold {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            channel: config.channel,
            threshold: config.threshold,
            walkable_above: config.walkable_above,
        }
    }
}

impl SamplePolicy for ChannelThreshold {
    fn classify(&self, texel: [f32; 4]) -> CellState {
        let [r, g, b, a] = texel;
        let value = match self.channel {
            Channel::Red => r,
            Channel::Green => g,
            Channel::Blue => b,
            Channel::Alpha => a,
            Channel::Luminance => 0.2126 * r + 0.7152 * g + 0.0722 * b,
        };
        if (value >= self.threshold) == self.walkable_above {
            CellState::Walkable
        } else {
            CellState::Blocked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_texture_sample_orientation() {
        let mut texture = CpuTexture::new(2, 2);
        // Top-left texel is (u=0, v=1)
        texture.set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]);
        texture.set_pixel(1, 1, [0.0, 1.0, 0.0, 1.0]);

        assert_eq!(texture.sample(Vec2::new(0.25, 0.75)), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample(Vec2::new(0.75, 0.25)), [0.0, 1.0, 0.0, 1.0]);
        // Edges and out-of-range UVs clamp
        assert_eq!(texture.sample(Vec2::new(1.0, 0.0)), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(texture.sample(Vec2::new(-3.0, 5.0)), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_texture_samples_zero() {
        assert_eq!(CpuTexture::new(0, 0).sample(Vec2::splat(0.5)), [0.0; 4]);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(CpuTexture::from_pixels(2, 2, vec![[0.0; 4]; 3]).is_none());
        assert!(CpuTexture::from_pixels(2, 2, vec![[0.0; 4]; 4]).is_some());
    }

    #[test]
    fn test_rgba_image_sample() {
        let mut img = image::RgbaImage::new(4, 4);
        img.put_pixel(3, 3, image::Rgba([255, 0, 0, 255]));
        let texel = img.sample(Vec2::new(0.9, 0.1));
        assert_eq!(texel, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.sample(Vec2::new(0.1, 0.9)), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_channel_threshold() {
        let policy = ChannelThreshold {
            channel: Channel::Alpha,
            threshold: 0.5,
            walkable_above: true,
        };
        assert_eq!(policy.classify([0.0, 0.0, 0.0, 0.8]), CellState::Walkable);
        assert_eq!(policy.classify([1.0, 1.0, 1.0, 0.2]), CellState::Blocked);

        let inverted = ChannelThreshold {
            walkable_above: false,
            channel: Channel::Luminance,
            ..policy
        };
        assert_eq!(inverted.classify([1.0, 1.0, 1.0, 1.0]), CellState::Blocked);
        assert_eq!(inverted.classify([0.0, 0.0, 0.0, 1.0]), CellState::Walkable);
    }

    #[test]
    fn test_closure_policy() {
        let policy = |texel: [f32; 4]| {
            if texel[0] > 0.0 {
                CellState::Blocked
            } else {
                CellState::Unset
            }
        };
        assert_eq!(policy.classify([1.0, 0.0, 0.0, 0.0]), CellState::Blocked);
        assert_eq!(SamplePolicy::classify(&policy, [0.0; 4]), CellState::Unset);
    }
}

use crate::Result;
use image::{imageops::FilterType, ImageFormat, RgbImage};
use ndarray::{Array3, Array4, Axis};

/// Edge length of the square grid every model consumes.
pub const GRID_SIZE: u32 = 256;

/// Colour channels per pixel (RGB).
pub const GRID_CHANNELS: usize = 3;

/// A decoded image as a 256x256x3 `f32` array in HWC layout.
///
/// Samples keep their raw 0-255 range; the models were exported to take
/// unnormalized input.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid(Array3<f32>);

impl PixelGrid {
    fn from_rgb(rgb: &RgbImage) -> Self {
        debug_assert_eq!(rgb.dimensions(), (GRID_SIZE, GRID_SIZE));

        let side = GRID_SIZE as usize;
        let grid = Array3::from_shape_fn((side, side, GRID_CHANNELS), |(y, x, c)| {
            rgb.get_pixel(x as u32, y as u32)[c] as f32
        });

        Self(grid)
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn as_array(&self) -> &Array3<f32> {
        &self.0
    }

    /// Copy of the grid with a leading batch axis of size 1 (NHWC).
    pub fn to_batch(&self) -> Array4<f32> {
        self.0.clone().insert_axis(Axis(0))
    }
}

pub struct ImageLoader;

impl ImageLoader {
    /// Decode arbitrary image bytes into a `PixelGrid`.
    ///
    /// Alpha is dropped and grayscale expanded to RGB before a bicubic
    /// resize to 256x256.
    pub fn decode(bytes: &[u8]) -> Result<PixelGrid> {
        let image = image::load_from_memory(bytes)?;

        tracing::debug!(
            "Decoded {:?} image: {}x{} {:?}",
            Self::detect_format(bytes),
            image.width(),
            image.height(),
            image.color()
        );

        let rgb = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, GRID_SIZE, GRID_SIZE, FilterType::CatmullRom);

        Ok(PixelGrid::from_rgb(&resized))
    }

    /// Detect the image format from its magic bytes
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}

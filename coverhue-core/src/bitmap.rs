use crate::error::DecodeError;
use crate::quality::{scaled_size, ScaleQuality};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use log::debug;
use std::borrow::Cow;

pub const CHANNELS: usize = 4;

/// A decoded RGBA8 image, row-major with no padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyDimensions { width, height });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(DecodeError::TooLarge { width, height })?;

        if pixels.len() != expected {
            return Err(DecodeError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, DecodeError> {
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(DecodeError::TooLarge { width, height })?;
        Self::new(width, height, rgba.repeat(count))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.width as usize * CHANNELS)
    }

    /// The bitmap the extractor analyses for `quality`.
    ///
    /// `Highest` borrows the original. Every other level resamples so the
    /// longer side matches the preset, which also enlarges small covers.
    pub fn resized(&self, quality: ScaleQuality) -> Result<Cow<'_, Bitmap>, DecodeError> {
        let Some(target) = quality.target_side() else {
            return Ok(Cow::Borrowed(self));
        };

        let (target_width, target_height) = scaled_size(self.width, self.height, target);
        if (target_width, target_height) == (self.width, self.height) {
            return Ok(Cow::Borrowed(self));
        }

        let resize_error = DecodeError::Resize {
            width: self.width,
            height: self.height,
            target_width,
            target_height,
        };

        let source: ImageBuffer<Rgba<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, self.pixels.as_slice())
                .ok_or_else(|| resize_error.clone())?;
        let scaled = imageops::resize(&source, target_width, target_height, FilterType::Triangle);

        debug!(
            "Resized {}x{} bitmap to {}x{} for {} quality",
            self.width, self.height, target_width, target_height, quality
        );

        Bitmap::new(target_width, target_height, scaled.into_raw())
            .map(Cow::Owned)
            .map_err(|_| resize_error)
    }
}

//! Owned pixel buffer every pipeline stage works on.
//!
//! A `RasterBuffer` is a tightly packed, row-major store of `u8` samples
//! with 1 (gray/binary) or 3 (RGB) interleaved channels. `levels` carries
//! the quantization the buffer was created with: 1 for strict binary
//! images, otherwise the maximum sample value (255 for everything the
//! pipeline allocates).

use image::{ ColorType, DynamicImage, GrayImage, RgbImage };

use std::path::Path;

use crate::error::{ LprError, LprErrorKind };

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    channels: usize,
    levels: u32,
    data: Vec<u8>,
}

impl RasterBuffer {

    /// Allocate a zeroed buffer.
    pub fn new(width: u32, height: u32, channels: usize, levels: u32) -> Result<Self, LprError> {
        Self::check_layout(width, height, channels, levels)?;
        let len = width as usize * height as usize * channels;
        Ok(Self { width, height, channels, levels, data: vec![0; len] })
    }

    /// Wrap an existing pixel store, checking its length against the layout.
    pub fn from_raw(width: u32, height: u32, channels: usize, levels: u32, data: Vec<u8>) -> Result<Self, LprError> {
        Self::check_layout(width, height, channels, levels)?;
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(LprErrorKind::BufferLength { expected, found: data.len() }.into());
        }
        Ok(Self { width, height, channels, levels, data })
    }

    /// New zeroed buffer with the same layout as `self`.
    pub fn new_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            levels: self.levels,
            data: vec![0; self.data.len()],
        }
    }

    fn check_layout(width: u32, height: u32, channels: usize, levels: u32) -> Result<(), LprError> {
        if levels == 0 || levels > 255 {
            return Err(LprErrorKind::InvalidLevels(levels).into());
        }
        if channels != 1 && channels != 3 {
            return Err(LprError::channels(3, channels));
        }
        if width == 0 || height == 0 {
            return Err(LprErrorKind::InvalidDimensions { width, height }.into());
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the first sample of pixel `(x, y)`.
    pub fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * self.channels
    }

    /// All channel samples of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let pos = self.offset(x, y);
        &self.data[pos..pos + self.channels]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let pos = self.offset(x, y);
        let channels = self.channels;
        &mut self.data[pos..pos + channels]
    }

    /// Fail with a `ChannelMismatch` unless the buffer has `channels` channels.
    pub fn expect_channels(&self, channels: usize) -> Result<(), LprError> {
        if self.channels != channels {
            return Err(LprError::channels(channels, self.channels));
        }
        Ok(())
    }

    /// Decode an image file (PBM/PGM/PPM or anything else `image` reads)
    /// into a 3 channel buffer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LprError> {
        let img = image::open(path)?;
        Ok(Self::from_dynamic(&img))
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self { width, height, channels: 3, levels: 255, data: rgb.into_raw() }
    }

    /// Encode as PGM (1 channel) or PPM (3 channels), picked by `path`'s extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LprError> {
        let color = match self.channels {
            1 => ColorType::L8,
            _ => ColorType::Rgb8,
        };
        image::save_buffer(path, &self.data, self.width, self.height, color)?;
        Ok(())
    }

    /// Extension matching what `save` should be given for this buffer.
    pub fn netpbm_extension(&self) -> &'static str {
        match self.channels {
            1 => "pgm",
            _ => "ppm",
        }
    }

    pub fn to_gray_image(&self) -> Result<GrayImage, LprError> {
        self.expect_channels(1)?;
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| LprErrorKind::DimensionMismatch.into())
    }

    pub fn to_rgb_image(&self) -> Result<RgbImage, LprError> {
        self.expect_channels(3)?;
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| LprErrorKind::DimensionMismatch.into())
    }

    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, channels: 3, levels: 255, data: img.into_raw() }
    }
}

//! Image to raster bitmap conversion.
//!
//! The printer only accepts 1-bit raster data, so any input image is first
//! reduced to black and white with Floyd-Steinberg error diffusion and then
//! packed 8 dots per byte, MSB first, row by row.

use image::{
    imageops::{self, BiLevel},
    DynamicImage, GrayImage,
};
use log::debug;

use crate::{
    command::{PrintMode, RasterHeader},
    error::{Dimension, Error},
};

/// Maximum raster width in bytes (1024 dots).
pub const MAX_WIDTH_BYTES: usize = 128;

/// Maximum raster height in dots.
pub const MAX_HEIGHT_DOTS: usize = 4095;

/// Luma value left by the dithering pass on pixels that should be printed.
const INK: u8 = 0x00;

/// Packed 1-bit bitmap ready to be sent with the raster image command.
///
/// Pixel columns past the last complete group of 8 are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBitmap {
    width_bytes: u16,
    height: u16,
    data: Vec<u8>,
}

impl RasterBitmap {
    /// Rasterize an image of any size and color type.
    ///
    /// Fails with [`Error::OutOfRange`] if the image is wider than 1024 dots
    /// (after dropping the partial byte column) or taller than 4095 dots.
    pub fn from_image(image: &DynamicImage) -> Result<Self, Error> {
        check_size(image.width(), image.height())?;
        Self::dither_and_pack(image.to_luma8())
    }

    /// Rasterize a grayscale image.
    pub fn from_luma(image: GrayImage) -> Result<Self, Error> {
        check_size(image.width(), image.height())?;
        Self::dither_and_pack(image)
    }

    fn dither_and_pack(mut image: GrayImage) -> Result<Self, Error> {
        imageops::dither(&mut image, &BiLevel);

        let width_bytes = image.width() as usize / 8;
        let height = image.height() as usize;
        let mut data = vec![0x00; width_bytes * height];

        for (x, y, pixel) in image.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            if x >= width_bytes * 8 {
                continue;
            }
            if pixel[0] == INK {
                data[x / 8 + width_bytes * y] |= 1 << (7 - x % 8);
            }
        }

        debug!(
            "rasterized {}x{} image into {} bytes x {} dots",
            image.width(),
            image.height(),
            width_bytes,
            height
        );

        Ok(RasterBitmap {
            width_bytes: width_bytes as u16,
            height: height as u16,
            data,
        })
    }

    pub fn width_bytes(&self) -> u16 {
        self.width_bytes
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Packed bit buffer, `width_bytes * height` bytes long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn header(&self, mode: PrintMode) -> RasterHeader {
        RasterHeader {
            mode,
            width_bytes: self.width_bytes,
            height: self.height,
        }
    }

    /// Full raster image command: header followed by the packed data.
    pub fn to_command(&self, mode: PrintMode) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RasterHeader::LEN + self.data.len());
        buf.extend_from_slice(&self.header(mode).to_bytes());
        buf.extend_from_slice(&self.data);
        buf
    }
}

fn check_size(width: u32, height: u32) -> Result<(), Error> {
    let width_bytes = width as usize / 8;
    let height = height as usize;

    if width_bytes > MAX_WIDTH_BYTES {
        return Err(Error::OutOfRange {
            dimension: Dimension::Width,
            value: width_bytes,
            max: MAX_WIDTH_BYTES,
            unit: "bytes (1024 dots)",
        });
    }
    if height > MAX_HEIGHT_DOTS {
        return Err(Error::OutOfRange {
            dimension: Dimension::Height,
            value: height,
            max: MAX_HEIGHT_DOTS,
            unit: "dots",
        });
    }
    Ok(())
}

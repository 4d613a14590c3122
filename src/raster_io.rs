//! File I/O for images and masks, kept thin and separate from the core
//! engine.
//!
//! Grounded directly on `image_processor::load_image` (open via the
//! `image` crate, flatten into a plain pixel buffer).

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::buffers::{ByteField, MultiChannelField};
use crate::geometry::Index;
use crate::mask::Mask;

/// Read an image from disk as an 8-bit RGB raster, widened to `f32`
/// channels in `[0, 255]`.
pub fn read_image(path: &Path) -> Result<MultiChannelField> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    let mut out = MultiChannelField::filled(width, height, 3, 0.0);
    for (x, y, pixel) in img.enumerate_pixels() {
        let idx = Index::new(y as i32, x as i32);
        out.set(idx, &[pixel[0] as f32, pixel[1] as f32, pixel[2] as f32]);
    }
    Ok(out)
}

/// Write a (possibly out-of-`[0, 255]`) `MultiChannelField` to disk,
/// clamping and rounding each channel to `u8`. Only the first 3 channels
/// are written; single-channel fields are written as grayscale.
pub fn write_image(path: &Path, image: &MultiChannelField) -> Result<()> {
    let width = image.width();
    let height = image.height();

    if image.channels == 1 {
        let mut buf = image::GrayImage::new(width, height);
        for (x, y, pixel) in buf.enumerate_pixels_mut() {
            let values = image.get(Index::new(y as i32, x as i32)).ok_or_else(|| anyhow!("pixel out of bounds"))?;
            *pixel = image::Luma([clamp_u8(values[0])]);
        }
        buf.save(path)?;
        return Ok(());
    }

    let mut buf = image::RgbImage::new(width, height);
    for (x, y, pixel) in buf.enumerate_pixels_mut() {
        let values = image.get(Index::new(y as i32, x as i32)).ok_or_else(|| anyhow!("pixel out of bounds"))?;
        *pixel = image::Rgb([clamp_u8(values[0]), clamp_u8(values.get(1).copied().unwrap_or(values[0])), clamp_u8(values.get(2).copied().unwrap_or(values[0]))]);
    }
    buf.save(path)?;
    Ok(())
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Read a mask per the byte encoding: 0 = HOLE, 255 = VALID, anything
/// else = IGNORED. The source image is converted to 8-bit grayscale
/// first.
pub fn read_mask(path: &Path) -> Result<Mask> {
    let img = image::open(path)?.to_luma8();
    let (width, height) = img.dimensions();
    let mut bytes = ByteField::filled(width, height, 0);
    for (x, y, pixel) in img.enumerate_pixels() {
        bytes.set(Index::new(y as i32, x as i32), pixel[0]);
    }
    Ok(Mask::from_bytes(&bytes))
}

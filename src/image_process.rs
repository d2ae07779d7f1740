/// Per pixel and fixed kernel transforms used to build the binary masks the
/// region labeller consumes.
///
/// Every function checks channel counts and sizes up front and returns an
/// error instead of touching the pixels when they do not match.

use imageproc::distance_transform::Norm;
use imageproc::drawing;
use imageproc::morphology;
use imageproc::rect::Rect;
use image::Rgb;

use crate::error::{ LprError, LprErrorKind };
use crate::raster::RasterBuffer;
use crate::regions::BoundingBox;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Luma of an RGB triple with the 0.299/0.587/0.114 weights, truncated and
/// clamped to 255. Takes `u16` so callers may pass boosted, unsaturated values.
pub fn rgb_to_gray(r: u16, g: u16, b: u16) -> u8 {
    let gray = (r as f64 * 0.299) + (g as f64 * 0.587) + (b as f64 * 0.114);
    if gray > 255.0 { 255 } else { gray as u8 }
}

/// 3 channel -> 1 channel luma.
pub fn grayscale(src: &RasterBuffer) -> Result<RasterBuffer, LprError> {
    src.expect_channels(3)?;
    let data = src.data().chunks_exact(3).map(|p| {
        rgb_to_gray(p[0] as u16, p[1] as u16, p[2] as u16)
    }).collect();
    RasterBuffer::from_raw(src.width(), src.height(), 1, src.levels(), data)
}

/// Samples strictly above `threshold` become foreground, the rest background.
/// The result is a strict binary buffer (levels 1).
pub fn binarize(src: &RasterBuffer, threshold: u8) -> Result<RasterBuffer, LprError> {
    src.expect_channels(1)?;
    let data = src.data().iter().map(|v| {
        if *v > threshold { FOREGROUND } else { BACKGROUND }
    }).collect();
    RasterBuffer::from_raw(src.width(), src.height(), 1, 1, data)
}

/// Saturating add of `delta` to every sample, in place.
pub fn brighten(src: &mut RasterBuffer, delta: u8) {
    src.data_mut().iter_mut().for_each(|v| *v = v.saturating_add(delta));
}

/// Population standard deviation of an RGB triple around its integer mean,
/// truncated to an integer.
pub fn rgb_deviation(r: u8, g: u8, b: u8) -> u32 {
    let mean = ((r as u32 + g as u32 + b as u32) / 3) as f32;
    let sum: f32 = [r, g, b].iter().map(|c| {
        let d = *c as f32 - mean;
        d * d
    }).sum();
    (sum / 3.0).sqrt() as u32
}

/// Replace every saturated pixel (channel deviation at or above
/// `threshold`) by the gray `replacement`, in place. Near neutral pixels
/// (white plate background, black glyphs) survive.
pub fn remove_color(src: &mut RasterBuffer, threshold: u32, replacement: u8) -> Result<(), LprError> {
    src.expect_channels(3)?;
    src.data_mut().chunks_exact_mut(3).for_each(|p| {
        if rgb_deviation(p[0], p[1], p[2]) >= threshold {
            p.iter_mut().for_each(|c| *c = replacement);
        }
    });
    Ok(())
}

fn kernel_radius(kernel: u32) -> u8 {
    (kernel / 2).min(u8::MAX as u32) as u8
}

/// Binary dilation with a square `kernel`x`kernel` structuring element.
/// Samples outside the image are ignored.
pub fn dilate(src: &RasterBuffer, kernel: u32) -> Result<RasterBuffer, LprError> {
    let img = src.to_gray_image()?;
    let out = morphology::dilate(&img, Norm::LInf, kernel_radius(kernel));
    RasterBuffer::from_raw(src.width(), src.height(), 1, src.levels(), out.into_raw())
}

/// Binary erosion with a square `kernel`x`kernel` structuring element.
/// Samples outside the image are ignored, so the border does not erode.
pub fn erode(src: &RasterBuffer, kernel: u32) -> Result<RasterBuffer, LprError> {
    let img = src.to_gray_image()?;
    let out = morphology::erode(&img, Norm::LInf, kernel_radius(kernel));
    RasterBuffer::from_raw(src.width(), src.height(), 1, src.levels(), out.into_raw())
}

/// Dilate then erode.
pub fn close(src: &RasterBuffer, kernel: u32) -> Result<RasterBuffer, LprError> {
    let dilated = dilate(src, kernel)?;
    erode(&dilated, kernel)
}

/// Swap foreground and background of a binary buffer, in place.
pub fn invert(src: &mut RasterBuffer) -> Result<(), LprError> {
    src.expect_channels(1)?;
    src.data_mut().iter_mut().for_each(|v| {
        *v = if *v == BACKGROUND { FOREGROUND } else { BACKGROUND };
    });
    Ok(())
}

pub fn fill(src: &mut RasterBuffer, value: u8) {
    src.data_mut().iter_mut().for_each(|v| *v = value);
}

fn check_inside(src: &RasterBuffer, bbox: &BoundingBox) -> Result<(), LprError> {
    let (width, height) = src.dimensions();
    if bbox.width == 0 || bbox.height == 0 || bbox.right() > width || bbox.bottom() > height {
        return Err(LprErrorKind::InvalidDimensions { width: bbox.width, height: bbox.height }.into());
    }
    Ok(())
}

/// Copy the pixels under `bbox` into a new buffer sized exactly to the box.
pub fn crop(src: &RasterBuffer, bbox: &BoundingBox) -> Result<RasterBuffer, LprError> {
    check_inside(src, bbox)?;
    let mut dst = RasterBuffer::new(bbox.width, bbox.height, src.channels(), src.levels())?;
    let row_len = bbox.width as usize * src.channels();
    for yy in 0..bbox.height {
        let from = src.offset(bbox.x, bbox.y + yy);
        let to = dst.offset(0, yy);
        dst.data_mut()[to..to + row_len].copy_from_slice(&src.data()[from..from + row_len]);
    }
    Ok(dst)
}

/// Same sized copy of `src` that is white everywhere except under `bbox`,
/// where the original pixels are kept.
pub fn copy_region(src: &RasterBuffer, bbox: &BoundingBox) -> Result<RasterBuffer, LprError> {
    check_inside(src, bbox)?;
    let mut dst = src.new_like();
    fill(&mut dst, 255);
    let row_len = bbox.width as usize * src.channels();
    for yy in bbox.y..bbox.bottom() {
        let pos = src.offset(bbox.x, yy);
        dst.data_mut()[pos..pos + row_len].copy_from_slice(&src.data()[pos..pos + row_len]);
    }
    Ok(dst)
}

/// Draw a red hollow rectangle around every box, in place.
pub fn draw_bounding_boxes<'a, I>(src: &mut RasterBuffer, boxes: I) -> Result<(), LprError>
where I: IntoIterator<Item = &'a BoundingBox>
{
    let mut img = src.to_rgb_image()?;
    for bbox in boxes {
        if bbox.width == 0 || bbox.height == 0 {
            continue;
        }
        let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        drawing::draw_hollow_rect_mut(&mut img, rect, Rgb([255, 0, 0]));
    }
    *src = RasterBuffer::from_rgb_image(img);
    Ok(())
}


#[cfg(test)]
mod test {

    use std::error::Error;

    use super::*;

    fn gray(width: u32, height: u32, data: Vec<u8>) -> RasterBuffer {
        RasterBuffer::from_raw(width, height, 1, 255, data).unwrap()
    }

    #[test]
    fn grayscale_uses_rec601_weights() -> Result<(), Box<dyn Error>> {
        let src = RasterBuffer::from_raw(2, 1, 3, 255, vec![255, 0, 0, 0, 255, 0])?;
        let out = grayscale(&src)?;
        assert_eq!(out.channels(), 1);
        assert_eq!(out.data(), &[76, 149]);
        assert!(grayscale(&out).is_err());
        Ok(())
    }

    #[test]
    fn boosted_gray_clamps() {
        assert_eq!(rgb_to_gray(305, 305, 305), 255);
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
    }

    #[test]
    fn binarize_is_strictly_above() -> Result<(), Box<dyn Error>> {
        let out = binarize(&gray(3, 1, vec![179, 180, 181]), 180)?;
        assert_eq!(out.data(), &[0, 0, 255]);
        assert_eq!(out.levels(), 1);
        assert_eq!(dilate(&out, 3)?.levels(), 1);
        Ok(())
    }

    #[test]
    fn brighten_saturates() {
        let mut src = gray(3, 1, vec![0, 155, 200]);
        brighten(&mut src, 100);
        assert_eq!(src.data(), &[100, 255, 255]);
    }

    #[test]
    fn remove_color_keeps_neutral_pixels() -> Result<(), Box<dyn Error>> {
        let mut src = RasterBuffer::from_raw(3, 1, 3, 255, vec![
            250, 250, 245,
            200, 30, 30,
            20, 20, 20,
        ])?;
        remove_color(&mut src, 12, 250)?;
        assert_eq!(src.data(), &[250, 250, 245, 250, 250, 250, 20, 20, 20]);
        Ok(())
    }

    #[test]
    fn deviation_uses_integer_mean() {
        assert_eq!(rgb_deviation(10, 10, 10), 0);
        // mean 1, squared distances 1 + 1 + 0
        assert_eq!(rgb_deviation(0, 2, 1), 0);
        assert_eq!(rgb_deviation(0, 0, 255), 120);
    }

    #[test]
    fn dilate_and_erode_square_kernel() -> Result<(), Box<dyn Error>> {
        let mut data = vec![0; 25];
        data[12] = 255;
        let dilated = dilate(&gray(5, 5, data), 3)?;
        let count = dilated.data().iter().filter(|v| **v == 255).count();
        assert_eq!(count, 9);
        let eroded = erode(&dilated, 3)?;
        let count = eroded.data().iter().filter(|v| **v == 255).count();
        assert_eq!(count, 1);
        assert_eq!(eroded.data()[12], 255);
        Ok(())
    }

    #[test]
    fn erode_ignores_outside_samples() -> Result<(), Box<dyn Error>> {
        let out = erode(&gray(3, 3, vec![255; 9]), 3)?;
        assert!(out.data().iter().all(|v| *v == 255));
        Ok(())
    }

    #[test]
    fn close_fills_single_pixel_gap() -> Result<(), Box<dyn Error>> {
        let mut data = vec![0; 7 * 5];
        for x in 1..6 {
            if x != 3 {
                data[2 * 7 + x] = 255;
            }
        }
        let out = close(&gray(7, 5, data), 2)?;
        assert_eq!(out.data()[2 * 7 + 3], 255);
        Ok(())
    }

    #[test]
    fn morphology_rejects_color() -> Result<(), Box<dyn Error>> {
        let src = RasterBuffer::new(3, 3, 3, 255)?;
        assert!(dilate(&src, 3).is_err());
        assert!(erode(&src, 3).is_err());
        Ok(())
    }

    #[test]
    fn invert_swaps_binary_values() -> Result<(), Box<dyn Error>> {
        let mut src = gray(2, 1, vec![0, 255]);
        invert(&mut src)?;
        assert_eq!(src.data(), &[255, 0]);
        Ok(())
    }

    #[test]
    fn crop_sizes_to_box() -> Result<(), Box<dyn Error>> {
        let src = gray(4, 3, (0..12).collect());
        let out = crop(&src, &BoundingBox { x: 1, y: 1, width: 2, height: 2 })?;
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.data(), &[5, 6, 9, 10]);
        assert!(crop(&src, &BoundingBox { x: 3, y: 0, width: 2, height: 1 }).is_err());
        Ok(())
    }

    #[test]
    fn copy_region_whitens_outside() -> Result<(), Box<dyn Error>> {
        let src = gray(3, 3, vec![0; 9]);
        let out = copy_region(&src, &BoundingBox { x: 1, y: 1, width: 1, height: 1 })?;
        assert_eq!(out.data().iter().filter(|v| **v == 0).count(), 1);
        assert_eq!(out.pixel(1, 1), &[0]);
        Ok(())
    }

    #[test]
    fn draws_red_outline() -> Result<(), Box<dyn Error>> {
        let mut src = RasterBuffer::new(6, 6, 3, 255)?;
        draw_bounding_boxes(&mut src, &[BoundingBox { x: 1, y: 1, width: 4, height: 4 }])?;
        assert_eq!(src.pixel(1, 1), &[255, 0, 0]);
        assert_eq!(src.pixel(4, 2), &[255, 0, 0]);
        assert_eq!(src.pixel(2, 2), &[0, 0, 0]);
        Ok(())
    }
}

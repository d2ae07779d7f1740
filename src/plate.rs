//! Plate and character selection over measured regions.
//!
//! A region is taken for a plate when its shape is plate like, its pixels
//! are mostly bright, and exactly the expected number of glyph shaped
//! regions show up inside it. The first region passing all three wins.

use log::debug;
use serde::Serialize;

use crate::config::{ CharacterParams, Config, LabellingParams, PlateParams };
use crate::error::{ LprError, LprErrorKind };
use crate::image_process;
use crate::labelling;
use crate::raster::RasterBuffer;
use crate::regions::{ self, BoundingBox, RegionDescriptor };
use crate::snapshot::SnapshotSink;

#[derive(Clone, Debug, Serialize)]
pub struct CharacterCandidate {
    pub region: RegionDescriptor,
    /// binary glyph cut to the region's bounding box, ready for recognition
    #[serde(skip)]
    pub glyph: RasterBuffer,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlateCandidate {
    pub region: RegionDescriptor,
    pub characters: Vec<CharacterCandidate>,
}

/// Fraction of the pixels in `bbox` whose boosted luma is above the
/// bright threshold. The boost is applied per channel without saturation.
pub fn bright_fraction(color: &RasterBuffer, bbox: &BoundingBox, params: &PlateParams) -> f32 {
    if color.channels() != 3 || bbox.area() == 0 {
        return 0.0;
    }
    let boost = params.bright_boost;
    let mut bright = 0u64;
    for y in bbox.y..bbox.bottom().min(color.height()) {
        for x in bbox.x..bbox.right().min(color.width()) {
            let p = color.pixel(x, y);
            let gray = image_process::rgb_to_gray(p[0] as u16 + boost, p[1] as u16 + boost, p[2] as u16 + boost);
            if gray > params.bright_threshold {
                bright += 1;
            }
        }
    }
    bright as f32 / bbox.area() as f32
}

fn plate_shaped(region: &RegionDescriptor, min_area: f64, params: &PlateParams) -> bool {
    let ratio = region.bbox.aspect_ratio();
    ratio > params.min_aspect && ratio < params.max_aspect && region.area as f64 > min_area
}

/// Scan `regions` in label order for the first plate. Returns `None` when
/// the image is not a colour image, there are no regions, or no region
/// passes every gate.
pub fn find_plate(color: &RasterBuffer, regions: &[RegionDescriptor], config: &Config, sink: &dyn SnapshotSink) -> Option<PlateCandidate> {
    if color.channels() != 3 {
        debug!("find_plate: expected a colour image, got {} channels", color.channels());
        return None;
    }
    if regions.is_empty() {
        return None;
    }
    let params = &config.plate;
    let (width, height) = color.dimensions();
    let min_area = width as f64 * height as f64 * params.min_area_fraction as f64;

    for region in regions {
        if !plate_shaped(region, min_area, params) {
            continue;
        }
        let bright = bright_fraction(color, &region.bbox, params);
        debug!("region {} {:?}: bright fraction {:.3}", region.label, region.bbox, bright);
        if bright <= params.min_bright_fraction {
            continue;
        }
        let plate = match image_process::copy_region(color, &region.bbox) {
            Ok(plate) => plate,
            Err(e) => {
                debug!("region {}: {}", region.label, e);
                continue;
            },
        };
        match find_characters(plate, &region.bbox, &config.characters, &config.labelling, sink) {
            Ok(characters) if characters.len() == config.characters.count => {
                return Some(PlateCandidate { region: region.clone(), characters });
            },
            Ok(characters) => {
                debug!("region {}: {} characters, rejected", region.label, characters.len());
            },
            Err(e) => {
                debug!("region {}: {}, rejected", region.label, e);
            },
        }
    }
    None
}

/// Binary mask of the dark glyphs inside a plate image: neutral colours
/// kept, brightened, thresholded, eroded and inverted so glyphs become
/// foreground.
pub fn glyph_mask(mut plate: RasterBuffer, params: &CharacterParams, sink: &dyn SnapshotSink) -> Result<RasterBuffer, LprError> {
    sink.save("plate_original", 0, &plate);
    image_process::remove_color(&mut plate, params.color_deviation, params.color_replacement)?;
    sink.save("plate_colorremove", 1, &plate);

    let mut gray = image_process::grayscale(&plate)?;
    sink.save("plate_gray", 2, &gray);
    image_process::brighten(&mut gray, params.brighten);
    sink.save("plate_brighten", 3, &gray);

    let binary = image_process::binarize(&gray, params.binary_threshold)?;
    let mut mask = image_process::erode(&binary, params.erode_kernel)?;
    sink.save("plate_binary_erode", 4, &mask);
    image_process::invert(&mut mask)?;
    sink.save("plate_binary_invert", 5, &mask);
    Ok(mask)
}

/// Find the glyph regions of a plate. `plate` is a full size colour image
/// holding the plate pixels under `plate_box`.
///
/// Regions are accepted in label order when they are shorter than the
/// plate but taller than `min_height_ratio` of it, narrow enough, and
/// inside the plate box. Finding more than `params.count` of them is an
/// error: a real plate carries exactly that many.
pub fn find_characters(plate: RasterBuffer, plate_box: &BoundingBox, params: &CharacterParams,
                       labelling_params: &LabellingParams, sink: &dyn SnapshotSink) -> Result<Vec<CharacterCandidate>, LprError> {
    plate.expect_channels(3)?;
    let mask = glyph_mask(plate, params, sink)?;

    let mut labelled = labelling::label(&mask, labelling_params)?;
    regions::measure(&labelled.map, &mut labelled.regions);

    let min_height = (plate_box.height as f32 * params.min_height_ratio) as u32;
    let mut found = Vec::new();
    for region in labelled.regions {
        let bbox = region.bbox;
        let height_ok = bbox.height > min_height && bbox.height < plate_box.height;
        let ratio_ok = bbox.aspect_ratio() < params.max_aspect;
        if !(height_ok && ratio_ok && plate_box.contains(&bbox)) {
            continue;
        }
        if found.len() == params.count {
            return Err(LprErrorKind::TooManyCharacters { limit: params.count }.into());
        }
        let glyph = image_process::crop(&mask, &bbox)?;
        sink.save("caracteres", found.len() as u32 + 1, &glyph);
        found.push(CharacterCandidate { region, glyph });
    }
    Ok(found)
}

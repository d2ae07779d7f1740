use log::{ debug, info, warn };

use std::path::Path;

use error::{ LprError, LprErrorKind };
use raster::RasterBuffer;
use regions::RegionDescriptor;
use plate::PlateCandidate;
use snapshot::SnapshotSink;

pub mod config;
pub mod error;
pub mod image_process;
pub mod labelling;
pub mod plate;
pub mod raster;
pub mod regions;
pub mod snapshot;
pub mod utils;

pub use config::Config;

/// Result of one run over an image.
#[derive(Clone, Debug)]
pub struct Detection {
    /// regions of the full image mask, in label order
    pub regions: Vec<RegionDescriptor>,
    pub plate: Option<PlateCandidate>,
}

impl Detection {
    pub fn found(&self) -> bool {
        self.plate.is_some()
    }
}

pub struct Lpr {
    config: Config,
}

impl Lpr {

    pub fn new(config: Config) -> Self {
        Lpr { config }
    }

    /// Binary mask of bright, neutral areas of a colour image; plates show
    /// up as solid blobs in it.
    pub fn plate_mask(&self, img: &RasterBuffer, sink: &dyn SnapshotSink) -> Result<RasterBuffer, LprError> {
        let params = &self.config.mask;
        img.expect_channels(3)?;

        let mut work = img.clone();
        image_process::remove_color(&mut work, params.color_deviation, params.color_replacement)?;
        sink.save("main_color_remove", 2, &work);

        let mut gray = image_process::grayscale(&work)?;
        sink.save("main_rgb_to_gray", 3, &gray);
        image_process::brighten(&mut gray, params.brighten);
        sink.save("main_brighten", 4, &gray);

        let binary = image_process::binarize(&gray, params.binary_threshold)?;
        sink.save("main_binary", 5, &binary);
        let closed = image_process::close(&binary, params.close_kernel)?;
        sink.save("main_close", 6, &closed);
        let dilated = image_process::dilate(&closed, params.dilate_kernel)?;
        sink.save("main_dilate", 7, &dilated);
        Ok(dilated)
    }

    /// Look for one plate in a colour image.
    pub fn recognize(&self, img: &RasterBuffer, sink: &dyn SnapshotSink) -> Result<Detection, LprError> {
        sink.save("original", 1, img);
        let mask = self.plate_mask(img, sink)?;

        let mut labelled = match labelling::label(&mask, &self.config.labelling) {
            Ok(labelled) => labelled,
            Err(e) => match e.kind() {
                LprErrorKind::LabelOverflow { .. } | LprErrorKind::InvalidDimensions { .. } => {
                    warn!("full image mask: {}, no plate", e);
                    return Ok(Detection { regions: Vec::new(), plate: None });
                },
                _ => return Err(e),
            },
        };
        if let Ok(rendered) = labelled.map.to_raster() {
            sink.save("main_blobs", 8, &rendered);
        }
        regions::measure(&labelled.map, &mut labelled.regions);
        debug!("full image mask: {} regions", labelled.region_count());

        let plate = plate::find_plate(img, &labelled.regions, &self.config, sink);
        Ok(Detection { regions: labelled.regions, plate })
    }

    /// Read `input`, run `recognize` and dump an annotated copy through
    /// `sink`: plate and character boxes when a plate is found, every
    /// region box otherwise.
    pub fn process_image(&self, input: impl AsRef<Path>, sink: &dyn SnapshotSink) -> Result<Detection, LprError> {
        let input = input.as_ref();
        let img = RasterBuffer::open(input)?;
        info!("processing {} ({}x{})", input.display(), img.width(), img.height());

        let detection = self.recognize(&img, sink)?;
        let mut annotated = img;
        match &detection.plate {
            Some(plate) => {
                image_process::draw_bounding_boxes(&mut annotated, Some(&plate.region.bbox))?;
                sink.save("main_plate_bounding", 9, &annotated);
                image_process::draw_bounding_boxes(&mut annotated, plate.characters.iter().map(|c| &c.region.bbox))?;
                sink.save("main_plate_bounding_chars", 9, &annotated);
            },
            None => {
                image_process::draw_bounding_boxes(&mut annotated, detection.regions.iter().map(|r| &r.bbox))?;
                sink.save("main_plate_notfound", 9, &annotated);
            },
        }
        Ok(detection)
    }
}


#[cfg(test)]
mod test {

    use std::error::Error;

    use super::*;
    use crate::snapshot::NullSink;

    #[test]
    fn mask_keeps_only_bright_neutral_pixels() -> Result<(), Box<dyn Error>> {
        let mut img = RasterBuffer::new(9, 9, 3, 255)?;
        img.pixel_mut(4, 4).copy_from_slice(&[250, 250, 250]);
        img.pixel_mut(6, 2).copy_from_slice(&[120, 120, 120]);
        let mask = Lpr::new(Config::default()).plate_mask(&img, &NullSink)?;
        assert_eq!(mask.channels(), 1);
        // the bright pixel survives the close and is dilated to 3x3
        assert_eq!(mask.data().iter().filter(|v| **v == 255).count(), 9);
        assert_eq!(mask.pixel(3, 3), &[255]);
        assert_eq!(mask.pixel(6, 2), &[0]);
        Ok(())
    }

    #[test]
    fn recognize_rejects_gray_input() -> Result<(), Box<dyn Error>> {
        let gray = RasterBuffer::new(9, 9, 1, 255)?;
        let err = Lpr::new(Config::default()).recognize(&gray, &NullSink).unwrap_err();
        assert!(matches!(err.kind(), LprErrorKind::ChannelMismatch { expected: 3, found: 1 }));
        Ok(())
    }

    #[test]
    fn empty_scene_reports_no_regions() -> Result<(), Box<dyn Error>> {
        let img = RasterBuffer::new(40, 30, 3, 255)?;
        let detection = Lpr::new(Config::default()).recognize(&img, &NullSink)?;
        assert!(!detection.found());
        assert!(detection.regions.is_empty());
        Ok(())
    }

    #[test]
    fn tiny_image_is_not_found() -> Result<(), Box<dyn Error>> {
        let lpr = Lpr::new(Config::default());
        for (width, height) in [(1, 1), (2, 2), (2, 9)].iter() {
            let img = RasterBuffer::new(*width, *height, 3, 255)?;
            let detection = lpr.recognize(&img, &NullSink)?;
            assert!(!detection.found());
            assert!(detection.regions.is_empty());
        }
        Ok(())
    }
}

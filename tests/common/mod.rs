#![allow(dead_code)]

use lpr_classic::raster::RasterBuffer;
use lpr_classic::regions::BoundingBox;
use lpr_classic::snapshot::SnapshotSink;

use std::cell::RefCell;

pub const SCENE_WIDTH: u32 = 600;
pub const SCENE_HEIGHT: u32 = 400;
/// 175x50: aspect 3.5, about 3.6% of the scene
pub const PLATE: BoundingBox = BoundingBox { x: 200, y: 150, width: 175, height: 50 };
pub const GLYPH_WIDTH: u32 = 12;
/// half the plate height
pub const GLYPH_HEIGHT: u32 = 25;

pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RasterBuffer {
    let data = (0..width * height).flat_map(|_| rgb.iter().copied()).collect();
    RasterBuffer::from_raw(width, height, 3, 255, data).unwrap()
}

pub fn paint(img: &mut RasterBuffer, bbox: BoundingBox, rgb: [u8; 3]) {
    for y in bbox.y..bbox.bottom() {
        for x in bbox.x..bbox.right() {
            img.pixel_mut(x, y).copy_from_slice(&rgb);
        }
    }
}

pub fn glyph_box(index: u32, spacing: u32) -> BoundingBox {
    glyph_box_in(&PLATE, index, spacing)
}

pub fn glyph_box_in(plate: &BoundingBox, index: u32, spacing: u32) -> BoundingBox {
    BoundingBox {
        x: plate.x + 10 + index * spacing,
        y: plate.y + 12,
        width: GLYPH_WIDTH,
        height: GLYPH_HEIGHT,
    }
}

/// Dark scene with one white plate carrying `glyphs` black glyphs.
pub fn plate_scene(glyphs: u32) -> RasterBuffer {
    let mut img = solid(SCENE_WIDTH, SCENE_HEIGHT, [40, 40, 40]);
    paint_plate(&mut img, PLATE, glyphs);
    img
}

/// White plate at `plate` with `glyphs` black glyphs on it.
pub fn paint_plate(img: &mut RasterBuffer, plate: BoundingBox, glyphs: u32) {
    let spacing = if glyphs > 6 { 22 } else { 27 };
    paint(img, plate, [255, 255, 255]);
    for i in 0..glyphs {
        paint(img, glyph_box_in(&plate, i, spacing), [0, 0, 0]);
    }
}

/// Single channel buffer, `boxes` foreground.
pub fn binary_with(width: u32, height: u32, boxes: &[BoundingBox]) -> RasterBuffer {
    let mut img = RasterBuffer::new(width, height, 1, 255).unwrap();
    for bbox in boxes {
        for y in bbox.y..bbox.bottom() {
            for x in bbox.x..bbox.right() {
                img.pixel_mut(x, y)[0] = 255;
            }
        }
    }
    img
}

/// Remembers the tag of every snapshot it is handed.
#[derive(Default)]
pub struct RecordingSink {
    pub tags: RefCell<Vec<String>>,
}

impl RecordingSink {
    pub fn saw(&self, tag: &str) -> bool {
        self.tags.borrow().iter().any(|t| t == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags.borrow().iter().filter(|t| *t == tag).count()
    }
}

impl SnapshotSink for RecordingSink {
    fn save(&self, tag: &str, _sequence_id: u32, _buffer: &RasterBuffer) {
        self.tags.borrow_mut().push(tag.to_string());
    }
}

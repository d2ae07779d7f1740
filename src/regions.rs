//! Region descriptors and the per label metric pass.

use serde::Serialize;

use crate::labelling::LabelMap;

/// Axis aligned box, `x + width` and `y + height` are one past the last pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// width / height, 0 for a degenerate box
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    /// True when `other` lies inside `self`, all four edges inclusive.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Centroid {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegionDescriptor {
    pub label: u32,
    /// foreground pixel count
    pub area: u32,
    pub bbox: BoundingBox,
    pub centroid: Centroid,
    /// pixels with at least one 4-neighbour carrying another label
    pub perimeter: u32,
}

impl RegionDescriptor {

    /// Placeholder with only the label set, filled in by `measure`.
    pub fn with_label(label: u32) -> Self {
        Self { label, ..Default::default() }
    }
}

#[derive(Clone, Copy)]
struct Accumulator {
    area: u32,
    perimeter: u32,
    sum_x: u64,
    sum_y: u64,
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            area: 0,
            perimeter: 0,
            sum_x: 0,
            sum_y: 0,
            x_min: u32::MAX,
            y_min: u32::MAX,
            x_max: 0,
            y_max: 0,
        }
    }
}

/// Fill area, bounding box, centroid and perimeter of every descriptor in
/// one sweep over the interior of `map`.
///
/// Every descriptor is reset first, so measuring twice gives the same
/// result. A descriptor whose label does not occur keeps a zero box and
/// area.
pub fn measure(map: &LabelMap, regions: &mut [RegionDescriptor]) {
    let max_label = regions.iter().map(|r| r.label).max().unwrap_or(0) as usize;
    // label -> index into `regions`, usize::MAX for labels nobody asked about
    let mut slots = vec![usize::MAX; max_label + 1];
    for (index, region) in regions.iter().enumerate() {
        if region.label != 0 {
            slots[region.label as usize] = index;
        }
    }
    let mut acc = vec![Accumulator::default(); regions.len()];

    let (width, height) = map.dimensions();
    if width >= 3 && height >= 3 {
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let label = map.get(x, y);
                if label == 0 || label as usize > max_label {
                    continue;
                }
                let slot = slots[label as usize];
                if slot == usize::MAX {
                    continue;
                }
                let a = &mut acc[slot];
                a.area += 1;
                a.sum_x += x as u64;
                a.sum_y += y as u64;
                a.x_min = a.x_min.min(x);
                a.y_min = a.y_min.min(y);
                a.x_max = a.x_max.max(x);
                a.y_max = a.y_max.max(y);
                if map.get(x - 1, y) != label || map.get(x + 1, y) != label
                    || map.get(x, y - 1) != label || map.get(x, y + 1) != label {
                    a.perimeter += 1;
                }
            }
        }
    }

    regions.iter_mut().zip(acc.iter()).for_each(|(region, a)| {
        region.area = a.area;
        region.perimeter = a.perimeter;
        if a.area == 0 {
            region.bbox = BoundingBox::default();
            region.centroid = Centroid::default();
            return;
        }
        region.bbox = BoundingBox {
            x: a.x_min,
            y: a.y_min,
            width: a.x_max - a.x_min + 1,
            height: a.y_max - a.y_min + 1,
        };
        let area = a.area.max(1) as u64;
        region.centroid = Centroid {
            x: (a.sum_x / area) as u32,
            y: (a.sum_y / area) as u32,
        };
    });
}

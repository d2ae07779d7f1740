//! Two pass connected component labelling of binary buffers.
//!
//! The first pass walks the interior in raster order and looks at the
//! already visited neighbours of each foreground pixel:
//!
//! ```text
//! A B C
//! D X
//! ```
//!
//! A pixel with no marked neighbour opens a new label, otherwise it takes
//! the smallest representative among them and every other representative is
//! merged into it. The second pass rewrites each pixel with its resolved,
//! densely renumbered label. Labels are numbered in order of first
//! discovery.

use log::trace;

use crate::config::{ Connectivity, LabellingParams };
use crate::error::{ LprError, LprErrorKind };
use crate::raster::RasterBuffer;
use crate::regions::RegionDescriptor;

/// Per pixel region labels, 0 is background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl LabelMap {

    pub fn from_raw(width: u32, height: u32, labels: Vec<u32>) -> Result<Self, LprError> {
        let expected = width as usize * height as usize;
        if labels.len() != expected {
            return Err(LprErrorKind::BufferLength { expected, found: labels.len() }.into());
        }
        Ok(Self { width, height, labels })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Gray rendering for snapshots, labels above 255 saturate.
    pub fn to_raster(&self) -> Result<RasterBuffer, LprError> {
        let data = self.labels.iter().map(|l| (*l).min(255) as u8).collect();
        RasterBuffer::from_raw(self.width, self.height, 1, 255, data)
    }
}

/// Output of `label`: the label map plus one placeholder descriptor per
/// region, in label order. Only `label` is set on the descriptors.
#[derive(Clone, Debug)]
pub struct Labelling {
    pub map: LabelMap,
    pub regions: Vec<RegionDescriptor>,
}

impl Labelling {

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

/// Equivalence table, every root is the smallest label of its class.
struct Equivalences {
    parent: Vec<u32>,
    limit: usize,
}

impl Equivalences {

    fn new(limit: usize) -> Self {
        // slot 0 is background
        Self { parent: vec![0], limit }
    }

    fn next_label(&self) -> u32 {
        self.parent.len() as u32
    }

    fn open(&mut self) -> Result<u32, LprError> {
        if self.parent.len() >= self.limit {
            return Err(LprErrorKind::LabelOverflow { limit: self.limit }.into());
        }
        let label = self.next_label();
        self.parent.push(label);
        Ok(label)
    }

    fn find(&mut self, mut label: u32) -> u32 {
        while self.parent[label as usize] != label {
            let grand = self.parent[self.parent[label as usize] as usize];
            self.parent[label as usize] = grand;
            label = grand;
        }
        label
    }

    /// Merge the class of `label` into the class rooted at `root`.
    fn merge_into(&mut self, label: u32, root: u32) {
        let other = self.find(label);
        if other != root {
            self.parent[other as usize] = root;
        }
    }
}

/// Label the 4 or 8 connected foreground components of a single channel
/// buffer. Any nonzero sample is foreground; the 1 pixel border is treated
/// as background.
pub fn label(binary: &RasterBuffer, params: &LabellingParams) -> Result<Labelling, LprError> {
    binary.expect_channels(1)?;
    let (width, height) = binary.dimensions();
    if width < 3 || height < 3 {
        return Err(LprErrorKind::InvalidDimensions { width, height }.into());
    }
    let w = width as usize;
    let src = binary.data();
    let mut labels = vec![0u32; w * height as usize];
    let mut table = Equivalences::new(params.max_labels);

    for y in 1..height as usize - 1 {
        for x in 1..w - 1 {
            let pos = y * w + x;
            if src[pos] == 0 {
                continue;
            }
            let north = pos - w;
            let neighbours = match params.connectivity {
                Connectivity::Eight => [labels[north - 1], labels[north], labels[north + 1], labels[pos - 1]],
                Connectivity::Four => [0, labels[north], 0, labels[pos - 1]],
            };
            let mut root = u32::MAX;
            for n in neighbours.iter().filter(|n| **n != 0) {
                root = root.min(table.find(*n));
            }
            if root == u32::MAX {
                labels[pos] = table.open()?;
                continue;
            }
            labels[pos] = root;
            for n in neighbours.iter().filter(|n| **n != 0) {
                table.merge_into(*n, root);
            }
        }
    }

    // raw root -> dense label, in order of first discovery
    let mut dense = vec![0u32; table.next_label() as usize];
    let mut regions = Vec::new();
    for raw in 1..table.next_label() {
        if table.find(raw) == raw {
            let id = regions.len() as u32 + 1;
            dense[raw as usize] = id;
            regions.push(RegionDescriptor::with_label(id));
        }
    }
    trace!("labelling: {} raw labels, {} regions", table.next_label() - 1, regions.len());

    for l in labels.iter_mut().filter(|l| **l != 0) {
        *l = dense[table.find(*l) as usize];
    }

    Ok(Labelling {
        map: LabelMap { width, height, labels },
        regions,
    })
}

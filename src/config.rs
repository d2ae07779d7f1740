//! Tunable constants of the detector.
//!
//! The defaults are the values the heuristics were tuned with; a JSON file
//! passed with `--config` may override any subset of them.

use serde::{ Deserialize, Serialize };

use std::fs;
use std::path::Path;

use crate::error::LprError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mask: MaskParams,
    pub plate: PlateParams,
    pub characters: CharacterParams,
    pub labelling: LabellingParams,
}

impl Config {

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LprError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, LprError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Full image mask that plate shaped regions are labelled from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// RGB deviation at or above which a pixel counts as coloured
    pub color_deviation: u32,
    /// gray written over coloured pixels
    pub color_replacement: u8,
    pub brighten: u8,
    pub binary_threshold: u8,
    pub close_kernel: u32,
    pub dilate_kernel: u32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            color_deviation: 12,
            color_replacement: 250,
            brighten: 100,
            binary_threshold: 254,
            close_kernel: 2,
            dilate_kernel: 3,
        }
    }
}

/// Gates a region must pass to be taken for a plate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateParams {
    /// exclusive lower bound on width / height
    pub min_aspect: f32,
    /// exclusive upper bound on width / height
    pub max_aspect: f32,
    /// region area must exceed this fraction of the image pixels
    pub min_area_fraction: f32,
    /// added to every channel before the bright test
    pub bright_boost: u16,
    /// boosted luma strictly above this counts as bright
    pub bright_threshold: u8,
    /// fraction of bright pixels in the box needed to look for characters
    pub min_bright_fraction: f32,
}

impl Default for PlateParams {
    fn default() -> Self {
        Self {
            min_aspect: 3.0,
            max_aspect: 4.5,
            min_area_fraction: 0.03,
            bright_boost: 50,
            bright_threshold: 200,
            min_bright_fraction: 0.3,
        }
    }
}

/// Character search inside a plate candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterParams {
    pub color_deviation: u32,
    pub color_replacement: u8,
    pub brighten: u8,
    pub binary_threshold: u8,
    pub erode_kernel: u32,
    /// glyph height must exceed this fraction of the plate height
    pub min_height_ratio: f32,
    /// exclusive upper bound on glyph width / height
    pub max_aspect: f32,
    /// characters printed on a plate, more than this rejects the candidate
    pub count: usize,
}

impl Default for CharacterParams {
    fn default() -> Self {
        Self {
            color_deviation: 12,
            color_replacement: 250,
            brighten: 100,
            binary_threshold: 180,
            erode_kernel: 3,
            min_height_ratio: 0.4,
            max_aspect: 0.8,
            count: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// causal mask north, west
    Four,
    /// causal mask north-west, north, north-east, west
    Eight,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabellingParams {
    pub connectivity: Connectivity,
    /// slots of the equivalence table, slot 0 is background
    pub max_labels: usize,
}

impl Default for LabellingParams {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            max_labels: 1024,
        }
    }
}

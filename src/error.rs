use image::ImageError;
use serde_json::Error as JsonError;

use std::error::Error;
use std::fmt;
use std::io::Error as IOError;

#[derive(Debug)]
pub struct LprError(LprErrorKind);

#[derive(Debug)]
pub enum LprErrorKind {
    IOError(IOError),
    ImageError(ImageError),
    ConfigError(JsonError),
    /// buffer has the wrong number of channels for the operation
    ChannelMismatch { expected: usize, found: usize },
    /// source and destination sizes differ
    DimensionMismatch,
    /// zero sized image, or too small to clear a 1 pixel border
    InvalidDimensions { width: u32, height: u32 },
    InvalidLevels(u32),
    BufferLength { expected: usize, found: usize },
    /// more raw labels than the equivalence table may hold
    LabelOverflow { limit: usize },
    /// more character shaped regions than a plate can carry
    TooManyCharacters { limit: usize },
}

impl LprError {
    pub fn kind(&self) -> &LprErrorKind {
        &self.0
    }

    pub(crate) fn channels(expected: usize, found: usize) -> Self {
        Self(LprErrorKind::ChannelMismatch { expected, found })
    }
}

impl<T> From<T> for LprError
where T: Into<LprErrorKind>
{
    fn from(e: T) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for LprError {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            LprErrorKind::IOError(e) => e.fmt(f),
            LprErrorKind::ImageError(e) => e.fmt(f),
            LprErrorKind::ConfigError(e) => write!(f, "invalid config: {}", e),
            LprErrorKind::ChannelMismatch { expected, found } => {
                write!(f, "expected a {} channel image, got {} channels", expected, found)
            },
            LprErrorKind::DimensionMismatch => write!(f, "source and destination dimensions differ"),
            LprErrorKind::InvalidDimensions { width, height } => {
                write!(f, "invalid image dimensions {}x{}", width, height)
            },
            LprErrorKind::InvalidLevels(levels) => write!(f, "levels {} outside [1, 255]", levels),
            LprErrorKind::BufferLength { expected, found } => {
                write!(f, "pixel store holds {} bytes, expected {}", found, expected)
            },
            LprErrorKind::LabelOverflow { limit } => write!(f, "more than {} raw labels", limit),
            LprErrorKind::TooManyCharacters { limit } => {
                write!(f, "more than {} character regions inside plate candidate", limit)
            },
        }
    }
}

impl Error for LprError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.kind() {
            LprErrorKind::IOError(e) => Some(e),
            LprErrorKind::ImageError(e) => Some(e),
            LprErrorKind::ConfigError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for LprErrorKind {
    fn from(e: IOError) -> Self {
        Self::IOError(e)
    }
}

impl From<ImageError> for LprErrorKind {
    fn from(e: ImageError) -> Self {
        Self::ImageError(e)
    }
}

impl From<JsonError> for LprErrorKind {
    fn from(e: JsonError) -> Self {
        Self::ConfigError(e)
    }
}

//! Decode result types

use std::fmt;

use crate::types::PixelFormat;

/// What a successful decode call reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrameInfo {
    /// Frame width
    pub width: u32,

    /// Frame height
    pub height: u32,

    /// Raw `AVPixelFormat` value, as reported across the C ABI
    pub pixel_format_code: i32,
}

impl DecodedFrameInfo {
    pub fn new(width: u32, height: u32, pixel_format_code: i32) -> Self {
        Self {
            width,
            height,
            pixel_format_code,
        }
    }

    /// Pixel format, if it is one of the formats this crate names
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::try_from(self.pixel_format_code).ok()
    }
}

impl fmt::Display for DecodedFrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.width, self.height)
    }
}

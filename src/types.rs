//! Parameter types shared by the safe API and the C ABI
//!
//! Discriminants follow FFmpeg's own numbering (`AVCodecID`, `AVPixelFormat`,
//! `SWS_*` flags) so values can cross the ABI unchanged.

use std::convert::TryFrom;
use std::fmt;

use bitflags::bitflags;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::software::scaling::Flags as ScalerFlags;

use crate::error::Error;

/// Video codec identifier (`AVCodecID` subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CodecId {
    Mjpeg = 7,
    H264 = 27,
    Hevc = 173,
}

impl CodecId {
    pub fn to_ffmpeg(self) -> ffmpeg::codec::Id {
        match self {
            CodecId::Mjpeg => ffmpeg::codec::Id::MJPEG,
            CodecId::H264 => ffmpeg::codec::Id::H264,
            CodecId::Hevc => ffmpeg::codec::Id::HEVC,
        }
    }

    /// Name of the Intel Quick Sync decoder for this codec, if there is one
    pub fn qsv_decoder_name(self) -> Option<&'static str> {
        match self {
            CodecId::H264 => Some("h264_qsv"),
            CodecId::Hevc => Some("hevc_qsv"),
            CodecId::Mjpeg => None,
        }
    }

    /// Whether out-of-band parameter sets are normally needed before decoding
    pub fn needs_extradata(self) -> bool {
        matches!(self, CodecId::H264 | CodecId::Hevc)
    }
}

impl TryFrom<i32> for CodecId {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(CodecId::Mjpeg),
            27 => Ok(CodecId::H264),
            173 => Ok(CodecId::Hevc),
            other => Err(Error::invalid(format!("unsupported codec id {}", other))),
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodecId::Mjpeg => "mjpeg",
            CodecId::H264 => "h264",
            CodecId::Hevc => "hevc",
        };
        f.write_str(name)
    }
}

/// Hardware acceleration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum HwAccel {
    /// Software decoding
    #[default]
    None = 0,
    /// Intel Quick Sync Video
    Qsv = 1,
}

impl TryFrom<i32> for HwAccel {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HwAccel::None),
            1 => Ok(HwAccel::Qsv),
            other => Err(Error::invalid(format!("unsupported hw accel mode {}", other))),
        }
    }
}

/// Pixel format (`AVPixelFormat` subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PixelFormat {
    None = -1,
    /// Planar YUV 4:2:0, software H.264/HEVC output
    Yuv420p = 0,
    Bgr24 = 3,
    Gray8 = 8,
    /// Full-range planar YUV 4:2:0, MJPEG output
    Yuvj420p = 12,
    /// Semi-planar YUV 4:2:0, Quick Sync output after download
    Nv12 = 23,
    Bgra = 28,
}

impl PixelFormat {
    pub fn to_ffmpeg(self) -> ffmpeg::format::Pixel {
        use ffmpeg::format::Pixel;
        match self {
            PixelFormat::None => Pixel::None,
            PixelFormat::Yuv420p => Pixel::YUV420P,
            PixelFormat::Bgr24 => Pixel::BGR24,
            PixelFormat::Gray8 => Pixel::GRAY8,
            PixelFormat::Yuvj420p => Pixel::YUVJ420P,
            PixelFormat::Nv12 => Pixel::NV12,
            PixelFormat::Bgra => Pixel::BGRA,
        }
    }

    /// Map an FFmpeg pixel format back, if it is one we know
    pub fn from_ffmpeg(pixel: ffmpeg::format::Pixel) -> Option<Self> {
        use ffmpeg::format::Pixel;
        match pixel {
            Pixel::None => Some(PixelFormat::None),
            Pixel::YUV420P => Some(PixelFormat::Yuv420p),
            Pixel::BGR24 => Some(PixelFormat::Bgr24),
            Pixel::GRAY8 => Some(PixelFormat::Gray8),
            Pixel::YUVJ420P => Some(PixelFormat::Yuvj420p),
            Pixel::NV12 => Some(PixelFormat::Nv12),
            Pixel::BGRA => Some(PixelFormat::Bgra),
            _ => None,
        }
    }

    /// Single-plane (packed) formats can be written through one buffer + stride
    pub fn is_packed(self) -> bool {
        self.bytes_per_pixel().is_some()
    }

    /// Bytes per pixel for packed formats
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Bgr24 => Some(3),
            PixelFormat::Gray8 => Some(1),
            PixelFormat::Bgra => Some(4),
            _ => None,
        }
    }
}

impl TryFrom<i32> for PixelFormat {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(PixelFormat::None),
            0 => Ok(PixelFormat::Yuv420p),
            3 => Ok(PixelFormat::Bgr24),
            8 => Ok(PixelFormat::Gray8),
            12 => Ok(PixelFormat::Yuvj420p),
            23 => Ok(PixelFormat::Nv12),
            28 => Ok(PixelFormat::Bgra),
            other => Err(Error::invalid(format!("unsupported pixel format {}", other))),
        }
    }
}

bitflags! {
    /// Scaling algorithm selector (`SWS_*` values)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScalingQuality: i32 {
        const FAST_BILINEAR = 0x1;
        const BILINEAR = 0x2;
        const BICUBIC = 0x4;
        const POINT = 0x10;
        const AREA = 0x20;
    }
}

impl Default for ScalingQuality {
    fn default() -> Self {
        Self::BILINEAR
    }
}

impl ScalingQuality {
    pub fn to_ffmpeg(self) -> ScalerFlags {
        let mut flags = ScalerFlags::empty();
        if self.contains(Self::FAST_BILINEAR) {
            flags |= ScalerFlags::FAST_BILINEAR;
        }
        if self.contains(Self::BILINEAR) {
            flags |= ScalerFlags::BILINEAR;
        }
        if self.contains(Self::BICUBIC) {
            flags |= ScalerFlags::BICUBIC;
        }
        if self.contains(Self::POINT) {
            flags |= ScalerFlags::POINT;
        }
        if self.contains(Self::AREA) {
            flags |= ScalerFlags::AREA;
        }
        flags
    }
}

/// Region of the decoded picture fed to the scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle covering a whole picture
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn has_offset(&self) -> bool {
        self.left != 0 || self.top != 0
    }

    /// Whether the rectangle lies inside a `width x height` picture
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left as u64 + self.width as u64 <= width as u64
            && self.top as u64 + self.height as u64 <= height as u64
    }
}

//! Color/size conversion of decoded pictures into caller buffers
//!
//! A `VideoScaler` is fixed to one source rectangle and pixel format pair.
//! `scale` reads the decoder's last picture and writes the converted image
//! into a single-plane destination slice with an explicit stride.

use std::os::raw::c_int;
use std::ptr;

use ffmpeg_next::ffi;
use ffmpeg_next::software::scaling::Context as ScalerContext;
use ffmpeg_next::util::frame::video::Video as FFmpegFrame;

use crate::decoder::VideoDecoder;
use crate::error::{Error, Result};
use crate::types::{PixelFormat, ScalingQuality, SourceRect};

/// Scaler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalerConfig {
    /// Region of the decoded picture to convert
    pub source: SourceRect,

    /// Pixel format of the decoded picture
    pub source_format: PixelFormat,

    /// Output width
    pub scaled_width: u32,

    /// Output height
    pub scaled_height: u32,

    /// Output pixel format (must be packed)
    pub scaled_format: PixelFormat,

    /// Scaling algorithm
    pub quality: ScalingQuality,
}

impl ScalerConfig {
    /// Full-picture conversion to BGRA at the same size
    pub fn to_bgra(width: u32, height: u32, source_format: PixelFormat) -> Self {
        Self {
            source: SourceRect::full(width, height),
            source_format,
            scaled_width: width,
            scaled_height: height,
            scaled_format: PixelFormat::Bgra,
            quality: ScalingQuality::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.width == 0 || self.source.height == 0 {
            return Err(Error::invalid("source rectangle is empty"));
        }
        if self.scaled_width == 0 || self.scaled_height == 0 {
            return Err(Error::invalid("scaled size is empty"));
        }
        if self.source_format == PixelFormat::None {
            return Err(Error::invalid("source pixel format is none"));
        }
        if !self.scaled_format.is_packed() {
            return Err(Error::invalid(format!(
                "scaled pixel format {:?} is not a single-plane format",
                self.scaled_format
            )));
        }
        Ok(())
    }

    /// Smallest destination row length in bytes
    pub fn min_stride(&self) -> usize {
        let bpp = self.scaled_format.bytes_per_pixel().unwrap_or(0);
        self.scaled_width as usize * bpp
    }

    /// Destination buffer size for a given stride
    pub fn required_buffer_size(&self, stride: usize) -> usize {
        stride * self.scaled_height as usize
    }
}

/// Software scaler bound to one configuration
pub struct VideoScaler {
    config: ScalerConfig,
    context: ScalerContext,
}

impl VideoScaler {
    /// Create a new scaler
    pub fn new(config: ScalerConfig) -> Result<Self> {
        config.validate()?;

        let context = ScalerContext::get(
            config.source_format.to_ffmpeg(),
            config.source.width,
            config.source.height,
            config.scaled_format.to_ffmpeg(),
            config.scaled_width,
            config.scaled_height,
            config.quality.to_ffmpeg(),
        )
        .map_err(|e| Error::ScalerInit(e.to_string()))?;

        log::debug!(
            "Scaler initialized: {:?} {}x{}+{}+{} -> {:?} {}x{}",
            config.source_format,
            config.source.width,
            config.source.height,
            config.source.left,
            config.source.top,
            config.scaled_format,
            config.scaled_width,
            config.scaled_height
        );

        Ok(Self { config, context })
    }

    /// Get configuration
    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Convert the decoder's last picture into `dst`.
    ///
    /// `dst` must hold at least `dst_stride * scaled_height` bytes. The decoder
    /// is borrowed mutably so a hardware picture can be downloaded and cached.
    pub fn scale(&mut self, decoder: &mut VideoDecoder, dst: &mut [u8], dst_stride: usize) -> Result<()> {
        if dst_stride < self.config.min_stride() {
            return Err(Error::invalid(format!(
                "stride {} below minimum {}",
                dst_stride,
                self.config.min_stride()
            )));
        }
        if dst_stride > c_int::MAX as usize {
            return Err(Error::invalid("stride too large"));
        }
        let required = self.config.required_buffer_size(dst_stride);
        if dst.len() < required {
            return Err(Error::invalid(format!(
                "destination holds {} bytes, {} required",
                dst.len(),
                required
            )));
        }

        let frame = decoder.software_frame()?;
        self.check_frame(frame)?;

        let sources = source_planes(frame, &self.config.source)?;
        let source_strides = unsafe { (*frame.as_ptr()).linesize };
        let destinations: [*mut u8; 4] = [dst.as_mut_ptr(), ptr::null_mut(), ptr::null_mut(), ptr::null_mut()];
        let destination_strides: [c_int; 4] = [dst_stride as c_int, 0, 0, 0];

        let rows = unsafe {
            ffi::sws_scale(
                self.context.as_mut_ptr(),
                sources.as_ptr(),
                source_strides.as_ptr(),
                0,
                self.config.source.height as c_int,
                destinations.as_ptr(),
                destination_strides.as_ptr(),
            )
        };

        if rows < 0 {
            return Err(Error::from_ffmpeg(rows));
        }

        log::trace!("Scaled {} rows", rows);
        Ok(())
    }

    fn check_frame(&self, frame: &FFmpegFrame) -> Result<()> {
        let format = PixelFormat::from_ffmpeg(frame.format());
        if format != Some(self.config.source_format) {
            return Err(Error::invalid(format!(
                "decoded format {:?} does not match scaler source {:?}",
                frame.format(),
                self.config.source_format
            )));
        }
        if !self.config.source.fits_within(frame.width(), frame.height()) {
            return Err(Error::invalid(format!(
                "source rectangle {:?} outside {}x{} picture",
                self.config.source,
                frame.width(),
                frame.height()
            )));
        }
        Ok(())
    }
}

/// Plane pointers of `frame` moved to the rectangle's origin
fn source_planes(frame: &FFmpegFrame, rect: &SourceRect) -> Result<[*const u8; 8]> {
    let raw = unsafe { &*frame.as_ptr() };
    let mut planes = [ptr::null::<u8>(); 8];

    if !rect.has_offset() {
        for (plane, data) in planes.iter_mut().zip(raw.data.iter()) {
            *plane = *data;
        }
        return Ok(planes);
    }

    let descriptor = unsafe { ffi::av_pix_fmt_desc_get(ffi::AVPixelFormat::from(frame.format())) };
    if descriptor.is_null() {
        return Err(Error::invalid(format!(
            "no descriptor for pixel format {:?}",
            frame.format()
        )));
    }
    let descriptor = unsafe { &*descriptor };
    let components = &descriptor.comp[..descriptor.nb_components as usize];

    for (index, plane) in planes.iter_mut().enumerate() {
        let base = raw.data[index];
        if base.is_null() {
            continue;
        }

        let step = components
            .iter()
            .filter(|c| c.plane as usize == index)
            .map(|c| c.step.max(1) as isize)
            .max()
            .unwrap_or(1);
        let (x_shift, y_shift) = if index == 1 || index == 2 {
            (descriptor.log2_chroma_w, descriptor.log2_chroma_h)
        } else {
            (0, 0)
        };

        let row = (rect.top >> y_shift) as isize;
        let column = (rect.left >> x_shift) as isize;
        let offset = row * raw.linesize[index] as isize + column * step;
        *plane = unsafe { base.offset(offset) as *const u8 };
    }

    Ok(planes)
}

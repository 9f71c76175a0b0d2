//! Single-frame video decoder using ffmpeg-next
//!
//! A `VideoDecoder` is bound to one codec and acceleration mode for its whole
//! life. Extradata, when the codec needs it, is set before the first decode.
//! Dropping the decoder releases every native resource it holds.

use std::os::raw::c_int;
use std::ptr;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::ffi;
use ffmpeg_next::util::frame::video::Video as FFmpegFrame;

use crate::error::{Error, Result};
use crate::types::HwAccel;

pub(crate) mod config;
mod extradata;
#[cfg(test)]
pub(crate) mod fixtures;
mod frame;
mod hwaccel;

pub use config::DecoderConfig;
pub use extradata::{build_extradata, concat_parameter_sets};
pub use frame::DecodedFrameInfo;

use hwaccel::HwDevice;

/// Main decoder struct
pub struct VideoDecoder {
    /// Decoder configuration
    config: DecoderConfig,

    /// QSV device, kept for reopening with new extradata
    hw_device: Option<HwDevice>,

    /// Opened FFmpeg decoder
    decoder: ffmpeg::decoder::Video,

    /// Last decoded picture (possibly in device memory)
    frame: FFmpegFrame,

    /// System-memory copy of `frame` for hardware decoding
    sw_frame: Option<FFmpegFrame>,

    /// Whether `frame` holds a picture
    has_frame: bool,

    /// Size of the extradata currently attached
    extradata_len: usize,
}

impl VideoDecoder {
    /// Create a new decoder
    pub fn new(config: DecoderConfig) -> Result<Self> {
        // Initialize FFmpeg (safe to call multiple times)
        ffmpeg::init().map_err(Error::from)?;

        log::info!(
            "Creating {} decoder (hw_accel={:?}, threads={})",
            config.codec_id,
            config.hw_accel,
            config.thread_count
        );

        let hw_device = match config.hw_accel {
            HwAccel::None => None,
            HwAccel::Qsv => Some(HwDevice::open_qsv()?),
        };

        let decoder = open_codec(&config, hw_device.as_ref(), None)?;

        Ok(Self {
            config,
            hw_device,
            decoder,
            frame: FFmpegFrame::empty(),
            sw_frame: None,
            has_frame: false,
            extradata_len: 0,
        })
    }

    /// Attach codec initialization data (e.g. SPS+PPS) and reopen the decoder.
    ///
    /// The bytes are copied; the caller's buffer is not retained.
    pub fn set_extradata(&mut self, extradata: &[u8]) -> Result<()> {
        if extradata.is_empty() {
            return Err(Error::invalid("extradata is empty"));
        }
        if extradata.len() > c_int::MAX as usize {
            return Err(Error::invalid("extradata too large"));
        }

        let decoder = open_codec(&self.config, self.hw_device.as_ref(), Some(extradata))?;

        self.decoder = decoder;
        self.extradata_len = extradata.len();
        self.reset_frame();

        log::debug!("Extradata set ({} bytes)", extradata.len());
        Ok(())
    }

    /// Decode one frame synchronously.
    ///
    /// Returns `Error::NoFrame` when the packet was accepted but the decoder
    /// did not produce a picture for it.
    pub fn decode_frame(&mut self, data: &[u8]) -> Result<DecodedFrameInfo> {
        if data.is_empty() {
            return Err(Error::invalid("raw buffer is empty"));
        }
        if self.extradata_len == 0 && self.config.codec_id.needs_extradata() {
            log::debug!("decode_frame - no extradata set for {}", self.config.codec_id);
        }

        let packet = ffmpeg::Packet::copy(data);

        match self.decoder.send_packet(&packet) {
            Ok(()) | Err(ffmpeg::Error::Eof) => {}
            Err(e) => {
                log::warn!("decode_frame - send_packet failed: {}", e);
                return Err(e.into());
            }
        }

        self.reset_frame();

        match self.decoder.receive_frame(&mut self.frame) {
            Ok(()) => {
                self.has_frame = true;
                let info = DecodedFrameInfo::new(
                    self.decoder.width(),
                    self.decoder.height(),
                    ffi::AVPixelFormat::from(self.decoder.format()) as i32,
                );
                log::debug!(
                    "decode_frame - got frame {}x{} (format {})",
                    info.width,
                    info.height,
                    info.pixel_format_code
                );
                Ok(info)
            }
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => {
                log::debug!("decode_frame - decoder needs more data");
                Err(Error::NoFrame)
            }
            Err(e) => {
                log::warn!("decode_frame - receive_frame failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Drop buffered packets and the last picture
    pub fn flush(&mut self) {
        self.decoder.flush();
        self.reset_frame();
    }

    /// Whether a decoded picture is available for scaling
    pub fn has_frame(&self) -> bool {
        self.has_frame
    }

    /// Size of the attached extradata (0 if none)
    pub fn extradata_len(&self) -> usize {
        self.extradata_len
    }

    /// Get configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Last decoded picture in system memory, downloading it from the device
    /// first when hardware decoding is in use
    pub(crate) fn software_frame(&mut self) -> Result<&FFmpegFrame> {
        if !self.has_frame {
            return Err(Error::NoFrame);
        }

        if !hwaccel::is_hw_frame(&self.frame) {
            return Ok(&self.frame);
        }

        if self.sw_frame.is_none() {
            let mut sw_frame = FFmpegFrame::empty();
            hwaccel::download_frame(&self.frame, &mut sw_frame)?;
            log::debug!("Downloaded hardware frame ({:?})", sw_frame.format());
            self.sw_frame = Some(sw_frame);
        }

        self.sw_frame.as_ref().ok_or(Error::NoFrame)
    }

    fn reset_frame(&mut self) {
        self.has_frame = false;
        self.sw_frame = None;
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        log::debug!("Decoder dropped ({})", self.config.codec_id);
    }
}

/// Find the codec for `config`, configure a fresh context and open it
fn open_codec(
    config: &DecoderConfig,
    hw_device: Option<&HwDevice>,
    extradata: Option<&[u8]>,
) -> Result<ffmpeg::decoder::Video> {
    let codec = match config.hw_accel {
        HwAccel::None => ffmpeg::decoder::find(config.codec_id.to_ffmpeg()),
        HwAccel::Qsv => config
            .codec_id
            .qsv_decoder_name()
            .and_then(ffmpeg::decoder::find_by_name),
    }
    .ok_or_else(|| {
        Error::CodecNotFound(format!("{} ({:?})", config.codec_id, config.hw_accel))
    })?;

    log::debug!("Using decoder: {}", codec.name());

    let mut context = CodecContext::new_with_codec(codec);

    unsafe {
        let raw = context.as_mut_ptr();

        if config.thread_count > 0 {
            (*raw).thread_count = config.thread_count as c_int;
        }

        if let Some(device) = hw_device {
            (*raw).hw_device_ctx = device.new_ref()?;
            (*raw).get_format = Some(hwaccel::select_qsv_format);
        }

        if let Some(data) = extradata {
            attach_extradata(raw, data)?;
        }
    }

    context
        .decoder()
        .open()
        .and_then(|opened| opened.video())
        .map_err(|e| Error::DecoderOpen(e.to_string()))
}

/// Copy `data` into a zero-padded FFmpeg buffer owned by the context
unsafe fn attach_extradata(context: *mut ffi::AVCodecContext, data: &[u8]) -> Result<()> {
    let padded_len = data.len() + ffi::AV_INPUT_BUFFER_PADDING_SIZE as usize;
    let buffer = ffi::av_mallocz(padded_len) as *mut u8;
    if buffer.is_null() {
        return Err(Error::Memory);
    }

    ptr::copy_nonoverlapping(data.as_ptr(), buffer, data.len());

    ffi::av_freep(ptr::addr_of_mut!((*context).extradata) as *mut _);
    (*context).extradata = buffer;
    (*context).extradata_size = data.len() as c_int;
    Ok(())
}

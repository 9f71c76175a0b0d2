//! FFI exports for C/.NET interop
//!
//! All functions in this module are exported with `#[no_mangle]` under the
//! `libffmpeghelper` symbol names and use C-compatible types.
//! Every fallible call returns a status code: 0 on success, or
//! [`Error::status_code`] of the failure (always negative).

use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr;
use std::slice;

use parking_lot::Mutex;

use crate::decoder::{DecoderConfig, VideoDecoder};
use crate::error::Error;
use crate::memory;
use crate::scaler::{ScalerConfig, VideoScaler};
use crate::types::{CodecId, HwAccel, PixelFormat, ScalingQuality, SourceRect};

// Thread-local error storage
thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = const { std::cell::RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Record `e` and turn it into a status code
fn fail(context: &str, e: Error) -> c_int {
    log::warn!("FFI::{} - {}", context, e);
    set_last_error(&e.to_string());
    e.status_code()
}

const SUCCESS: c_int = 0;

// =============================================================================
// Opaque Handles
// =============================================================================

/// Opaque decoder handle
pub struct DecoderHandle {
    decoder: Mutex<VideoDecoder>,
}

/// Opaque scaler handle
pub struct ScalerHandle {
    scaler: Mutex<VideoScaler>,
}

// =============================================================================
// Error Handling
// =============================================================================

/// Get last error message of the calling thread (null if none)
#[no_mangle]
pub extern "C" fn ffmpeghelper_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().as_ref().map(|s| s.as_ptr()).unwrap_or(ptr::null()))
}

/// Clear last error
#[no_mangle]
pub extern "C" fn ffmpeghelper_clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Initialize the library (sets up logging and FFmpeg).
/// Optional; decoders initialize FFmpeg on their own.
#[no_mangle]
pub extern "C" fn ffmpeghelper_init() {
    crate::init();
}

// =============================================================================
// Decoder Lifecycle
// =============================================================================

/// Create decoder
#[no_mangle]
pub extern "C" fn create_video_decoder(codec_id: c_int, hw_accel: c_int, handle: *mut *mut c_void) -> c_int {
    if handle.is_null() {
        return fail("create_video_decoder", Error::invalid("handle out-pointer is null"));
    }

    let config = match (CodecId::try_from(codec_id), HwAccel::try_from(hw_accel)) {
        (Ok(codec_id), Ok(hw_accel)) => DecoderConfig::new(codec_id, hw_accel),
        (Err(e), _) | (_, Err(e)) => return fail("create_video_decoder", e),
    };

    match VideoDecoder::new(config) {
        Ok(decoder) => {
            let boxed = Box::new(DecoderHandle {
                decoder: Mutex::new(decoder),
            });
            unsafe {
                *handle = Box::into_raw(boxed) as *mut c_void;
            }
            SUCCESS
        }
        Err(e) => fail("create_video_decoder", e),
    }
}

/// Destroy decoder
#[no_mangle]
pub extern "C" fn remove_video_decoder(handle: *mut c_void) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle as *mut DecoderHandle));
        }
    }
}

/// Set codec extradata (copied)
#[no_mangle]
pub extern "C" fn set_video_decoder_extradata(
    handle: *mut c_void,
    extradata: *const c_void,
    extradata_length: c_int,
) -> c_int {
    if handle.is_null() || extradata.is_null() || extradata_length <= 0 {
        return fail("set_video_decoder_extradata", Error::invalid("null handle or empty extradata"));
    }

    let handle = unsafe { &*(handle as *const DecoderHandle) };
    let data = unsafe { slice::from_raw_parts(extradata as *const u8, extradata_length as usize) };

    match handle.decoder.lock().set_extradata(data) {
        Ok(()) => SUCCESS,
        Err(e) => fail("set_video_decoder_extradata", e),
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one frame
#[no_mangle]
pub extern "C" fn decode_video_frame(
    handle: *mut c_void,
    raw_buffer: *const c_void,
    raw_buffer_length: c_int,
    frame_width: *mut c_int,
    frame_height: *mut c_int,
    frame_pixel_format: *mut c_int,
) -> c_int {
    if handle.is_null()
        || raw_buffer.is_null()
        || raw_buffer_length <= 0
        || frame_width.is_null()
        || frame_height.is_null()
        || frame_pixel_format.is_null()
    {
        return fail("decode_video_frame", Error::invalid("null argument or empty buffer"));
    }

    let handle = unsafe { &*(handle as *const DecoderHandle) };
    let data = unsafe { slice::from_raw_parts(raw_buffer as *const u8, raw_buffer_length as usize) };

    match handle.decoder.lock().decode_frame(data) {
        Ok(info) => {
            unsafe {
                *frame_width = info.width as c_int;
                *frame_height = info.height as c_int;
                *frame_pixel_format = info.pixel_format_code;
            }
            SUCCESS
        }
        Err(e) => fail("decode_video_frame", e),
    }
}

// =============================================================================
// Native Memory
// =============================================================================

/// Allocate from FFmpeg's allocator (null on failure or non-positive size)
#[no_mangle]
pub extern "C" fn custom_alloc(buffer_size: c_int) -> *mut c_void {
    if buffer_size <= 0 {
        set_last_error("buffer size must be positive");
        return ptr::null_mut();
    }
    memory::allocate(buffer_size as usize)
}

/// Free memory from `custom_alloc`
#[no_mangle]
pub extern "C" fn custom_free(buffer: *mut c_void) {
    unsafe { memory::free(buffer) };
}

/// Free memory from `custom_alloc` (alias kept for existing callers)
#[no_mangle]
pub extern "C" fn free_buff(buffer: *mut c_void) {
    custom_free(buffer);
}

// =============================================================================
// Scaler
// =============================================================================

fn scaler_config(
    source_left: c_int,
    source_top: c_int,
    source_width: c_int,
    source_height: c_int,
    source_pixel_format: c_int,
    scaled_width: c_int,
    scaled_height: c_int,
    scaled_pixel_format: c_int,
    quality: c_int,
) -> Result<ScalerConfig, Error> {
    let to_u32 = |value: c_int, name: &str| {
        u32::try_from(value).map_err(|_| Error::invalid(format!("{} is negative", name)))
    };

    Ok(ScalerConfig {
        source: SourceRect::new(
            to_u32(source_left, "source_left")?,
            to_u32(source_top, "source_top")?,
            to_u32(source_width, "source_width")?,
            to_u32(source_height, "source_height")?,
        ),
        source_format: PixelFormat::try_from(source_pixel_format)?,
        scaled_width: to_u32(scaled_width, "scaled_width")?,
        scaled_height: to_u32(scaled_height, "scaled_height")?,
        scaled_format: PixelFormat::try_from(scaled_pixel_format)?,
        quality: ScalingQuality::from_bits_truncate(quality),
    })
}

/// Create scaler
#[no_mangle]
pub extern "C" fn create_video_scaler(
    source_left: c_int,
    source_top: c_int,
    source_width: c_int,
    source_height: c_int,
    source_pixel_format: c_int,
    scaled_width: c_int,
    scaled_height: c_int,
    scaled_pixel_format: c_int,
    quality: c_int,
    handle: *mut *mut c_void,
) -> c_int {
    if handle.is_null() {
        return fail("create_video_scaler", Error::invalid("handle out-pointer is null"));
    }

    let scaler = scaler_config(
        source_left,
        source_top,
        source_width,
        source_height,
        source_pixel_format,
        scaled_width,
        scaled_height,
        scaled_pixel_format,
        quality,
    )
    .and_then(VideoScaler::new);

    match scaler {
        Ok(scaler) => {
            let boxed = Box::new(ScalerHandle {
                scaler: Mutex::new(scaler),
            });
            unsafe {
                *handle = Box::into_raw(boxed) as *mut c_void;
            }
            SUCCESS
        }
        Err(e) => fail("create_video_scaler", e),
    }
}

/// Scale the decoder's last frame into `scaled_buffer`.
///
/// The buffer must hold `scaled_buffer_stride * scaled_height` bytes.
#[no_mangle]
pub extern "C" fn scale_decoded_video_frame(
    handle: *mut c_void,
    scaler_handle: *mut c_void,
    scaled_buffer: *mut c_void,
    scaled_buffer_stride: c_int,
) -> c_int {
    if handle.is_null() || scaler_handle.is_null() || scaled_buffer.is_null() || scaled_buffer_stride <= 0 {
        return fail("scale_decoded_video_frame", Error::invalid("null argument or bad stride"));
    }

    let handle = unsafe { &*(handle as *const DecoderHandle) };
    let scaler_handle = unsafe { &*(scaler_handle as *const ScalerHandle) };

    let mut scaler = scaler_handle.scaler.lock();
    let stride = scaled_buffer_stride as usize;
    let len = scaler.config().required_buffer_size(stride);
    let dst = unsafe { slice::from_raw_parts_mut(scaled_buffer as *mut u8, len) };

    let mut decoder = handle.decoder.lock();
    match scaler.scale(&mut decoder, dst, stride) {
        Ok(()) => SUCCESS,
        Err(e) => fail("scale_decoded_video_frame", e),
    }
}

/// Destroy scaler
#[no_mangle]
pub extern "C" fn remove_video_scaler(handle: *mut c_void) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle as *mut ScalerHandle));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;
    use crate::decoder::{build_extradata, fixtures};

    fn create(codec: CodecId) -> *mut c_void {
        let mut handle = ptr::null_mut();
        assert_eq!(create_video_decoder(codec as c_int, HwAccel::None as c_int, &mut handle), 0);
        assert!(!handle.is_null());
        handle
    }

    #[test]
    fn test_null_arguments() {
        assert_eq!(create_video_decoder(27, 0, ptr::null_mut()), -1);
        assert_eq!(set_video_decoder_extradata(ptr::null_mut(), ptr::null(), 4), -1);

        let (mut w, mut h, mut f) = (0, 0, 0);
        assert_eq!(decode_video_frame(ptr::null_mut(), ptr::null(), 1, &mut w, &mut h, &mut f), -1);
        assert_eq!(scale_decoded_video_frame(ptr::null_mut(), ptr::null_mut(), ptr::null_mut(), 4), -1);

        // Removing null is a no-op
        remove_video_decoder(ptr::null_mut());
        remove_video_scaler(ptr::null_mut());
    }

    #[test]
    fn test_unknown_codec_sets_last_error() {
        ffmpeghelper_clear_last_error();
        let mut handle = ptr::null_mut();
        assert_eq!(create_video_decoder(9999, 0, &mut handle), -1);
        assert!(handle.is_null());

        let message = ffmpeghelper_get_last_error();
        assert!(!message.is_null());
        let message = unsafe { CStr::from_ptr(message) }.to_str().unwrap();
        assert!(message.contains("9999"));

        ffmpeghelper_clear_last_error();
        assert!(ffmpeghelper_get_last_error().is_null());
    }

    #[test]
    fn test_decode_through_abi() {
        let handle = create(CodecId::Mjpeg);
        let jpeg = fixtures::mjpeg_frame(64, 48);

        let (mut w, mut h, mut f) = (0, 0, -1);
        let status = decode_video_frame(
            handle,
            jpeg.as_ptr() as *const c_void,
            jpeg.len() as c_int,
            &mut w,
            &mut h,
            &mut f,
        );
        assert_eq!(status, 0);
        assert_eq!((w, h), (64, 48));
        assert_ne!(f, PixelFormat::None as c_int);

        remove_video_decoder(handle);
    }

    #[test]
    fn test_decode_h264_through_abi() {
        let handle = create(CodecId::H264);
        let extradata = build_extradata(&fixtures::H264_SPS, &fixtures::H264_PPS);
        assert_eq!(
            set_video_decoder_extradata(handle, extradata.as_ptr() as *const c_void, extradata.len() as c_int),
            0
        );

        let frame = fixtures::h264_idr_frame();
        let (mut w, mut h, mut f) = (0, 0, -1);
        let status = decode_video_frame(
            handle,
            frame.as_ptr() as *const c_void,
            frame.len() as c_int,
            &mut w,
            &mut h,
            &mut f,
        );
        assert_eq!(status, 0);
        assert_eq!((w, h), (16, 16));
        assert_eq!(f, PixelFormat::Yuv420p as c_int);

        remove_video_decoder(handle);
    }

    #[test]
    fn test_empty_extradata_rejected() {
        let handle = create(CodecId::H264);
        let data = [0u8; 4];
        assert_eq!(set_video_decoder_extradata(handle, data.as_ptr() as *const c_void, 0), -1);
        remove_video_decoder(handle);
    }

    #[test]
    fn test_scale_through_abi() {
        let handle = create(CodecId::Mjpeg);
        let jpeg = fixtures::mjpeg_frame(32, 32);
        let (mut w, mut h, mut f) = (0, 0, 0);
        assert_eq!(
            decode_video_frame(handle, jpeg.as_ptr() as *const c_void, jpeg.len() as c_int, &mut w, &mut h, &mut f),
            0
        );

        let mut scaler = ptr::null_mut();
        let status = create_video_scaler(
            0,
            0,
            w,
            h,
            f,
            16,
            16,
            PixelFormat::Bgra as c_int,
            ScalingQuality::BICUBIC.bits(),
            &mut scaler,
        );
        assert_eq!(status, 0);

        let stride = 16 * 4;
        let buffer = custom_alloc(stride * 16);
        assert!(!buffer.is_null());
        assert_eq!(scale_decoded_video_frame(handle, scaler, buffer, stride), 0);

        custom_free(buffer);
        remove_video_scaler(scaler);
        remove_video_decoder(handle);
    }

    #[test]
    fn test_scaler_rejects_negative_geometry() {
        let mut scaler = ptr::null_mut();
        let status = create_video_scaler(-1, 0, 16, 16, 12, 16, 16, 28, 2, &mut scaler);
        assert_eq!(status, -1);
        assert!(scaler.is_null());
    }

    #[test]
    fn test_custom_alloc() {
        assert!(custom_alloc(0).is_null());
        let buffer = custom_alloc(128);
        assert!(!buffer.is_null());
        free_buff(buffer);
        custom_free(ptr::null_mut());
    }
}

//! Intel Quick Sync device setup

use ffmpeg_next::ffi;

use crate::error::{Error, Result};

/// Reference-counted `AVHWDeviceContext` for a QSV device
pub(crate) struct HwDevice {
    device_ref: *mut ffi::AVBufferRef,
}

impl HwDevice {
    /// Open the default QSV device
    #[cfg(feature = "qsv")]
    pub fn open_qsv() -> Result<Self> {
        let mut device_ref = std::ptr::null_mut();
        let ret = unsafe {
            ffi::av_hwdevice_ctx_create(
                &mut device_ref,
                ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_QSV,
                c"auto".as_ptr(),
                std::ptr::null_mut(),
                0,
            )
        };

        if ret < 0 || device_ref.is_null() {
            let reason = ffmpeg_next::Error::from(ret).to_string();
            log::warn!("QSV device unavailable: {}", reason);
            return Err(Error::HwDevice(reason));
        }

        log::info!("Opened QSV device");
        Ok(Self { device_ref })
    }

    #[cfg(not(feature = "qsv"))]
    pub fn open_qsv() -> Result<Self> {
        Err(Error::HwDevice("built without qsv support".to_string()))
    }

    /// New reference for a codec context to own
    pub fn new_ref(&self) -> Result<*mut ffi::AVBufferRef> {
        let new_ref = unsafe { ffi::av_buffer_ref(self.device_ref) };
        if new_ref.is_null() {
            return Err(Error::Memory);
        }
        Ok(new_ref)
    }
}

impl Drop for HwDevice {
    fn drop(&mut self) {
        unsafe { ffi::av_buffer_unref(&mut self.device_ref) };
    }
}

unsafe impl Send for HwDevice {}

/// `get_format` callback: take the QSV surface format when the decoder offers it.
/// No `hw_frames_ctx` is set; the QSV decoder builds its surface pool from
/// the context's `hw_device_ctx`.
pub(crate) unsafe extern "C" fn select_qsv_format(
    _ctx: *mut ffi::AVCodecContext,
    formats: *const ffi::AVPixelFormat,
) -> ffi::AVPixelFormat {
    let mut cursor = formats;
    while !cursor.is_null() && *cursor != ffi::AVPixelFormat::AV_PIX_FMT_NONE {
        if *cursor == ffi::AVPixelFormat::AV_PIX_FMT_QSV {
            return ffi::AVPixelFormat::AV_PIX_FMT_QSV;
        }
        cursor = cursor.add(1);
    }

    log::error!("The QSV pixel format not offered in get_format()");
    ffi::AVPixelFormat::AV_PIX_FMT_NONE
}

/// Whether the frame lives in device memory
pub(crate) fn is_hw_frame(frame: &ffmpeg_next::frame::Video) -> bool {
    unsafe { !(*frame.as_ptr()).hw_frames_ctx.is_null() }
}

/// Copy a device frame into system memory
pub(crate) fn download_frame(
    hw_frame: &ffmpeg_next::frame::Video,
    sw_frame: &mut ffmpeg_next::frame::Video,
) -> Result<()> {
    let ret = unsafe { ffi::av_hwframe_transfer_data(sw_frame.as_mut_ptr(), hw_frame.as_ptr(), 0) };
    if ret < 0 {
        return Err(Error::from_ffmpeg(ret));
    }
    Ok(())
}

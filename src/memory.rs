//! Buffers from FFmpeg's allocator
//!
//! `av_malloc` memory is suitably aligned for SIMD scaling, so it is the
//! preferred destination for `scale_decoded_video_frame`.

use std::ffi::c_void;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use ffmpeg_next::ffi;

use crate::error::{Error, Result};

/// Zero-initialized byte buffer owned by FFmpeg's allocator
pub struct NativeBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl NativeBuffer {
    /// Allocate `len` zeroed bytes
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid("buffer size must be positive"));
        }
        let raw = unsafe { ffi::av_mallocz(len) } as *mut u8;
        let ptr = NonNull::new(raw).ok_or(Error::Memory)?;
        Ok(Self { ptr, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Give up ownership; release with [`free`]
    pub fn into_raw(self) -> *mut u8 {
        let raw = self.ptr.as_ptr();
        std::mem::forget(self);
        raw
    }

    /// Take back a buffer produced by [`NativeBuffer::into_raw`] or [`allocate`].
    ///
    /// # Safety
    /// `ptr` must come from FFmpeg's allocator, hold at least `len` bytes and
    /// not be owned by anything else.
    pub unsafe fn from_raw(ptr: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, len })
    }
}

impl Deref for NativeBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for NativeBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        unsafe { ffi::av_free(self.ptr.as_ptr() as *mut c_void) };
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

unsafe impl Send for NativeBuffer {}

/// Raw `av_malloc`; null on failure
pub fn allocate(size: usize) -> *mut c_void {
    unsafe { ffi::av_malloc(size) }
}

/// Raw `av_free`; null is ignored
///
/// # Safety
/// `ptr` must be null or come from [`allocate`] / [`NativeBuffer::into_raw`]
/// and not be freed twice.
pub unsafe fn free(ptr: *mut c_void) {
    if !ptr.is_null() {
        ffi::av_free(ptr);
    }
}

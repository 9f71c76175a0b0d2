//! ffmpeg-helper - single-frame video decoding over FFmpeg
//!
//! This crate is the `libffmpeghelper` native library:
//! - Decoder handles bound to one codec and acceleration mode (software or QSV)
//! - Extradata (SPS/PPS) injection before decoding
//! - Synchronous one-packet-in, one-frame-out decoding
//! - Scaling/color conversion of the decoded picture into caller buffers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           FFI Layer                  │
//! │  (C exports via #[no_mangle])        │
//! └─────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌──────────────────┐ ┌────────────────┐
//! │  Decoder Module  │◀│ Scaler Module  │
//! │  (ffmpeg-next)   │ │ (swscale)      │
//! └──────────────────┘ └────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────┐
//! │      Pipeline (decode-frame)         │
//! │  (files -> extradata -> decode)      │
//! └─────────────────────────────────────┘
//! ```

pub mod decoder;
pub mod error;
pub mod ffi;
pub mod memory;
pub mod pipeline;
pub mod scaler;
pub mod types;

// Re-export main types
pub use decoder::{build_extradata, DecodedFrameInfo, DecoderConfig, VideoDecoder};
pub use error::{Error, Result};
pub use memory::NativeBuffer;
pub use scaler::{ScalerConfig, VideoScaler};
pub use types::{CodecId, HwAccel, PixelFormat, ScalingQuality, SourceRect};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (call once at startup)
pub fn init() {
    // Initialize logging with info level by default if RUST_LOG is not set
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();

    if let Err(e) = ffmpeg_next::init() {
        log::error!("FFmpeg initialization failed: {}", e);
        return;
    }

    log::info!("ffmpeg-helper {} initialized", VERSION);
}

//! Error types for ffmpeg-helper

use thiserror::Error;

/// Result type alias for ffmpeg-helper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for decoder and scaler operations
#[derive(Error, Debug)]
pub enum Error {
    /// Null pointer, bad length, unknown enum value or mismatched geometry
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Memory allocation error
    #[error("Memory allocation failed")]
    Memory,

    /// Hardware device could not be opened
    #[error("Hardware device unavailable: {0}")]
    HwDevice(String),

    /// No decoder for the requested codec / acceleration pair
    #[error("Codec not found: {0}")]
    CodecNotFound(String),

    /// Codec context could not be opened
    #[error("Failed to open decoder: {0}")]
    DecoderOpen(String),

    /// Packet accepted but no picture came out
    #[error("No frame decoded")]
    NoFrame,

    /// Software scaler could not be created
    #[error("Failed to create scaler: {0}")]
    ScalerInit(String),

    /// FFmpeg error with code
    #[error("FFmpeg error {code}: {message}")]
    FFmpeg { code: i32, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Status code reported across the C ABI. Zero is never returned here.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => -1,
            Error::Memory => -2,
            Error::HwDevice(_) => -3,
            Error::CodecNotFound(_) => -4,
            Error::DecoderOpen(_) => -6,
            Error::NoFrame => -8,
            Error::ScalerInit(_) => -9,
            Error::FFmpeg { code, .. } => *code,
            Error::Io(_) => -99,
        }
    }

    /// Whether the failure came from the native side rather than local I/O
    pub fn is_native(&self) -> bool {
        !matches!(self, Error::Io(_))
    }

    /// Create from FFmpeg error code
    pub fn from_ffmpeg(code: i32) -> Self {
        let message = ffmpeg_next::Error::from(code).to_string();
        Error::FFmpeg { code, message }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

impl From<ffmpeg_next::Error> for Error {
    fn from(e: ffmpeg_next::Error) -> Self {
        Error::FFmpeg {
            code: i32::from(e),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::invalid("x").status_code(), -1);
        assert_eq!(Error::Memory.status_code(), -2);
        assert_eq!(Error::HwDevice("qsv".into()).status_code(), -3);
        assert_eq!(Error::CodecNotFound("h264".into()).status_code(), -4);
        assert_eq!(Error::NoFrame.status_code(), -8);
    }

    #[test]
    fn test_ffmpeg_code_passthrough() {
        let err = Error::from_ffmpeg(-22);
        assert!(matches!(err, Error::FFmpeg { code: -22, .. }));
        assert_eq!(err.status_code(), -22);
        assert!(err.is_native());
    }

    #[test]
    fn test_io_is_local() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sps.dat");
        let err = Error::from(io);
        assert!(!err.is_native());
        assert!(err.to_string().contains("sps.dat"));
    }
}

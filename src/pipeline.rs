//! The demonstration decode sequence
//!
//! create decoder -> load frame/SPS/PPS -> build extradata -> set extradata
//! -> decode one frame. The first failing step stops the sequence and is
//! reported with the step it happened in.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::decoder::{build_extradata, DecodedFrameInfo, DecoderConfig, VideoDecoder};
use crate::error::Error;

/// Default input file names, read from the working directory
pub const FRAME_FILE: &str = "frame.dat";
pub const SPS_FILE: &str = "sps.dat";
pub const PPS_FILE: &str = "pps.dat";

/// Step of the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateDecoder,
    LoadInputs,
    SetExtradata,
    DecodeFrame,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CreateDecoder => "create decoder",
            Stage::LoadInputs => "load inputs",
            Stage::SetExtradata => "set extradata",
            Stage::DecodeFrame => "decode frame",
        };
        f.write_str(name)
    }
}

/// Failure of one step
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(Error) -> Self {
        move |source| Self { stage, source }
    }

    /// Native failures carry a status code; local ones (file I/O) do not
    pub fn status_code(&self) -> Option<i32> {
        self.source.is_native().then(|| self.source.status_code())
    }

    /// Status code to print as `decoded error: CODE`. Only a failed decode
    /// call is reported this way; earlier native failures are logged.
    pub fn decode_status(&self) -> Option<i32> {
        match self.stage {
            Stage::DecodeFrame => self.status_code(),
            _ => None,
        }
    }
}

/// Paths of the three input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInputs {
    pub frame: PathBuf,
    pub sps: PathBuf,
    pub pps: PathBuf,
}

impl Default for DriverInputs {
    fn default() -> Self {
        Self {
            frame: PathBuf::from(FRAME_FILE),
            sps: PathBuf::from(SPS_FILE),
            pps: PathBuf::from(PPS_FILE),
        }
    }
}

/// Input bytes ready for the decoder
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub frame: Vec<u8>,
    pub extradata: Vec<u8>,
}

impl DriverInputs {
    /// Default file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            frame: dir.join(FRAME_FILE),
            sps: dir.join(SPS_FILE),
            pps: dir.join(PPS_FILE),
        }
    }

    /// Read all three files and build SPS+PPS extradata
    pub fn load(&self) -> Result<LoadedInputs, Error> {
        let frame = read_input(&self.frame)?;
        let sps = read_input(&self.sps)?;
        let pps = read_input(&self.pps)?;

        log::debug!(
            "Loaded inputs: frame={} bytes, sps={} bytes, pps={} bytes",
            frame.len(),
            sps.len(),
            pps.len()
        );

        Ok(LoadedInputs {
            frame,
            extradata: build_extradata(&sps, &pps),
        })
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    let data = fs::read(path).map_err(|e| {
        Error::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    if data.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: file is empty", path.display()),
        )));
    }
    Ok(data)
}

/// Run the whole sequence once
pub fn run(config: &DecoderConfig, inputs: &DriverInputs) -> Result<DecodedFrameInfo, StageError> {
    let mut decoder = VideoDecoder::new(config.clone()).map_err(StageError::at(Stage::CreateDecoder))?;

    let loaded = inputs.load().map_err(StageError::at(Stage::LoadInputs))?;

    decoder
        .set_extradata(&loaded.extradata)
        .map_err(StageError::at(Stage::SetExtradata))?;

    let info = decoder
        .decode_frame(&loaded.frame)
        .map_err(StageError::at(Stage::DecodeFrame))?;

    log::info!("Decoded {} frame: {}x{}", config.codec_id, info.width, info.height);
    Ok(info)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::decoder::fixtures;
    use crate::types::{CodecId, PixelFormat};

    fn write_inputs(dir: &Path, frame: &[u8], sps: &[u8], pps: &[u8]) -> DriverInputs {
        let inputs = DriverInputs::in_dir(dir);
        fs::write(&inputs.frame, frame).unwrap();
        fs::write(&inputs.sps, sps).unwrap();
        fs::write(&inputs.pps, pps).unwrap();
        inputs
    }

    #[test]
    fn test_default_inputs() {
        let inputs = DriverInputs::default();
        assert_eq!(inputs.frame, PathBuf::from("frame.dat"));
        assert_eq!(inputs.sps, PathBuf::from("sps.dat"));
        assert_eq!(inputs.pps, PathBuf::from("pps.dat"));
    }

    #[test]
    fn test_load_builds_extradata() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[9, 9], &[1, 2, 3], &[4, 5]);

        let loaded = inputs.load().unwrap();
        assert_eq!(loaded.frame, vec![9, 9]);
        assert_eq!(loaded.extradata, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_file_is_local_error() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = DriverInputs::in_dir(dir.path());

        let err = run(&DecoderConfig::software(CodecId::H264), &inputs).unwrap_err();
        assert_eq!(err.stage, Stage::LoadInputs);
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("frame.dat"));
    }

    #[test]
    fn test_run_decodes_frame() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = fixtures::mjpeg_frame(48, 32);
        // MJPEG ignores this extradata; it only has to be non-empty
        let inputs = write_inputs(dir.path(), &jpeg, &[0, 0], &[0, 0]);

        let info = run(&DecoderConfig::software(CodecId::Mjpeg), &inputs).unwrap();
        assert_eq!((info.width, info.height), (48, 32));
    }

    #[test]
    fn test_run_decodes_h264_frame() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(
            dir.path(),
            &fixtures::h264_idr_frame(),
            &fixtures::H264_SPS,
            &fixtures::H264_PPS,
        );

        let info = run(&DecoderConfig::software(CodecId::H264), &inputs).unwrap();
        assert_eq!((info.width, info.height), fixtures::H264_SIZE);
        assert_eq!(info.pixel_format(), Some(PixelFormat::Yuv420p));
        assert_eq!(info.to_string(), "16/16");
    }

    #[test]
    fn test_empty_input_file_is_local_error() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[0, 0, 0, 1, 0x65], &[], &fixtures::H264_PPS);

        let err = run(&DecoderConfig::software(CodecId::H264), &inputs).unwrap_err();
        assert_eq!(err.stage, Stage::LoadInputs);
        assert_eq!(err.status_code(), None);
        assert_eq!(err.decode_status(), None);
        assert!(err.to_string().contains("sps.dat"));
    }

    #[test]
    fn test_only_decode_failures_are_reported() {
        let err = StageError::at(Stage::SetExtradata)(Error::invalid("bad extradata"));
        assert_eq!(err.status_code(), Some(-1));
        assert_eq!(err.decode_status(), None);

        let dir = tempfile::tempdir().unwrap();
        // Not a JPEG: no start-of-image marker
        let inputs = write_inputs(dir.path(), &[0x00, 0x01, 0x02, 0x03], &[0, 0], &[0, 0]);

        let err = run(&DecoderConfig::software(CodecId::Mjpeg), &inputs).unwrap_err();
        assert_eq!(err.stage, Stage::DecodeFrame);
        assert!(err.decode_status().is_some());
        assert_eq!(err.decode_status(), err.status_code());
    }

    #[test]
    fn test_garbage_frame_fails_at_decode() {
        let dir = tempfile::tempdir().unwrap();
        // Parameter sets that do not describe the slice
        let inputs = write_inputs(
            dir.path(),
            &[0, 0, 0, 1, 0x65, 0x88, 0x84, 0x00],
            &[0, 0, 0, 1, 0x67, 0xff],
            &[0, 0, 0, 1, 0x68, 0xff],
        );

        match run(&DecoderConfig::software(CodecId::H264), &inputs) {
            Err(err) => {
                assert!(matches!(err.stage, Stage::SetExtradata | Stage::DecodeFrame));
                assert!(err.status_code().is_some());
            }
            Ok(info) => panic!("garbage decoded to {}", info),
        }
    }
}

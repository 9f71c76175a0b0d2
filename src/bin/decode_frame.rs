//! decode-frame
//!
//! Decodes a single frame from `frame.dat` using `sps.dat` + `pps.dat` as
//! extradata and prints the decoded size.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ffmpeghelper::pipeline::{self, DriverInputs};
use ffmpeghelper::{CodecId, DecoderConfig, HwAccel};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodecArg {
    Mjpeg,
    H264,
    Hevc,
}

impl From<CodecArg> for CodecId {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Mjpeg => CodecId::Mjpeg,
            CodecArg::H264 => CodecId::H264,
            CodecArg::Hevc => CodecId::Hevc,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AccelArg {
    None,
    Qsv,
}

impl From<AccelArg> for HwAccel {
    fn from(arg: AccelArg) -> Self {
        match arg {
            AccelArg::None => HwAccel::None,
            AccelArg::Qsv => HwAccel::Qsv,
        }
    }
}

#[derive(Parser)]
#[command(name = "decode-frame")]
#[command(version, about = "Decode one video frame and print its size", long_about = None)]
struct Cli {
    /// Raw bitstream of the frame
    #[arg(long, default_value = pipeline::FRAME_FILE)]
    frame: PathBuf,

    /// Sequence parameter set
    #[arg(long, default_value = pipeline::SPS_FILE)]
    sps: PathBuf,

    /// Picture parameter set
    #[arg(long, default_value = pipeline::PPS_FILE)]
    pps: PathBuf,

    /// Codec of the bitstream
    #[arg(long, value_enum, default_value_t = CodecArg::H264)]
    codec: CodecArg,

    /// Decoding path
    #[arg(long, value_enum, default_value_t = AccelArg::None)]
    hw_accel: AccelArg,

    /// Decoder threads (0 = FFmpeg default)
    #[arg(long, default_value_t = 0)]
    threads: u32,
}

fn main() -> Result<ExitCode> {
    ffmpeghelper::init();

    let cli = Cli::parse();
    let config = DecoderConfig::new(cli.codec.into(), cli.hw_accel.into()).with_thread_count(cli.threads);
    let inputs = DriverInputs {
        frame: cli.frame,
        sps: cli.sps,
        pps: cli.pps,
    };

    match pipeline::run(&config, &inputs) {
        Ok(info) => {
            println!("decoded width/height: {}", info);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if err.status_code().is_none() {
                return Err(err).context("failed to read decoder inputs");
            }

            log::error!("{}", err);
            if let Some(code) = err.decode_status() {
                println!("decoded error: {}", code);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

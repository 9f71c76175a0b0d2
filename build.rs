//! Build script for ffmpeg-helper
//!
//! This script:
//! 1. Locates FFmpeg libraries using pkg-config
//! 2. Generates the C header using cbindgen
//! 3. Sets up link paths for static/dynamic linking

use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    // Get build configuration
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    // Find FFmpeg libraries
    find_ffmpeg_libs();

    // Generate C header
    generate_header(&manifest_dir, &out_dir);
}

/// Find FFmpeg libraries using pkg-config or fallback paths
fn find_ffmpeg_libs() {
    let libs = ["libavcodec", "libavutil", "libswscale"];

    let mut found_all = true;
    for lib in &libs {
        match pkg_config::Config::new()
            .atleast_version("58.0.0") // FFmpeg 6.0+
            .probe(lib)
        {
            Ok(library) => {
                println!("cargo:info=Found {} via pkg-config", lib);
                for path in &library.link_paths {
                    println!("cargo:rustc-link-search=native={}", path.display());
                }
            }
            Err(e) => {
                println!("cargo:warning=pkg-config failed for {}: {}", lib, e);
                found_all = false;
            }
        }
    }

    if !found_all {
        try_fallback_paths();
    }
}

/// Try common FFmpeg installation paths
fn try_fallback_paths() {
    let lib_paths = [
        "/usr/lib/x86_64-linux-gnu",
        "/usr/local/lib",
        "/opt/homebrew/opt/ffmpeg/lib",
        "/opt/homebrew/lib",
        // Local FFmpeg build with QSV enabled
        "ffmpeg-build/output/lib",
    ];

    for path in &lib_paths {
        if Path::new(path).exists() {
            println!("cargo:rustc-link-search=native={}", path);
            println!("cargo:info=Added link path: {}", path);
        }
    }

    // Link FFmpeg libraries dynamically
    println!("cargo:rustc-link-lib=dylib=avcodec");
    println!("cargo:rustc-link-lib=dylib=avutil");
    println!("cargo:rustc-link-lib=dylib=swscale");
}

/// Generate C header using cbindgen
fn generate_header(manifest_dir: &str, out_dir: &str) {
    let crate_dir = PathBuf::from(manifest_dir);
    let config_path = crate_dir.join("cbindgen.toml");

    let header_out = PathBuf::from(out_dir).join("ffmpeghelper.h");
    let include_dir = crate_dir.join("include");

    let config = if config_path.exists() {
        cbindgen::Config::from_file(&config_path).unwrap_or_default()
    } else {
        cbindgen::Config::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header_out);
            println!("cargo:info=Generated header: {}", header_out.display());

            // Also copy next to the sources for foreign projects if the directory exists
            if include_dir.exists() {
                let header = include_dir.join("ffmpeghelper.h");
                bindings.write_to_file(&header);
                println!("cargo:info=Copied header to: {}", header.display());
            }
        }
        Err(e) => {
            println!("cargo:warning=cbindgen failed: {}", e);
            create_fallback_header(out_dir);
        }
    }
}

/// Create a minimal fallback header if cbindgen fails
fn create_fallback_header(out_dir: &str) {
    let header_content = r#"
#ifndef FFMPEGHELPER_H
#define FFMPEGHELPER_H

// Note: This is a fallback header. Build with cbindgen for full API.

// Error handling
const char* ffmpeghelper_get_last_error(void);
void ffmpeghelper_clear_last_error(void);
void ffmpeghelper_init(void);

// Decoder
int create_video_decoder(int codec_id, int hw_accel, void** handle);
void remove_video_decoder(void* handle);
int set_video_decoder_extradata(void* handle, const void* extradata, int extradata_length);
int decode_video_frame(void* handle, const void* raw_buffer, int raw_buffer_length,
                       int* frame_width, int* frame_height, int* frame_pixel_format);

// Memory
void* custom_alloc(int buffer_size);
void custom_free(void* buffer);
void free_buff(void* buffer);

// Scaler
int create_video_scaler(int source_left, int source_top, int source_width, int source_height,
                        int source_pixel_format, int scaled_width, int scaled_height,
                        int scaled_pixel_format, int quality, void** handle);
int scale_decoded_video_frame(void* handle, void* scaler_handle, void* scaled_buffer,
                              int scaled_buffer_stride);
void remove_video_scaler(void* handle);

#endif // FFMPEGHELPER_H
"#;

    let header_path = PathBuf::from(out_dir).join("ffmpeghelper.h");
    std::fs::write(&header_path, header_content).expect("Failed to write fallback header");
    println!("cargo:info=Created fallback header: {}", header_path.display());
}

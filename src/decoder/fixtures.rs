//! Test bitstreams
//!
//! MJPEG is produced with FFmpeg's built-in encoder. FFmpeg has no built-in
//! H.264 encoder, so the H.264 stream is written out by hand: a 16x16
//! baseline IDR picture made of one I_PCM macroblock.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::Pixel;

/// Encode one gradient picture as a baseline JPEG
pub(crate) fn mjpeg_frame(width: u32, height: u32) -> Vec<u8> {
    ffmpeg::init().unwrap();

    let codec = ffmpeg::encoder::find(ffmpeg::codec::Id::MJPEG).expect("mjpeg encoder");
    let mut encoder = CodecContext::new_with_codec(codec)
        .encoder()
        .video()
        .expect("video encoder context");
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::YUVJ420P);
    encoder.set_time_base((1, 25));
    let mut encoder = encoder.open().expect("open mjpeg encoder");

    let mut picture = ffmpeg::frame::Video::new(Pixel::YUVJ420P, width, height);
    for plane in 0..3 {
        for (i, byte) in picture.data_mut(plane).iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
    }
    picture.set_pts(Some(0));

    encoder.send_frame(&picture).expect("send frame");
    encoder.send_eof().expect("send eof");

    let mut packet = ffmpeg::Packet::empty();
    encoder.receive_packet(&mut packet).expect("receive packet");
    packet.data().expect("packet data").to_vec()
}

/// Size of the hand-written H.264 picture
pub(crate) const H264_SIZE: (u32, u32) = (16, 16);

/// SPS: baseline, level 1.0, poc type 2, no reference frames, 1x1 macroblocks
pub(crate) const H264_SPS: [u8; 10] = [0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xc0, 0x0a, 0xdd, 0xe4];

/// PPS: CAVLC, one slice group, all QP offsets zero
pub(crate) const H264_PPS: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x68, 0xce, 0x38, 0x80];

/// IDR slice header (I slice, frame_num 0) followed by mb_type I_PCM and the
/// alignment bits
const H264_IDR_HEADER: [u8; 9] = [0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x86, 0x80];

/// Mid-gray PCM samples (256 luma, 2 x 64 chroma); no zero bytes, so no
/// emulation prevention is needed
const H264_PCM_SAMPLES: usize = 256 + 64 + 64;

/// The IDR picture as an Annex B access unit
pub(crate) fn h264_idr_frame() -> Vec<u8> {
    let mut frame = H264_IDR_HEADER.to_vec();
    frame.extend(std::iter::repeat(0x80).take(H264_PCM_SAMPLES));
    // rbsp_slice_trailing_bits
    frame.push(0x80);
    frame
}

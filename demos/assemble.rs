//! Assemble PNG frames into an animated WebP, then decode it back.
//!
//! Run with `RUST_LOG=debug` to see the encoder and decoder lifecycle.

use std::env;
use std::fs;
use webpkit::{AnimationDecoder, AnimationEncoder, AnimationOptions, EncodeOptions, FrameStep};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: assemble <frame_ms> <output.webp> <frame1.png> [frame2.png ...]");
        return;
    }
    let frame_ms: i32 = args[1].parse().expect("frame_ms must be an integer");
    let output = &args[2];

    let frames: Vec<_> = args[3..]
        .iter()
        .map(|path| image::open(path).unwrap().to_rgba8())
        .collect();
    let (width, height) = frames[0].dimensions();

    let mut encoder =
        AnimationEncoder::with_options(width, height, &AnimationOptions::new().loop_count(0))
            .unwrap();
    encoder
        .configure(&EncodeOptions::new().quality(80.0).method(4))
        .unwrap();
    for (i, frame) in frames.iter().enumerate() {
        encoder.add_frame_rgba(frame.as_raw(), i as i32 * frame_ms).unwrap();
    }
    let webp = encoder.finish(frames.len() as i32 * frame_ms).unwrap();
    fs::write(output, &webp).unwrap();
    eprintln!("Wrote {} frames, {} bytes to {}", frames.len(), webp.len(), output);

    let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
    let canvas = decoder.decode_header().unwrap().clone();
    eprintln!(
        "{}x{}, {} frames, loop_count {}",
        canvas.width, canvas.height, canvas.frame_count, canvas.loop_count
    );
    while let FrameStep::Frame(frame) = decoder.next_frame().unwrap() {
        eprintln!(
            "  frame {}: {}ms +{}ms",
            frame.index, frame.timestamp_ms, frame.duration_ms
        );
    }
}

//! # webpkit
//!
//! Animated WebP assembly and frame-by-frame decoding on top of libwebp.
//!
//! This crate wraps libwebp via FFI to provide:
//! - An animation encoder that accumulates timestamped RGBA frames
//! - An animation decoder that composites frames onto a full canvas
//! - Option translation from typed or named settings to libwebp's config
//! - Cooperative cancellation and encode progress callbacks
//! - Still image encode, decode and header probing
//!
//! ## Quick Start
//!
//! ```rust
//! use webpkit::{AnimationDecoder, AnimationEncoder, AnimationOptions, FrameStep};
//!
//! let frames: Vec<Vec<u8>> = [[255u8, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]
//!     .iter()
//!     .map(|px| px.repeat(16 * 16))
//!     .collect();
//!
//! // Encode three 100ms frames that loop forever
//! let mut encoder =
//!     AnimationEncoder::with_options(16, 16, &AnimationOptions::new().loop_count(0))?;
//! for (i, frame) in frames.iter().enumerate() {
//!     encoder.add_frame_rgba(frame, i as i32 * 100)?;
//! }
//! let webp = encoder.finish(300)?;
//!
//! // Decode them back
//! let mut decoder = AnimationDecoder::from_bytes(&webp)?;
//! assert_eq!(decoder.decode_header()?.frame_count, 3);
//! while let FrameStep::Frame(frame) = decoder.next_frame()? {
//!     assert_eq!(frame.duration_ms, 100);
//! }
//! # Ok::<(), webpkit::At<webpkit::Error>>(())
//! ```
//!
//! ## Named options
//!
//! ```rust
//! use webpkit::{AnimationEncoder, EncodeOptions};
//!
//! let options = EncodeOptions::from_named([("preset", "picture"), ("quality", "85")])?;
//! let mut encoder = AnimationEncoder::new(64, 64)?;
//! encoder.configure(&options)?;
//! # Ok::<(), webpkit::At<webpkit::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

whereat::define_at_crate_info!();

mod animation;
mod config;
mod decode;
mod encode;
mod error;
pub mod pixel;
mod progress;

// Re-exports
pub use animation::{
    AnimationDecoder, AnimationEncoder, BitstreamFormat, DecodedCanvas, DecodedFrame,
    DecoderState, EncoderState, Frame, FrameStep,
};
pub use config::{
    AnimationOptions, EncodeOptions, ImageHint, Preset, ResolvedConfig, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_LOOP_COUNT, DEFAULT_QUALITY,
};
pub use decode::{decode_rgba, decode_to_img, probe};
pub use encode::{encode_lossless, encode_rgba, MAX_DIMENSION};
pub use error::{DecodingError, EncodingError, Error, Result};
pub use progress::{CancelFlag, EncodeProgress, NoProgress};

pub use enough::{Stop, StopReason, Unstoppable};
pub use whereat::At;

/// Library version information.
pub fn version() -> (u32, u32, u32) {
    let v = unsafe { libwebp_sys::WebPGetDecoderVersion() } as u32;
    ((v >> 16) & 0xff, (v >> 8) & 0xff, v & 0xff)
}

//! Still image decoding and header probing.

use crate::animation::{read_features, still_canvas, AnimationDecoder, DecodedCanvas, FrameStep};
use crate::error::{DecodingError, Error, Result};
use alloc::vec::Vec;
use enough::StopReason;
use imgref::ImgVec;
use rgb::RGBA8;
use whereat::*;

/// Read canvas information without decoding pixels.
///
/// Animated files are opened with the animation decoder to read the frame
/// and loop counts.
///
/// # Example
///
/// ```rust
/// use webpkit::Unstoppable;
///
/// let webp = webpkit::encode_lossless(&[10u8; 4 * 3 * 4], 4, 3, Unstoppable)?;
/// let canvas = webpkit::probe(&webp)?;
/// assert_eq!((canvas.width, canvas.height, canvas.frame_count), (4, 3, 1));
/// assert!(!canvas.has_animation);
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
pub fn probe(data: &[u8]) -> Result<DecodedCanvas> {
    let features = read_features(data)?;
    if features.has_animation == 0 {
        return Ok(still_canvas(&features));
    }
    let decoder = AnimationDecoder::from_bytes(data)?;
    decoder.decode_header().cloned()
}

/// Decode WebP data to RGBA pixels.
///
/// Returns the pixels and dimensions. For an animation this is the first
/// composited frame.
///
/// # Errors
///
/// Data without a readable WebP header yields `InvalidWebP`. A failure
/// inside `WebPDecodeRGBA` or the animation decoder maps to
/// `DecodeFailed(DecodingError::BitstreamError)`, since neither API reports a
/// status code.
pub fn decode_rgba(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let features = read_features(data)?;
    if features.has_animation != 0 {
        return decode_first_frame(data);
    }

    let mut width: i32 = 0;
    let mut height: i32 = 0;

    let ptr =
        unsafe { libwebp_sys::WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height) };

    // Null is the only failure signal.
    if ptr.is_null() {
        log::warn!("libwebp failed to decode {} byte still image", data.len());
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    let size = (width as usize) * (height as usize) * 4;
    let pixels = unsafe {
        let slice = core::slice::from_raw_parts(ptr, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(ptr as *mut _);
        vec
    };

    Ok((pixels, width as u32, height as u32))
}

/// Decode WebP data to an imgref image.
///
/// # Example
///
/// ```rust
/// use webpkit::Unstoppable;
///
/// let webp = webpkit::encode_lossless(&[200u8; 2 * 2 * 4], 2, 2, Unstoppable)?;
/// let img = webpkit::decode_to_img(&webp)?;
/// assert_eq!((img.width(), img.height()), (2, 2));
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
pub fn decode_to_img(data: &[u8]) -> Result<ImgVec<RGBA8>> {
    let (bytes, width, height) = decode_rgba(data)?;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| RGBA8::new(px[0], px[1], px[2], px[3]))
        .collect();
    Ok(ImgVec::new(pixels, width as usize, height as usize))
}

fn decode_first_frame(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let mut decoder = AnimationDecoder::from_bytes(data)?;
    match decoder.next_frame()? {
        FrameStep::Frame(frame) => Ok((frame.pixels.to_vec(), frame.width, frame.height)),
        FrameStep::EndOfStream => Err(at!(Error::DecodeFailed(DecodingError::NotEnoughData))),
        FrameStep::Cancelled => Err(at!(Error::Cancelled(StopReason::Cancelled))),
    }
}

//! Conversion between host RGBA buffers and libwebp's packed ARGB words.
//!
//! Hosts hand over tightly packed RGBA8888 rows. Read as little-endian
//! integers those pixels are `0xAABBGGRR`, while `WebPPicture::argb` holds
//! `0xAARRGGBB`. Every pixel therefore has its red and blue channels swapped
//! on the way in and on the way out.

use crate::error::{Error, Result};
use alloc::vec::Vec;
use whereat::*;

/// Bytes per pixel for every buffer this crate accepts.
pub const BYTES_PER_PIXEL: usize = 4;

/// Convert a host-packed `0xAABBGGRR` pixel to codec `0xAARRGGBB`.
#[inline]
#[must_use]
pub const fn abgr_to_argb(pixel: u32) -> u32 {
    (pixel & 0xff00_ff00) | ((pixel & 0x0000_00ff) << 16) | ((pixel >> 16) & 0x0000_00ff)
}

/// Convert a codec `0xAARRGGBB` pixel to host-packed `0xAABBGGRR`.
///
/// The swap is its own inverse.
#[inline]
#[must_use]
pub const fn argb_to_abgr(pixel: u32) -> u32 {
    abgr_to_argb(pixel)
}

/// Convert host RGBA rows to codec ARGB words.
///
/// `stride` is the distance between rows in bytes and must equal
/// `width * 4`; padded rows are rejected with [`Error::InvalidFormat`].
pub fn rgba_to_argb(src: &[u8], width: u32, height: u32, stride: usize) -> Result<Vec<u32>> {
    check_layout(src.len(), width, height, stride)?;

    let argb = src
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|px| abgr_to_argb(u32::from_le_bytes([px[0], px[1], px[2], px[3]])))
        .collect();
    Ok(argb)
}

/// Convert codec ARGB words back to host RGBA bytes.
pub fn argb_to_rgba(src: &[u32], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = pixel_count(width, height)?;
    if src.len() != expected {
        return Err(at!(Error::InvalidInput(alloc::format!(
            "expected {} pixels, got {}",
            expected,
            src.len()
        ))));
    }

    let mut out = Vec::with_capacity(expected * BYTES_PER_PIXEL);
    for &px in src {
        out.extend_from_slice(&argb_to_abgr(px).to_le_bytes());
    }
    Ok(out)
}

/// Swap red and blue while copying 4-byte pixels from `src` into `dst`.
///
/// Turns libwebp's BGRA output (ARGB memory order) into RGBA in place of a
/// reused buffer. Both slices must have the same length, a multiple of 4.
pub(crate) fn swap_red_blue_into(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    for (s, d) in src
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(dst.chunks_exact_mut(BYTES_PER_PIXEL))
    {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
}

/// Copy ARGB words into a codec picture whose row stride may exceed `width`.
pub(crate) fn write_argb_rows(
    argb: &[u32],
    width: u32,
    dst: &mut [u32],
    dst_stride: usize,
) {
    let width = width as usize;
    for (row, out) in argb.chunks_exact(width).zip(dst.chunks_mut(dst_stride)) {
        out[..width].copy_from_slice(row);
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(at!(Error::InvalidInput(
            "width and height must be non-zero".into(),
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| at!(Error::InvalidInput("dimensions overflow".into())))
}

pub(crate) fn check_layout(len: usize, width: u32, height: u32, stride: usize) -> Result<()> {
    let pixels = pixel_count(width, height)?;
    let row_bytes = width as usize * BYTES_PER_PIXEL;
    if stride != row_bytes {
        return Err(at!(Error::InvalidFormat(alloc::format!(
            "stride {} does not match width * 4 = {}; only tightly packed RGBA is supported",
            stride,
            row_bytes
        ))));
    }
    let expected = pixels * BYTES_PER_PIXEL;
    if len != expected {
        return Err(at!(Error::InvalidInput(alloc::format!(
            "buffer is {} bytes, expected {}",
            len,
            expected
        ))));
    }
    Ok(())
}

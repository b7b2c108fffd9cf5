//! Still image encoding, and the picture plumbing shared with the
//! animation encoder.

use crate::config::EncodeOptions;
use crate::error::{EncodingError, Error, Result};
use crate::pixel;
use crate::progress::{EncodeProgress, NoProgress, ProgressContext};
use alloc::vec::Vec;
use enough::Stop;
use whereat::*;

/// Largest width or height libwebp accepts.
pub const MAX_DIMENSION: u32 = 16383;

/// Encode RGBA pixels to lossy WebP.
///
/// # Arguments
///
/// * `data` - RGBA pixel data, exactly `width * height * 4` bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - Quality factor (0.0 = smallest, 100.0 = best)
/// * `stop` - Cancellation token ([`enough::Unstoppable`] for none)
///
/// # Example
///
/// ```rust
/// use webpkit::Unstoppable;
///
/// let rgba = vec![200u8; 8 * 8 * 4];
/// let webp = webpkit::encode_rgba(&rgba, 8, 8, 85.0, Unstoppable)?;
/// assert_eq!(&webp[..4], b"RIFF");
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
pub fn encode_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    quality: f32,
    stop: impl Stop,
) -> Result<Vec<u8>> {
    EncodeOptions::new()
        .quality(quality)
        .encode_rgba(data, width, height, stop)
}

/// Encode RGBA pixels to lossless WebP.
///
/// Lossless encoding preserves all pixel values exactly.
pub fn encode_lossless(data: &[u8], width: u32, height: u32, stop: impl Stop) -> Result<Vec<u8>> {
    EncodeOptions::new_lossless()
        .exact(true)
        .encode_rgba(data, width, height, stop)
}

impl EncodeOptions {
    /// Encode one RGBA image with these options.
    pub fn encode_rgba(&self, data: &[u8], width: u32, height: u32, stop: impl Stop) -> Result<Vec<u8>> {
        self.encode_rgba_with_progress(data, width, height, stop, &NoProgress)
    }

    /// Encode one RGBA image, reporting progress to `progress`.
    ///
    /// Returns [`Error::Cancelled`] if `stop` fires or `progress` returns an
    /// error before libwebp finishes.
    pub fn encode_rgba_with_progress(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        stop: impl Stop,
        progress: &dyn EncodeProgress,
    ) -> Result<Vec<u8>> {
        validate_dimensions(width, height)?;
        stop.check().map_err(|reason| at!(Error::Cancelled(reason)))?;

        let config = self.to_libwebp()?;
        let mut picture = OwnedPicture::from_rgba(data, width, height)?;

        let mut ctx = ProgressContext::new(&stop, progress);
        ctx.attach(picture.as_mut());

        let mut writer = core::mem::MaybeUninit::<libwebp_sys::WebPMemoryWriter>::uninit();
        unsafe { libwebp_sys::WebPMemoryWriterInit(writer.as_mut_ptr()) };
        let mut writer = unsafe { writer.assume_init() };

        let pic = picture.as_mut();
        pic.writer = Some(libwebp_sys::WebPMemoryWrite);
        pic.custom_ptr = &mut writer as *mut _ as *mut _;

        let ok = unsafe { libwebp_sys::WebPEncode(&config, pic) };

        let result = if ok == 0 {
            Err(picture_error(picture.as_mut(), &ctx))
        } else {
            // SAFETY: the memory writer owns `size` initialized bytes at `mem`.
            Ok(unsafe { core::slice::from_raw_parts(writer.mem, writer.size) }.to_vec())
        };
        unsafe { libwebp_sys::WebPMemoryWriterClear(&mut writer) };

        if let Ok(bytes) = &result {
            log::debug!("encoded {}x{} still image: {} bytes", width, height, bytes.len());
        }
        result
    }
}

/// A `WebPPicture` holding ARGB pixels, freed on drop.
pub(crate) struct OwnedPicture {
    picture: libwebp_sys::WebPPicture,
}

impl OwnedPicture {
    /// Allocate a picture and fill it from tightly packed RGBA bytes.
    pub(crate) fn from_rgba(data: &[u8], width: u32, height: u32) -> Result<Self> {
        let argb = pixel::rgba_to_argb(data, width, height, width as usize * pixel::BYTES_PER_PIXEL)?;

        let picture = libwebp_sys::WebPPicture::new()
            .map_err(|_| at!(Error::InvalidConfig("failed to init picture".into())))?;
        let mut owned = Self { picture };
        owned.picture.width = width as i32;
        owned.picture.height = height as i32;
        owned.picture.use_argb = 1;

        if unsafe { libwebp_sys::WebPPictureAlloc(&mut owned.picture) } == 0 {
            return Err(at!(Error::OutOfMemory));
        }

        let stride = owned.picture.argb_stride as usize;
        // SAFETY: WebPPictureAlloc allocated `argb_stride * height` words.
        let dst = unsafe {
            core::slice::from_raw_parts_mut(owned.picture.argb, stride * height as usize)
        };
        pixel::write_argb_rows(&argb, width, dst, stride);

        Ok(owned)
    }

    pub(crate) fn as_mut(&mut self) -> &mut libwebp_sys::WebPPicture {
        &mut self.picture
    }
}

impl Drop for OwnedPicture {
    fn drop(&mut self) {
        unsafe { libwebp_sys::WebPPictureFree(&mut self.picture) };
    }
}

/// Error for a failed encode of `picture`, preferring a hook-reported stop.
pub(crate) fn picture_error(
    picture: &libwebp_sys::WebPPicture,
    ctx: &ProgressContext<'_>,
) -> whereat::At<Error> {
    if let Some(reason) = ctx.stopped() {
        return at!(Error::Cancelled(reason));
    }
    let error = EncodingError::from(picture.error_code as i32);
    log::warn!("libwebp encode failed: {} (code {})", error, error.code());
    at!(Error::EncodeFailed(error))
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(at!(Error::InvalidInput(
            "width and height must be non-zero".into(),
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(at!(Error::InvalidInput(alloc::format!(
            "dimensions exceed maximum ({} x {})",
            MAX_DIMENSION,
            MAX_DIMENSION
        ))));
    }
    Ok(())
}

use crate::config::{AnimationOptions, EncodeOptions};
use crate::encode::{validate_dimensions, OwnedPicture};
use crate::error::{EncodingError, Error, Result};
use crate::progress::{CancelFlag, EncodeProgress, NoProgress, ProgressContext};
use alloc::vec::Vec;
use core::ptr;
use enough::StopReason;
use rgb::RGBA8;
use whereat::*;

/// Lifecycle of an [`AnimationEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Accepting frames.
    Accumulating,
    /// `assemble` has produced the output; no more frames.
    Finalized,
    /// libwebp resources are freed.
    Released,
}

impl EncoderState {
    fn describe(self) -> &'static str {
        match self {
            EncoderState::Accumulating => "accumulating",
            EncoderState::Finalized => "finalized",
            EncoderState::Released => "released",
        }
    }
}

/// Animated WebP encoder.
///
/// Frames are added in timestamp order and [`assemble`](Self::assemble)d
/// into one WebP file. Every frame must match the canvas size given at
/// creation.
///
/// # Example
///
/// ```rust
/// use webpkit::{AnimationEncoder, AnimationOptions, EncodeOptions};
///
/// let red = [255u8, 0, 0, 255].repeat(16 * 16);
/// let blue = [0u8, 0, 255, 255].repeat(16 * 16);
///
/// let mut encoder =
///     AnimationEncoder::with_options(16, 16, &AnimationOptions::new().loop_count(0))?;
/// encoder.configure(&EncodeOptions::new_lossless())?;
/// encoder.add_frame_rgba(&red, 0)?;      // First frame at t=0
/// encoder.add_frame_rgba(&blue, 100)?;   // Second frame at t=100ms
/// let webp = encoder.assemble(200)?;     // Second frame lasts 100ms
/// encoder.release();
/// assert!(!webp.is_empty());
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
pub struct AnimationEncoder {
    encoder: *mut libwebp_sys::WebPAnimEncoder,
    width: u32,
    height: u32,
    config: libwebp_sys::WebPConfig,
    state: EncoderState,
    frame_count: u32,
    last_timestamp: Option<i32>,
    cancel: CancelFlag,
}

// SAFETY: the WebPAnimEncoder is only reached through `&mut self`.
unsafe impl Send for AnimationEncoder {}

impl AnimationEncoder {
    /// Create an encoder with default [`AnimationOptions`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_options(width, height, &AnimationOptions::default())
    }

    /// Create an encoder for a `width` x `height` canvas.
    pub fn with_options(width: u32, height: u32, options: &AnimationOptions) -> Result<Self> {
        validate_dimensions(width, height)?;

        let native_options = options.to_libwebp()?;
        let config = EncodeOptions::default().to_libwebp()?;

        let encoder = unsafe {
            libwebp_sys::WebPAnimEncoderNewInternal(
                width as i32,
                height as i32,
                &native_options,
                libwebp_sys::WEBP_MUX_ABI_VERSION as i32,
            )
        };

        if encoder.is_null() {
            return Err(at!(Error::OutOfMemory));
        }

        log::debug!(
            "animation encoder created: {}x{}, loop_count={}, bgcolor={:#010x}",
            width,
            height,
            options.loop_count,
            options.background_color
        );

        Ok(Self {
            encoder,
            width,
            height,
            config,
            state: EncoderState::Accumulating,
            frame_count: 0,
            last_timestamp: None,
            cancel: CancelFlag::new(),
        })
    }

    /// Apply per-frame codec options.
    ///
    /// Only allowed before the first frame; libwebp fixes the settings once
    /// encoding has started.
    pub fn configure(&mut self, options: &EncodeOptions) -> Result<()> {
        self.require_accumulating("configure")?;
        if self.frame_count > 0 {
            return Err(at!(Error::InvalidState {
                operation: "configure",
                state: "holding frames",
            }));
        }
        self.config = options.to_libwebp()?;
        log::debug!("animation encoder configured: {:?}", options);
        Ok(())
    }

    /// Add a frame of typed pixels.
    pub fn add_frame(&mut self, pixels: &[RGBA8], timestamp_ms: i32) -> Result<()> {
        // SAFETY: RGBA8 is repr(C) and has the same layout as [u8; 4]
        let data = unsafe {
            core::slice::from_raw_parts(pixels.as_ptr() as *const u8, pixels.len() * 4)
        };
        self.add_frame_with_progress(data, timestamp_ms, &NoProgress)
    }

    /// Add a frame of RGBA bytes (exactly `width * height * 4`).
    pub fn add_frame_rgba(&mut self, data: &[u8], timestamp_ms: i32) -> Result<()> {
        self.add_frame_with_progress(data, timestamp_ms, &NoProgress)
    }

    /// Add a frame, reporting progress to `progress`.
    ///
    /// `timestamp_ms` is the frame's start time and must not be lower than
    /// the previous frame's. An equal timestamp leaves the previous frame
    /// with zero duration, which libwebp treats as a no-op frame.
    ///
    /// libwebp encodes animation frames from its own copy of the canvas and
    /// does not run picture progress hooks, so progress is frame-grained:
    /// `progress` sees 0 before the frame is handed to libwebp and 100 once
    /// it has been accepted. The cancel flag and the sink's answer at 0 are
    /// the abort points; a frame already accepted is never rolled back.
    ///
    /// On failure no frame is recorded and the encoder keeps accepting
    /// frames.
    pub fn add_frame_with_progress(
        &mut self,
        data: &[u8],
        timestamp_ms: i32,
        progress: &dyn EncodeProgress,
    ) -> Result<()> {
        self.require_accumulating("add a frame")?;
        self.check_timestamp(timestamp_ms)?;
        if Some(timestamp_ms) == self.last_timestamp {
            log::debug!(
                "frame {} shares timestamp {}ms; previous frame gets zero duration",
                self.frame_count,
                timestamp_ms
            );
        }

        let mut picture = OwnedPicture::from_rgba(data, self.width, self.height)?;
        let mut ctx = ProgressContext::new(&self.cancel, progress);
        if !ctx.report(0) {
            let reason = ctx.stopped().unwrap_or(StopReason::Cancelled);
            log::debug!("frame {} cancelled before encoding", self.frame_count);
            return Err(at!(Error::Cancelled(reason)));
        }

        let ok = unsafe {
            libwebp_sys::WebPAnimEncoderAdd(
                self.encoder,
                picture.as_mut(),
                timestamp_ms,
                &self.config,
            )
        };

        if ok == 0 {
            let code = picture.as_mut().error_code as i32;
            if code != 0 {
                let error = EncodingError::from(code);
                log::warn!("libwebp rejected frame {}: {} (code {})", self.frame_count, error, code);
                return Err(at!(Error::EncodeFailed(error)));
            }
            let msg = self.last_error();
            log::warn!("libwebp rejected frame {}: {}", self.frame_count, msg);
            return Err(at!(Error::AnimationError(msg)));
        }

        // Committed; a stop requested now applies to the next frame.
        let _ = ctx.report(100);

        log::trace!("added frame {} at {}ms", self.frame_count, timestamp_ms);
        self.frame_count += 1;
        self.last_timestamp = Some(timestamp_ms);
        Ok(())
    }

    /// Finish the animation and return the encoded WebP bytes.
    ///
    /// `end_timestamp_ms` closes the last frame: its duration is the gap
    /// between the last added timestamp and this value. Can be called once.
    pub fn assemble(&mut self, end_timestamp_ms: i32) -> Result<Vec<u8>> {
        self.require_accumulating("assemble")?;
        if self.frame_count == 0 {
            return Err(at!(Error::InvalidInput(
                "cannot assemble an animation without frames".into(),
            )));
        }
        self.check_timestamp(end_timestamp_ms)?;

        // NULL frame marks the end timestamp
        let ok = unsafe {
            libwebp_sys::WebPAnimEncoderAdd(
                self.encoder,
                ptr::null_mut(),
                end_timestamp_ms,
                ptr::null(),
            )
        };
        if ok == 0 {
            let msg = self.last_error();
            log::warn!("libwebp rejected end marker: {}", msg);
            return Err(at!(Error::AnimationError(msg)));
        }

        let mut webp_data = libwebp_sys::WebPData::default();
        let ok = unsafe { libwebp_sys::WebPAnimEncoderAssemble(self.encoder, &mut webp_data) };
        // The end marker is in; the encoder cannot take more frames either way.
        self.state = EncoderState::Finalized;

        if ok == 0 {
            unsafe { libwebp_sys::WebPDataClear(&mut webp_data) };
            let msg = self.last_error();
            log::warn!("libwebp failed to assemble animation: {}", msg);
            return Err(at!(Error::AnimationError(msg)));
        }

        let result = unsafe {
            if webp_data.bytes.is_null() || webp_data.size == 0 {
                libwebp_sys::WebPDataClear(&mut webp_data);
                return Err(at!(Error::AnimationError("empty output".into())));
            }
            let vec = core::slice::from_raw_parts(webp_data.bytes, webp_data.size).to_vec();
            libwebp_sys::WebPDataClear(&mut webp_data);
            vec
        };

        log::debug!(
            "assembled {} frames ending at {}ms: {} bytes",
            self.frame_count,
            end_timestamp_ms,
            result.len()
        );
        Ok(result)
    }

    /// Assemble and release in one step.
    pub fn finish(mut self, end_timestamp_ms: i32) -> Result<Vec<u8>> {
        let result = self.assemble(end_timestamp_ms);
        self.release();
        result
    }

    /// Free the libwebp encoder. Safe to call more than once and from any
    /// state; also run on drop.
    pub fn release(&mut self) {
        if !self.encoder.is_null() {
            unsafe { libwebp_sys::WebPAnimEncoderDelete(self.encoder) };
            self.encoder = ptr::null_mut();
            log::debug!("animation encoder released after {} frames", self.frame_count);
        }
        self.state = EncoderState::Released;
    }

    /// Request that the current or next `add_frame` stop early.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Flag that cancels this encoder, usable from another thread.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Frames accepted so far.
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Timestamp of the last accepted frame.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<i32> {
        self.last_timestamp
    }

    /// Canvas width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn require_accumulating(&self, operation: &'static str) -> Result<()> {
        if self.state != EncoderState::Accumulating {
            return Err(at!(Error::InvalidState {
                operation,
                state: self.state.describe(),
            }));
        }
        Ok(())
    }

    fn check_timestamp(&self, timestamp_ms: i32) -> Result<()> {
        if timestamp_ms < 0 {
            return Err(at!(Error::InvalidInput(alloc::format!(
                "timestamp {}ms is negative",
                timestamp_ms
            ))));
        }
        match self.last_timestamp {
            Some(last) if timestamp_ms < last => Err(at!(Error::InvalidInput(alloc::format!(
                "timestamp {}ms is before previous frame at {}ms",
                timestamp_ms,
                last
            )))),
            _ => Ok(()),
        }
    }

    fn last_error(&self) -> alloc::string::String {
        unsafe {
            let ptr = libwebp_sys::WebPAnimEncoderGetError(self.encoder);
            if ptr.is_null() {
                "unknown error".into()
            } else {
                core::ffi::CStr::from_ptr(ptr)
                    .to_str()
                    .unwrap_or("unknown error")
                    .into()
            }
        }
    }
}

impl Drop for AnimationEncoder {
    fn drop(&mut self) {
        self.release();
    }
}

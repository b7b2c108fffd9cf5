use crate::error::{DecodingError, Error, Result};
use crate::pixel;
use crate::progress::CancelFlag;
use alloc::vec;
use alloc::vec::Vec;
use core::ptr;
use enough::StopReason;
use whereat::*;

/// Bitstream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum BitstreamFormat {
    /// Format not determined (mixed, or an animation).
    #[default]
    Undefined,
    /// Lossy compression (VP8).
    Lossy,
    /// Lossless compression (VP8L).
    Lossless,
}

impl BitstreamFormat {
    fn from_features(format: i32) -> Self {
        match format {
            1 => BitstreamFormat::Lossy,
            2 => BitstreamFormat::Lossless,
            _ => BitstreamFormat::Undefined,
        }
    }
}

/// Canvas-level information about a WebP file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DecodedCanvas {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Whether any frame carries alpha.
    pub has_alpha: bool,
    /// Whether the file has an animation chunk.
    pub has_animation: bool,
    /// Background color (ARGB).
    pub bgcolor: u32,
    /// Number of frames (1 for still images).
    pub frame_count: u32,
    /// Loop count (0 = infinite, 1 for still images).
    pub loop_count: u32,
    /// Bitstream format.
    pub format: BitstreamFormat,
}

/// A frame in an animation, owning its pixels.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Frame {
    /// Frame pixel data (RGBA).
    pub data: Vec<u8>,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Frame start time in milliseconds from animation start.
    pub timestamp_ms: i32,
    /// Frame duration in milliseconds.
    pub duration_ms: i32,
}

/// A composited frame borrowed from the decoder's canvas.
///
/// The pixels are overwritten by the next call to
/// [`AnimationDecoder::next_frame`].
#[derive(Debug, Clone, Copy)]
pub struct DecodedFrame<'a> {
    /// Zero-based frame index within the current loop.
    pub index: u32,
    /// Start time in milliseconds from the start of the loop.
    pub timestamp_ms: i32,
    /// How long the frame is shown, in milliseconds.
    pub duration_ms: i32,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Full-canvas RGBA pixels.
    pub pixels: &'a [u8],
}

impl DecodedFrame<'_> {
    /// Copy the frame out of the decoder.
    #[must_use]
    pub fn to_frame(&self) -> Frame {
        Frame {
            data: self.pixels.to_vec(),
            width: self.width,
            height: self.height,
            timestamp_ms: self.timestamp_ms,
            duration_ms: self.duration_ms,
        }
    }
}

/// Result of one [`AnimationDecoder::next_frame`] call.
#[derive(Debug)]
pub enum FrameStep<'a> {
    /// The next composited frame.
    Frame(DecodedFrame<'a>),
    /// The current loop has no more frames.
    EndOfStream,
    /// The cancel flag was observed; no frame was decoded.
    Cancelled,
}

/// Lifecycle of an [`AnimationDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No source yet.
    Created,
    /// Source accepted and header read.
    Configured,
    /// At least one frame of the current loop decoded.
    Decoding,
    /// Every frame of the current loop decoded.
    Exhausted,
    /// Cancelled through the cancel flag.
    Cancelled,
    /// libwebp resources are freed.
    Released,
}

impl DecoderState {
    fn describe(self) -> &'static str {
        match self {
            DecoderState::Created => "created",
            DecoderState::Configured => "configured",
            DecoderState::Decoding => "decoding",
            DecoderState::Exhausted => "exhausted",
            DecoderState::Cancelled => "cancelled",
            DecoderState::Released => "released",
        }
    }
}

/// Animated WebP decoder that composites frames onto a full canvas.
///
/// Still images are accepted too and behave as a one-frame animation that
/// plays once.
///
/// # Example
///
/// ```rust
/// use webpkit::{AnimationDecoder, AnimationEncoder, FrameStep};
///
/// let mut encoder = AnimationEncoder::new(8, 8)?;
/// encoder.add_frame_rgba(&[255u8, 0, 0, 255].repeat(64), 0)?;
/// encoder.add_frame_rgba(&[0u8, 255, 0, 255].repeat(64), 40)?;
/// let webp = encoder.finish(80)?;
///
/// let mut decoder = AnimationDecoder::from_bytes(&webp)?;
/// let canvas = decoder.decode_header()?;
/// assert_eq!((canvas.width, canvas.height), (8, 8));
///
/// while let FrameStep::Frame(frame) = decoder.next_frame()? {
///     println!("frame {} at {}ms for {}ms", frame.index, frame.timestamp_ms, frame.duration_ms);
/// }
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
#[derive(Debug)]
pub struct AnimationDecoder {
    decoder: *mut libwebp_sys::WebPAnimDecoder,
    // libwebp reads from this buffer for the decoder's whole lifetime
    data: Vec<u8>,
    canvas: Vec<u8>,
    info: Option<DecodedCanvas>,
    state: DecoderState,
    frame_index: u32,
    last_timestamp: i32,
    loops_completed: u32,
    cancel: CancelFlag,
}

// SAFETY: the WebPAnimDecoder is only reached through `&mut self`.
unsafe impl Send for AnimationDecoder {}

impl Default for AnimationDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDecoder {
    /// Create a decoder with no source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: ptr::null_mut(),
            data: Vec::new(),
            canvas: Vec::new(),
            info: None,
            state: DecoderState::Created,
            frame_index: 0,
            last_timestamp: 0,
            loops_completed: 0,
            cancel: CancelFlag::new(),
        }
    }

    /// Create a decoder and set its source.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut decoder = Self::new();
        decoder.set_source(data)?;
        Ok(decoder)
    }

    /// Copy `data` in and read the canvas header.
    pub fn set_source(&mut self, data: &[u8]) -> Result<()> {
        if self.state != DecoderState::Created {
            return Err(self.invalid_state("set the source"));
        }

        let features = read_features(data)?;
        let data = data.to_vec();

        let mut options = core::mem::MaybeUninit::<libwebp_sys::WebPAnimDecoderOptions>::uninit();
        let ok = unsafe { libwebp_sys::WebPAnimDecoderOptionsInit(options.as_mut_ptr()) };
        if ok == 0 {
            return Err(at!(Error::InvalidConfig(
                "failed to init decoder options".into(),
            )));
        }
        let mut options = unsafe { options.assume_init() };
        options.color_mode = libwebp_sys::WEBP_CSP_MODE::MODE_BGRA;
        options.use_threads = 0;

        let webp_data = libwebp_sys::WebPData {
            bytes: data.as_ptr(),
            size: data.len(),
        };
        let decoder = unsafe { libwebp_sys::WebPAnimDecoderNew(&webp_data, &options) };
        if decoder.is_null() {
            log::warn!("libwebp could not open a {} byte source", data.len());
            return Err(at!(Error::InvalidWebP));
        }

        let mut anim_info = libwebp_sys::WebPAnimInfo::default();
        if unsafe { libwebp_sys::WebPAnimDecoderGetInfo(decoder, &mut anim_info) } == 0 {
            unsafe { libwebp_sys::WebPAnimDecoderDelete(decoder) };
            return Err(at!(Error::InvalidWebP));
        }

        let has_animation = features.has_animation != 0;
        let info = DecodedCanvas {
            width: anim_info.canvas_width,
            height: anim_info.canvas_height,
            has_alpha: features.has_alpha != 0,
            has_animation,
            bgcolor: anim_info.bgcolor,
            frame_count: if has_animation { anim_info.frame_count } else { 1 },
            loop_count: if has_animation { anim_info.loop_count } else { 1 },
            format: BitstreamFormat::from_features(features.format),
        };

        log::debug!(
            "decoder source set: {}x{}, {} frames, loop_count={}, animated={}",
            info.width,
            info.height,
            info.frame_count,
            info.loop_count,
            info.has_animation
        );

        self.canvas = vec![0u8; info.width as usize * info.height as usize * pixel::BYTES_PER_PIXEL];
        self.decoder = decoder;
        self.data = data;
        self.info = Some(info);
        self.state = DecoderState::Configured;
        Ok(())
    }

    /// Canvas information read by [`set_source`](Self::set_source).
    pub fn decode_header(&self) -> Result<&DecodedCanvas> {
        match (&self.info, self.state) {
            (Some(info), state) if state != DecoderState::Released => Ok(info),
            _ => Err(self.invalid_state("read the header")),
        }
    }

    /// Decode and composite the next frame of the current loop.
    ///
    /// # Errors
    ///
    /// A frame libwebp cannot decode yields
    /// `DecodeFailed(DecodingError::BitstreamError)`. The animation decode API
    /// reports no status code, so the underlying cause is not available.
    pub fn next_frame(&mut self) -> Result<FrameStep<'_>> {
        match self.state {
            DecoderState::Created | DecoderState::Released => {
                return Err(self.invalid_state("decode a frame"));
            }
            DecoderState::Cancelled => return Ok(FrameStep::Cancelled),
            DecoderState::Exhausted => return Ok(FrameStep::EndOfStream),
            DecoderState::Configured | DecoderState::Decoding => {}
        }

        if self.cancel.is_cancelled() {
            log::debug!("decoder cancelled at frame {}", self.frame_index);
            self.state = DecoderState::Cancelled;
            return Ok(FrameStep::Cancelled);
        }

        if unsafe { libwebp_sys::WebPAnimDecoderHasMoreFrames(self.decoder) } == 0 {
            self.state = DecoderState::Exhausted;
            self.loops_completed += 1;
            log::trace!("loop {} finished after {} frames", self.loops_completed, self.frame_index);
            return Ok(FrameStep::EndOfStream);
        }

        let mut buf: *mut u8 = ptr::null_mut();
        let mut end_timestamp: i32 = 0;
        let ok = unsafe {
            libwebp_sys::WebPAnimDecoderGetNext(self.decoder, &mut buf, &mut end_timestamp)
        };
        // GetNext only reports success or failure.
        if ok == 0 || buf.is_null() {
            log::warn!("libwebp failed to decode frame {}", self.frame_index);
            return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
        }

        // SAFETY: the decoder owns a canvas-sized BGRA buffer until the next call.
        let src = unsafe { core::slice::from_raw_parts(buf, self.canvas.len()) };
        pixel::swap_red_blue_into(src, &mut self.canvas);

        // libwebp reports the frame's end time
        let timestamp_ms = self.last_timestamp;
        let duration_ms = end_timestamp - timestamp_ms;
        let index = self.frame_index;
        self.last_timestamp = end_timestamp;
        self.frame_index += 1;
        self.state = DecoderState::Decoding;

        log::trace!("decoded frame {} at {}ms for {}ms", index, timestamp_ms, duration_ms);

        let (width, height) = self
            .info
            .as_ref()
            .map_or((0, 0), |info| (info.width, info.height));
        Ok(FrameStep::Frame(DecodedFrame {
            index,
            timestamp_ms,
            duration_ms,
            width,
            height,
            pixels: &self.canvas,
        }))
    }

    /// Rewind for another pass after the current loop is exhausted.
    ///
    /// Returns `false` once the stream's loop count has been played out.
    /// A loop count of 0 never runs out.
    pub fn reset_for_next_loop(&mut self) -> Result<bool> {
        if self.state != DecoderState::Exhausted {
            return Err(self.invalid_state("reset for the next loop"));
        }
        let loop_count = self.info.as_ref().map_or(1, |info| info.loop_count);
        if loop_count != 0 && self.loops_completed >= loop_count {
            return Ok(false);
        }

        unsafe { libwebp_sys::WebPAnimDecoderReset(self.decoder) };
        self.frame_index = 0;
        self.last_timestamp = 0;
        self.state = DecoderState::Decoding;
        log::trace!("starting loop {}", self.loops_completed + 1);
        Ok(true)
    }

    /// Decode the remaining frames of the current loop into owned frames.
    pub fn decode_all(&mut self) -> Result<Vec<Frame>> {
        let capacity = self.info.as_ref().map_or(0, |info| info.frame_count) as usize;
        let mut frames = Vec::with_capacity(capacity);
        self.for_each_frame(|frame| {
            frames.push(frame.to_frame());
            Ok(())
        })?;
        Ok(frames)
    }

    /// Call `f` with each remaining frame of the current loop.
    ///
    /// Stops at the first error `f` returns. Returns the number of frames
    /// delivered.
    pub fn for_each_frame<F>(&mut self, mut f: F) -> Result<u32>
    where
        F: FnMut(&DecodedFrame<'_>) -> Result<()>,
    {
        let mut delivered = 0;
        loop {
            match self.next_frame()? {
                FrameStep::Frame(frame) => {
                    f(&frame)?;
                    delivered += 1;
                }
                FrameStep::EndOfStream => return Ok(delivered),
                FrameStep::Cancelled => return Err(at!(Error::Cancelled(StopReason::Cancelled))),
            }
        }
    }

    /// Request that decoding stop before the next frame.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Flag that cancels this decoder, usable from another thread.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Free the libwebp decoder and the copied source. Safe to call more
    /// than once; also run on drop.
    pub fn release(&mut self) {
        if !self.decoder.is_null() {
            unsafe { libwebp_sys::WebPAnimDecoderDelete(self.decoder) };
            self.decoder = ptr::null_mut();
            log::debug!("animation decoder released after {} loops", self.loops_completed);
        }
        self.data = Vec::new();
        self.canvas = Vec::new();
        self.state = DecoderState::Released;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Index of the next frame within the current loop.
    #[must_use]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Number of loops played to the end.
    #[must_use]
    pub fn loops_completed(&self) -> u32 {
        self.loops_completed
    }

    fn invalid_state(&self, operation: &'static str) -> whereat::At<Error> {
        at!(Error::InvalidState {
            operation,
            state: self.state.describe(),
        })
    }
}

impl Drop for AnimationDecoder {
    fn drop(&mut self) {
        self.release();
    }
}

/// Bitstream features, or [`Error::InvalidWebP`] for anything libwebp
/// does not recognize.
pub(crate) fn read_features(data: &[u8]) -> Result<libwebp_sys::WebPBitstreamFeatures> {
    let mut features = core::mem::MaybeUninit::<libwebp_sys::WebPBitstreamFeatures>::uninit();
    let status =
        unsafe { libwebp_sys::WebPGetFeatures(data.as_ptr(), data.len(), features.as_mut_ptr()) };
    if status != libwebp_sys::VP8StatusCode::VP8_STATUS_OK {
        log::debug!("not a WebP bitstream (status {})", status as i32);
        return Err(at!(Error::InvalidWebP));
    }
    Ok(unsafe { features.assume_init() })
}

/// Build canvas information from the bitstream header alone.
pub(crate) fn still_canvas(features: &libwebp_sys::WebPBitstreamFeatures) -> DecodedCanvas {
    DecodedCanvas {
        width: features.width as u32,
        height: features.height as u32,
        has_alpha: features.has_alpha != 0,
        has_animation: false,
        bgcolor: 0,
        frame_count: 1,
        loop_count: 1,
        format: BitstreamFormat::from_features(features.format),
    }
}

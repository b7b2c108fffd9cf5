//! Cooperative cancellation and encode progress reporting.

use alloc::sync::Arc;
use core::ffi::{c_int, c_void};
use core::sync::atomic::{AtomicBool, Ordering};
use enough::{Stop, StopReason};

/// Shared cancellation flag.
///
/// Clones share one atomic flag, so a clone handed to another thread can
/// stop an encode or decode running on the owner's thread. The flag is
/// checked at frame boundaries and from libwebp's progress hook.
///
/// # Example
///
/// ```rust
/// use webpkit::CancelFlag;
///
/// let flag = CancelFlag::new();
/// let remote = flag.clone();
/// std::thread::spawn(move || remote.cancel()).join().unwrap();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Stop for CancelFlag {
    fn check(&self) -> Result<(), StopReason> {
        if self.is_cancelled() {
            Err(StopReason::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Progress callback for encoding. Return `Err(StopReason)` to cancel.
///
/// Called on whichever thread runs the encode. Implementations that update
/// UI state must marshal the value themselves.
pub trait EncodeProgress {
    /// Called with encoding progress percentage (0-100).
    fn on_progress(&self, percent: u8) -> Result<(), StopReason>;
}

/// Default progress callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl EncodeProgress for NoProgress {
    #[inline(always)]
    fn on_progress(&self, _: u8) -> Result<(), StopReason> {
        Ok(())
    }
}

impl<F: Fn(u8) -> Result<(), StopReason>> EncodeProgress for F {
    fn on_progress(&self, percent: u8) -> Result<(), StopReason> {
        self(percent)
    }
}

/// Per-call progress state.
///
/// Still encodes hand it to libwebp's progress hook through
/// `WebPPicture::user_data`. Animation frames call [`report`](Self::report)
/// directly.
pub(crate) struct ProgressContext<'a> {
    stop: &'a dyn Stop,
    sink: &'a dyn EncodeProgress,
    last_percent: i32,
    stopped: Option<StopReason>,
}

impl<'a> ProgressContext<'a> {
    pub(crate) fn new(stop: &'a dyn Stop, sink: &'a dyn EncodeProgress) -> Self {
        Self {
            stop,
            sink,
            last_percent: -1,
            stopped: None,
        }
    }

    /// Point `picture` at this context.
    ///
    /// The context must stay in place until libwebp is done with the picture.
    pub(crate) fn attach(&mut self, picture: &mut libwebp_sys::WebPPicture) {
        picture.progress_hook = Some(progress_hook);
        picture.user_data = self as *mut Self as *mut c_void;
    }

    /// Reason the hook asked libwebp to abort, if it did.
    pub(crate) fn stopped(&self) -> Option<StopReason> {
        self.stopped.clone()
    }

    /// Returns `false` when the encode should abort.
    pub(crate) fn report(&mut self, percent: i32) -> bool {
        if let Err(reason) = self.stop.check() {
            self.stopped = Some(reason);
            return false;
        }
        if percent == self.last_percent {
            return true;
        }
        self.last_percent = percent;
        match self.sink.on_progress(percent.clamp(0, 100) as u8) {
            Ok(()) => true,
            Err(reason) => {
                self.stopped = Some(reason);
                false
            }
        }
    }
}

extern "C" fn progress_hook(percent: c_int, picture: *const libwebp_sys::WebPPicture) -> c_int {
    // SAFETY: `user_data` was set by `ProgressContext::attach`, and the
    // context outlives every encode call made with this picture.
    let ctx = unsafe {
        let data = (*picture).user_data as *mut ProgressContext<'_>;
        if data.is_null() {
            return 1;
        }
        &mut *data
    };
    ctx.report(percent) as c_int
}

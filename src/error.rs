//! Error types for webpkit operations.

use alloc::string::String;
use core::fmt;
use enough::StopReason;

/// Result type for webpkit operations.
///
/// Errors are wrapped in [`whereat::At`] so they carry the file and line
/// where they were raised.
pub type Result<T> = core::result::Result<T, whereat::At<Error>>;

/// Error type for webpkit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input parameters (dimensions, buffer size, timestamps)
    InvalidInput(String),
    /// Invalid or contradictory encoder parameters
    InvalidConfig(String),
    /// Pixel buffer layout not supported (stride, channel count)
    InvalidFormat(String),
    /// Input is not a WebP bitstream
    InvalidWebP,
    /// Encoding failed with a libwebp error code
    EncodeFailed(EncodingError),
    /// Decoding failed with a libwebp error code
    DecodeFailed(DecodingError),
    /// Animation encoder reported a failure without an error code
    AnimationError(String),
    /// Operation called in a state that does not allow it
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the encoder or decoder was in.
        state: &'static str,
    },
    /// Operation stopped through a cancellation token or progress sink
    Cancelled(StopReason),
    /// Memory allocation failed
    OutOfMemory,
}

impl Error {
    /// Whether this error is a cooperative cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::InvalidFormat(msg) => write!(f, "invalid pixel format: {}", msg),
            Error::InvalidWebP => write!(f, "invalid WebP data"),
            Error::EncodeFailed(e) => write!(f, "encode failed: {} (code {})", e, e.code()),
            Error::DecodeFailed(e) => write!(f, "decode failed: {} (code {})", e, e.code()),
            Error::AnimationError(msg) => write!(f, "animation error: {}", msg),
            Error::InvalidState { operation, state } => {
                write!(f, "cannot {} while {}", operation, state)
            }
            Error::Cancelled(reason) => write!(f, "cancelled: {}", reason),
            Error::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Encoding error codes from libwebp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EncodingError {
    /// No error
    Ok = 0,
    /// Memory allocation error
    OutOfMemory = 1,
    /// Bitstream out of memory
    BitstreamOutOfMemory = 2,
    /// NULL parameter
    NullParameter = 3,
    /// Invalid configuration
    InvalidConfiguration = 4,
    /// Bad dimension (width or height is 0 or > 16383)
    BadDimension = 5,
    /// Partition is bigger than 512k
    Partition0Overflow = 6,
    /// Partition is bigger than 16M
    PartitionOverflow = 7,
    /// Bad write callback
    BadWrite = 8,
    /// File is bigger than 4G
    FileTooBig = 9,
    /// User abort
    UserAbort = 10,
    /// Last error (unknown)
    Last = 11,
}

impl EncodingError {
    /// The numeric libwebp code.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<i32> for EncodingError {
    fn from(code: i32) -> Self {
        match code {
            0 => EncodingError::Ok,
            1 => EncodingError::OutOfMemory,
            2 => EncodingError::BitstreamOutOfMemory,
            3 => EncodingError::NullParameter,
            4 => EncodingError::InvalidConfiguration,
            5 => EncodingError::BadDimension,
            6 => EncodingError::Partition0Overflow,
            7 => EncodingError::PartitionOverflow,
            8 => EncodingError::BadWrite,
            9 => EncodingError::FileTooBig,
            10 => EncodingError::UserAbort,
            _ => EncodingError::Last,
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            EncodingError::Ok => "ok",
            EncodingError::OutOfMemory => "out of memory",
            EncodingError::BitstreamOutOfMemory => "bitstream out of memory",
            EncodingError::NullParameter => "null parameter",
            EncodingError::InvalidConfiguration => "invalid configuration",
            EncodingError::BadDimension => "bad dimension",
            EncodingError::Partition0Overflow => "partition0 overflow",
            EncodingError::PartitionOverflow => "partition overflow",
            EncodingError::BadWrite => "bad write",
            EncodingError::FileTooBig => "file too big",
            EncodingError::UserAbort => "user abort",
            EncodingError::Last => "unknown error",
        };
        write!(f, "{}", msg)
    }
}

/// Decoding error codes from libwebp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DecodingError {
    /// No error
    Ok = 0,
    /// Memory allocation error
    OutOfMemory = 1,
    /// Invalid parameter
    InvalidParam = 2,
    /// Bitstream error
    BitstreamError = 3,
    /// Unsupported feature
    UnsupportedFeature = 4,
    /// Suspended (need more data)
    Suspended = 5,
    /// User abort
    UserAbort = 6,
    /// Not enough data
    NotEnoughData = 7,
}

impl DecodingError {
    /// The numeric libwebp code.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<i32> for DecodingError {
    fn from(code: i32) -> Self {
        match code {
            0 => DecodingError::Ok,
            1 => DecodingError::OutOfMemory,
            2 => DecodingError::InvalidParam,
            3 => DecodingError::BitstreamError,
            4 => DecodingError::UnsupportedFeature,
            5 => DecodingError::Suspended,
            6 => DecodingError::UserAbort,
            _ => DecodingError::NotEnoughData,
        }
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodingError::Ok => "ok",
            DecodingError::OutOfMemory => "out of memory",
            DecodingError::InvalidParam => "invalid param",
            DecodingError::BitstreamError => "bitstream error",
            DecodingError::UnsupportedFeature => "unsupported feature",
            DecodingError::Suspended => "suspended",
            DecodingError::UserAbort => "user abort",
            DecodingError::NotEnoughData => "not enough data",
        };
        write!(f, "{}", msg)
    }
}

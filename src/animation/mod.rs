//! Animated WebP encoding and decoding.

mod decoder;
mod encoder;

pub use decoder::{
    AnimationDecoder, BitstreamFormat, DecodedCanvas, DecodedFrame, DecoderState, Frame,
    FrameStep,
};
pub use encoder::{AnimationEncoder, EncoderState};

pub(crate) use decoder::{read_features, still_canvas};

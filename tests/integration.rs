//! Integration tests for webpkit crate.

use webpkit::*;

/// Generate a solid color RGBA image.
fn generate_rgba(width: u32, height: u32, r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.push(r);
        data.push(g);
        data.push(b);
        data.push(a);
    }
    data
}

/// Generate a gradient RGBA image.
fn generate_gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = (((x + y) * 127) / (width + height).max(1)) as u8;
            data.push(r);
            data.push(g);
            data.push(b);
            data.push(255);
        }
    }
    data
}

/// Encode solid frames of distinct colors at the given start times.
fn encode_animation(
    width: u32,
    height: u32,
    timestamps: &[i32],
    end_ms: i32,
    options: &AnimationOptions,
) -> Vec<u8> {
    let colors = [
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [255, 255, 0],
        [0, 255, 255],
    ];
    let mut encoder =
        AnimationEncoder::with_options(width, height, options).expect("encoder creation failed");
    for (i, &ts) in timestamps.iter().enumerate() {
        let [r, g, b] = colors[i % colors.len()];
        let frame = generate_rgba(width, height, r, g, b, 255);
        encoder.add_frame_rgba(&frame, ts).expect("add frame failed");
    }
    encoder.finish(end_ms).expect("finish failed")
}

mod animation_roundtrip {
    use super::*;

    #[test]
    fn test_frame_count_and_durations_survive() {
        let starts = [0, 40, 100, 250];
        let webp = encode_animation(32, 32, &starts, 400, &AnimationOptions::new());

        let canvas = probe(&webp).expect("probe failed");
        assert!(canvas.has_animation);
        assert_eq!(canvas.frame_count, 4);

        let mut decoder = AnimationDecoder::from_bytes(&webp).expect("decoder creation failed");
        let frames = decoder.decode_all().expect("decode_all failed");
        assert_eq!(frames.len(), 4);

        let timestamps: Vec<i32> = frames.iter().map(|f| f.timestamp_ms).collect();
        let durations: Vec<i32> = frames.iter().map(|f| f.duration_ms).collect();
        assert_eq!(timestamps, [0, 40, 100, 250]);
        assert_eq!(durations, [40, 60, 150, 150]);
    }

    #[test]
    fn test_lossless_2x2_exact() {
        let src: Vec<u8> = vec![
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            17, 99, 201, 255, // odd values
        ];

        let mut encoder =
            AnimationEncoder::with_options(2, 2, &AnimationOptions::new().loop_count(1))
                .expect("encoder creation failed");
        encoder
            .configure(&EncodeOptions::new_lossless().exact(true))
            .expect("configure failed");
        encoder.add_frame_rgba(&src, 0).expect("add frame failed");
        let webp = encoder.assemble(100).expect("assemble failed");
        encoder.release();

        let mut decoder = AnimationDecoder::from_bytes(&webp).expect("decoder creation failed");
        assert_eq!(decoder.decode_header().unwrap().loop_count, 1);
        match decoder.next_frame().expect("next_frame failed") {
            FrameStep::Frame(frame) => {
                assert_eq!(frame.index, 0);
                assert_eq!(frame.pixels, &src[..]);
            }
            other => panic!("expected a frame, got {:?}", other),
        }
    }

    #[test]
    fn test_typed_frames_roundtrip() {
        let red = vec![rgb::RGBA8::new(255, 0, 0, 255); 8 * 8];
        let blue = vec![rgb::RGBA8::new(0, 0, 255, 255); 8 * 8];

        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder.configure(&EncodeOptions::new_lossless()).unwrap();
        encoder.add_frame(&red, 0).unwrap();
        encoder.add_frame(&blue, 50).unwrap();
        let webp = encoder.finish(100).unwrap();

        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        let frames = decoder.decode_all().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0].data[..4], &[255, 0, 0, 255]);
        assert_eq!(&frames[1].data[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_for_each_frame_counts() {
        let webp = encode_animation(16, 16, &[0, 100, 200], 300, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();

        let mut indices = Vec::new();
        let delivered = decoder
            .for_each_frame(|frame| {
                assert_eq!(frame.pixels.len(), 16 * 16 * 4);
                indices.push(frame.index);
                Ok(())
            })
            .unwrap();
        assert_eq!(delivered, 3);
        assert_eq!(indices, [0, 1, 2]);
        assert_eq!(decoder.state(), DecoderState::Exhausted);
    }

    #[test]
    fn test_background_and_loop_count_stored() {
        let options = AnimationOptions::new()
            .loop_count(3)
            .background_color(0xff11_2233);
        let webp = encode_animation(16, 16, &[0, 100], 200, &options);

        let canvas = probe(&webp).unwrap();
        assert_eq!(canvas.loop_count, 3);
        assert_eq!(canvas.bgcolor, 0xff11_2233);
    }
}

mod accumulator_state {
    use super::*;

    #[test]
    fn test_add_after_assemble_fails() {
        let frame = generate_rgba(8, 8, 10, 20, 30, 255);
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder.add_frame_rgba(&frame, 0).unwrap();
        encoder.assemble(100).unwrap();
        assert_eq!(encoder.state(), EncoderState::Finalized);

        let err = encoder.add_frame_rgba(&frame, 200).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidState { .. }));

        let err = encoder.assemble(300).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidState { .. }));
    }

    #[test]
    fn test_release_twice() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(8, 8, 1, 2, 3, 255), 0)
            .unwrap();
        encoder.release();
        encoder.release();
        assert_eq!(encoder.state(), EncoderState::Released);

        let webp = encode_animation(8, 8, &[0, 10], 20, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        decoder.release();
        decoder.release();
        assert_eq!(decoder.state(), DecoderState::Released);
        assert!(decoder.next_frame().is_err());
    }

    #[test]
    fn test_non_monotonic_timestamp() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(8, 8, 1, 2, 3, 255), 100)
            .unwrap();
        let err = encoder
            .add_frame_rgba(&generate_rgba(8, 8, 4, 5, 6, 255), 99)
            .unwrap_err();
        assert!(matches!(err.error(), Error::InvalidInput(_)));
        assert_eq!(encoder.frame_count(), 1);

        let err = encoder.assemble(50).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidInput(_)));
        assert_eq!(encoder.state(), EncoderState::Accumulating);
    }

    #[test]
    fn test_equal_timestamp_accepted() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(8, 8, 1, 2, 3, 255), 0)
            .unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(8, 8, 200, 100, 50, 255), 0)
            .unwrap();
        assert_eq!(encoder.frame_count(), 2);
        assert!(encoder.finish(100).is_ok());
    }

    #[test]
    fn test_configure_after_first_frame() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(8, 8, 1, 2, 3, 255), 0)
            .unwrap();
        let err = encoder
            .configure(&EncodeOptions::new().quality(10.0))
            .unwrap_err();
        assert!(matches!(err.error(), Error::InvalidState { .. }));
    }

    #[test]
    fn test_invalid_config_rejected_by_configure() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        let options = EncodeOptions::from_named([("method", "9")]).unwrap();
        let err = encoder.configure(&options).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidConfig(_)));
        assert_eq!(encoder.state(), EncoderState::Accumulating);
    }

    #[test]
    fn test_wrong_frame_size() {
        let mut encoder = AnimationEncoder::new(8, 8).unwrap();
        let err = encoder
            .add_frame_rgba(&generate_rgba(4, 4, 0, 0, 0, 255), 0)
            .unwrap_err();
        assert!(matches!(err.error(), Error::InvalidInput(_)));
    }

    #[test]
    fn test_frame_progress_reported() {
        use std::sync::Mutex;

        let seen = Mutex::new(Vec::new());
        let recording = |percent: u8| -> core::result::Result<(), StopReason> {
            seen.lock().unwrap().push(percent);
            Ok(())
        };

        let mut encoder = AnimationEncoder::new(16, 16).unwrap();
        encoder
            .add_frame_with_progress(&generate_rgba(16, 16, 255, 0, 0, 255), 0, &recording)
            .unwrap();
        encoder
            .add_frame_with_progress(&generate_gradient_rgba(16, 16), 100, &recording)
            .unwrap();
        assert_eq!(encoder.frame_count(), 2);
        assert_eq!(*seen.lock().unwrap(), [0u8, 100, 0, 100]);
        assert!(encoder.finish(200).is_ok());
    }

    #[test]
    fn test_frame_progress_abort() {
        let mut encoder = AnimationEncoder::new(16, 16).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(16, 16, 0, 0, 255, 255), 0)
            .unwrap();

        let abort = |_: u8| -> core::result::Result<(), StopReason> { Err(StopReason::Cancelled) };
        let err = encoder
            .add_frame_with_progress(&generate_gradient_rgba(16, 16), 100, &abort)
            .unwrap_err();
        assert!(err.error().is_cancelled());
        assert_eq!(encoder.frame_count(), 1);
        assert_eq!(encoder.last_timestamp(), Some(0));
        assert_eq!(encoder.state(), EncoderState::Accumulating);

        // The encoder keeps working after the aborted frame.
        encoder
            .add_frame_rgba(&generate_gradient_rgba(16, 16), 100)
            .unwrap();
        assert_eq!(encoder.frame_count(), 2);
    }

    #[test]
    fn test_cancel_flag_stops_next_frame() {
        let mut encoder = AnimationEncoder::new(16, 16).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(16, 16, 0, 255, 0, 255), 0)
            .unwrap();

        let flag = encoder.cancel_flag();
        std::thread::spawn(move || flag.cancel()).join().unwrap();

        let err = encoder
            .add_frame_rgba(&generate_gradient_rgba(16, 16), 50)
            .unwrap_err();
        assert!(err.error().is_cancelled());
        assert_eq!(encoder.frame_count(), 1);
    }
}

mod decoder_state {
    use super::*;

    #[test]
    fn test_still_image_is_single_frame() {
        let still = encode_lossless(&generate_gradient_rgba(16, 16), 16, 16, Unstoppable).unwrap();

        let mut decoder = AnimationDecoder::from_bytes(&still).unwrap();
        let canvas = decoder.decode_header().unwrap().clone();
        assert_eq!(canvas.frame_count, 1);
        assert_eq!(canvas.loop_count, 1);
        assert!(!canvas.has_animation);
        assert_eq!(canvas.format, BitstreamFormat::Lossless);

        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::Frame(_)));
        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::EndOfStream));
        assert!(!decoder.reset_for_next_loop().unwrap());
    }

    #[test]
    fn test_cancel_before_first_frame() {
        let webp = encode_animation(16, 16, &[0, 100], 200, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        decoder.cancel();

        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::Cancelled));
        assert_eq!(decoder.state(), DecoderState::Cancelled);
        assert_eq!(decoder.frame_index(), 0);
        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::Cancelled));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let webp = encode_animation(16, 16, &[0, 100, 200], 300, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::Frame(_)));

        let flag = decoder.cancel_flag();
        std::thread::spawn(move || flag.cancel()).join().unwrap();

        assert!(matches!(decoder.next_frame().unwrap(), FrameStep::Cancelled));
        assert_eq!(decoder.frame_index(), 1);

        let err = decoder.decode_all().unwrap_err();
        assert!(err.error().is_cancelled());
    }

    #[test]
    fn test_single_loop_does_not_reset() {
        let webp = encode_animation(16, 16, &[0, 100], 200, &AnimationOptions::new().loop_count(1));
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        decoder.decode_all().unwrap();
        assert_eq!(decoder.loops_completed(), 1);
        assert!(!decoder.reset_for_next_loop().unwrap());
    }

    #[test]
    fn test_infinite_loop_resets() {
        let webp = encode_animation(16, 16, &[0, 100], 200, &AnimationOptions::new().loop_count(0));
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();

        for pass in 1..=3 {
            let frames = decoder.decode_all().unwrap();
            assert_eq!(frames.len(), 2);
            assert_eq!(frames[0].timestamp_ms, 0);
            assert_eq!(decoder.loops_completed(), pass);
            assert!(decoder.reset_for_next_loop().unwrap());
            assert_eq!(decoder.frame_index(), 0);
        }

        match decoder.next_frame().unwrap() {
            FrameStep::Frame(frame) => assert_eq!(frame.index, 0),
            other => panic!("expected frame 0, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_before_exhausted() {
        let webp = encode_animation(16, 16, &[0, 100], 200, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        let err = decoder.reset_for_next_loop().unwrap_err();
        assert!(matches!(err.error(), Error::InvalidState { .. }));
    }

    #[test]
    fn test_set_source_twice() {
        let webp = encode_animation(8, 8, &[0, 10], 20, &AnimationOptions::new());
        let mut decoder = AnimationDecoder::new();
        decoder.set_source(&webp).unwrap();
        assert_eq!(decoder.state(), DecoderState::Configured);
        let err = decoder.set_source(&webp).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidState { .. }));
    }

    #[test]
    fn test_garbage_source() {
        let err = AnimationDecoder::from_bytes(&[0u8; 64]).unwrap_err();
        assert_eq!(*err.error(), Error::InvalidWebP);
    }
}

mod configuration {
    use super::*;

    #[test]
    fn test_override_beats_preset() {
        let resolved = EncodeOptions::new()
            .preset(Preset::Photo)
            .quality(90.0)
            .resolve()
            .unwrap();
        assert_eq!(resolved.quality, 90.0);

        let preset_only = EncodeOptions::new().preset(Preset::Photo).resolve().unwrap();
        assert_eq!(preset_only.quality, DEFAULT_QUALITY);
    }

    #[test]
    fn test_named_override_beats_later_preset() {
        let options =
            EncodeOptions::from_named([("quality", "90"), ("sns_strength", "5"), ("preset", "photo")])
                .unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.quality, 90.0);
        assert_eq!(resolved.sns_strength, 5);
    }

    #[test]
    fn test_named_unknown_key() {
        let err = EncodeOptions::from_named([("qualty", "90")]).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidConfig(_)));
    }

    #[test]
    fn test_named_animation_options() {
        let options = AnimationOptions::from_named([
            ("loop_count", "0"),
            ("background_color", "#ff000000"),
            ("allow_mixed", "true"),
        ])
        .unwrap();
        assert_eq!(options.loop_count, 0);
        assert_eq!(options.background_color, 0xff00_0000);
        assert!(options.allow_mixed);
    }

    #[test]
    fn test_bad_keyframe_distance() {
        let err = AnimationEncoder::with_options(
            8,
            8,
            &AnimationOptions::new().keyframe_distance(5, u32::MAX),
        )
        .err()
        .unwrap();
        assert!(matches!(err.error(), Error::InvalidConfig(_)));
    }

    #[test]
    fn test_inverted_keyframe_distance_adjusted() {
        let options = AnimationOptions::new().keyframe_distance(10, 5);
        let webp = encode_animation(16, 16, &[0, 100, 200], 300, &options);
        let mut decoder = AnimationDecoder::from_bytes(&webp).unwrap();
        assert_eq!(decoder.decode_header().unwrap().frame_count, 3);
    }
}

mod still_image {
    use super::*;

    #[test]
    fn test_lossless_roundtrip() {
        let src = generate_gradient_rgba(32, 16);
        let webp = encode_lossless(&src, 32, 16, Unstoppable).unwrap();
        let (pixels, width, height) = decode_rgba(&webp).unwrap();
        assert_eq!((width, height), (32, 16));
        assert_eq!(pixels, src);

        let img = decode_to_img(&webp).unwrap();
        assert_eq!(img.width(), 32);
        assert_eq!(img.buf()[0], rgb::RGBA8::new(src[0], src[1], src[2], src[3]));
    }

    #[test]
    fn test_lossy_dimensions() {
        let src = generate_gradient_rgba(64, 48);
        let webp = encode_rgba(&src, 64, 48, 75.0, Unstoppable).unwrap();
        let canvas = probe(&webp).unwrap();
        assert_eq!((canvas.width, canvas.height), (64, 48));
        assert_eq!(canvas.format, BitstreamFormat::Lossy);
    }

    #[test]
    fn test_truncated_still_image() {
        let src = generate_gradient_rgba(64, 48);
        let webp = encode_rgba(&src, 64, 48, 90.0, Unstoppable).unwrap();
        let truncated = &webp[..webp.len() / 2];

        // The header survives, so the failure comes from the pixel decode.
        let canvas = probe(truncated).unwrap();
        assert_eq!((canvas.width, canvas.height), (64, 48));
        let err = decode_rgba(truncated).unwrap_err();
        assert!(matches!(
            err.error(),
            Error::DecodeFailed(DecodingError::BitstreamError)
        ));
    }

    #[test]
    fn test_decode_rgba_of_animation_gives_first_frame() {
        let mut encoder = AnimationEncoder::new(4, 4).unwrap();
        encoder.configure(&EncodeOptions::new_lossless()).unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(4, 4, 0, 128, 255, 255), 0)
            .unwrap();
        encoder
            .add_frame_rgba(&generate_rgba(4, 4, 255, 0, 0, 255), 30)
            .unwrap();
        let webp = encoder.finish(60).unwrap();

        let (pixels, width, height) = decode_rgba(&webp).unwrap();
        assert_eq!((width, height), (4, 4));
        assert_eq!(&pixels[..4], &[0, 128, 255, 255]);
    }

    #[test]
    fn test_cancelled_stop_token() {
        let flag = CancelFlag::new();
        flag.cancel();
        let err = encode_rgba(&generate_rgba(8, 8, 0, 0, 0, 255), 8, 8, 80.0, flag).unwrap_err();
        assert!(err.error().is_cancelled());
    }

    #[test]
    fn test_progress_reported_and_abortable() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let src = generate_gradient_rgba(128, 128);
        let calls = AtomicU32::new(0);
        let counting = |_: u8| -> core::result::Result<(), StopReason> {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        };
        EncodeOptions::new()
            .encode_rgba_with_progress(&src, 128, 128, Unstoppable, &counting)
            .unwrap();
        assert!(calls.load(Ordering::Relaxed) > 0);

        let abort = |_: u8| -> core::result::Result<(), StopReason> { Err(StopReason::Cancelled) };
        let err = EncodeOptions::new()
            .encode_rgba_with_progress(&src, 128, 128, Unstoppable, &abort)
            .unwrap_err();
        assert!(err.error().is_cancelled());
    }
}

mod pixel_adapter {
    use super::*;

    #[test]
    fn test_padded_stride_rejected() {
        let err = pixel::rgba_to_argb(&[0u8; 48], 2, 2, 12).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidFormat(_)));
    }

    #[test]
    fn test_roundtrip_through_argb() {
        let src = generate_gradient_rgba(5, 3);
        let argb = pixel::rgba_to_argb(&src, 5, 3, 20).unwrap();
        assert_eq!(argb[0] >> 24, 255);
        assert_eq!(pixel::argb_to_rgba(&argb, 5, 3).unwrap(), src);
    }
}

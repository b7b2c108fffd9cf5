//! Encoder and animation configuration, and their translation to libwebp.
//!
//! Every option is optional. Translation starts from the selected preset
//! (quality defaults to [`DEFAULT_QUALITY`]), then overwrites exactly the
//! fields that were set, then runs libwebp's own validation.

use crate::error::{Error, Result};
use alloc::string::String;
use core::str::FromStr;
use whereat::*;

/// Quality used when none is given.
pub const DEFAULT_QUALITY: f32 = 70.0;

/// Loop count used when none is given.
pub const DEFAULT_LOOP_COUNT: u32 = 1;

/// Background color used when none is given (transparent black, ARGB).
pub const DEFAULT_BACKGROUND_COLOR: u32 = 0x0000_0000;

/// Content-aware encoding presets.
///
/// These presets configure the encoder for different types of content,
/// optimizing the balance between file size and visual quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Preset {
    /// Default preset, balanced for general use.
    #[default]
    Default = 0,
    /// Digital picture (portrait, indoor shot).
    Picture = 1,
    /// Outdoor photograph with natural lighting.
    Photo = 2,
    /// Hand or line drawing with high-contrast details.
    Drawing = 3,
    /// Small-sized colorful images like icons or sprites.
    Icon = 4,
    /// Text-heavy images.
    Text = 5,
}

impl Preset {
    pub(crate) fn to_libwebp(self) -> libwebp_sys::WebPPreset {
        match self {
            Preset::Default => libwebp_sys::WebPPreset::WEBP_PRESET_DEFAULT,
            Preset::Picture => libwebp_sys::WebPPreset::WEBP_PRESET_PICTURE,
            Preset::Photo => libwebp_sys::WebPPreset::WEBP_PRESET_PHOTO,
            Preset::Drawing => libwebp_sys::WebPPreset::WEBP_PRESET_DRAWING,
            Preset::Icon => libwebp_sys::WebPPreset::WEBP_PRESET_ICON,
            Preset::Text => libwebp_sys::WebPPreset::WEBP_PRESET_TEXT,
        }
    }
}

impl FromStr for Preset {
    type Err = whereat::At<Error>;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "picture" => Ok(Preset::Picture),
            "photo" => Ok(Preset::Photo),
            "drawing" => Ok(Preset::Drawing),
            "icon" => Ok(Preset::Icon),
            "text" => Ok(Preset::Text),
            other => Err(at!(Error::InvalidConfig(alloc::format!(
                "unknown preset '{}'",
                other
            )))),
        }
    }
}

/// Hint about the kind of image, used by the lossless encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageHint {
    /// No hint.
    #[default]
    Default,
    /// Digital picture, indoor shot.
    Picture,
    /// Outdoor photograph.
    Photo,
    /// Discrete tone image (graph, map-tile).
    Graph,
}

impl ImageHint {
    fn to_libwebp(self) -> libwebp_sys::WebPImageHint {
        match self {
            ImageHint::Default => libwebp_sys::WebPImageHint::WEBP_HINT_DEFAULT,
            ImageHint::Picture => libwebp_sys::WebPImageHint::WEBP_HINT_PICTURE,
            ImageHint::Photo => libwebp_sys::WebPImageHint::WEBP_HINT_PHOTO,
            ImageHint::Graph => libwebp_sys::WebPImageHint::WEBP_HINT_GRAPH,
        }
    }
}

impl FromStr for ImageHint {
    type Err = whereat::At<Error>;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ImageHint::Default),
            "picture" => Ok(ImageHint::Picture),
            "photo" => Ok(ImageHint::Photo),
            "graph" => Ok(ImageHint::Graph),
            other => Err(at!(Error::InvalidConfig(alloc::format!(
                "unknown image hint '{}'",
                other
            )))),
        }
    }
}

/// Per-frame codec parameters.
///
/// Unset fields keep the preset's value. Build with the chained setters or
/// from a named options map with [`EncodeOptions::from_named`].
///
/// # Example
///
/// ```rust
/// use webpkit::{EncodeOptions, Preset};
///
/// let options = EncodeOptions::new()
///     .preset(Preset::Photo)
///     .quality(90.0)
///     .method(4);
/// let resolved = options.resolve()?;
/// assert_eq!(resolved.quality, 90.0);
/// # Ok::<(), webpkit::At<webpkit::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOptions {
    pub(crate) preset: Option<Preset>,
    pub(crate) quality: Option<f32>,
    pub(crate) lossless: Option<bool>,
    pub(crate) method: Option<u8>,
    pub(crate) image_hint: Option<ImageHint>,
    pub(crate) target_size: Option<u32>,
    pub(crate) target_psnr: Option<f32>,
    pub(crate) segments: Option<u8>,
    pub(crate) sns_strength: Option<u8>,
    pub(crate) filter_strength: Option<u8>,
    pub(crate) filter_sharpness: Option<u8>,
    pub(crate) filter_type: Option<u8>,
    pub(crate) autofilter: Option<bool>,
    pub(crate) alpha_compression: Option<bool>,
    pub(crate) alpha_filtering: Option<u8>,
    pub(crate) alpha_quality: Option<u8>,
    pub(crate) pass: Option<u8>,
    pub(crate) preprocessing: Option<u8>,
    pub(crate) partitions: Option<u8>,
    pub(crate) partition_limit: Option<u8>,
    pub(crate) emulate_jpeg_size: Option<bool>,
    pub(crate) thread_level: Option<u8>,
    pub(crate) low_memory: Option<bool>,
    pub(crate) near_lossless: Option<u8>,
    pub(crate) exact: Option<bool>,
    pub(crate) use_delta_palette: Option<bool>,
    pub(crate) use_sharp_yuv: Option<bool>,
}

impl EncodeOptions {
    /// Create options with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for lossless frames.
    #[must_use]
    pub fn new_lossless() -> Self {
        Self::default().lossless(true)
    }

    /// Build options from `(name, value)` pairs.
    ///
    /// Names match the setter names. The preset is applied before every
    /// other option regardless of its position. Unknown names and values
    /// that do not parse are rejected.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            options.set_named(name, value)?;
        }
        Ok(options)
    }

    /// Set a single option by name.
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "preset" => self.preset = Some(value.parse()?),
            "quality" => self.quality = Some(parse_value(name, value)?),
            "lossless" => self.lossless = Some(parse_bool(name, value)?),
            "method" => self.method = Some(parse_value(name, value)?),
            "image_hint" => self.image_hint = Some(value.parse()?),
            "target_size" => self.target_size = Some(parse_value(name, value)?),
            "target_psnr" => self.target_psnr = Some(parse_value(name, value)?),
            "segments" => self.segments = Some(parse_value(name, value)?),
            "sns_strength" => self.sns_strength = Some(parse_value(name, value)?),
            "filter_strength" => self.filter_strength = Some(parse_value(name, value)?),
            "filter_sharpness" => self.filter_sharpness = Some(parse_value(name, value)?),
            "filter_type" => self.filter_type = Some(parse_value(name, value)?),
            "autofilter" => self.autofilter = Some(parse_bool(name, value)?),
            "alpha_compression" => self.alpha_compression = Some(parse_bool(name, value)?),
            "alpha_filtering" => self.alpha_filtering = Some(parse_value(name, value)?),
            "alpha_quality" => self.alpha_quality = Some(parse_value(name, value)?),
            "pass" => self.pass = Some(parse_value(name, value)?),
            "preprocessing" => self.preprocessing = Some(parse_value(name, value)?),
            "partitions" => self.partitions = Some(parse_value(name, value)?),
            "partition_limit" => self.partition_limit = Some(parse_value(name, value)?),
            "emulate_jpeg_size" => self.emulate_jpeg_size = Some(parse_bool(name, value)?),
            "thread_level" => self.thread_level = Some(parse_value(name, value)?),
            "low_memory" => self.low_memory = Some(parse_bool(name, value)?),
            "near_lossless" => self.near_lossless = Some(parse_value(name, value)?),
            "exact" => self.exact = Some(parse_bool(name, value)?),
            "use_delta_palette" => self.use_delta_palette = Some(parse_bool(name, value)?),
            "use_sharp_yuv" => self.use_sharp_yuv = Some(parse_bool(name, value)?),
            _ => {
                return Err(at!(Error::InvalidConfig(alloc::format!(
                    "unknown option '{}'",
                    name
                ))))
            }
        }
        Ok(())
    }

    /// Set content-aware preset. Applied before every explicit option.
    #[must_use]
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Set encoding quality (0.0 = smallest, 100.0 = best).
    ///
    /// For lossless frames this is compression effort.
    #[must_use]
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality.clamp(0.0, 100.0));
        self
    }

    /// Enable or disable lossless compression.
    #[must_use]
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = Some(lossless);
        self
    }

    /// Set quality/speed tradeoff (0 = fast, 6 = slower but better).
    #[must_use]
    pub fn method(mut self, method: u8) -> Self {
        self.method = Some(method.min(6));
        self
    }

    /// Set image type hint (lossless only).
    #[must_use]
    pub fn hint(mut self, hint: ImageHint) -> Self {
        self.image_hint = Some(hint);
        self
    }

    /// Set target file size in bytes (0 = disabled).
    #[must_use]
    pub fn target_size(mut self, size: u32) -> Self {
        self.target_size = Some(size);
        self
    }

    /// Set target PSNR in dB (0.0 = disabled).
    #[must_use]
    pub fn target_psnr(mut self, psnr: f32) -> Self {
        self.target_psnr = Some(psnr);
        self
    }

    /// Set number of segments (1-4).
    #[must_use]
    pub fn segments(mut self, segments: u8) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Set spatial noise shaping strength (0-100, 0 = off).
    #[must_use]
    pub fn sns_strength(mut self, strength: u8) -> Self {
        self.sns_strength = Some(strength);
        self
    }

    /// Set filter strength (0-100, 0 = off).
    #[must_use]
    pub fn filter_strength(mut self, strength: u8) -> Self {
        self.filter_strength = Some(strength);
        self
    }

    /// Set filter sharpness (0-7, 0 = sharpest).
    #[must_use]
    pub fn filter_sharpness(mut self, sharpness: u8) -> Self {
        self.filter_sharpness = Some(sharpness);
        self
    }

    /// Set filter type (0 = simple, 1 = strong).
    #[must_use]
    pub fn filter_type(mut self, filter_type: u8) -> Self {
        self.filter_type = Some(filter_type);
        self
    }

    /// Enable auto-adjustment of filter strength.
    #[must_use]
    pub fn autofilter(mut self, enable: bool) -> Self {
        self.autofilter = Some(enable);
        self
    }

    /// Enable or disable alpha plane compression.
    #[must_use]
    pub fn alpha_compression(mut self, enable: bool) -> Self {
        self.alpha_compression = Some(enable);
        self
    }

    /// Set alpha plane filtering (0 = none, 1 = fast, 2 = best).
    #[must_use]
    pub fn alpha_filtering(mut self, level: u8) -> Self {
        self.alpha_filtering = Some(level);
        self
    }

    /// Set alpha plane quality (0-100).
    #[must_use]
    pub fn alpha_quality(mut self, quality: u8) -> Self {
        self.alpha_quality = Some(quality);
        self
    }

    /// Set number of entropy analysis passes (1-10).
    #[must_use]
    pub fn pass(mut self, passes: u8) -> Self {
        self.pass = Some(passes);
        self
    }

    /// Set preprocessing filter (0 = none, 1 = segment-smooth, 2 = pseudo-random dithering).
    #[must_use]
    pub fn preprocessing(mut self, level: u8) -> Self {
        self.preprocessing = Some(level);
        self
    }

    /// Set log2 of the number of token partitions (0-3).
    #[must_use]
    pub fn partitions(mut self, partitions: u8) -> Self {
        self.partitions = Some(partitions);
        self
    }

    /// Set quality degradation allowed to fit the 512k partition limit (0-100).
    #[must_use]
    pub fn partition_limit(mut self, limit: u8) -> Self {
        self.partition_limit = Some(limit);
        self
    }

    /// Match the expected size of a JPEG at the same quality.
    #[must_use]
    pub fn emulate_jpeg_size(mut self, enable: bool) -> Self {
        self.emulate_jpeg_size = Some(enable);
        self
    }

    /// Set thread level for multi-threaded encoding.
    #[must_use]
    pub fn thread_level(mut self, level: u8) -> Self {
        self.thread_level = Some(level);
        self
    }

    /// Reduce memory usage at cost of CPU.
    #[must_use]
    pub fn low_memory(mut self, enable: bool) -> Self {
        self.low_memory = Some(enable);
        self
    }

    /// Set near-lossless preprocessing (0 = max preprocessing, 100 = off).
    #[must_use]
    pub fn near_lossless(mut self, value: u8) -> Self {
        self.near_lossless = Some(value);
        self
    }

    /// Preserve exact RGB values under transparent areas.
    #[must_use]
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Use delta palettization (lossless).
    #[must_use]
    pub fn delta_palette(mut self, enable: bool) -> Self {
        self.use_delta_palette = Some(enable);
        self
    }

    /// Use sharp YUV conversion (slower but better quality).
    #[must_use]
    pub fn sharp_yuv(mut self, enable: bool) -> Self {
        self.use_sharp_yuv = Some(enable);
        self
    }

    /// Whether lossless mode was requested.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.lossless.unwrap_or(false)
    }

    /// Translate and validate, returning the values libwebp will use.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.to_libwebp().map(|config| ResolvedConfig::from(&config))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.to_libwebp().map(|_| ())
    }

    /// Convert to a validated libwebp `WebPConfig`.
    pub(crate) fn to_libwebp(&self) -> Result<libwebp_sys::WebPConfig> {
        let preset = self.preset.unwrap_or_default();
        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        let mut config = libwebp_sys::WebPConfig::new_with_preset(preset.to_libwebp(), quality)
            .map_err(|_| at!(Error::InvalidConfig("failed to initialize config".into())))?;

        fn set<T: Copy>(field: &mut i32, value: Option<T>, convert: fn(T) -> i32) {
            if let Some(v) = value {
                *field = convert(v);
            }
        }
        let flag = |b: bool| b as i32;
        let num = |n: u8| n as i32;

        set(&mut config.lossless, self.lossless, flag);
        set(&mut config.method, self.method, num);
        set(&mut config.segments, self.segments, num);
        set(&mut config.sns_strength, self.sns_strength, num);
        set(&mut config.filter_strength, self.filter_strength, num);
        set(&mut config.filter_sharpness, self.filter_sharpness, num);
        set(&mut config.filter_type, self.filter_type, num);
        set(&mut config.autofilter, self.autofilter, flag);
        set(&mut config.alpha_compression, self.alpha_compression, flag);
        set(&mut config.alpha_filtering, self.alpha_filtering, num);
        set(&mut config.alpha_quality, self.alpha_quality, num);
        set(&mut config.pass, self.pass, num);
        set(&mut config.preprocessing, self.preprocessing, num);
        set(&mut config.partitions, self.partitions, num);
        set(&mut config.partition_limit, self.partition_limit, num);
        set(&mut config.emulate_jpeg_size, self.emulate_jpeg_size, flag);
        set(&mut config.thread_level, self.thread_level, num);
        set(&mut config.low_memory, self.low_memory, flag);
        set(&mut config.near_lossless, self.near_lossless, num);
        set(&mut config.exact, self.exact, flag);
        set(&mut config.use_delta_palette, self.use_delta_palette, flag);
        set(&mut config.use_sharp_yuv, self.use_sharp_yuv, flag);
        if let Some(size) = self.target_size {
            config.target_size = i32::try_from(size)
                .map_err(|_| at!(Error::InvalidConfig("target_size too large".into())))?;
        }
        if let Some(psnr) = self.target_psnr {
            config.target_PSNR = psnr;
        }
        if let Some(hint) = self.image_hint {
            config.image_hint = hint.to_libwebp();
        }

        if unsafe { libwebp_sys::WebPValidateConfig(&config) } == 0 {
            return Err(at!(Error::InvalidConfig(
                "libwebp rejected the parameter combination".into(),
            )));
        }

        Ok(config)
    }
}

/// Values of a translated and validated configuration.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ResolvedConfig {
    /// Quality factor.
    pub quality: f32,
    /// Lossless mode.
    pub lossless: bool,
    /// Quality/speed tradeoff.
    pub method: i32,
    /// Target size in bytes (0 = off).
    pub target_size: i32,
    /// Target PSNR (0 = off).
    pub target_psnr: f32,
    /// Segment count.
    pub segments: i32,
    /// Spatial noise shaping strength.
    pub sns_strength: i32,
    /// Loop filter strength.
    pub filter_strength: i32,
    /// Loop filter sharpness.
    pub filter_sharpness: i32,
    /// Loop filter type.
    pub filter_type: i32,
    /// Alpha plane quality.
    pub alpha_quality: i32,
    /// Entropy passes.
    pub pass: i32,
    /// Preprocessing filter.
    pub preprocessing: i32,
    /// Thread level.
    pub thread_level: i32,
    /// Near-lossless level.
    pub near_lossless: i32,
    /// Exact RGB under transparency.
    pub exact: bool,
}

impl From<&libwebp_sys::WebPConfig> for ResolvedConfig {
    fn from(c: &libwebp_sys::WebPConfig) -> Self {
        Self {
            quality: c.quality,
            lossless: c.lossless != 0,
            method: c.method,
            target_size: c.target_size,
            target_psnr: c.target_PSNR,
            segments: c.segments,
            sns_strength: c.sns_strength,
            filter_strength: c.filter_strength,
            filter_sharpness: c.filter_sharpness,
            filter_type: c.filter_type,
            alpha_quality: c.alpha_quality,
            pass: c.pass,
            preprocessing: c.preprocessing,
            thread_level: c.thread_level,
            near_lossless: c.near_lossless,
            exact: c.exact != 0,
        }
    }
}

/// Container-level animation settings, fixed when the encoder is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Number of times to play (0 = infinite).
    pub loop_count: u32,
    /// Background color in ARGB order.
    pub background_color: u32,
    /// Try harder to minimize output size (slower).
    pub minimize_size: bool,
    /// Minimum distance between key frames (`None` = libwebp default).
    pub kmin: Option<u32>,
    /// Maximum distance between key frames (`None` = libwebp default).
    pub kmax: Option<u32>,
    /// Allow mixing lossy and lossless frames.
    pub allow_mixed: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            loop_count: DEFAULT_LOOP_COUNT,
            background_color: DEFAULT_BACKGROUND_COLOR,
            minimize_size: false,
            kmin: None,
            kmax: None,
            allow_mixed: false,
        }
    }
}

impl AnimationOptions {
    /// Create options with the defaults (play once, transparent background).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set loop count (0 = infinite).
    #[must_use]
    pub fn loop_count(mut self, count: u32) -> Self {
        self.loop_count = count;
        self
    }

    /// Set background color (ARGB).
    #[must_use]
    pub fn background_color(mut self, argb: u32) -> Self {
        self.background_color = argb;
        self
    }

    /// Spend more effort minimizing output size.
    #[must_use]
    pub fn minimize_size(mut self, enable: bool) -> Self {
        self.minimize_size = enable;
        self
    }

    /// Set key frame distance bounds.
    ///
    /// Values are passed through as given. libwebp itself adjusts `kmin`
    /// when it is not below `kmax`, and `kmax == 0` disables key frames.
    #[must_use]
    pub fn keyframe_distance(mut self, kmin: u32, kmax: u32) -> Self {
        self.kmin = Some(kmin);
        self.kmax = Some(kmax);
        self
    }

    /// Allow mixing lossy and lossless frames.
    #[must_use]
    pub fn allow_mixed(mut self, enable: bool) -> Self {
        self.allow_mixed = enable;
        self
    }

    /// Build options from `(name, value)` pairs.
    ///
    /// `background_color` accepts decimal or `0x`-prefixed hex.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            match name {
                "loop_count" => options.loop_count = parse_value(name, value)?,
                "background_color" => options.background_color = parse_color(value)?,
                "minimize_size" => options.minimize_size = parse_bool(name, value)?,
                "kmin" => options.kmin = Some(parse_value(name, value)?),
                "kmax" => options.kmax = Some(parse_value(name, value)?),
                "allow_mixed" => options.allow_mixed = parse_bool(name, value)?,
                _ => {
                    return Err(at!(Error::InvalidConfig(alloc::format!(
                        "unknown animation option '{}'",
                        name
                    ))))
                }
            }
        }
        Ok(options)
    }

    pub(crate) fn to_libwebp(&self) -> Result<libwebp_sys::WebPAnimEncoderOptions> {
        let mut options = core::mem::MaybeUninit::<libwebp_sys::WebPAnimEncoderOptions>::uninit();
        let ok = unsafe {
            libwebp_sys::WebPAnimEncoderOptionsInitInternal(
                options.as_mut_ptr(),
                libwebp_sys::WEBP_MUX_ABI_VERSION as i32,
            )
        };
        if ok == 0 {
            return Err(at!(Error::InvalidConfig(
                "failed to init encoder options".into(),
            )));
        }
        let mut options = unsafe { options.assume_init() };

        options.anim_params.loop_count = i32::try_from(self.loop_count)
            .map_err(|_| at!(Error::InvalidConfig("loop_count too large".into())))?;
        options.anim_params.bgcolor = self.background_color;
        options.minimize_size = self.minimize_size as i32;
        options.allow_mixed = self.allow_mixed as i32;
        // Ordering between kmin and kmax is left to libwebp, which lowers
        // kmin below kmax when the pair is inconsistent.
        if let Some(kmin) = self.kmin {
            options.kmin = i32::try_from(kmin)
                .map_err(|_| at!(Error::InvalidConfig("kmin too large".into())))?;
        }
        if let Some(kmax) = self.kmax {
            options.kmax = i32::try_from(kmax)
                .map_err(|_| at!(Error::InvalidConfig("kmax too large".into())))?;
        }

        Ok(options)
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_value(name, value))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_value(name, value)),
    }
}

fn parse_color(value: &str) -> Result<u32> {
    let v = value.trim();
    let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("#")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => v.parse(),
    };
    parsed.map_err(|_| invalid_value("background_color", value))
}

fn invalid_value(name: &str, value: &str) -> whereat::At<Error> {
    let msg: String = alloc::format!("invalid value '{}' for option '{}'", value, name);
    at!(Error::InvalidConfig(msg))
}

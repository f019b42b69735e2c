use crate::foundation::error::{LottieError, LottieResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// 0-based frame index in animation playback space (`0` is the document in-point).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Declared animation frame rate in frames per second.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a validated frame rate (finite and `> 0`).
    pub fn new(fps: f64) -> LottieResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(LottieError::validation(format!(
                "frame rate must be finite and > 0, got {fps}"
            )));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / self.0
    }

    /// Convert a duration in seconds into a frame count using floor semantics.
    ///
    /// A small epsilon keeps exact frame boundaries (e.g. `k / fps`) from being lost to rounding.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        self.floor_frames(secs, secs.abs())
    }

    /// Whole frames between two absolute clock readings, floor semantics.
    ///
    /// The rounding tolerance grows with the magnitude of the readings, so a clock that has been
    /// running for days still lands `origin + k / fps` on frame `k`.
    pub fn frames_between_floor(self, origin_secs: f64, now_secs: f64) -> u64 {
        let magnitude = origin_secs.abs().max(now_secs.abs());
        self.floor_frames(now_secs - origin_secs, magnitude)
    }

    fn floor_frames(self, secs: f64, magnitude: f64) -> u64 {
        const EPS: f64 = 1e-9;
        let tolerance = EPS.max(magnitude * f64::EPSILON * self.0 * 4.0);
        (secs * self.0 + tolerance).floor().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. Raster surfaces are `u16`-addressed, so both sides must be
    /// in `1..=65535`.
    pub fn new(width: u32, height: u32) -> LottieResult<Self> {
        let max = u32::from(u16::MAX);
        if width == 0 || height == 0 || width > max || height > max {
            return Err(LottieError::validation(format!(
                "canvas size must be within 1..={max}, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width as `u16` (validated in [`Canvas::new`]).
    pub fn width_u16(self) -> u16 {
        self.width.min(u32::from(u16::MAX)) as u16
    }

    /// Height as `u16` (validated in [`Canvas::new`]).
    pub fn height_u16(self) -> u16 {
        self.height.min(u32::from(u16::MAX)) as u16
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Construct from straight channel values.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert unit-range components (`[r, g, b]` or `[r, g, b, a]`) as used by Lottie colors.
    ///
    /// Documents exported with 0..255 components are detected and scaled down.
    pub fn from_unit_components(c: &[f64]) -> Self {
        let scale = if c.iter().take(3).any(|v| *v > 1.0) {
            1.0 / 255.0
        } else {
            1.0
        };
        let ch = |i: usize, default: f64| -> u8 {
            let v = c.get(i).copied().unwrap_or(default) * scale;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Self {
            r: ch(0, 0.0),
            g: ch(1, 0.0),
            b: ch(2, 0.0),
            a: if c.len() > 3 { ch(3, 1.0) } else { 255 },
        }
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(s: &str) -> LottieResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| -> LottieResult<u8> {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| LottieError::malformed(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(LottieError::malformed(format!("invalid hex color '{s}'"))),
        }
    }

    /// Return this color with its alpha multiplied by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// CSS `rgb(r,g,b)` notation (alpha is emitted separately as an opacity attribute).
    pub fn css_rgb(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

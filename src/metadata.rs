//! Source video metadata.
//!
//! [`VideoMetadata`] is read once when a source is opened and describes what
//! the sampler needs: frame count, frame rate and geometry.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// An exact frame rate expressed as a rational number.
///
/// Keeping the rational form means NTSC-style rates such as `30000/1001`
/// are re-encoded exactly instead of being rounded through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    /// Frames per `denominator` seconds.
    pub numerator: i32,
    /// Seconds per `numerator` frames.
    pub denominator: i32,
}

impl FrameRate {
    /// Fallback used when a container reports no usable rate.
    pub const FALLBACK: FrameRate = FrameRate::new(25, 1);

    /// Create a frame rate from a numerator and denominator.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whole frames per second.
    pub const fn from_integer(frames_per_second: i32) -> Self {
        Self::new(frames_per_second, 1)
    }

    /// `true` when both terms are positive.
    pub fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Closest rate whose terms are both at most `max`.
    ///
    /// Rates that already fit (after reducing by their common divisor) are
    /// returned exactly; others get the best continued-fraction
    /// approximation. Encoders such as MPEG-4 Part 2 cap time base terms at
    /// 65535, which variable-rate sources can exceed (e.g. `1509000/50333`).
    #[must_use]
    pub fn limited(self, max: i32) -> FrameRate {
        if !self.is_valid() || max <= 0 {
            return self;
        }

        let max = i64::from(max);
        let divisor = gcd(i64::from(self.numerator), i64::from(self.denominator));
        let mut numerator = i64::from(self.numerator) / divisor;
        let mut denominator = i64::from(self.denominator) / divisor;
        if numerator <= max && denominator <= max {
            return FrameRate::new(numerator as i32, denominator as i32);
        }

        // Walk the convergents until the next one would overflow `max`,
        // then take the largest semiconvergent that still fits.
        let (mut previous_numerator, mut previous_denominator) = (0_i64, 1_i64);
        let (mut current_numerator, mut current_denominator) = (1_i64, 0_i64);
        while denominator != 0 {
            let term = numerator / denominator;
            let next_numerator = term * current_numerator + previous_numerator;
            let next_denominator = term * current_denominator + previous_denominator;

            if next_numerator > max || next_denominator > max {
                let mut step = term;
                if current_numerator != 0 {
                    step = (max - previous_numerator) / current_numerator;
                }
                if current_denominator != 0 {
                    step = step.min((max - previous_denominator) / current_denominator);
                }
                if denominator * (2 * step * current_denominator + previous_denominator)
                    > numerator * current_denominator
                {
                    current_numerator = step * current_numerator + previous_numerator;
                    current_denominator = step * current_denominator + previous_denominator;
                }
                break;
            }

            (previous_numerator, previous_denominator) = (current_numerator, current_denominator);
            (current_numerator, current_denominator) = (next_numerator, next_denominator);
            (numerator, denominator) = (denominator, numerator - term * denominator);
        }

        FrameRate::new(current_numerator as i32, current_denominator as i32)
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

impl Display for FrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Metadata for the video stream being sampled.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate, taken from the stream's average rate.
    pub frame_rate: FrameRate,
    /// Total number of frames. Taken from the container when it records one,
    /// otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Frames per second as a float.
    pub fn frames_per_second(&self) -> f64 {
        self.frame_rate.as_f64()
    }
}

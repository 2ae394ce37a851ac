//! Frame index selection.
//!
//! [`FrameIndexSet`] holds the positions the sampler keeps: `count` points
//! spread linearly over `[0, frame_count - 1]` and truncated to integers.
//! The result depends only on the two counts, so a given video always
//! yields the same selection.
//!
//! # Example
//!
//! ```
//! use std::num::NonZero;
//!
//! use clipsampler::FrameIndexSet;
//!
//! let set = FrameIndexSet::linspace(NonZero::new(420).unwrap(), NonZero::new(14).unwrap());
//! assert_eq!(set.indices()[0], 0);
//! assert_eq!(set.indices()[1], 32);
//! assert_eq!(set.last(), 419);
//! ```

use std::num::{NonZeroU64, NonZeroUsize};

/// Number of frames in a normalized control clip.
pub const DEFAULT_FRAME_COUNT: usize = 14;

/// An ordered, non-decreasing list of source frame indices.
///
/// Indices repeat when the source has fewer frames than requested; each
/// repetition produces one output frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIndexSet {
    indices: Vec<u64>,
}

impl FrameIndexSet {
    /// Spread `count` indices evenly over a video with `frame_count` frames.
    ///
    /// Position `i` holds `floor(i * (frame_count - 1) / (count - 1))`. The
    /// first index is always `0` and the last is always `frame_count - 1`
    /// (for `count == 1` the only index is `0`).
    pub fn linspace(frame_count: NonZeroU64, count: NonZeroUsize) -> Self {
        let last = (frame_count.get() - 1) as u128;
        let count = count.get();

        let indices = if count == 1 {
            vec![0]
        } else {
            let steps = (count - 1) as u128;
            (0..count)
                .map(|position| ((position as u128 * last) / steps) as u64)
                .collect()
        };

        Self { indices }
    }

    /// The selected indices in output order.
    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    /// Number of output positions (including repeats).
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always `false`; a set holds at least one index.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The highest selected index. Decoding can stop once it is reached.
    pub fn last(&self) -> u64 {
        self.indices.last().copied().unwrap_or(0)
    }

    /// Number of distinct source frames selected.
    pub fn distinct_count(&self) -> usize {
        let mut distinct = self.indices.clone();
        distinct.dedup();
        distinct.len()
    }
}

#[cfg(test)]
mod tests {
    use std::num::{NonZeroU64, NonZeroUsize};

    use super::{DEFAULT_FRAME_COUNT, FrameIndexSet};

    fn set(frame_count: u64, count: usize) -> FrameIndexSet {
        FrameIndexSet::linspace(
            NonZeroU64::new(frame_count).unwrap(),
            NonZeroUsize::new(count).unwrap(),
        )
    }

    #[test]
    fn long_video_matches_floor_formula() {
        for frame_count in [14_u64, 15, 29, 100, 420, 10_007] {
            let selection = set(frame_count, DEFAULT_FRAME_COUNT);
            assert_eq!(selection.len(), 14);
            for (position, &index) in selection.indices().iter().enumerate() {
                assert_eq!(index, position as u64 * (frame_count - 1) / 13);
            }
            assert_eq!(selection.indices()[0], 0);
            assert_eq!(selection.last(), frame_count - 1);
        }
    }

    #[test]
    fn four_hundred_twenty_frames() {
        let selection = set(420, 14);
        assert_eq!(
            selection.indices(),
            &[0, 32, 64, 96, 128, 161, 193, 225, 257, 290, 322, 354, 386, 419]
        );
        assert_eq!(selection.distinct_count(), 14);
    }

    #[test]
    fn exactly_fourteen_frames_is_identity() {
        let selection = set(14, 14);
        let expected: Vec<u64> = (0..14).collect();
        assert_eq!(selection.indices(), expected.as_slice());
    }

    #[test]
    fn short_video_repeats_indices() {
        let selection = set(5, 14);
        assert_eq!(
            selection.indices(),
            &[0, 0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4]
        );
        assert_eq!(selection.distinct_count(), 5);
    }

    #[test]
    fn single_frame_video_selects_zero_everywhere() {
        let selection = set(1, 14);
        assert_eq!(selection.indices(), &[0; 14]);
        assert_eq!(selection.distinct_count(), 1);
        assert_eq!(selection.last(), 0);
    }

    #[test]
    fn single_output_frame_selects_first() {
        let selection = set(300, 1);
        assert_eq!(selection.indices(), &[0]);
    }

    #[test]
    fn indices_are_non_decreasing_and_in_range() {
        for frame_count in 1..60_u64 {
            for count in 1..20_usize {
                let selection = set(frame_count, count);
                assert_eq!(selection.len(), count);
                assert!(selection.indices().windows(2).all(|pair| pair[0] <= pair[1]));
                assert!(selection.indices().iter().all(|&index| index < frame_count));
                assert!(!selection.is_empty());
            }
        }
    }

    #[test]
    fn odd_frame_count_skips_alternate_frames() {
        let selection = set(27, 14);
        let expected: Vec<u64> = (0..14).map(|position| position * 2).collect();
        assert_eq!(selection.indices(), expected.as_slice());
        assert_eq!(selection.distinct_count(), 14);
    }
}

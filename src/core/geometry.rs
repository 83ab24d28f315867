// Hand region geometry - derives a padded square sampling region from landmarks

use crate::models::classification::{RecognizerError, RecognizerResult};
use crate::models::landmarks::{BoundingBox, HandLandmarkSet, Landmark, SquareRegion};

/// Padding applied around the hand, as a fraction of its larger dimension.
/// With 0.6 the hand fills roughly 70% of the final square.
pub const DEFAULT_PADDING_RATIO: f32 = 0.6;

/// Computes the square crop region around a detected hand
#[derive(Debug, Clone, Copy)]
pub struct LandmarkGeometry {
    padding_ratio: f32,
}

impl Default for LandmarkGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_PADDING_RATIO)
    }
}

impl LandmarkGeometry {
    pub fn new(padding_ratio: f32) -> Self {
        Self { padding_ratio }
    }

    pub fn padding_ratio(&self) -> f32 {
        self.padding_ratio
    }

    /// Tight pixel-space box around every landmark
    pub fn bounding_box(landmarks: &[Landmark], width: u32, height: u32) -> RecognizerResult<BoundingBox> {
        let (first, rest) = landmarks
            .split_first()
            .ok_or(RecognizerError::EmptyLandmarkSet)?;

        let (x, y) = first.to_pixels(width, height);
        let mut bbox = BoundingBox { min_x: x, min_y: y, max_x: x, max_y: y };

        for landmark in rest {
            let (x, y) = landmark.to_pixels(width, height);
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }

        Ok(bbox)
    }

    /// Pad, square and clamp the landmark box for a `width` x `height` frame.
    ///
    /// The clamped crop is not re-squared: near frame edges it can be narrower
    /// on one axis, and the sampler centers it on a square canvas instead.
    pub fn square_region(
        &self,
        landmarks: &[Landmark],
        width: u32,
        height: u32,
    ) -> RecognizerResult<SquareRegion> {
        let raw = Self::bounding_box(landmarks, width, height)?;

        let hand_size = raw.width().max(raw.height());
        let padded = raw.expand(hand_size * self.padding_ratio);

        let size = padded.width().max(padded.height());
        let (cx, cy) = padded.center();
        let square = BoundingBox::centered(cx, cy, size);

        Ok(SquareRegion {
            square,
            crop: square.clamp_to(width, height),
        })
    }

    /// Convenience wrapper over a full hand
    pub fn hand_region(
        &self,
        hand: &HandLandmarkSet,
        width: u32,
        height: u32,
    ) -> RecognizerResult<SquareRegion> {
        self.square_region(hand.landmarks(), width, height)
    }
}

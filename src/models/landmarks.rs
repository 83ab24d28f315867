// Data models for hand landmarks and the pixel-space regions derived from them

use serde::{Deserialize, Serialize};

use super::classification::RecognizerError;

/// Number of landmarks the hand tracker reports for one hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// How far outside `[0, 1]` a normalized coordinate may fall. Trackers report
/// slightly out-of-frame points for partially visible hands.
pub const LANDMARK_COORD_MARGIN: f32 = 0.5;

// ==============================================================================
// Landmarks
// ==============================================================================

/// A single hand keypoint in normalized image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // Normalized [0, 1] relative to frame width
    pub y: f32, // Normalized [0, 1] relative to frame height
    #[serde(default)]
    pub z: f32, // Depth, unused by the recognition pipeline
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Convert to pixel coordinates for a frame of the given size
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }

    /// Finite and within `LANDMARK_COORD_MARGIN` of the frame
    pub fn is_plausible(&self) -> bool {
        let range = -LANDMARK_COORD_MARGIN..=1.0 + LANDMARK_COORD_MARGIN;
        range.contains(&self.x) && range.contains(&self.y)
    }
}

/// MediaPipe Hand Landmark indices (21 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const FINGERTIPS: [HandLandmark; 5] = [
        HandLandmark::ThumbTip,
        HandLandmark::IndexFingerTip,
        HandLandmark::MiddleFingerTip,
        HandLandmark::RingFingerTip,
        HandLandmark::PinkyTip,
    ];
}

/// One tracked hand: exactly 21 landmarks in anatomical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandLandmarkSet {
    landmarks: [Landmark; HAND_LANDMARK_COUNT],
}

impl HandLandmarkSet {
    pub fn new(landmarks: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark; HAND_LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn get(&self, landmark: HandLandmark) -> Landmark {
        self.landmarks[landmark as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarkSet {
    type Error = RecognizerError;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(RecognizerError::EmptyLandmarkSet);
        }
        let landmarks: [Landmark; HAND_LANDMARK_COUNT] = value
            .try_into()
            .map_err(|v: Vec<Landmark>| RecognizerError::InvalidLandmarkCount(v.len()))?;

        if let Some((index, point)) = landmarks.iter().enumerate().find(|(_, p)| !p.is_plausible()) {
            return Err(RecognizerError::InvalidLandmark {
                index,
                x: point.x,
                y: point.y,
            });
        }
        Ok(Self { landmarks })
    }
}

impl From<HandLandmarkSet> for Vec<Landmark> {
    fn from(value: HandLandmarkSet) -> Self {
        value.landmarks.to_vec()
    }
}

// ==============================================================================
// Pixel-space regions
// ==============================================================================

/// Axis-aligned box in pixel space of the current frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Build a box from two corners, ordering the coordinates
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Box of side `size` centered on `(cx, cy)`
    pub fn centered(cx: f32, cy: f32, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(cx - half, cy - half, cx + half, cy + half)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow every side by `amount` pixels
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Clamp each edge independently into `[0, width] x [0, height]`
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            min_x: self.min_x.clamp(0.0, w),
            min_y: self.min_y.clamp(0.0, h),
            max_x: self.max_x.clamp(0.0, w),
            max_y: self.max_y.clamp(0.0, h),
        }
    }

    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.min_x >= 0.0
            && self.min_y >= 0.0
            && self.max_x <= width as f32
            && self.max_y <= height as f32
    }
}

/// Square sampling region around a hand.
///
/// `square` is the pre-clamp box whose sides are equal; `crop` is the same box
/// clamped to the frame, which may be narrower on one axis near frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareRegion {
    pub square: BoundingBox,
    pub crop: BoundingBox,
}

impl SquareRegion {
    /// Side length of the pre-clamp square
    pub fn size(&self) -> f32 {
        self.square.width()
    }
}

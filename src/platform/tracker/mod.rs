// Hand tracking integration
// The landmark detector itself is an external capability; this module defines
// the seam it plugs into and a replay backend for recorded sessions.

pub mod replay;

pub use replay::{ReplaySkipper, ReplayTracker};

use crate::models::classification::RecognizerResult;
use crate::models::frame::RawFrame;
use crate::models::landmarks::HandLandmarkSet;

/// Hand landmark detector.
///
/// Called once per frame, before the next frame is considered. Returns the
/// landmarks of at most one hand.
pub trait HandTracker: Send {
    /// Run detection on a frame
    fn detect(&mut self, frame: &RawFrame) -> RecognizerResult<Option<HandLandmarkSet>>;

    /// Check if the detector is ready to process frames
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

impl<T: HandTracker + ?Sized> HandTracker for Box<T> {
    fn detect(&mut self, frame: &RawFrame) -> RecognizerResult<Option<HandLandmarkSet>> {
        (**self).detect(frame)
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn get_model_info(&self) -> String {
        (**self).get_model_info()
    }
}

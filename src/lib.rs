pub mod core;
pub mod logging;
pub mod models;
pub mod platform;

pub use crate::core::classifier_client::{Classifier, HttpClassifier};
pub use crate::core::config::RecognizerConfig;
pub use crate::core::geometry::LandmarkGeometry;
pub use crate::core::orchestrator::{
    FrameOrchestrator, FrameRateCounter, RecognitionListener, SessionLifecycle, SessionState,
};
pub use crate::core::region_sampler::{RegionSampler, SampledImage, CLASSIFIER_INPUT_SIZE};
pub use crate::core::tensor::{NormalizedTensor, TensorNormalizer};
pub use crate::core::throttle::ClassificationThrottler;
pub use crate::models::classification::{
    ClassificationOutcome, HealthStatus, Prediction, Recognition, RecognizerError,
    RecognizerResult, Telemetry,
};
pub use crate::models::frame::{PixelFormat, RawFrame};
pub use crate::models::landmarks::{BoundingBox, HandLandmark, HandLandmarkSet, Landmark, SquareRegion};
pub use crate::platform::tracker::{HandTracker, ReplaySkipper, ReplayTracker};

// Replay backend: feeds landmark sets recorded from an earlier session

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::HandTracker;
use crate::models::classification::{RecognizerError, RecognizerResult};
use crate::models::frame::RawFrame;
use crate::models::landmarks::HandLandmarkSet;

/// Drops recorded detections for frames that never reach the tracker, such as
/// images that failed to decode. Cloned out of the tracker before it is handed
/// to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ReplaySkipper {
    skipped: Arc<Mutex<BTreeSet<usize>>>,
}

impl ReplaySkipper {
    /// Mark the record at `index` (0-based frame position) as never delivered.
    /// Must be called before any later frame is handed to the tracker.
    pub fn skip(&self, index: usize) {
        if let Ok(mut skipped) = self.skipped.lock() {
            skipped.insert(index);
        }
    }

    fn take(&self, index: usize) -> bool {
        self.skipped
            .lock()
            .map(|mut skipped| skipped.remove(&index))
            .unwrap_or(false)
    }
}

/// Returns one recorded detection per frame, then "no hand" once exhausted
pub struct ReplayTracker {
    detections: VecDeque<Option<HandLandmarkSet>>,
    total: usize,
    // Index of the record at the front of `detections`
    cursor: usize,
    skipper: ReplaySkipper,
}

impl ReplayTracker {
    pub fn new(detections: impl IntoIterator<Item = Option<HandLandmarkSet>>) -> Self {
        let detections: VecDeque<_> = detections.into_iter().collect();
        let total = detections.len();
        Self {
            detections,
            total,
            cursor: 0,
            skipper: ReplaySkipper::default(),
        }
    }

    pub fn skipper(&self) -> ReplaySkipper {
        self.skipper.clone()
    }

    /// Parse JSON lines: each line is `null` or an array of 21 `{x, y, z}` objects
    pub fn from_jsonl(contents: &str) -> RecognizerResult<Self> {
        let mut detections = Vec::new();

        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let detection: Option<HandLandmarkSet> = serde_json::from_str(line).map_err(|e| {
                RecognizerError::InitializationFailure(format!(
                    "landmark record {}: {}",
                    line_no + 1,
                    e
                ))
            })?;
            detections.push(detection);
        }

        Ok(Self::new(detections))
    }

    pub fn from_file(path: &Path) -> RecognizerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RecognizerError::InitializationFailure(format!("{}: {}", path.display(), e))
        })?;
        Self::from_jsonl(&contents)
    }

    pub fn remaining(&self) -> usize {
        self.detections.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl HandTracker for ReplayTracker {
    fn detect(&mut self, _frame: &RawFrame) -> RecognizerResult<Option<HandLandmarkSet>> {
        while self.skipper.take(self.cursor) {
            self.detections.pop_front();
            self.cursor += 1;
        }

        self.cursor += 1;
        Ok(self.detections.pop_front().flatten())
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_model_info(&self) -> String {
        format!("Replay tracker ({} recorded frames)", self.total)
    }
}

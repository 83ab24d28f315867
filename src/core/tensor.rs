// Tensor normalization - converts the sampled hand image into the float
// tensor sent to the remote classifier

use serde::ser::{Serialize, Serializer};

use super::region_sampler::{SampledImage, CLASSIFIER_INPUT_SIZE};

const SIDE: usize = CLASSIFIER_INPUT_SIZE as usize;

/// Fixed 128 x 128 x 3 grid of floats in [0, 1], row-major, channels R, G, B
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Box<[[[f32; 3]; SIDE]; SIDE]>,
}

impl NormalizedTensor {
    pub const SHAPE: [usize; 3] = [SIDE, SIDE, 3];

    /// Normalize every pixel: each of R, G, B divided by 255, alpha dropped.
    /// Element `[row][col]` corresponds to pixel `(col, row)`.
    pub fn from_image(image: &SampledImage) -> Self {
        let mut data = Box::new([[[0.0f32; 3]; SIDE]; SIDE]);

        for (col, row, pixel) in image.enumerate_pixels() {
            let [r, g, b, _alpha] = pixel.0;
            data[row as usize][col as usize] = [
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
            ];
        }

        Self { data }
    }

    pub fn get(&self, row: usize, col: usize) -> [f32; 3] {
        self.data[row][col]
    }

    pub fn rows(&self) -> &[[[f32; 3]; SIDE]; SIDE] {
        &self.data
    }

    /// Iterate over every channel value in row-major order
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().flatten().flatten().copied()
    }
}

impl Serialize for NormalizedTensor {
    // Nested `[[[r, g, b], ...], ...]` arrays, as the classifier expects
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.iter().map(|row| &row[..]))
    }
}

/// Stateless mapping from sampled images to tensors
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorNormalizer;

impl TensorNormalizer {
    pub fn normalize(&self, image: &SampledImage) -> NormalizedTensor {
        NormalizedTensor::from_image(image)
    }
}

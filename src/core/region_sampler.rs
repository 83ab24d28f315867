// Region sampling - crops the hand region onto a square canvas and resamples it
// to the classifier's fixed input resolution

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::models::classification::{RecognizerError, RecognizerResult};
use crate::models::frame::RawFrame;
use crate::models::landmarks::SquareRegion;

/// Side length of the classifier input, in pixels
pub const CLASSIFIER_INPUT_SIZE: u32 = 128;

/// Light background matching the classifier's training images
pub const DEFAULT_BACKGROUND: [u8; 3] = [240, 240, 240];

/// Largest intermediate canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 2048;

/// An RGBA image guaranteed to be `CLASSIFIER_INPUT_SIZE` square
#[derive(Debug, Clone, PartialEq)]
pub struct SampledImage(RgbaImage);

impl SampledImage {
    pub fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn into_inner(self) -> RgbaImage {
        self.0
    }
}

impl TryFrom<RgbaImage> for SampledImage {
    type Error = RecognizerError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let actual = image.dimensions();
        let expected = (CLASSIFIER_INPUT_SIZE, CLASSIFIER_INPUT_SIZE);
        if actual != expected {
            return Err(RecognizerError::InvalidDimensions { expected, actual });
        }
        Ok(Self(image))
    }
}

impl std::ops::Deref for SampledImage {
    type Target = RgbaImage;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts square hand regions from camera frames
#[derive(Debug, Clone)]
pub struct RegionSampler {
    background: Rgba<u8>,
    filter: FilterType,
}

impl Default for RegionSampler {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}

impl RegionSampler {
    pub fn new(background: [u8; 3]) -> Self {
        Self {
            background: Rgba([background[0], background[1], background[2], 255]),
            // Bilinear
            filter: FilterType::Triangle,
        }
    }

    /// Crop `region` out of `frame` and resample it to the classifier input size
    pub fn sample(&self, frame: &RawFrame, region: &SquareRegion) -> RecognizerResult<SampledImage> {
        let canvas = self.extract(frame, region)?;
        let resized = imageops::resize(
            &canvas,
            CLASSIFIER_INPUT_SIZE,
            CLASSIFIER_INPUT_SIZE,
            self.filter,
        );
        SampledImage::try_from(resized)
    }

    /// Copy the clamped crop onto a background-filled square canvas of the
    /// region's pre-clamp side length, centered on both axes.
    ///
    /// Squares larger than `MAX_CANVAS_SIDE` are drawn at a reduced scale so
    /// the canvas never exceeds that side.
    pub fn extract(&self, frame: &RawFrame, region: &SquareRegion) -> RecognizerResult<RgbaImage> {
        frame.validate()?;

        let size = (region.size().round() as u32).max(1);
        let side = size.min(MAX_CANVAS_SIDE);
        let scale = side as f32 / size as f32;
        let mut canvas = RgbaImage::from_pixel(side, side, self.background);

        // Whole pixels covered by the crop, kept inside the frame and the square
        let x0 = (region.crop.min_x.floor().max(0.0) as u32).min(frame.width);
        let y0 = (region.crop.min_y.floor().max(0.0) as u32).min(frame.height);
        let x1 = (region.crop.max_x.ceil().max(0.0) as u32).min(frame.width);
        let y1 = (region.crop.max_y.ceil().max(0.0) as u32).min(frame.height);
        let crop_w = x1.saturating_sub(x0).min(size);
        let crop_h = y1.saturating_sub(y0).min(size);

        if crop_w == 0 || crop_h == 0 {
            return Ok(canvas);
        }

        let mut crop = RgbaImage::new(crop_w, crop_h);
        let bpp = frame.format.bytes_per_pixel();
        let stride = frame.stride();
        for row in 0..crop_h {
            let src_start = (y0 + row) as usize * stride + x0 as usize * bpp;
            let src_row = &frame.data[src_start..src_start + crop_w as usize * bpp];
            for (col, px) in src_row.chunks_exact(bpp).enumerate() {
                crop.put_pixel(col as u32, row, Rgba(frame.format.to_rgba(px)));
            }
        }

        if side < size {
            let scaled_w = ((crop_w as f32 * scale).round() as u32).clamp(1, side);
            let scaled_h = ((crop_h as f32 * scale).round() as u32).clamp(1, side);
            crop = imageops::resize(&crop, scaled_w, scaled_h, self.filter);
        }

        let offset_x = (side - crop.width()) / 2;
        let offset_y = (side - crop.height()) / 2;
        imageops::replace(&mut canvas, &crop, offset_x as i64, offset_y as i64);

        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::PixelFormat;
    use crate::models::landmarks::BoundingBox;

    fn create_test_frame(width: u32, height: u32, color: [u8; 4], format: PixelFormat) -> RawFrame {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        RawFrame {
            timestamp: 0,
            width,
            height,
            data,
            format,
        }
    }

    fn region(square: BoundingBox, width: u32, height: u32) -> SquareRegion {
        SquareRegion {
            square,
            crop: square.clamp_to(width, height),
        }
    }

    #[test]
    fn test_output_is_always_classifier_size() {
        let sampler = RegionSampler::default();
        let frame = create_test_frame(640, 480, [10, 20, 30, 255], PixelFormat::RGBA8);

        let squares = [
            BoundingBox::centered(320.0, 240.0, 660.0),
            BoundingBox::centered(320.0, 240.0, 50.0),
            BoundingBox::centered(0.0, 0.0, 300.0),
            BoundingBox::centered(639.0, 479.0, 3.0),
            BoundingBox::centered(320.0, 240.0, 0.0),
        ];

        for square in squares {
            let sampled = sampler.sample(&frame, &region(square, 640, 480)).unwrap();
            assert_eq!(sampled.dimensions(), (CLASSIFIER_INPUT_SIZE, CLASSIFIER_INPUT_SIZE));
        }
    }

    #[test]
    fn test_region_outside_frame_is_background() {
        let sampler = RegionSampler::new([200, 201, 202]);
        let frame = create_test_frame(640, 480, [0, 0, 0, 255], PixelFormat::RGBA8);
        let square = BoundingBox::centered(2000.0, 2000.0, 100.0);

        let sampled = sampler.sample(&frame, &region(square, 640, 480)).unwrap();
        assert_eq!(sampled.dimensions(), (128, 128));
        assert!(sampled.pixels().all(|p| *p == Rgba([200, 201, 202, 255])));
    }

    #[test]
    fn test_clamped_crop_is_centered_on_canvas() {
        let sampler = RegionSampler::new([255, 255, 255]);
        let frame = create_test_frame(100, 100, [0, 0, 0, 255], PixelFormat::RGBA8);

        // 60px square hanging 20px off the left edge: 40px of frame content
        let square = BoundingBox::new(-20.0, 20.0, 40.0, 80.0);
        let canvas = sampler.extract(&frame, &region(square, 100, 100)).unwrap();

        assert_eq!(canvas.dimensions(), (60, 60));
        // 10px background band on each side of the 40px crop
        assert_eq!(*canvas.get_pixel(5, 30), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(10, 30), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(49, 30), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(50, 30), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_oversized_region_canvas_is_bounded() {
        let sampler = RegionSampler::new([255, 255, 255]);
        let frame = create_test_frame(640, 480, [0, 0, 0, 255], PixelFormat::RGBA8);

        // Padded square from a hand spread across ~90 frame widths
        let square = BoundingBox::centered(320.0, 240.0, 56320.0);
        let canvas = sampler.extract(&frame, &region(square, 640, 480)).unwrap();

        assert_eq!(canvas.dimensions(), (MAX_CANVAS_SIDE, MAX_CANVAS_SIDE));
        // The frame shrinks to a ~23 x 17 patch in the middle
        assert_eq!(*canvas.get_pixel(1024, 1024), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(1024, 1000), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));

        let sampled = sampler.sample(&frame, &region(square, 640, 480)).unwrap();
        assert_eq!(sampled.dimensions(), (CLASSIFIER_INPUT_SIZE, CLASSIFIER_INPUT_SIZE));
    }

    #[test]
    fn test_bgra_frames_are_swizzled() {
        let sampler = RegionSampler::default();
        let frame = create_test_frame(64, 64, [10, 20, 30, 255], PixelFormat::BGRA8);
        let square = BoundingBox::new(0.0, 0.0, 64.0, 64.0);

        let sampled = sampler.sample(&frame, &region(square, 64, 64)).unwrap();
        assert_eq!(*sampled.get_pixel(64, 64), Rgba([30, 20, 10, 255]));
    }

    #[test]
    fn test_sampled_image_rejects_wrong_size() {
        let result = SampledImage::try_from(RgbaImage::new(64, 128));
        assert!(matches!(
            result,
            Err(RecognizerError::InvalidDimensions { actual: (64, 128), .. })
        ));
    }

    #[test]
    fn test_invalid_frame_is_rejected() {
        let sampler = RegionSampler::default();
        let mut frame = create_test_frame(10, 10, [0, 0, 0, 255], PixelFormat::RGBA8);
        frame.data.truncate(10);
        let square = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(sampler.sample(&frame, &region(square, 10, 10)).is_err());
    }
}

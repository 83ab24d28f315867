// Data structures for camera frames delivered to the pipeline

use super::classification::{RecognizerError, RecognizerResult};

/// A captured camera frame
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub timestamp: i64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

/// Pixel format of captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGBA8,
    BGRA8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        4
    }

    /// Reorder one pixel into RGBA
    pub fn to_rgba(&self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelFormat::RGBA8 => [px[0], px[1], px[2], px[3]],
            PixelFormat::BGRA8 => [px[2], px[1], px[0], px[3]],
        }
    }
}

impl RawFrame {
    /// Build an RGBA frame from a decoded image
    pub fn from_rgba_image(image: image::RgbaImage, timestamp: i64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            timestamp,
            width,
            height,
            data: image.into_raw(),
            format: PixelFormat::RGBA8,
        }
    }

    /// Row stride in bytes
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Check that the pixel buffer matches the declared dimensions
    pub fn validate(&self) -> RecognizerResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RecognizerError::InvalidFrame(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }

        let expected = self.stride() * self.height as usize;
        if self.data.len() < expected {
            return Err(RecognizerError::InvalidFrame(format!(
                "expected at least {} bytes for {}x{}, got {}",
                expected,
                self.width,
                self.height,
                self.data.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_swizzle() {
        assert_eq!(PixelFormat::BGRA8.to_rgba(&[1, 2, 3, 4]), [3, 2, 1, 4]);
        assert_eq!(PixelFormat::RGBA8.to_rgba(&[1, 2, 3, 4]), [1, 2, 3, 4]);
    }

    #[test]
    fn test_frame_validation() {
        let frame = RawFrame {
            timestamp: 0,
            width: 4,
            height: 2,
            data: vec![0; 32],
            format: PixelFormat::RGBA8,
        };
        assert!(frame.validate().is_ok());

        let short = RawFrame {
            data: vec![0; 31],
            ..frame.clone()
        };
        assert!(short.validate().is_err());

        let empty = RawFrame {
            width: 0,
            ..frame
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_from_rgba_image() {
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 255]));
        let frame = RawFrame::from_rgba_image(image, 42);
        assert_eq!(frame.width, 3);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.data.len(), 24);
        assert_eq!(frame.timestamp, 42);
    }
}

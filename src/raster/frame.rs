use image::DynamicImage;

use crate::error::{RecognizeError, Result};

/// One RGBA sample, channels in `[r, g, b, a]` order.
pub type Rgba = [u8; 4];

/// An immutable RGBA raster captured from a drawing surface.
///
/// Pixels are stored row-major: the pixel at `(x, y)` lives at
/// `pixels[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl RasterFrame {
    /// Builds a frame from explicit pixels.
    ///
    /// Fails with `InvalidRaster` when either dimension is zero or the pixel
    /// count does not equal `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgba>) -> Result<RasterFrame> {
        if width == 0 || height == 0 {
            return Err(RecognizeError::InvalidRaster(format!(
                "raster must have a non-zero area, got {}x{}", width, height
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            RecognizeError::InvalidRaster(format!("raster {}x{} is too large", width, height))
        })?;
        if pixels.len() != expected {
            return Err(RecognizeError::InvalidRaster(format!(
                "expected {} pixels for {}x{}, got {}", expected, width, height, pixels.len()
            )));
        }
        Ok(RasterFrame { width, height, pixels })
    }

    /// Builds a frame from a flat `R,G,B,A,R,G,B,A,...` byte buffer, the
    /// layout a canvas `getImageData()` call produces.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<RasterFrame> {
        if bytes.len() % 4 != 0 {
            return Err(RecognizeError::InvalidRaster(format!(
                "RGBA buffer length {} is not a multiple of 4", bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        RasterFrame::new(width, height, pixels)
    }

    /// A frame where every pixel has the same value.
    ///
    /// The size is checked before anything is allocated.
    pub fn filled(width: usize, height: usize, pixel: Rgba) -> Result<RasterFrame> {
        let count = width
            .checked_mul(height)
            .filter(|n| n.checked_mul(4).map_or(false, |bytes| bytes <= isize::MAX as usize))
            .ok_or_else(|| {
                RecognizeError::InvalidRaster(format!("raster {}x{} is too large", width, height))
            })?;
        RasterFrame::new(width, height, vec![pixel; count])
    }

    /// Converts an already-decoded image to RGBA8.
    pub fn from_image(img: &DynamicImage) -> Result<RasterFrame> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();
        RasterFrame::new(width as usize, height as usize, pixels)
    }

    /// Decodes image bytes (PNG/JPEG/BMP/GIF) into a frame at native resolution.
    pub fn decode(bytes: &[u8]) -> Result<RasterFrame> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| RecognizeError::InvalidRaster(format!("image decode error: {}", e)))?;
        RasterFrame::from_image(&img)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Row `y` as a slice of `width` pixels.
    pub fn row(&self, y: usize) -> &[Rgba] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageOutputFormat, Rgba as ImgRgba};
    use std::io::Cursor;

    #[test]
    fn rejects_pixel_count_mismatch() {
        let err = RasterFrame::new(3, 3, vec![[0, 0, 0, 255]; 8]).unwrap_err();
        assert_eq!(err.kind(), "invalid_raster");
    }

    #[test]
    fn rejects_zero_area() {
        assert!(RasterFrame::new(0, 5, vec![]).is_err());
        assert!(RasterFrame::filled(5, 0, [255; 4]).is_err());
    }

    #[test]
    fn oversized_fill_is_rejected_without_allocating() {
        for (w, h) in [(usize::MAX, 2), (usize::MAX / 4, 2)] {
            let err = RasterFrame::filled(w, h, [0, 0, 0, 255]).unwrap_err();
            assert_eq!(err.kind(), "invalid_raster");
            assert!(err.to_string().contains("too large"), "{}", err);
        }
    }

    #[test]
    fn rgba_bytes_are_grouped_per_pixel() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let frame = RasterFrame::from_rgba_bytes(2, 1, &bytes).unwrap();
        assert_eq!(frame.pixels(), &[[1, 2, 3, 4], [5, 6, 7, 8]]);
        assert!(RasterFrame::from_rgba_bytes(2, 1, &bytes[..7]).is_err());
    }

    #[test]
    fn row_slices_follow_row_major_layout() {
        let pixels = (0..6u8).map(|i| [i, i, i, 255]).collect();
        let frame = RasterFrame::new(3, 2, pixels).unwrap();
        assert_eq!(frame.row(1)[0], [3, 3, 3, 255]);
        assert_eq!(frame.row(1).len(), 3);
    }

    #[test]
    fn decodes_png_at_native_resolution() {
        let img: ImageBuffer<ImgRgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(40, 30, ImgRgba([10, 20, 30, 200]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();

        let frame = RasterFrame::decode(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (40, 30));
        assert_eq!(frame.pixels()[0], [10, 20, 30, 200]);
    }

    #[test]
    fn garbage_bytes_are_an_invalid_raster() {
        let err = RasterFrame::decode(b"not an image").unwrap_err();
        assert_eq!(err.kind(), "invalid_raster");
    }
}

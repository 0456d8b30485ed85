use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use log::debug;
use thiserror::Error;

use crate::models::PhotoPayload;

/// Per-photo storage budget. Anything larger gets recompressed before it is
/// handed to the history store.
pub const MAX_PHOTO_BYTES: usize = 500 * 1024;

/// Longer edge clamp applied before the quality loop.
const MAX_DIMENSION: u32 = 800;

const START_QUALITY: u8 = 80;
const MIN_QUALITY: u8 = 10;
const QUALITY_STEP: u8 = 10;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("failed to decode source image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode JPEG: {0}")]
    Encode(image::ImageError),
}

/// Result of a compression pass. `quality` is the encode quality that was
/// finally used; at `MIN_QUALITY` the byte budget may still be exceeded.
#[derive(Debug)]
pub struct CompressedPhoto {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl CompressedPhoto {
    pub fn into_payload(self) -> PhotoPayload {
        PhotoPayload::from_jpeg(&self.jpeg, self.width, self.height)
    }
}

/// Shrink `bytes` to at most `max_bytes` of encoded JPEG.
///
/// Dimensions are clamped first (longer edge to `MAX_DIMENSION`, aspect
/// ratio preserved), then quality steps down from `START_QUALITY` by
/// `QUALITY_STEP` until the budget is met or `MIN_QUALITY` is reached. The
/// `MIN_QUALITY` result is returned best-effort even if it is still over
/// budget, so the loop runs at most 8 encodes.
pub fn compress_to_budget(bytes: &[u8], max_bytes: usize) -> Result<CompressedPhoto, CompressError> {
    let source = image::load_from_memory(bytes).map_err(CompressError::Decode)?;
    let scaled = fit_within(&source, MAX_DIMENSION);
    // JPEG has no alpha channel; flatten whatever the source format was.
    let rgb = DynamicImage::ImageRgb8(scaled.to_rgb8());
    let (width, height) = (rgb.width(), rgb.height());

    let mut quality = START_QUALITY;
    let mut jpeg = encode_jpeg(&rgb, quality)?;
    while jpeg.len() > max_bytes && quality > MIN_QUALITY {
        quality -= QUALITY_STEP;
        jpeg = encode_jpeg(&rgb, quality)?;
    }

    debug!(
        "compressed photo to {} bytes at quality {} ({}x{})",
        jpeg.len(),
        quality,
        width,
        height
    );

    Ok(CompressedPhoto {
        jpeg,
        width,
        height,
        quality,
    })
}

/// Async wrapper used from command handlers; the actual work is CPU-bound
/// and runs on the blocking pool.
pub async fn compress_payload(
    payload: &PhotoPayload,
    max_bytes: usize,
) -> Result<PhotoPayload, CompressError> {
    let bytes = payload.decode_bytes().ok_or_else(|| {
        CompressError::Decode(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "photo payload is not valid base64",
        )))
    })?;

    match tokio::task::spawn_blocking(move || compress_to_budget(&bytes, max_bytes)).await {
        Ok(result) => result.map(CompressedPhoto::into_payload),
        Err(join_err) => Err(CompressError::Encode(image::ImageError::IoError(
            std::io::Error::other(join_err),
        ))),
    }
}

/// Render a grabbed camera frame at the configured capture bound and
/// quality. Shares the resize/encode path with the compressor.
pub fn render_capture(
    frame_jpeg: &[u8],
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<PhotoPayload, CompressError> {
    let source = image::load_from_memory(frame_jpeg).map_err(CompressError::Decode)?;
    let bounded = if source.width() > max_width || source.height() > max_height {
        source.resize(max_width, max_height, FilterType::Triangle)
    } else {
        source
    };
    let rgb = DynamicImage::ImageRgb8(bounded.to_rgb8());
    let (width, height) = (rgb.width(), rgb.height());
    let jpeg = encode_jpeg(&rgb, quality)?;
    Ok(PhotoPayload::from_jpeg(&jpeg, width, height))
}

fn fit_within(img: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= max_dimension && height <= max_dimension {
        return img.clone();
    }

    let (new_width, new_height) = if width > height {
        let scaled = (height as u64 * max_dimension as u64 / width as u64) as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (width as u64 * max_dimension as u64 / height as u64) as u32;
        (scaled.max(1), max_dimension)
    };

    img.resize_exact(new_width, new_height, FilterType::Triangle)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    img.write_with_encoder(encoder)
        .map_err(CompressError::Encode)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    /// Deterministic high-entropy fill so JPEG cannot compress it well.
    fn noisy_image(width: u32, height: u32) -> DynamicImage {
        let mut state: u32 = 0x9E37_79B9;
        let img = ImageBuffer::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Rgb([
                (state & 0xFF) as u8,
                ((state >> 8) & 0xFF) as u8,
                ((state >> 16) & 0xFF) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn clamps_longer_edge_preserving_aspect_ratio() {
        let png = gradient_png(1600, 900);
        let result = compress_to_budget(&png, MAX_PHOTO_BYTES).unwrap();
        assert_eq!((result.width, result.height), (800, 450));
    }

    #[test]
    fn clamps_portrait_images_on_height() {
        let png = gradient_png(900, 1600);
        let result = compress_to_budget(&png, MAX_PHOTO_BYTES).unwrap();
        assert_eq!((result.width, result.height), (450, 800));
    }

    #[test]
    fn leaves_small_images_unscaled() {
        let png = gradient_png(640, 480);
        let result = compress_to_budget(&png, MAX_PHOTO_BYTES).unwrap();
        assert_eq!((result.width, result.height), (640, 480));
    }

    #[test]
    fn meets_budget_or_bottoms_out_at_min_quality() {
        let mut buffer = Cursor::new(Vec::new());
        noisy_image(800, 600)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        let png = buffer.into_inner();

        // A budget this tight is not reachable for pure noise; the loop
        // must stop at the quality floor instead of spinning.
        let result = compress_to_budget(&png, 10_000).unwrap();
        assert!(result.jpeg.len() <= 10_000 || result.quality == MIN_QUALITY);

        // A comfortable budget is met at a higher quality.
        let result = compress_to_budget(&png, 10 * 1024 * 1024).unwrap();
        assert!(result.jpeg.len() <= 10 * 1024 * 1024);
        assert_eq!(result.quality, START_QUALITY);
    }

    #[test]
    fn flattens_alpha_sources_to_jpeg() {
        let img = ImageBuffer::from_fn(320, 200, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 64, 128])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();

        let result = compress_to_budget(&buffer.into_inner(), MAX_PHOTO_BYTES).unwrap();
        assert!(!result.jpeg.is_empty());
        assert_eq!(image::guess_format(&result.jpeg).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn rejects_undecodable_input() {
        let err = compress_to_budget(b"definitely not an image", MAX_PHOTO_BYTES).unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
    }

    #[test]
    fn render_capture_bounds_frame_to_configured_resolution() {
        let frame = {
            let mut buffer = Cursor::new(Vec::new());
            noisy_image(1920, 1080)
                .write_to(&mut buffer, image::ImageFormat::Jpeg)
                .unwrap();
            buffer.into_inner()
        };

        let payload = render_capture(&frame, 1280, 720, 85).unwrap();
        assert!(payload.width <= 1280 && payload.height <= 720);
        assert_eq!(payload.mime_type, "image/jpeg");
    }
}

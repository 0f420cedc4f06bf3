//! Transform engine operations.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use tracing::warn;

use super::{TransformError, TransformKind};

/// Decode raw bytes into an image, guessing the container format.
///
/// The detected format is returned alongside the pixels so that derived
/// images can be encoded back into the same format as the input.
pub fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), TransformError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(e.to_string()))?;

    let format = reader.format().ok_or(TransformError::UnknownFormat)?;
    let image = reader
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))?;

    Ok((image, format))
}

/// Apply a transformation to an image.
///
/// Returns `None` for [`TransformKind::Original`], which is a pass-through
/// marker and never produces a derived image. Callers skip derivative
/// creation in that case; the original artifact is persisted regardless.
pub fn apply(kind: TransformKind, image: &DynamicImage) -> Option<DynamicImage> {
    match kind {
        TransformKind::Original => {
            warn!("transform engine invoked with pass-through kind, skipping");
            None
        }
        // 90 degree rotation, canvas expands to fit (dimensions swap).
        TransformKind::Rotated => Some(image.rotate90()),
        // Single-channel luminance, dimensions unchanged.
        TransformKind::Gray => Some(image.grayscale()),
        // Both dimensions doubled, aspect ratio preserved.
        TransformKind::Scaled => Some(image.resize_exact(
            image.width() * 2,
            image.height() * 2,
            FilterType::Lanczos3,
        )),
    }
}

/// Encode an image into the given container format.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Canonical file extension for a format ("jpg", "png", ...).
pub fn format_extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_rotated_swaps_dimensions() {
        let image = test_image(40, 30);
        let rotated = apply(TransformKind::Rotated, &image).unwrap();
        assert_eq!(rotated.width(), 30);
        assert_eq!(rotated.height(), 40);
    }

    #[test]
    fn test_rotated_square_keeps_dimensions() {
        let image = test_image(32, 32);
        let rotated = apply(TransformKind::Rotated, &image).unwrap();
        assert_eq!(rotated.width(), 32);
        assert_eq!(rotated.height(), 32);
    }

    #[test]
    fn test_gray_keeps_dimensions_single_channel() {
        let image = test_image(40, 30);
        let gray = apply(TransformKind::Gray, &image).unwrap();
        assert_eq!(gray.width(), 40);
        assert_eq!(gray.height(), 30);
        assert_eq!(gray.color().channel_count(), 1);
    }

    #[test]
    fn test_scaled_doubles_both_dimensions() {
        let image = test_image(40, 30);
        let scaled = apply(TransformKind::Scaled, &image).unwrap();
        assert_eq!(scaled.width(), 80);
        assert_eq!(scaled.height(), 60);
    }

    #[test]
    fn test_original_yields_nothing() {
        let image = test_image(10, 10);
        assert!(apply(TransformKind::Original, &image).is_none());
    }

    #[test]
    fn test_decode_keeps_input_format() {
        let image = test_image(16, 16);

        let png = encode(&image, ImageFormat::Png).unwrap();
        let (_, format) = decode(&png).unwrap();
        assert_eq!(format, ImageFormat::Png);

        let jpeg = encode(&image, ImageFormat::Jpeg).unwrap();
        let (_, format) = decode(&jpeg).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode(b"definitely not an image");
        assert!(result.is_err());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(format_extension(ImageFormat::Jpeg), "jpg");
        assert_eq!(format_extension(ImageFormat::Png), "png");
    }
}

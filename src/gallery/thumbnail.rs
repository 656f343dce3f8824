use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::ForgeError;

pub const THUMBNAIL_MAX_SIDE: u32 = 200;
pub const THUMBNAIL_JPEG_QUALITY: u8 = 70;

/// Scales `(width, height)` so the longest side fits `max_side`, keeping the
/// aspect ratio. Images that already fit are left alone.
pub fn thumbnail_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width.max(1), height.max(1));
    }
    let scale = |side: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max_side) + u64::from(longest) / 2)
            / u64::from(longest);
        (scaled as u32).clamp(1, max_side)
    };
    (scale(width), scale(height))
}

/// Renders a JPEG preview of `bytes` as a `data:` URI.
pub fn create_thumbnail(bytes: &[u8]) -> Result<String, ForgeError> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| ForgeError::Payload(format!("Generated image could not be decoded: {err}")))?;
    let (width, height) = thumbnail_dimensions(image.width(), image.height(), THUMBNAIL_MAX_SIDE);
    let preview = image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, THUMBNAIL_JPEG_QUALITY)
        .encode_image(&preview)
        .map_err(|err| ForgeError::Payload(format!("Thumbnail encoding failed: {err}")))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(encoded)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([120, 40, 160])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn dimensions_keep_aspect_ratio() {
        assert_eq!(thumbnail_dimensions(1024, 1365, 200), (150, 200));
        assert_eq!(thumbnail_dimensions(800, 200, 200), (200, 50));
        assert_eq!(thumbnail_dimensions(120, 80, 200), (120, 80));
        assert_eq!(thumbnail_dimensions(5000, 1, 200), (200, 1));
    }

    #[test]
    fn thumbnail_is_a_bounded_jpeg_data_uri() {
        let uri = create_thumbnail(&png_bytes(600, 800)).expect("thumbnail");
        let encoded = uri
            .strip_prefix("data:image/jpeg;base64,")
            .expect("jpeg data uri");
        let bytes = general_purpose::STANDARD.decode(encoded).expect("base64");
        let preview = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).expect("jpeg");
        assert_eq!((preview.width(), preview.height()), (150, 200));
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        assert!(matches!(
            create_thumbnail(b"definitely not an image"),
            Err(ForgeError::Payload(_))
        ));
    }
}

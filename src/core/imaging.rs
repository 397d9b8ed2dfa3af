//! Re-encoding of raster images into `data:` URLs.
//!
//! Images come either from an 8-bit pixel array (`PixelArray`) or from a file
//! on disk. Both are held as an `image::DynamicImage` and written into an
//! in-memory buffer in the requested format before base64 encoding.

use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, ImageReader, LumaA};
use std::io::Cursor;
use std::path::Path;

const DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),
}

/// Decoded pixel data laid out as `height × width × channels` 8-bit samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelArray {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl PixelArray {
    pub fn new(height: u32, width: u32, channels: u8, data: Vec<u8>) -> Result<Self, ImageError> {
        if !(1..=4).contains(&channels) {
            return Err(ImageError::InvalidBuffer(format!(
                "unsupported channel count {channels} (expected 1-4)"
            )));
        }
        let expected = height as usize * width as usize * channels as usize;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer(format!(
                "shape {height}x{width}x{channels} needs {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// 16-bit and float images are narrowed to 8 bits per sample.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, data) = match image.color() {
            ColorType::L8 | ColorType::L16 => (1, image.to_luma8().into_raw()),
            ColorType::La8 | ColorType::La16 => (2, image.to_luma_alpha8().into_raw()),
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => {
                (3, image.to_rgb8().into_raw())
            }
            _ => (4, image.to_rgba8().into_raw()),
        };
        Self {
            height,
            width,
            channels,
            data,
        }
    }

    pub fn to_image(&self) -> Result<DynamicImage, ImageError> {
        let (w, h) = (self.width, self.height);
        let data = self.data.clone();
        let image = match self.channels {
            1 => image::GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::<LumaA<u8>, Vec<u8>>::from_raw(w, h, data)
                .map(DynamicImage::ImageLumaA8),
            3 => image::RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            4 => image::RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            n => {
                return Err(ImageError::InvalidBuffer(format!(
                    "unsupported channel count {n}"
                )));
            }
        };
        image.ok_or_else(|| {
            ImageError::InvalidBuffer(format!(
                "buffer of {} samples does not fit {}x{}x{}",
                self.data.len(),
                h,
                w,
                self.channels
            ))
        })
    }
}

/// Encodes `image` as `data:image/{format};base64,...`.
///
/// `format` is a file-extension style name (`png`, `jpeg`, `jpg`, `bmp`, ...)
/// and is echoed verbatim in the URL. `quality` only affects JPEG.
pub fn encode_to_data_url(
    image: &DynamicImage,
    quality: u8,
    format: &str,
) -> Result<String, ImageError> {
    let target = ImageFormat::from_extension(format)
        .ok_or_else(|| ImageError::UnsupportedFormat(format.to_string()))?;
    let bytes = encode_bytes(image, quality, target)?;
    let payload = general_purpose::STANDARD.encode(&bytes);
    Ok(format!("{DATA_URL_PREFIX}{format}{BASE64_MARKER}{payload}"))
}

pub fn array_to_data_url(
    array: &PixelArray,
    quality: u8,
    format: &str,
) -> Result<String, ImageError> {
    encode_to_data_url(&array.to_image()?, quality, format)
}

/// Decodes the file at `path` and re-encodes it. Without an explicit `format`
/// the lowercased file extension is used.
pub fn file_to_data_url(
    path: &Path,
    quality: u8,
    format: Option<&str>,
) -> Result<String, ImageError> {
    let format = match format {
        Some(f) => f.to_string(),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                ImageError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?,
    };
    let image = load_image(path)?;
    log::debug!(
        "encoding {} ({}x{}) as {}",
        path.display(),
        image.width(),
        image.height(),
        format
    );
    encode_to_data_url(&image, quality, &format)
}

pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::open(path)
        .map_err(|e| ImageError::Decode(format!("cannot open {}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(format!("cannot read {}: {e}", path.display())))?;
    reader
        .decode()
        .map_err(|e| ImageError::Decode(format!("{}: {e}", path.display())))
}

/// Inverse of `encode_to_data_url`.
pub fn decode_data_url(url: &str) -> Result<DynamicImage, ImageError> {
    if !url.starts_with(DATA_URL_PREFIX) {
        return Err(ImageError::InvalidDataUrl("missing data:image/ prefix".to_string()));
    }
    let start = url
        .find(BASE64_MARKER)
        .ok_or_else(|| ImageError::InvalidDataUrl("missing ;base64, marker".to_string()))?;
    let bytes = general_purpose::STANDARD
        .decode(&url[start + BASE64_MARKER.len()..])
        .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

fn encode_bytes(
    image: &DynamicImage,
    quality: u8,
    format: ImageFormat,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            let result = if image.color().has_color() {
                encoder.encode_image(&image.to_rgb8())
            } else {
                encoder.encode_image(&image.to_luma8())
            };
            result.map_err(|e| ImageError::Encode(e.to_string()))?;
        }
        other => image
            .write_to(&mut buf, other)
            .map_err(|e| ImageError::Encode(e.to_string()))?,
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_array() -> PixelArray {
        PixelArray::new(
            2,
            2,
            3,
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120],
        )
        .unwrap()
    }

    #[test]
    fn png_round_trip_is_exact() {
        let array = sample_array();
        let url = array_to_data_url(&array, 50, "png").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let restored = PixelArray::from_image(&decode_data_url(&url).unwrap());
        assert_eq!(restored, array);
    }

    #[test]
    fn png_round_trip_keeps_alpha_and_gray() {
        let gray = PixelArray::new(1, 3, 1, vec![0, 128, 255]).unwrap();
        let url = array_to_data_url(&gray, 0, "png").unwrap();
        assert_eq!(PixelArray::from_image(&decode_data_url(&url).unwrap()), gray);

        let rgba = PixelArray::new(1, 2, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let url = array_to_data_url(&rgba, 0, "png").unwrap();
        assert_eq!(PixelArray::from_image(&decode_data_url(&url).unwrap()), rgba);
    }

    #[test]
    fn jpeg_preserves_shape() {
        let array = PixelArray::new(8, 16, 4, vec![200; 8 * 16 * 4]).unwrap();
        let url = array_to_data_url(&array, 30, "jpeg").unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let restored = decode_data_url(&url).unwrap();
        assert_eq!((restored.height(), restored.width()), (8, 16));
    }

    #[test]
    fn jpeg_quality_changes_payload() {
        let data: Vec<u8> = (0..32 * 32 * 3).map(|i| (i * 7 % 251) as u8).collect();
        let array = PixelArray::new(32, 32, 3, data).unwrap();
        let low = array_to_data_url(&array, 5, "jpeg").unwrap();
        let high = array_to_data_url(&array, 95, "jpeg").unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn format_name_is_echoed_verbatim() {
        let url = array_to_data_url(&sample_array(), 70, "jpg").unwrap();
        assert!(url.starts_with("data:image/jpg;base64,"));
        assert!(!url.contains('\n'));
    }

    #[test]
    fn rejects_bad_shapes_and_formats() {
        assert!(matches!(
            PixelArray::new(2, 2, 3, vec![0; 11]),
            Err(ImageError::InvalidBuffer(_))
        ));
        assert!(matches!(
            PixelArray::new(1, 1, 5, vec![0; 5]),
            Err(ImageError::InvalidBuffer(_))
        ));
        assert!(matches!(
            array_to_data_url(&sample_array(), 50, "nope"),
            Err(ImageError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = file_to_data_url(Path::new("/definitely/not/here.png"), 50, None).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn malformed_data_urls() {
        assert!(decode_data_url("http://x").is_err());
        assert!(decode_data_url("data:image/png,abc").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
    }
}

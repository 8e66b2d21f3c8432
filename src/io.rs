use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, ImageError, ImageOutputFormat, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::canvas::{Color, PixelBuffer};

/// Default JPEG quality for exports.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// ICO entries are limited to 256×256.
const ICO_MAX_SIDE: u32 = 256;

// ============================================================================
// ERRORS
// ============================================================================

/// Error type for image and palette file operations
#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Image(ImageError),
    Json(serde_json::Error),
    Dimensions(String),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::Io(e) => write!(f, "I/O error: {}", e),
            IoError::Image(e) => write!(f, "Image error: {}", e),
            IoError::Json(e) => write!(f, "Palette format error: {}", e),
            IoError::Dimensions(e) => write!(f, "Invalid dimensions: {}", e),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Io(e) => Some(e),
            IoError::Image(e) => Some(e),
            IoError::Json(e) => Some(e),
            IoError::Dimensions(_) => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Io(e)
    }
}

impl From<ImageError> for IoError {
    fn from(e: ImageError) -> Self {
        IoError::Image(e)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json(e)
    }
}

// ============================================================================
// FORMATS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tga,
    Ico,
    Tiff,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Webp => "webp",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Ico => "ico",
            SaveFormat::Tiff => "tiff",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "webp" => Some(SaveFormat::Webp),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            "ico" => Some(SaveFormat::Ico),
            "tif" | "tiff" => Some(SaveFormat::Tiff),
            _ => None,
        }
    }

    /// Format implied by the path's extension; PNG when missing or unknown.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }
}

// ============================================================================
// IMAGE CONVERSION
// ============================================================================

pub fn buffer_to_rgba_image(buffer: &PixelBuffer) -> RgbaImage {
    buffer.to_rgba_image()
}

/// Wrap a decoded image; zero-area images are rejected.
pub fn rgba_image_to_buffer(img: &RgbaImage) -> Result<PixelBuffer, IoError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(IoError::Dimensions(format!(
            "{}×{} image has no pixels",
            img.width(),
            img.height()
        )));
    }
    Ok(PixelBuffer::from_rgba_image(img))
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Decode any raster format the `image` crate understands into straight RGBA8.
pub fn load_image(path: &Path) -> Result<PixelBuffer, IoError> {
    let img = image::open(path)
        .map_err(|e| {
            crate::log_err!("Load failed for {}: {}", path.display(), e);
            e
        })?
        .to_rgba8();
    let buffer = rgba_image_to_buffer(&img)?;
    crate::log_info!(
        "Loaded {} ({}×{})",
        path.display(),
        buffer.width(),
        buffer.height()
    );
    Ok(buffer)
}

/// Encode `buffer` with the format implied by the extension (PNG by default).
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<(), IoError> {
    save_image_as(buffer, path, SaveFormat::from_path(path), DEFAULT_JPEG_QUALITY)
}

pub fn save_image_as(
    buffer: &PixelBuffer,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), IoError> {
    let image = buffer_to_rgba_image(buffer);
    encode_and_write(&image, path, format, quality).map_err(|e| {
        crate::log_err!("Save failed for {}: {}", path.display(), e);
        e
    })?;
    crate::log_info!(
        "Saved {} ({}×{}, {:?})",
        path.display(),
        buffer.width(),
        buffer.height(),
        format
    );
    Ok(())
}

/// Encode and write an image to a file.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    if format == SaveFormat::Webp {
        // The WebP codec picks its own encoder through the path-based API.
        return DynamicImage::ImageRgba8(image.clone()).save_with_format(path, image::ImageFormat::WebP);
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100)).write_image(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut writer, ImageOutputFormat::Bmp)?;
        }
        SaveFormat::Tga => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut writer, ImageOutputFormat::Tga)?;
        }
        SaveFormat::Tiff => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut writer, ImageOutputFormat::Tiff)?;
        }
        SaveFormat::Ico => {
            // Nearest-neighbour keeps hard pixel edges when shrinking to the ICO limit.
            let dyn_img = if image.width() > ICO_MAX_SIDE || image.height() > ICO_MAX_SIDE {
                let scale = ICO_MAX_SIDE as f32 / image.width().max(image.height()) as f32;
                let new_w = ((image.width() as f32 * scale) as u32).max(1);
                let new_h = ((image.height() as f32 * scale) as u32).max(1);
                DynamicImage::ImageRgba8(image::imageops::resize(
                    image,
                    new_w,
                    new_h,
                    image::imageops::FilterType::Nearest,
                ))
            } else {
                DynamicImage::ImageRgba8(image.clone())
            };
            dyn_img.write_to(&mut writer, ImageOutputFormat::Ico)?;
        }
        SaveFormat::Webp => {}
    }

    writer.flush()?;
    Ok(())
}

// ============================================================================
// PALETTE FILES - JSON array of {"r","g","b","a"} objects
// ============================================================================

pub fn save_palette(colors: &[Color], path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, colors)?;
    writer.flush()?;
    crate::log_info!("Saved palette {} ({} colours)", path.display(), colors.len());
    Ok(())
}

pub fn load_palette(path: &Path) -> Result<Vec<Color>, IoError> {
    let file = File::open(path)?;
    let colors: Vec<Color> = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        crate::log_warn!("Palette {} is not valid: {}", path.display(), e);
        e
    })?;
    crate::log_info!("Loaded palette {} ({} colours)", path.display(), colors.len());
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PaintMode;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pexler_io_{}_{}", uuid::Uuid::new_v4(), name))
    }

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::new(3, 2);
        buf.set_pixel(0, 0, Color::rgba(255, 0, 0, 255), PaintMode::Overwrite);
        buf.set_pixel(2, 1, Color::rgba(10, 20, 30, 128), PaintMode::Overwrite);
        buf
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SaveFormat::from_path(Path::new("a.PNG")), SaveFormat::Png);
        assert_eq!(SaveFormat::from_path(Path::new("a.jpeg")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("a.tif")), SaveFormat::Tiff);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), SaveFormat::Png);
        assert_eq!(SaveFormat::from_path(Path::new("a.xyz")), SaveFormat::Png);
    }

    #[test]
    fn test_png_preserves_pixels() {
        let path = temp_path("sample.png");
        let buf = sample();
        save_image(&buf, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.pixels(), buf.pixels());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = load_image(&temp_path("missing.png")).unwrap_err();
        assert!(matches!(err, IoError::Image(_) | IoError::Io(_)));
    }

    #[test]
    fn test_zero_area_image_rejected() {
        let img = RgbaImage::new(0, 4);
        assert!(matches!(rgba_image_to_buffer(&img), Err(IoError::Dimensions(_))));
    }

    #[test]
    fn test_palette_file_round_trip() {
        let path = temp_path("palette.json");
        let colors = vec![Color::rgb(1, 2, 3), Color::rgba(250, 0, 9, 0)];
        save_palette(&colors, &path).unwrap();
        assert_eq!(load_palette(&path).unwrap(), colors);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"r\": 1"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_palette_json() {
        let path = temp_path("bad.json");
        std::fs::write(&path, "[{\"r\": 1, \"g\": 2}]").unwrap();
        assert!(matches!(load_palette(&path), Err(IoError::Json(_))));
        let _ = std::fs::remove_file(&path);
    }
}

//! In-process image optimization.
//!
//! PNG and JPEG are re-encoded and kept only when smaller; SVG goes through
//! usvg. GIF and WebP pass through untouched.

use super::{ImageOptimizer, ToolError};
use crate::utils::fs::extension;
use image::{
    DynamicImage, ImageFormat,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};
use std::{fs, path::Path};

const JPEG_QUALITY: u8 = 80;

pub struct NativeOptimizer;

impl ImageOptimizer for NativeOptimizer {
    fn optimize(&self, src: &Path) -> Result<Vec<u8>, ToolError> {
        let original = fs::read(src)?;

        let candidate = match extension(src).as_str() {
            "png" => Some(encode_png(&original)?),
            "jpg" | "jpeg" => Some(encode_jpeg(&original)?),
            "svg" => optimize_svg(&original),
            _ => None,
        };

        Ok(match candidate {
            Some(smaller) if smaller.len() < original.len() => smaller,
            _ => original,
        })
    }

    fn to_webp(&self, src: &Path) -> Result<Vec<u8>, ToolError> {
        let img = image::open(src)?;
        // The WebP encoder only takes 8-bit RGB(A).
        let img = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let mut out = Vec::new();
        img.write_with_encoder(WebPEncoder::new_lossless(&mut out))?;
        Ok(out)
    }
}

fn encode_png(data: &[u8]) -> Result<Vec<u8>, ToolError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)?;
    let mut out = Vec::new();
    img.write_with_encoder(PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Best,
        FilterType::Adaptive,
    ))?;
    Ok(out)
}

fn encode_jpeg(data: &[u8]) -> Result<Vec<u8>, ToolError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    let img = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out)
}

/// Simplify an SVG with usvg.
///
/// Documents containing text are left alone: usvg would need system fonts to
/// convert them and otherwise drops the glyphs. Unparseable documents are
/// left alone as well.
fn optimize_svg(data: &[u8]) -> Option<Vec<u8>> {
    if String::from_utf8_lossy(data).contains("<text") {
        return None;
    }

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(data, &options).ok()?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Some(tree.to_string(&write_options).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path) {
        let img = RgbaImage::from_fn(32, 32, |x, _| Rgba([(x * 8) as u8, 0, 0, 255]));
        // Fast, unfiltered encoding leaves room for the optimizer.
        PngEncoder::new_with_quality(
            fs::File::create(path).unwrap(),
            CompressionType::Fast,
            FilterType::NoFilter,
        )
        .write_image(img.as_raw(), 32, 32, image::ExtendedColorType::Rgba8)
        .unwrap();
    }

    #[test]
    fn test_png_never_grows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logo.png");
        write_png(&path);

        let original = fs::read(&path).unwrap();
        let optimized = NativeOptimizer.optimize(&path).unwrap();
        assert!(optimized.len() <= original.len());
        assert!(image::load_from_memory(&optimized).is_ok());
    }

    #[test]
    fn test_jpeg_never_grows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let img = RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 90]));
        JpegEncoder::new_with_quality(fs::File::create(&path).unwrap(), 100)
            .write_image(img.as_raw(), 40, 30, image::ExtendedColorType::Rgb8)
            .unwrap();

        let original = fs::read(&path).unwrap();
        let optimized = NativeOptimizer.optimize(&path).unwrap();
        assert!(optimized.len() <= original.len());
    }

    #[test]
    fn test_gif_passes_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        fs::write(&path, b"GIF89a-not-really").unwrap();

        assert_eq!(NativeOptimizer.optimize(&path).unwrap(), b"GIF89a-not-really");
    }

    #[test]
    fn test_svg_with_text_is_untouched() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><text x="0" y="5">Hi</text></svg>"#;
        assert!(optimize_svg(svg).is_none());
    }

    #[test]
    fn test_svg_is_simplified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("icon.svg");
        let svg = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported by an editor -->
<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10">
    <g>
        <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
    </g>
</svg>
"##;
        fs::write(&path, svg).unwrap();

        let optimized = NativeOptimizer.optimize(&path).unwrap();
        assert!(optimized.len() <= svg.len());
        assert!(String::from_utf8_lossy(&optimized).contains("<svg"));
    }

    #[test]
    fn test_invalid_svg_passes_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.svg");
        fs::write(&path, "<svg").unwrap();

        assert_eq!(NativeOptimizer.optimize(&path).unwrap(), b"<svg");
    }

    #[test]
    fn test_to_webp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hero.png");
        write_png(&path);

        let webp = NativeOptimizer.to_webp(&path).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_corrupt_png_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            NativeOptimizer.optimize(&path),
            Err(ToolError::Image(_))
        ));
    }
}

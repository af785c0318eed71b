//! Decoding, orientation, color flattening and variant rendering.
//!
//! Everything here is synchronous and CPU-bound; callers run it on the
//! blocking pool.

use std::io::Cursor;

use image::{
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
    DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage,
};

use crate::errors::ImageError;

pub const OUTPUT_EXTENSION: &str = "jpg";
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Original,
    Large,
    Medium,
    Thumbnail,
}

impl VariantKind {
    /// File name of this variant for a given storage stem.
    /// The large variant is the main file and carries no suffix.
    pub fn file_name(self, stem: &str) -> String {
        match self {
            VariantKind::Original => format!("{stem}_original.{OUTPUT_EXTENSION}"),
            VariantKind::Large => format!("{stem}.{OUTPUT_EXTENSION}"),
            VariantKind::Medium => format!("{stem}_medium.{OUTPUT_EXTENSION}"),
            VariantKind::Thumbnail => format!("{stem}_thumb.{OUTPUT_EXTENSION}"),
        }
    }
}

/// Target box and encoding quality of one derived variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

pub const ORIGINAL_QUALITY: u8 = 95;

pub const DEFAULT_VARIANTS: [VariantSpec; 3] = [
    VariantSpec { kind: VariantKind::Large, width: 1200, height: 900, quality: 85 },
    VariantSpec { kind: VariantKind::Medium, width: 800, height: 600, quality: 80 },
    VariantSpec { kind: VariantKind::Thumbnail, width: 300, height: 200, quality: 75 },
];

#[derive(Debug, Clone)]
pub struct EncodedVariant {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Decodes `bytes` and returns an upright RGB raster.
pub fn decode_upright(bytes: &[u8]) -> Result<RgbImage, ImageError> {
    if !infer::is_image(bytes) {
        return Err(ImageError::Decode("content is not a recognised image".into()));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    // Unreadable orientation metadata is treated like no metadata
    let orientation = decoder.orientation().ok();

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    if let Some(orientation) = orientation {
        image.apply_orientation(orientation);
    }

    Ok(flatten(image))
}

/// Composites transparent pixels onto white; opaque images are just converted to RGB.
pub fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Size after the aspect-preserving downscale and the final crop box.
///
/// The image is scaled so it covers the target box (never enlarged), then
/// cropped to at most the box.
pub fn cover_dimensions(src: (u32, u32), target: (u32, u32)) -> ((u32, u32), (u32, u32)) {
    let (sw, sh) = src;
    let (tw, th) = target;

    let scale = (tw as f64 / sw as f64)
        .max(th as f64 / sh as f64)
        .min(1.0);

    let scaled_w = ((sw as f64 * scale).round() as u32).clamp(1, sw);
    let scaled_h = ((sh as f64 * scale).round() as u32).clamp(1, sh);

    ((scaled_w, scaled_h), (scaled_w.min(tw), scaled_h.min(th)))
}

/// Downscale with Lanczos3 and center-crop to the variant's box.
pub fn render_variant(source: &RgbImage, spec: &VariantSpec) -> RgbImage {
    let ((scaled_w, scaled_h), (crop_w, crop_h)) =
        cover_dimensions(source.dimensions(), (spec.width, spec.height));

    let scaled = if (scaled_w, scaled_h) == source.dimensions() {
        source.clone()
    } else {
        imageops::resize(source, scaled_w, scaled_h, FilterType::Lanczos3)
    };

    let x = (scaled_w - crop_w) / 2;
    let y = (scaled_h - crop_h) / 2;

    imageops::crop_imm(&scaled, x, y, crop_w, crop_h).to_image()
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(image)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Full CPU side of an upload: the upright original plus every variant, encoded.
pub fn render_all(bytes: &[u8], variants: &[VariantSpec]) -> Result<Vec<EncodedVariant>, ImageError> {
    let upright = decode_upright(bytes)?;

    let mut encoded = Vec::with_capacity(variants.len() + 1);
    encoded.push(EncodedVariant {
        kind: VariantKind::Original,
        width: upright.width(),
        height: upright.height(),
        bytes: encode_jpeg(&upright, ORIGINAL_QUALITY)?,
    });

    for spec in variants {
        let rendered = render_variant(&upright, spec);
        encoded.push(EncodedVariant {
            kind: spec.kind,
            width: rendered.width(),
            height: rendered.height(),
            bytes: encode_jpeg(&rendered, spec.quality)?,
        });
    }

    Ok(encoded)
}

use std::io::Cursor;

use common::models::OutputFormat;
use image::{DynamicImage, ImageOutputFormat};

fn output_format(format: OutputFormat, jpeg_quality: u8) -> ImageOutputFormat {
    match format {
        OutputFormat::Png => ImageOutputFormat::Png,
        OutputFormat::Jpeg => ImageOutputFormat::Jpeg(jpeg_quality),
    }
}

/// Encodes a page as RGB in the requested format.
pub fn encode_page(image: &DynamicImage, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut bytes: Vec<u8> = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), output_format(format, jpeg_quality))?;
    Ok(bytes)
}

use std::sync::Arc;

use image::{imageops, imageops::FilterType, DynamicImage, RgbaImage};
use tracing::{info, warn};

use crate::settings::WatermarkSettings;

const MIN_WATERMARK_WIDTH: u32 = 32;

/// Marks a rendered page. Must not change the page dimensions.
pub trait IWatermarkService: Send + Sync {
    fn apply(&self, page: DynamicImage) -> DynamicImage;
}

pub struct NoWatermark;

impl IWatermarkService for NoWatermark {
    fn apply(&self, page: DynamicImage) -> DynamicImage {
        page
    }
}

/// Tiles a logo across the page and pastes one larger copy in the center.
pub struct TiledWatermark {
    logo: RgbaImage,
    scale: f32,
    center_scale: f32,
    spacing: (u32, u32),
}

impl TiledWatermark {
    pub fn new(mut logo: RgbaImage, opacity: f32, scale: f32, center_scale: f32, spacing: (u32, u32)) -> Self {
        if opacity < 1.0 {
            for pixel in logo.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * opacity) as u8;
            }
        }
        TiledWatermark {
            logo,
            scale,
            center_scale,
            spacing: (spacing.0.max(1), spacing.1.max(1)),
        }
    }

    fn scaled(&self, min_dim: u32, fraction: f32) -> RgbaImage {
        let target_width = ((min_dim as f32 * fraction) as u32).max(MIN_WATERMARK_WIDTH);
        let factor = target_width as f32 / self.logo.width().max(1) as f32;
        let target_height = ((self.logo.height() as f32 * factor) as u32).max(1);
        imageops::resize(&self.logo, target_width, target_height, FilterType::Lanczos3)
    }
}

impl IWatermarkService for TiledWatermark {
    fn apply(&self, page: DynamicImage) -> DynamicImage {
        let mut base = page.to_rgba8();
        let min_dim = base.width().min(base.height());

        let tile = self.scaled(min_dim, self.scale);
        for y in (0..base.height()).step_by(self.spacing.1 as usize) {
            for x in (0..base.width()).step_by(self.spacing.0 as usize) {
                imageops::overlay(&mut base, &tile, x as i64, y as i64);
            }
        }

        let center = self.scaled(min_dim, self.center_scale);
        let center_x = (base.width() as i64 - center.width() as i64) / 2;
        let center_y = (base.height() as i64 - center.height() as i64) / 2;
        imageops::overlay(&mut base, &center, center_x, center_y);

        DynamicImage::ImageRgba8(base)
    }
}

pub fn build_watermark(settings: &WatermarkSettings) -> Arc<dyn IWatermarkService> {
    let Some(path) = &settings.path else {
        info!("No watermark configured, pages are passed through");
        return Arc::new(NoWatermark);
    };
    match image::open(path) {
        Ok(logo) => {
            info!("Using watermark {} ({}x{})", path.display(), logo.width(), logo.height());
            Arc::new(TiledWatermark::new(logo.to_rgba8(), settings.opacity, settings.scale, settings.center_scale, settings.spacing))
        }
        Err(err) => {
            warn!("Could not load watermark {}: {}, pages are passed through", path.display(), err);
            Arc::new(NoWatermark)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white_page(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    fn red_logo() -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn no_watermark_passes_through() {
        let page = white_page(10, 12);
        assert_eq!(NoWatermark.apply(page.clone()), page);
    }

    #[test]
    fn tiled_watermark_keeps_dimensions() {
        let watermark = TiledWatermark::new(red_logo(), 0.5, 0.25, 0.35, (320, 380));
        let marked = watermark.apply(white_page(200, 300));
        assert_eq!((marked.width(), marked.height()), (200, 300));
    }

    #[test]
    fn tiled_watermark_marks_tiles_and_center() {
        let watermark = TiledWatermark::new(red_logo(), 1.0, 0.25, 0.35, (50, 50));
        let marked = watermark.apply(white_page(100, 100)).to_rgba8();
        let reddish = |pixel: &Rgba<u8>| pixel[0] > 200 && pixel[1] < 60 && pixel[2] < 60;
        assert!(reddish(marked.get_pixel(1, 1)));
        assert!(reddish(marked.get_pixel(51, 51)));
        assert_eq!(marked.get_pixel(40, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn transparent_watermark_leaves_page_untouched() {
        let watermark = TiledWatermark::new(red_logo(), 0.0, 0.25, 0.35, (50, 50));
        let marked = watermark.apply(white_page(100, 100)).to_rgba8();
        assert!(marked.pixels().all(|pixel| pixel == &Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn missing_logo_falls_back_to_pass_through() {
        let settings = WatermarkSettings {
            path: Some("/definitely/not/here.png".into()),
            opacity: 0.5,
            scale: 0.25,
            center_scale: 0.35,
            spacing: (320, 380),
        };
        let page = white_page(8, 8);
        assert_eq!(build_watermark(&settings).apply(page.clone()), page);
    }
}

pub mod config;
pub mod error;
pub mod fields;
pub mod metadata;
pub mod overlay;
pub mod render;
pub mod session;
pub mod viewport;
pub mod worker;

use anyhow::Result;
use mupdf::{Colorspace, Matrix};

/// Render a page of a PDF document to an RGB pixmap at a uniform `scale`.
/// Returns (rgb_bytes, pixel_width, pixel_height, page_pts_width, page_pts_height).
pub fn render_page_pixmap(
    doc: &mupdf::Document,
    page_number: i32,
    scale: f32,
) -> Result<(Vec<u8>, u32, u32, f64, f64)> {
    let page = doc.load_page(page_number)?;
    let bounds = page.bounds()?;
    let width_pts = (bounds.x1 - bounds.x0) as f64;
    let height_pts = (bounds.y1 - bounds.y0) as f64;

    let pixmap = page.to_pixmap(
        &Matrix::new_scale(scale, scale),
        &Colorspace::device_rgb(),
        false,
        true,
    )?;

    let pixel_width = pixmap.width();
    let pixel_height = pixmap.height();
    let samples = pixmap.samples().to_vec();

    if std::env::var("PROOFVIEW_DUMP_PIXMAP").is_ok() {
        let path = format!("/tmp/page{}.ppm", page_number);
        let mut ppm = format!("P6\n{} {}\n255\n", pixel_width, pixel_height).into_bytes();
        ppm.extend_from_slice(&samples);
        std::fs::write(&path, &ppm).ok();
        log::info!("Dumped pixmap ({} bytes) to {}", samples.len(), path);
    }

    Ok((samples, pixel_width, pixel_height, width_pts, height_pts))
}

use skia_safe::{images, surfaces, AlphaType, Color, ColorType, Data, ImageInfo, Surface};

use crate::error::LoadError;
use crate::metadata::http_agent;
use crate::viewport::ViewportTransform;

/// Fixed zoom factor for the single displayed page. Applied uniformly to
/// both axes, so overlays scale isotropically with the page.
pub const PAGE_SCALE: f32 = 1.5;

/// Fetch the raw document bytes named by a storage path. `http(s)` URLs go
/// through the shared agent; anything else is read from the filesystem.
/// Failures count as document-load failures of the render step.
pub fn load_document_bytes(storage_path: &str, timeout_secs: u64) -> Result<Vec<u8>, LoadError> {
    if storage_path.starts_with("http://") || storage_path.starts_with("https://") {
        let response = http_agent()
            .get(storage_path)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .call()
            .map_err(|e| LoadError::Render(e.to_string()))?;

        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut response.into_reader(), &mut bytes)
            .map_err(|e| LoadError::Render(e.to_string()))?;
        Ok(bytes)
    } else {
        std::fs::read(storage_path)
            .map_err(|e| LoadError::Render(format!("{}: {}", storage_path, e)))
    }
}

/// Decode the document and paint its first page into a fresh raster surface
/// at `PAGE_SCALE`. The surface is cleared before painting; its dimensions
/// define the returned transform, so overlay drawing and hit-testing share
/// the raster's pixel grid.
pub fn render_page(pdf_bytes: &[u8]) -> Result<(Surface, ViewportTransform), LoadError> {
    let doc = mupdf::Document::from_bytes(pdf_bytes, "application/pdf")
        .map_err(|e| LoadError::Render(e.to_string()))?;

    // First page only; MuPDF pages are 0-indexed.
    let (rgb, px_w, px_h, _, _) = crate::render_page_pixmap(&doc, 0, PAGE_SCALE)
        .map_err(|e| LoadError::Render(e.to_string()))?;

    let mut surface = surfaces::raster_n32_premul((px_w as i32, px_h as i32))
        .ok_or_else(|| LoadError::Render("could not create raster surface".to_string()))?;

    let canvas = surface.canvas();
    canvas.clear(Color::WHITE);

    // MuPDF hands back packed RGB; Skia rasters want four channels.
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(0xFF);
    }

    let info = ImageInfo::new(
        (px_w as i32, px_h as i32),
        ColorType::RGBA8888,
        AlphaType::Opaque,
        None,
    );
    let image = images::raster_from_data(&info, Data::new_copy(&rgba), px_w as usize * 4)
        .ok_or_else(|| LoadError::Render("could not wrap page pixmap".to_string()))?;
    canvas.draw_image(&image, (0.0, 0.0), None);

    let transform = ViewportTransform::new(PAGE_SCALE, px_w as f32, px_h as f32);
    Ok((surface, transform))
}

/// Assemble a valid single-page PDF with the given MediaBox, with a correct
/// cross-reference table. Enough for MuPDF to decode and rasterize a blank
/// page.
#[cfg(test)]
pub(crate) fn minimal_pdf(width: f32, height: f32) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] >>"),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_pos = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_pos
    ));

    out.into_bytes()
}

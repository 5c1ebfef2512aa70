use skia_safe::{Canvas, Color, Paint, PaintStyle, Rect};

use crate::metadata::BoundingBox;
use crate::viewport::ViewportTransform;

/// Outline width in raster pixels.
pub const BOX_STROKE_WIDTH: f32 = 2.0;

/// Stroke every box outline onto the canvas through `transform`. Redrawing
/// with the same inputs paints the same pixels; the canvas is not cleared
/// here (the renderer clears before the page is painted).
pub fn draw_overlays(canvas: &Canvas, boxes: &[BoundingBox], transform: &ViewportTransform) {
    let mut paint = Paint::default();
    paint.set_color(Color::RED);
    paint.set_style(PaintStyle::Stroke);
    paint.set_stroke_width(BOX_STROKE_WIDTH);

    for bounding_box in boxes {
        let screen = transform.to_screen(bounding_box.rect);
        canvas.draw_rect(Rect::from_xywh(screen.x, screen.y, screen.w, screen.h), &paint);
    }
}

/// Resolve a screen-space click to the owning box. Boxes are scanned in
/// server response order and the first containing rectangle wins, so
/// overlapping boxes resolve by that order rather than area or z-order.
pub fn hit_test<'a>(
    boxes: &'a [BoundingBox],
    transform: &ViewportTransform,
    x: f32,
    y: f32,
) -> Option<&'a str> {
    boxes
        .iter()
        .find(|b| transform.contains_point(b.rect, x, y))
        .map(|b| b.element_id.as_str())
}

/// Rectangle in document space (page points, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PageRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Rectangle in screen space, matching the raster surface's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ScreenRect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Mapping from document space to screen space for one rendered page.
/// `width`/`height` are the raster surface dimensions produced by the same
/// render. Callers must ensure `scale > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportTransform {
    pub fn new(scale: f32, width: f32, height: f32) -> Self {
        Self {
            scale,
            width,
            height,
        }
    }

    /// Map a document-space rectangle to screen space. Both axes scale
    /// uniformly, so boxes stay isotropic with the page.
    pub fn to_screen(&self, rect: PageRect) -> ScreenRect {
        ScreenRect {
            x: rect.x * self.scale,
            y: rect.y * self.scale,
            w: rect.w * self.scale,
            h: rect.h * self.scale,
        }
    }

    /// True if the screen-space point lies inside `rect` after mapping,
    /// inclusive of all four edges.
    pub fn contains_point(&self, rect: PageRect, px: f32, py: f32) -> bool {
        let screen = self.to_screen(rect);
        px >= screen.x && px <= screen.x + screen.w && py >= screen.y && py <= screen.y + screen.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_screen_scales_all_components() {
        let transform = ViewportTransform::new(1.5, 900.0, 1200.0);
        let screen = transform.to_screen(PageRect::new(50.0, 100.0, 150.0, 30.0));
        assert_eq!(screen.x, 75.0);
        assert_eq!(screen.y, 150.0);
        assert_eq!(screen.w, 225.0);
        assert_eq!(screen.h, 45.0);
    }

    #[test]
    fn center_of_mapped_rect_hits_its_own_rect() {
        let rects = [
            PageRect::new(0.0, 0.0, 10.0, 10.0),
            PageRect::new(50.0, 100.0, 150.0, 30.0),
            PageRect::new(3.5, 7.25, 0.5, 0.5),
        ];
        for scale in [0.5, 1.0, 1.5, 4.0] {
            let transform = ViewportTransform::new(scale, 0.0, 0.0);
            for rect in rects {
                let (cx, cy) = transform.to_screen(rect).center();
                assert!(
                    transform.contains_point(rect, cx, cy),
                    "center miss at scale {scale} for {rect:?}"
                );
            }
        }
    }

    #[test]
    fn containment_is_inclusive_of_edges() {
        let transform = ViewportTransform::new(2.0, 0.0, 0.0);
        let rect = PageRect::new(10.0, 10.0, 20.0, 20.0);
        // Screen rect is (20, 20)..(60, 60).
        assert!(transform.contains_point(rect, 20.0, 20.0));
        assert!(transform.contains_point(rect, 60.0, 60.0));
        assert!(transform.contains_point(rect, 20.0, 60.0));
        assert!(!transform.contains_point(rect, 19.9, 20.0));
        assert!(!transform.contains_point(rect, 60.1, 60.0));
    }
}

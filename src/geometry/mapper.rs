//! Image-space to view-space mapping
//!
//! OCR geometry is reported in pixels of the captured page image, while the
//! lasso is drawn in on-screen view coordinates. The captured image need not
//! share the view's aspect ratio, so X and Y are scaled independently.

use serde::{Deserialize, Serialize};

use super::types::{Point, Rect, Size};

/// Current on-screen render box and the pixel size of the latest capture
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewLayout {
    pub view: Size,
    pub image: Size,
}

impl ViewLayout {
    pub fn new(view: Size, image: Size) -> Self {
        Self { view, image }
    }

    /// A mapper for this layout, or `None` while either size is unknown
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        CoordinateMapper::new(*self)
    }
}

/// Maps image-pixel rectangles and points into view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    /// Build a mapper; refuses layouts with a zero or negative dimension.
    pub fn new(layout: ViewLayout) -> Option<Self> {
        if !layout.view.is_measured() || !layout.image.is_measured() {
            return None;
        }

        Some(Self {
            scale_x: layout.view.width / layout.image.width,
            scale_y: layout.view.height / layout.image.height,
        })
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn map_rect(&self, rect: &Rect) -> Rect {
        Rect {
            x: rect.x * self.scale_x,
            y: rect.y * self.scale_y,
            width: rect.width * self.scale_x,
            height: rect.height * self.scale_y,
        }
    }

    pub fn map_point(&self, point: Point) -> Point {
        Point::new(point.x * self.scale_x, point.y * self.scale_y)
    }
}

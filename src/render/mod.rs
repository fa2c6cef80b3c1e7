mod frame;
mod null_renderer;
mod primitives;

pub use frame::{DrawCommand, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, ClipRect, Color, LinePrimitive, PathPrimitive, Point, RectPrimitive,
    ShapePrimitive, TextHAlign, TextPrimitive,
};

use crate::error::ChartResult;
use crate::interaction::CursorStyle;

/// Immediate-mode drawing surface consumed by strategies and decorations.
///
/// Coordinates are canvas pixels with the origin at the top-left corner.
pub trait DrawingSurface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64);

    /// Stroked polyline through `points`.
    fn path(&mut self, points: &[Point], color: Color, width: f64);

    /// Closed polygon filled with `color`.
    fn filled_shape(&mut self, points: &[Point], color: Color);

    fn circle(
        &mut self,
        center: Point,
        radius: f64,
        stroke: Option<Color>,
        fill: Option<Color>,
        border_width: f64,
    );

    fn text(&mut self, text: &str, at: Point, color: Color, font_size_px: f64, align: TextHAlign);

    fn rect(&mut self, rect: RectPrimitive);

    fn save_clip(&mut self, clip: ClipRect);
    fn restore_clip(&mut self);

    /// Copies another recorded surface into this one at `(dx, dy)`.
    fn blit(&mut self, source: &RenderFrame, dx: f64, dy: f64);
}

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully recorded `RenderFrame` so drawing code stays
/// isolated from chart state and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    /// Pointer cursor requested by the range selector.
    fn set_cursor(&mut self, _cursor: CursorStyle) {}
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};

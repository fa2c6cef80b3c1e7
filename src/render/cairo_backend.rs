use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{ChartError, ChartResult};
use crate::render::{Color, DrawCommand, Point, RectPrimitive, RenderFrame, Renderer, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub paths_drawn: usize,
    pub shapes_drawn: usize,
    pub circles_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// Replays recorded frames either onto its own off-screen image surface
/// (`Renderer::render`) or onto a caller-provided context.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        context.set_line_cap(cairo::LineCap::Round);
        context.set_line_join(cairo::LineJoin::Round);

        for command in &frame.commands {
            match command {
                DrawCommand::Line(line) => {
                    apply_color(context, line.color);
                    context.set_line_width(line.stroke_width);
                    context.move_to(line.from.x + 0.5, line.from.y + 0.5);
                    context.line_to(line.to.x + 0.5, line.to.y + 0.5);
                    stroke(context, "failed to stroke line")?;
                    stats.lines_drawn += 1;
                }
                DrawCommand::Path(path) => {
                    apply_color(context, path.color);
                    context.set_line_width(path.stroke_width);
                    append_polyline(context, &path.points, 0.5);
                    stroke(context, "failed to stroke path")?;
                    stats.paths_drawn += 1;
                }
                DrawCommand::Shape(shape) => {
                    apply_color(context, shape.color);
                    append_polyline(context, &shape.points, 0.0);
                    context.close_path();
                    fill(context, "failed to fill shape")?;
                    stats.shapes_drawn += 1;
                }
                DrawCommand::Circle(circle) => {
                    context.new_path();
                    context.arc(circle.center.x, circle.center.y, circle.radius, 0.0, 2.0 * PI);
                    if let Some(fill_color) = circle.fill {
                        apply_color(context, fill_color);
                        context
                            .fill_preserve()
                            .map_err(|err| map_backend_error("failed to fill circle", err))?;
                    }
                    if let Some(stroke_color) = circle.stroke {
                        apply_color(context, stroke_color);
                        context.set_line_width(circle.border_width);
                        stroke(context, "failed to stroke circle")?;
                    } else {
                        context.new_path();
                    }
                    stats.circles_drawn += 1;
                }
                DrawCommand::Rect(rect) => {
                    append_rect_path(context, *rect);
                    apply_color(context, rect.fill_color);
                    fill(context, "failed to fill rectangle")?;
                    stats.rects_drawn += 1;
                }
                DrawCommand::Text(text) => {
                    let layout = pangocairo::functions::create_layout(context);
                    let font_description =
                        FontDescription::from_string(&format!("Sans {}px", text.font_size_px));
                    layout.set_font_description(Some(&font_description));
                    layout.set_text(&text.text);

                    let (text_width, text_height) = layout.pixel_size();
                    let x = match text.h_align {
                        TextHAlign::Left => text.at.x,
                        TextHAlign::Center => text.at.x - f64::from(text_width) / 2.0,
                        TextHAlign::Right => text.at.x - f64::from(text_width),
                    };

                    apply_color(context, text.color);
                    // Canvas text is positioned by its baseline.
                    context.move_to(x, text.at.y - f64::from(text_height));
                    pangocairo::functions::show_layout(context, &layout);
                    stats.texts_drawn += 1;
                }
                DrawCommand::PushClip(clip) => {
                    context
                        .save()
                        .map_err(|err| map_backend_error("failed to save context", err))?;
                    context.rectangle(clip.x, clip.y, clip.width, clip.height);
                    context.clip();
                }
                DrawCommand::PopClip => {
                    context
                        .restore()
                        .map_err(|err| map_backend_error("failed to restore context", err))?;
                }
            }
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_polyline(context: &Context, points: &[Point], offset: f64) {
    context.new_path();
    for (index, point) in points.iter().enumerate() {
        if index == 0 {
            context.move_to(point.x + offset, point.y + offset);
        } else {
            context.line_to(point.x + offset, point.y + offset);
        }
    }
}

fn stroke(context: &Context, message: &str) -> ChartResult<()> {
    context
        .stroke()
        .map_err(|err| map_backend_error(message, err))
}

fn fill(context: &Context, message: &str) -> ChartResult<()> {
    context.fill().map_err(|err| map_backend_error(message, err))
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    context.new_path();
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}

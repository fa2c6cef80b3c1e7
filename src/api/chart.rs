use tracing::debug;

use crate::api::chart_data::ChartData;
use crate::api::display::{DisplaySurface, TooltipContent, TooltipHost};
use crate::api::engine_config::{ChartConfig, ChartKind, Palette, Theme};
use crate::api::label_format::{DefaultLabelFormatter, LabelFormatter};
use crate::api::overview::OverviewSurface;
use crate::api::scheduler::{FrameScheduler, RedrawReason};
use crate::api::strategy::FrameContext;
use crate::core::{Millis, RangeFraction, Series, SeriesSet, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CursorStyle, PointerPosition};
use crate::render::{RenderFrame, Renderer};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Main orchestration facade consumed by host applications.
///
/// `Chart` owns the series, the display and overview surfaces and the
/// frame scheduler, and hands each composed frame to its renderer. All
/// time-dependent calls take the host's animation clock in milliseconds.
pub struct Chart<R: Renderer> {
    renderer: R,
    config: ChartConfig,
    palette: Palette,
    formatter: Box<dyn LabelFormatter>,
    kind: ChartKind,
    series: SeriesSet,
    display: DisplaySurface,
    overview: OverviewSurface,
    scheduler: FrameScheduler,
    cursor: CursorStyle,
}

impl<R: Renderer> Chart<R> {
    pub fn new(renderer: R, config: ChartConfig, kind: ChartKind) -> ChartResult<Self> {
        let config = config.validate()?;
        let mut scheduler = FrameScheduler::default();
        scheduler.request_redraw(RedrawReason::Layout);
        Ok(Self {
            renderer,
            palette: config.theme.palette(),
            formatter: Box::new(DefaultLabelFormatter),
            kind,
            series: SeriesSet::new(),
            display: DisplaySurface::new(kind, &config),
            overview: OverviewSurface::new(kind, &config),
            scheduler,
            cursor: CursorStyle::Default,
            config,
        })
    }

    /// Validates `data` and builds a chart of the kind its flags select.
    pub fn from_data(renderer: R, config: ChartConfig, data: ChartData, now: Millis) -> ChartResult<Self> {
        let kind = data.chart_kind();
        let series = data.into_series()?;
        let mut chart = Self::new(renderer, config, kind)?;
        for series in series {
            chart.add_series(series, now)?;
        }
        Ok(chart)
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl LabelFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self.scheduler.request_redraw(RedrawReason::Style);
        self
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn series(&self) -> &SeriesSet {
        &self.series
    }

    pub fn series_by_id(&self, id: &str) -> ChartResult<&Series> {
        self.series
            .get(id)
            .ok_or_else(|| ChartError::UnknownSeries(id.to_owned()))
    }

    #[must_use]
    pub fn display(&self) -> &DisplaySurface {
        &self.display
    }

    #[must_use]
    pub fn overview(&self) -> &OverviewSurface {
        &self.overview
    }

    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.scheduler.needs_redraw()
    }

    pub fn request_redraw(&mut self, reason: RedrawReason) {
        self.scheduler.request_redraw(reason);
    }

    /// Registers a series on both surfaces and snaps the borders to it.
    ///
    /// The first series also establishes the initial range selection.
    pub fn add_series(&mut self, series: Series, now: Millis) -> ChartResult<()> {
        let id = series.id().to_owned();
        if self.series.contains_key(&id) {
            return Err(ChartError::InvalidData(format!("duplicate series id `{id}`")));
        }
        self.series.insert(id.clone(), series);

        self.display.strategy_mut().add_series(&id, &self.series, now);
        self.overview.add_series(&id, &mut self.series, now);
        if self.overview.target_range().is_none() {
            self.overview
                .set_range(self.config.initial_range, &mut self.series, now)?;
        }
        self.display.strategy_mut().recalc_borders(&self.series, now, 0.0);

        debug!(id, total = self.series.len(), "series added");
        self.scheduler.request_redraw(RedrawReason::Data);
        Ok(())
    }

    /// Detaches a series from every surface and returns it.
    pub fn remove_series(&mut self, id: &str, now: Millis) -> ChartResult<Series> {
        let removed = self
            .series
            .shift_remove(id)
            .ok_or_else(|| ChartError::UnknownSeries(id.to_owned()))?;
        let duration = self.config.range_border_duration_ms;
        self.display
            .strategy_mut()
            .remove_series(id, &self.series, now, duration);
        self.overview
            .remove_series(id, &mut self.series, now, duration);
        self.display
            .strategy_mut()
            .recalc_borders(&self.series, now, duration);

        debug!(id, total = self.series.len(), "series removed");
        self.scheduler.request_redraw(RedrawReason::Data);
        Ok(removed)
    }

    /// Fades a series in or out and rescales both surfaces.
    ///
    /// Returns `false` when the series already had that visibility.
    pub fn set_series_visible(&mut self, id: &str, visible: bool, now: Millis) -> ChartResult<bool> {
        let fade = self.config.fade_duration_ms;
        let changed = self
            .series
            .get_mut(id)
            .ok_or_else(|| ChartError::UnknownSeries(id.to_owned()))?
            .set_visible(visible, now, fade);
        if !changed {
            return Ok(false);
        }

        let duration = self.config.range_border_duration_ms;
        self.display.clear_cursor(&mut self.series);
        self.overview.recalc_borders(&self.series, now, duration);
        self.overview.apply_windows(&mut self.series);
        self.display
            .strategy_mut()
            .recalc_borders(&self.series, now, duration);
        self.scheduler.request_redraw(RedrawReason::Visibility);
        Ok(true)
    }

    pub fn toggle_series(&mut self, id: &str, now: Millis) -> ChartResult<bool> {
        let visible = self.series_by_id(id)?.is_visible();
        self.set_series_visible(id, !visible, now)
    }

    /// Live range selection.
    #[must_use]
    pub fn range(&self, now: Millis) -> Option<RangeFraction> {
        self.overview.range(now)
    }

    pub fn set_range(&mut self, range: RangeFraction, now: Millis) -> ChartResult<()> {
        self.overview.set_range(range, &mut self.series, now)?;
        self.display.strategy_mut().recalc_borders(
            &self.series,
            now,
            self.config.range_border_duration_ms,
        );
        self.scheduler.request_redraw(RedrawReason::Range);
        Ok(())
    }

    /// `"j F Y - j F Y"` label of the visible window.
    #[must_use]
    pub fn range_label(&self) -> Option<String> {
        self.display.range_label(self.formatter.as_ref())
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now: Millis) -> ChartResult<()> {
        let position = PointerPosition::new(x, y);
        let range_changed = self.overview.pointer_move(position, &mut self.series, now)?;
        if self.overview.is_dragging() {
            if self.display.clear_cursor(&mut self.series) {
                self.scheduler.request_redraw(RedrawReason::Cursor);
            }
            if range_changed {
                self.display.strategy_mut().recalc_borders(
                    &self.series,
                    now,
                    self.config.range_border_duration_ms,
                );
                self.scheduler.request_redraw(RedrawReason::Range);
            }
        } else if self.display.pointer_move(position, &mut self.series, now) {
            self.scheduler.request_redraw(RedrawReason::Cursor);
        }
        self.sync_cursor();
        Ok(())
    }

    /// Returns whether a range drag started.
    pub fn pointer_down(&mut self, x: f64, y: f64, now: Millis) -> bool {
        let started = self.overview.pointer_down(PointerPosition::new(x, y), now);
        if started && self.display.clear_cursor(&mut self.series) {
            self.scheduler.request_redraw(RedrawReason::Cursor);
        }
        self.sync_cursor();
        started
    }

    pub fn pointer_up(&mut self) {
        self.overview.pointer_up();
        self.sync_cursor();
    }

    /// Pointer left the canvas: hide the cursor point.
    pub fn pointer_leave(&mut self) {
        if self.display.clear_cursor(&mut self.series) {
            self.scheduler.request_redraw(RedrawReason::Cursor);
        }
    }

    fn sync_cursor(&mut self) {
        let cursor = self.overview.cursor();
        if cursor != self.cursor {
            self.cursor = cursor;
            self.renderer.set_cursor(cursor);
        }
    }

    pub fn resize(&mut self, viewport: Viewport, now: Millis) -> ChartResult<()> {
        let config = ChartConfig {
            viewport,
            ..self.config
        }
        .validate()?;
        self.config = config;
        self.display.resize(&config, now);
        self.overview.resize(&config, now);
        self.overview.apply_windows(&mut self.series);
        self.scheduler.request_redraw(RedrawReason::Layout);
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        self.palette = theme.palette();
        self.overview.invalidate();
        self.scheduler.request_redraw(RedrawReason::Style);
    }

    /// Draws both surfaces into a fresh frame without touching the
    /// scheduler. Also returns whether any animation is still running and
    /// the tooltip for the cursor point.
    pub fn compose_frame(&mut self, now: Millis) -> (RenderFrame, bool, Option<TooltipContent>) {
        let mut frame = RenderFrame::new(self.config.viewport);
        let ctx = FrameContext {
            now,
            palette: &self.palette,
            formatter: self.formatter.as_ref(),
        };
        let display_animating = self.display.draw(&mut frame, &self.series, &ctx);
        let overview_animating = self.overview.draw(&mut frame, &self.series, &ctx);
        let tooltip = self.display.tooltip(&self.series, &ctx);
        (frame, display_animating || overview_animating, tooltip)
    }

    /// Renders at most one frame.
    ///
    /// Returns `false` when nothing was pending; otherwise composes both
    /// surfaces, hands the frame to the renderer and updates the tooltip.
    pub fn frame(&mut self, now: Millis, tooltip: &mut dyn TooltipHost) -> ChartResult<bool> {
        if !self.scheduler.begin_frame() {
            return Ok(false);
        }
        let (frame, animating, content) = self.compose_frame(now);
        let rendered = self.renderer.render(&frame);
        self.scheduler.end_frame(animating);
        rendered?;
        show_tooltip(tooltip, content.as_ref());
        Ok(true)
    }

    /// Renders at most one frame into an external cairo context.
    #[cfg(feature = "cairo-backend")]
    pub fn frame_on_cairo_context(
        &mut self,
        now: Millis,
        context: &cairo::Context,
        tooltip: &mut dyn TooltipHost,
    ) -> ChartResult<bool>
    where
        R: CairoContextRenderer,
    {
        if !self.scheduler.begin_frame() {
            return Ok(false);
        }
        let (frame, animating, content) = self.compose_frame(now);
        let rendered = self.renderer.render_on_cairo_context(context, &frame);
        self.scheduler.end_frame(animating);
        rendered?;
        show_tooltip(tooltip, content.as_ref());
        Ok(true)
    }
}

fn show_tooltip(host: &mut dyn TooltipHost, content: Option<&TooltipContent>) {
    match content {
        Some(content) => host.show(content),
        None => host.hide(),
    }
}

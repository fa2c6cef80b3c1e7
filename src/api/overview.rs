use tracing::{debug, trace};

use crate::api::engine_config::{ChartConfig, ChartKind, Palette};
use crate::api::strategy::{DrawingStrategy, FrameContext, StrategyRole};
use crate::core::{AnimatedScalar, Millis, RangeFraction, SeriesSet, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CursorStyle, InteractionState, PointerPosition, RangeDrag, RangeDragMode};
use crate::render::{DrawingSurface, Point, RectPrimitive, RenderFrame};

const GRIPPER_WIDTH_PX: f64 = 10.0;
const GRIPPER_RADIUS_PX: f64 = 6.0;
const SPAN_TOLERANCE: f64 = 1e-9;

/// Animated `[from, to]` selection.
#[derive(Debug, Clone, PartialEq)]
struct RangeAnimation {
    from: AnimatedScalar,
    to: AnimatedScalar,
}

/// Minimap of the full data extent with a draggable range selector.
///
/// Series geometry is drawn into an off-screen buffer that is reused while
/// no fade or Y rescale is running; the selector chrome is drawn on top
/// every frame.
#[derive(Debug, Clone)]
pub struct OverviewSurface {
    strategy: DrawingStrategy,
    top: f64,
    buffer_viewport: Viewport,
    selector_duration: Millis,
    min_span: f64,
    range: Option<RangeAnimation>,
    interaction: InteractionState,
    cache: Option<RenderFrame>,
    cache_stale: bool,
}

impl OverviewSurface {
    #[must_use]
    pub fn new(kind: ChartKind, config: &ChartConfig) -> Self {
        Self {
            strategy: DrawingStrategy::new(kind, StrategyRole::Overview, config, config.minimap_area()),
            top: config.minimap_top(),
            buffer_viewport: minimap_viewport(config),
            selector_duration: config.selector_duration_ms,
            min_span: config.min_range_span,
            range: None,
            interaction: InteractionState::default(),
            cache: None,
            cache_stale: true,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &DrawingStrategy {
        &self.strategy
    }

    pub fn add_series(&mut self, id: &str, set: &mut SeriesSet, now: Millis) -> bool {
        let added = self.strategy.add_series(id, set, now);
        self.invalidate();
        self.apply_windows(set);
        added
    }

    pub fn remove_series(&mut self, id: &str, set: &mut SeriesSet, now: Millis, duration: Millis) -> bool {
        let removed = self.strategy.remove_series(id, set, now, duration);
        self.invalidate();
        self.apply_windows(set);
        removed
    }

    pub fn recalc_borders(&mut self, set: &SeriesSet, now: Millis, duration: Millis) -> bool {
        self.strategy.recalc_borders(set, now, duration)
    }

    pub fn resize(&mut self, config: &ChartConfig, now: Millis) {
        self.top = config.minimap_top();
        self.buffer_viewport = minimap_viewport(config);
        self.strategy.set_area(config.minimap_area(), now);
        self.invalidate();
    }

    /// Drops the cached buffer; the next frame redraws the series.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Live selection at `now`.
    #[must_use]
    pub fn range(&self, now: Millis) -> Option<RangeFraction> {
        let range = self.range.as_ref()?;
        Some(RangeFraction::new(range.from.value(now), range.to.value(now)))
    }

    /// Selection the animation is heading to.
    #[must_use]
    pub fn target_range(&self) -> Option<RangeFraction> {
        let range = self.range.as_ref()?;
        Some(RangeFraction::new(range.from.target(), range.to.target()))
    }

    /// Moves the selection and rewrites every series' time window.
    ///
    /// The first selection snaps; later ones animate the chrome.
    pub fn set_range(&mut self, range: RangeFraction, set: &mut SeriesSet, now: Millis) -> ChartResult<()> {
        let range = range.validate()?;
        if range.to - range.from < self.min_span - SPAN_TOLERANCE {
            return Err(ChartError::InvalidData(format!(
                "range span {} is below the minimum {}",
                range.to - range.from,
                self.min_span
            )));
        }
        self.range = Some(match self.range.take() {
            Some(previous) => RangeAnimation {
                from: previous.from.retarget(range.from, now, self.selector_duration),
                to: previous.to.retarget(range.to, now, self.selector_duration),
            },
            None => RangeAnimation {
                from: AnimatedScalar::settled(range.from),
                to: AnimatedScalar::settled(range.to),
            },
        });
        debug!(from = range.from, to = range.to, "range selected");
        self.apply_windows(set);
        Ok(())
    }

    /// Projects the target selection onto the minimap's target X extent
    /// and writes it into every series.
    pub fn apply_windows(&self, set: &mut SeriesSet) -> bool {
        let (Some(range), Some(borders)) = (self.target_range(), self.strategy.primary().borders())
        else {
            return false;
        };
        let extent = borders.target();
        let window = range.project(extent.min_x, extent.max_x);
        for series in set.values_mut() {
            series.set_window(Some(window));
        }
        true
    }

    /// Selector part under `position`, using the live selection.
    #[must_use]
    pub fn hit_zone(&self, position: PointerPosition, now: Millis) -> Option<RangeDragMode> {
        let range = self.range(now)?;
        let height = f64::from(self.buffer_viewport.height);
        if position.y < self.top || position.y >= self.top + height {
            return None;
        }
        let width = f64::from(self.buffer_viewport.width);
        let left = range.from * width;
        let right = range.to * width;
        let x = position.x;
        if (left - 5.0..=left + 20.0).contains(&x) {
            Some(RangeDragMode::From)
        } else if x >= right - 15.0 && x < right + 5.0 {
            Some(RangeDragMode::To)
        } else if x >= left && x < right {
            Some(RangeDragMode::All)
        } else {
            None
        }
    }

    #[must_use]
    pub fn cursor(&self) -> CursorStyle {
        self.interaction.cursor()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    /// Updates hover and, while dragging, the selection.
    ///
    /// Returns whether the selection changed.
    pub fn pointer_move(&mut self, position: PointerPosition, set: &mut SeriesSet, now: Millis) -> ChartResult<bool> {
        let hover = self.hit_zone(position, now);
        self.interaction.on_pointer_move(position, hover);
        let Some(drag) = self.interaction.drag() else {
            return Ok(false);
        };
        let width = f64::from(self.buffer_viewport.width);
        let next = drag_range(drag, position, width, self.min_span);
        if self.target_range() == Some(next) {
            return Ok(false);
        }
        self.set_range(next, set, now)?;
        Ok(true)
    }

    /// Starts a drag when `position` is over the selector.
    pub fn pointer_down(&mut self, position: PointerPosition, now: Millis) -> bool {
        let hover = self.hit_zone(position, now);
        self.interaction.on_pointer_move(position, hover);
        let Some(range) = self.target_range() else {
            return false;
        };
        self.interaction.on_pointer_down(range.from, range.to)
    }

    pub fn pointer_up(&mut self) {
        self.interaction.on_pointer_up();
    }

    fn content_animating(&self, set: &SeriesSet, now: Millis) -> bool {
        let fading = set.values().any(|series| !series.opacity().is_finished(now));
        let rescaling = self
            .strategy
            .primary()
            .borders()
            .is_some_and(|borders| !borders.max_y.is_finished(now));
        fading || rescaling
    }

    /// Blits the cached series buffer, rebuilding it when stale, then draws
    /// the selector. Returns whether another frame is needed.
    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, set: &SeriesSet, ctx: &FrameContext<'_>) -> bool {
        let now = ctx.now;
        if self.cache.is_none() || self.cache_stale || self.content_animating(set, now) {
            let mut buffer = RenderFrame::new(self.buffer_viewport);
            self.cache_stale = self.strategy.draw_all(&mut buffer, set, ctx);
            trace!(commands = buffer.commands.len(), "minimap cache rebuilt");
            self.cache = Some(buffer);
        }
        if let Some(cache) = &self.cache {
            surface.blit(cache, 0.0, self.top);
        }

        let Some(range) = self.range(now) else {
            return self.cache_stale;
        };
        self.draw_selector(surface, range, ctx.palette);
        let selector_animating = self
            .range
            .as_ref()
            .is_some_and(|r| !r.from.is_finished(now) || !r.to.is_finished(now));
        self.cache_stale || selector_animating
    }

    fn draw_selector(&self, surface: &mut dyn DrawingSurface, range: RangeFraction, palette: &Palette) {
        let width = f64::from(self.buffer_viewport.width);
        let height = f64::from(self.buffer_viewport.height);
        let top = self.top;
        let left = range.from * width;
        let right = range.to * width;

        surface.rect(
            RectPrimitive::new(0.0, top, left + GRIPPER_RADIUS_PX, height, palette.shadow)
                .rounded(GRIPPER_RADIUS_PX),
        );
        surface.rect(
            RectPrimitive::new(
                right - GRIPPER_RADIUS_PX,
                top,
                width - right + GRIPPER_RADIUS_PX,
                height,
                palette.shadow,
            )
            .rounded(GRIPPER_RADIUS_PX),
        );

        for (block, square, strip) in [
            (left, left + 5.0, left + 4.0),
            (right - GRIPPER_WIDTH_PX, right - GRIPPER_WIDTH_PX, right - 6.0),
        ] {
            surface.rect(
                RectPrimitive::new(block, top, GRIPPER_WIDTH_PX, height, palette.range_background)
                    .rounded(GRIPPER_RADIUS_PX),
            );
            surface.rect(RectPrimitive::new(square, top, 5.0, height, palette.range_background));
            surface.rect(
                RectPrimitive::new(strip, top + 13.0, 2.0, 12.0, palette.range_fill).rounded(2.0),
            );
        }

        for y in [top, top + height - 1.0] {
            surface.line(
                Point::new(left + 9.0, y),
                Point::new(right - GRIPPER_WIDTH_PX, y),
                palette.range_background,
                1.0,
            );
        }
    }
}

fn minimap_viewport(config: &ChartConfig) -> Viewport {
    Viewport::new(config.viewport.width, config.minimap_height.round().max(1.0) as u32)
}

/// Selection after dragging from `drag.start` to `position`.
///
/// Moving the body keeps the span and stops at either edge; moving a
/// gripper keeps at least `min_span` between the edges.
#[must_use]
pub fn drag_range(drag: RangeDrag, position: PointerPosition, width: f64, min_span: f64) -> RangeFraction {
    let delta = if width > 0.0 {
        (position.x - drag.start.x) / width
    } else {
        0.0
    };
    let (from, to) = match drag.mode {
        RangeDragMode::All => {
            let span = drag.start_to - drag.start_from;
            let from = (drag.start_from + delta).clamp(0.0, (1.0 - span).max(0.0));
            (from, from + span)
        }
        RangeDragMode::From => {
            let from = (drag.start_from + delta).clamp(0.0, (drag.start_to - min_span).max(0.0));
            (from, drag.start_to)
        }
        RangeDragMode::To => {
            let to = (drag.start_to + delta).clamp((drag.start_from + min_span).min(1.0), 1.0);
            (drag.start_from, to)
        }
    };
    RangeFraction::new(from, to)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{OverviewSurface, drag_range};
    use crate::api::engine_config::{ChartConfig, ChartKind, Theme};
    use crate::api::label_format::DefaultLabelFormatter;
    use crate::api::strategy::FrameContext;
    use crate::core::{DataPoint, RangeFraction, Series, SeriesSet, Viewport};
    use crate::interaction::{CursorStyle, PointerPosition, RangeDrag, RangeDragMode};
    use crate::render::RenderFrame;

    fn drag(mode: RangeDragMode, from: f64, to: f64) -> RangeDrag {
        RangeDrag {
            mode,
            start: PointerPosition::new(100.0, 380.0),
            start_from: from,
            start_to: to,
        }
    }

    #[test]
    fn body_drag_preserves_span_at_the_edges() {
        let moved = drag_range(drag(RangeDragMode::All, 0.6, 0.9), PointerPosition::new(300.0, 380.0), 400.0, 0.05);
        assert_relative_eq!(moved.from, 0.7, epsilon = 1e-9);
        assert_relative_eq!(moved.to, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn gripper_drag_keeps_minimum_span() {
        let moved = drag_range(drag(RangeDragMode::From, 0.5, 0.6), PointerPosition::new(400.0, 380.0), 400.0, 0.05);
        assert_relative_eq!(moved.from, 0.55, epsilon = 1e-9);
        assert_relative_eq!(moved.to, 0.6, epsilon = 1e-9);
    }

    fn overview() -> (OverviewSurface, SeriesSet) {
        let config = ChartConfig::new(Viewport::new(400, 300));
        let points = (0..=100).map(|i| DataPoint::new(f64::from(i), 1.0)).collect();
        let mut set = SeriesSet::new();
        set.insert("a".to_owned(), Series::new("a", "a", "#ff0000", points).expect("series"));
        let mut overview = OverviewSurface::new(ChartKind::Line, &config);
        overview.add_series("a", &mut set, 0.0);
        overview
            .set_range(RangeFraction::new(0.8, 1.0), &mut set, 0.0)
            .expect("range");
        (overview, set)
    }

    #[test]
    fn range_writes_series_windows() {
        let (_, set) = overview();
        let window = set["a"].window().expect("window");
        assert_relative_eq!(window.from, 80.0, epsilon = 1e-9);
        assert_relative_eq!(window.to, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn dragging_the_left_gripper_moves_from() {
        let (mut overview, mut set) = overview();
        // Selector spans x 320..400 on a 400 px canvas; minimap starts at y 262.
        let grip = PointerPosition::new(322.0, 270.0);
        assert!(overview.pointer_down(grip, 0.0));
        assert_eq!(overview.cursor(), CursorStyle::EwResize);
        assert!(overview
            .pointer_move(PointerPosition::new(282.0, 270.0), &mut set, 1.0)
            .expect("drag"));
        let target = overview.target_range().expect("range");
        assert_relative_eq!(target.from, 0.7, epsilon = 1e-9);
        overview.pointer_up();
        assert!(!overview.is_dragging());
    }

    #[test]
    fn cached_buffer_is_reused_once_settled() {
        let (mut overview, set) = overview();
        let palette = Theme::Light.palette();
        let ctx = FrameContext {
            now: 0.0,
            palette: &palette,
            formatter: &DefaultLabelFormatter,
        };
        let mut frame = RenderFrame::new(Viewport::new(400, 300));
        assert!(!overview.draw(&mut frame, &set, &ctx));
        let first = overview.cache.clone();
        let mut frame = RenderFrame::new(Viewport::new(400, 300));
        overview.draw(&mut frame, &set, &ctx);
        assert_eq!(overview.cache, first);
        assert_eq!(frame.paths().len(), 1);
        assert!(frame.paths()[0].points.iter().all(|p| p.y >= 262.0));
    }

    #[test]
    fn cache_rebuilds_while_y_rescales_after_the_fade() {
        let (mut overview, mut set) = overview();
        let points = (0..=100).map(|i| DataPoint::new(f64::from(i), 10.0)).collect();
        set.insert("b".to_owned(), Series::new("b", "b", "#0000ff", points).expect("series"));
        overview.add_series("b", &mut set, 0.0);

        let palette = Theme::Light.palette();
        let draw = |overview: &mut OverviewSurface, set: &SeriesSet, now: f64| {
            let ctx = FrameContext {
                now,
                palette: &palette,
                formatter: &DefaultLabelFormatter,
            };
            let mut frame = RenderFrame::new(Viewport::new(400, 300));
            let animating = overview.draw(&mut frame, set, &ctx);
            (animating, overview.cache.clone())
        };
        let (_, settled) = draw(&mut overview, &set, 0.0);

        set.get_mut("b").expect("b").set_visible(false, 0.0, 100.0);
        overview.recalc_borders(&set, 0.0, 300.0);
        let (animating, fading) = draw(&mut overview, &set, 50.0);
        assert!(animating);
        assert_ne!(fading, settled);

        let (animating, rescaling) = draw(&mut overview, &set, 150.0);
        assert!(animating);
        let (_, later) = draw(&mut overview, &set, 250.0);
        assert_ne!(later, rescaling);
        assert_eq!(later.as_ref().map(|cache| cache.paths().len()), Some(1));

        draw(&mut overview, &set, 400.0);
        let (animating, settled) = draw(&mut overview, &set, 400.0);
        assert!(!animating);
        let (_, reused) = draw(&mut overview, &set, 500.0);
        assert_eq!(reused, settled);
    }
}

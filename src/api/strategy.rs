use tracing::{debug, trace, warn};

use crate::api::axis_guides::AxisGuides;
use crate::api::dual_axis_strategy::DualAxisStrategy;
use crate::api::engine_config::{ChartConfig, ChartKind, Palette};
use crate::api::label_format::LabelFormatter;
use crate::api::line_strategy::LineStrategy;
use crate::api::milestones::Milestones;
use crate::api::stacked_strategy::StackedStrategy;
use crate::core::{
    BorderSet, CoordinateMapper, Extent, ExtentRule, Millis, PlotArea, Series, SeriesSet,
    compute_extent,
};
use crate::render::{DrawingSurface, Point};

/// Per-frame inputs shared by every strategy.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub now: Millis,
    pub palette: &'a Palette,
    pub formatter: &'a dyn LabelFormatter,
}

/// Which surface a strategy draws for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyRole {
    /// Primary chart: windowed extent, guides, milestones, cursor.
    Display,
    /// Minimap: full extent, series only.
    Overview,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyOptions {
    pub role: StrategyRole,
    pub rule: ExtentRule,
    pub line_width: f64,
    pub x_duration: Millis,
}

impl StrategyOptions {
    #[must_use]
    pub fn new(kind: ChartKind, role: StrategyRole, config: &ChartConfig) -> Self {
        let rule = match kind {
            ChartKind::Line | ChartKind::DualAxis => ExtentRule::Line {
                y_floor: config.y_floor,
            },
            ChartKind::Stacked { .. } => ExtentRule::Stacked,
            ChartKind::StackedPercent => ExtentRule::StackedPercent,
        };
        let line_width = match role {
            StrategyRole::Display => config.display_line_width,
            StrategyRole::Overview => config.minimap_line_width,
        };
        Self {
            role,
            rule,
            line_width,
            x_duration: config.x_border_duration_ms,
        }
    }

    #[must_use]
    pub fn in_window(self) -> bool {
        self.role == StrategyRole::Display
    }

    #[must_use]
    pub fn decorated(self) -> bool {
        self.role == StrategyRole::Display
    }
}

/// State every strategy variant carries for one Y axis: member series,
/// animated borders, guides and milestones.
#[derive(Debug, Clone)]
pub struct StrategyCore {
    options: StrategyOptions,
    area: PlotArea,
    members: Vec<String>,
    borders: Option<BorderSet>,
    guides: AxisGuides,
    milestones: Milestones,
}

impl StrategyCore {
    #[must_use]
    pub fn new(options: StrategyOptions, area: PlotArea) -> Self {
        Self {
            options,
            area,
            members: Vec::new(),
            borders: None,
            guides: AxisGuides::new(options.rule == ExtentRule::StackedPercent),
            milestones: Milestones::default(),
        }
    }

    #[must_use]
    pub fn options(&self) -> StrategyOptions {
        self.options
    }

    #[must_use]
    pub fn area(&self) -> PlotArea {
        self.area
    }

    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    #[must_use]
    pub fn borders(&self) -> Option<&BorderSet> {
        self.borders.as_ref()
    }

    #[must_use]
    pub fn guides(&self) -> &AxisGuides {
        &self.guides
    }

    #[must_use]
    pub fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    pub fn add_member(&mut self, id: &str) -> bool {
        if self.members.iter().any(|member| member == id) {
            return false;
        }
        self.members.push(id.to_owned());
        true
    }

    pub fn remove_member(&mut self, id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member != id);
        before != self.members.len()
    }

    /// Member series in registration order; ids missing from `set` are skipped.
    pub fn series<'a>(&'a self, set: &'a SeriesSet) -> impl Iterator<Item = &'a Series> + 'a {
        self.members.iter().filter_map(move |id| set.get(id))
    }

    #[must_use]
    pub fn target_extent(&self, set: &SeriesSet) -> Option<Extent> {
        compute_extent(self.series(set), self.options.rule, self.options.in_window())
    }

    /// Retargets the borders to the visible members' extent.
    ///
    /// Keeps the previous borders when no visible member has points in
    /// scope. Returns whether the borders were retargeted.
    pub fn recalc_borders(&mut self, set: &SeriesSet, now: Millis, duration: Millis) -> bool {
        let Some(extent) = self.target_extent(set) else {
            debug!(members = self.members.len(), "no visible points; keeping borders");
            return false;
        };
        self.apply_extent(extent, set, now, duration);
        true
    }

    pub fn apply_extent(&mut self, extent: Extent, set: &SeriesSet, now: Millis, duration: Millis) {
        let previous_y = self
            .borders
            .as_ref()
            .map(|borders| (borders.min_y.target(), borders.max_y.target()));
        self.borders = Some(BorderSet::transition(
            self.borders.as_ref(),
            extent,
            now,
            self.options.x_duration,
            duration,
        ));
        debug!(?extent, duration, role = ?self.options.role, "borders retargeted");

        if !self.options.decorated() {
            return;
        }
        if previous_y != Some((extent.min_y, extent.max_y)) {
            self.guides.regenerate(extent, self.area, now, duration);
        }
        let full = compute_extent(self.series(set), self.options.rule, false);
        if let Some(full) = full {
            self.milestones.regenerate(full.min_x, full.max_x);
        }
    }

    /// Replaces the plot box; guides snap to the new geometry.
    pub fn set_area(&mut self, area: PlotArea, now: Millis) {
        self.area = area;
        if !self.options.decorated() {
            return;
        }
        if let Some(target) = self.borders.as_ref().map(BorderSet::target) {
            self.guides.regenerate(target, area, now, 0.0);
        }
    }

    /// Mapper over the live borders, or `None` for degenerate geometry.
    #[must_use]
    pub fn live_mapper(&self, now: Millis) -> Option<CoordinateMapper> {
        let extent = self.borders.as_ref()?.current(now);
        CoordinateMapper::new(extent, self.area)
            .map_err(|err| trace!(%err, "skipping draw"))
            .ok()
    }

    #[must_use]
    pub fn is_x_animating(&self, now: Millis) -> bool {
        self.borders
            .as_ref()
            .is_some_and(|borders| !borders.is_x_finished(now))
    }

    /// Whether any border, member fade or guide fade is still running.
    #[must_use]
    pub fn is_animating(&self, set: &SeriesSet, now: Millis) -> bool {
        let borders = self
            .borders
            .as_ref()
            .is_some_and(|borders| !borders.is_finished(now));
        let fades = self
            .series(set)
            .any(|series| !series.opacity().is_finished(now));
        borders || fades || self.guides.is_animating(now)
    }

    pub fn prune_guides(&mut self, now: Millis) {
        self.guides.prune(now);
    }

    pub fn draw_milestones(
        &mut self,
        surface: &mut dyn DrawingSurface,
        mapper: CoordinateMapper,
        ctx: &FrameContext<'_>,
    ) {
        let top = mapper.area().plot_bottom() + 18.0;
        self.milestones
            .draw(surface, mapper, top, ctx.palette.axis_text, ctx.formatter);
    }

    /// Vertical cursor line at the first visible member's current point.
    pub fn draw_current_line(
        &self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        mapper: CoordinateMapper,
        ctx: &FrameContext<'_>,
    ) {
        let Some(point) = self
            .series(set)
            .filter(|series| series.is_visible())
            .find_map(Series::current_point)
        else {
            return;
        };
        let x = mapper.to_canvas_x(point.x);
        let area = mapper.area();
        if !(0.0..=area.width).contains(&x) {
            return;
        }
        surface.line(
            Point::new(x, area.top_padding),
            Point::new(x, area.plot_bottom()),
            ctx.palette.cursor_line,
            1.0,
        );
    }

    /// Marker circles on every visible member's current point.
    pub fn draw_current_points(
        &self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        mapper: CoordinateMapper,
        ctx: &FrameContext<'_>,
    ) {
        let width = mapper.area().width;
        for series in self.series(set).filter(|series| series.is_visible()) {
            let Some(point) = series.current_point() else {
                continue;
            };
            let center = Point::new(mapper.to_canvas_x(point.x), mapper.to_canvas_y(point.y));
            if !(0.0..=width).contains(&center.x) {
                continue;
            }
            surface.circle(
                center,
                4.5,
                Some(series.color()),
                Some(ctx.palette.background),
                2.0,
            );
        }
    }
}

/// Closed set of drawing strategies, chosen once per chart.
#[derive(Debug, Clone)]
pub enum DrawingStrategy {
    Line(LineStrategy),
    Stacked(StackedStrategy),
    StackedPercent(StackedStrategy),
    DualAxis(DualAxisStrategy),
}

impl DrawingStrategy {
    #[must_use]
    pub fn new(kind: ChartKind, role: StrategyRole, config: &ChartConfig, area: PlotArea) -> Self {
        let options = StrategyOptions::new(kind, role, config);
        match kind {
            ChartKind::Line => Self::Line(LineStrategy::new(StrategyCore::new(options, area))),
            ChartKind::Stacked { bars } => Self::Stacked(StackedStrategy::new(
                StrategyCore::new(options, area),
                false,
                bars,
            )),
            ChartKind::StackedPercent => Self::StackedPercent(StackedStrategy::new(
                StrategyCore::new(options, area),
                true,
                false,
            )),
            ChartKind::DualAxis => Self::DualAxis(DualAxisStrategy::new(options, area)),
        }
    }

    /// Axis that owns the X borders and the cursor.
    #[must_use]
    pub fn primary(&self) -> &StrategyCore {
        match self {
            Self::Line(strategy) => strategy.core(),
            Self::Stacked(strategy) | Self::StackedPercent(strategy) => strategy.core(),
            Self::DualAxis(strategy) => strategy.axis(0),
        }
    }

    fn cores_mut(&mut self) -> Vec<&mut StrategyCore> {
        match self {
            Self::Line(strategy) => vec![strategy.core_mut()],
            Self::Stacked(strategy) | Self::StackedPercent(strategy) => vec![strategy.core_mut()],
            Self::DualAxis(strategy) => strategy.axes_mut().iter_mut().collect(),
        }
    }

    /// Registers `id` and snaps the borders to include it.
    pub fn add_series(&mut self, id: &str, set: &SeriesSet, now: Millis) -> bool {
        let added = match self {
            Self::Line(strategy) => strategy.core_mut().add_member(id),
            Self::Stacked(strategy) | Self::StackedPercent(strategy) => {
                strategy.core_mut().add_member(id)
            }
            Self::DualAxis(strategy) => strategy.add_member(id),
        };
        if !added {
            warn!(id, "series not attached to strategy");
            return false;
        }
        self.recalc_borders(set, now, 0.0);
        true
    }

    pub fn remove_series(&mut self, id: &str, set: &SeriesSet, now: Millis, duration: Millis) -> bool {
        let removed = self
            .cores_mut()
            .into_iter()
            .fold(false, |removed, core| core.remove_member(id) || removed);
        if removed {
            self.recalc_borders(set, now, duration);
        }
        removed
    }

    /// Retargets every axis' borders; `duration` drives the Y animation.
    pub fn recalc_borders(&mut self, set: &SeriesSet, now: Millis, duration: Millis) -> bool {
        match self {
            Self::Line(strategy) => strategy.core_mut().recalc_borders(set, now, duration),
            Self::Stacked(strategy) | Self::StackedPercent(strategy) => {
                strategy.core_mut().recalc_borders(set, now, duration)
            }
            Self::DualAxis(strategy) => strategy.recalc_borders(set, now, duration),
        }
    }

    pub fn set_area(&mut self, area: PlotArea, now: Millis) {
        for core in self.cores_mut() {
            core.set_area(area, now);
        }
    }

    /// Draws every member; returns whether another frame is needed.
    pub fn draw_all(
        &mut self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        ctx: &FrameContext<'_>,
    ) -> bool {
        match self {
            Self::Line(strategy) => strategy.draw(surface, set, ctx),
            Self::Stacked(strategy) | Self::StackedPercent(strategy) => {
                strategy.draw(surface, set, ctx)
            }
            Self::DualAxis(strategy) => strategy.draw(surface, set, ctx),
        }
    }

    #[must_use]
    pub fn is_percent(&self) -> bool {
        matches!(self, Self::StackedPercent(_))
    }

    /// Pointer x shift applied before hit-testing; half a column for bars.
    #[must_use]
    pub fn hit_offset(&self, set: &SeriesSet, mapper: CoordinateMapper) -> f64 {
        match self {
            Self::Stacked(strategy) => strategy.hit_offset(set, mapper),
            _ => 0.0,
        }
    }
}

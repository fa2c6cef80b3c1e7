use tracing::{debug, warn};

use crate::api::line_strategy::{draw_line_series, series_clip};
use crate::api::strategy::{FrameContext, StrategyCore, StrategyOptions};
use crate::core::{Extent, Millis, PlotArea, SeriesSet};
use crate::render::{DrawingSurface, TextHAlign};

/// Two line series, each scaled to its own Y axis over a shared X range.
///
/// The first series is labelled on the left, the second on the right;
/// guide labels take their series' color.
#[derive(Debug, Clone)]
pub struct DualAxisStrategy {
    axes: [StrategyCore; 2],
}

impl DualAxisStrategy {
    #[must_use]
    pub fn new(options: StrategyOptions, area: PlotArea) -> Self {
        Self {
            axes: [
                StrategyCore::new(options, area),
                StrategyCore::new(options, area),
            ],
        }
    }

    #[must_use]
    pub fn axis(&self, index: usize) -> &StrategyCore {
        &self.axes[index.min(1)]
    }

    pub fn axes_mut(&mut self) -> &mut [StrategyCore; 2] {
        &mut self.axes
    }

    /// Attaches `id` to the first axis without a series.
    pub fn add_member(&mut self, id: &str) -> bool {
        if self
            .axes
            .iter()
            .any(|axis| axis.members().iter().any(|member| member == id))
        {
            return false;
        }
        match self.axes.iter_mut().find(|axis| axis.members().is_empty()) {
            Some(axis) => axis.add_member(id),
            None => {
                warn!(id, "dual-axis chart already has two series");
                false
            }
        }
    }

    /// Retargets both axes over the union of their X ranges.
    ///
    /// An axis whose series is hidden keeps its Y bounds but follows the
    /// shared X range.
    pub fn recalc_borders(&mut self, set: &SeriesSet, now: Millis, duration: Millis) -> bool {
        let extents = [
            self.axes[0].target_extent(set),
            self.axes[1].target_extent(set),
        ];
        let Some((min_x, max_x)) = extents
            .iter()
            .flatten()
            .map(|extent| (extent.min_x, extent.max_x))
            .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
        else {
            debug!("no visible points on either axis; keeping borders");
            return false;
        };

        for (axis, extent) in self.axes.iter_mut().zip(extents) {
            let extent: Option<Extent> =
                extent.or_else(|| axis.borders().map(|borders| borders.target()));
            if let Some(extent) = extent {
                axis.apply_extent(extent.with_x(min_x, max_x), set, now, duration);
            }
        }
        true
    }

    pub fn draw(
        &mut self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        ctx: &FrameContext<'_>,
    ) -> bool {
        let now = ctx.now;
        let mut animating = false;
        let mut mappers = [None, None];
        for (axis, mapper) in self.axes.iter_mut().zip(mappers.iter_mut()) {
            axis.prune_guides(now);
            animating |= axis.is_animating(set, now);
            *mapper = axis.live_mapper(now);
        }
        let decorated = self.axes[0].options().decorated();
        let line_width = self.axes[0].options().line_width;
        let windowed = self.axes[0].options().in_window();

        if decorated {
            for (axis, mapper) in self.axes.iter().zip(mappers) {
                if let Some(mapper) = mapper {
                    axis.guides()
                        .draw_lines(surface, mapper, ctx.palette.dual_axis_line, now);
                }
            }
            if let Some(mapper) = mappers[0] {
                self.axes[0].draw_milestones(surface, mapper, ctx);
                self.axes[0].draw_current_line(surface, set, mapper, ctx);
            }
        }

        for (axis, mapper) in self.axes.iter().zip(mappers) {
            let Some(mapper) = mapper else {
                continue;
            };
            surface.save_clip(series_clip(mapper));
            for series in axis.series(set) {
                draw_line_series(surface, series, mapper, line_width, windowed, now);
            }
            surface.restore_clip();
        }

        if decorated {
            let aligns = [TextHAlign::Left, TextHAlign::Right];
            for ((axis, mapper), align) in self.axes.iter().zip(mappers).zip(aligns) {
                let (Some(mapper), Some(series)) = (mapper, axis.series(set).next()) else {
                    continue;
                };
                let color = series.color().with_opacity(series.opacity().value(now));
                axis.guides().draw_labels(surface, mapper, color, align, now);
            }
            for (axis, mapper) in self.axes.iter().zip(mappers) {
                if let Some(mapper) = mapper {
                    axis.draw_current_points(surface, set, mapper, ctx);
                }
            }
        }
        animating
    }
}

use smallvec::SmallVec;
use tracing::trace;

use crate::core::{AnimatedScalar, CoordinateMapper, Extent, Millis, PlotArea};
use crate::render::{ClipRect, Color, DrawingSurface, Point, TextHAlign};

pub const GUIDE_COUNT: usize = 6;
pub const PERCENT_GUIDE_COUNT: usize = 4;
pub const GUIDE_FONT_SIZE_PX: f64 = 11.0;
/// Guides kept alive at once, counting those still fading out.
const GUIDE_GENERATIONS: usize = 3;

/// One horizontal value guide with its own fade.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGuide {
    pub value: f64,
    pub label: String,
    pub opacity: AnimatedScalar,
}

/// Horizontal guide lines and their value labels.
///
/// A new generation is produced whenever the target Y bounds change; the
/// previous generation fades out while the new one fades in.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGuides {
    count: usize,
    percent: bool,
    guides: SmallVec<[AxisGuide; GUIDE_COUNT * GUIDE_GENERATIONS]>,
}

impl AxisGuides {
    #[must_use]
    pub fn new(percent: bool) -> Self {
        Self {
            count: if percent {
                PERCENT_GUIDE_COUNT
            } else {
                GUIDE_COUNT
            },
            percent,
            guides: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn guides(&self) -> &[AxisGuide] {
        &self.guides
    }

    /// Builds guides for `target` and fades the previous ones out.
    ///
    /// A zero duration drops every previous guide and shows the new ones at
    /// full opacity.
    pub fn regenerate(&mut self, target: Extent, area: PlotArea, now: Millis, duration: Millis) {
        if duration <= 0.0 {
            self.guides.clear();
        } else {
            for guide in &mut self.guides {
                guide.opacity = guide.opacity.retarget(0.0, now, duration);
            }
        }

        let Ok(mapper) = CoordinateMapper::new(target, area) else {
            trace!(?target, "skipping guides for degenerate extent");
            return;
        };

        let step = area.plot_height() / self.count as f64;
        let span = target.y_span();
        for n in 0..self.count {
            let canvas_y = area.plot_bottom() - step * n as f64;
            let raw = mapper.from_canvas_y(canvas_y);
            let value = if span > 1.0 { raw.round() } else { raw };
            let opacity = if duration <= 0.0 {
                AnimatedScalar::settled(1.0)
            } else {
                AnimatedScalar::new(0.0, 1.0, now, duration)
            };
            self.guides.push(AxisGuide {
                value,
                label: guide_label(value, span, self.percent),
                opacity,
            });
        }

        let cap = self.count * GUIDE_GENERATIONS;
        if self.guides.len() > cap {
            let excess = self.guides.len() - cap;
            self.guides.drain(..excess);
        }
    }

    /// Drops guides that finished fading out.
    pub fn prune(&mut self, now: Millis) {
        self.guides
            .retain(|guide| !(guide.opacity.is_finished(now) && guide.opacity.target() <= 0.0));
    }

    #[must_use]
    pub fn is_animating(&self, now: Millis) -> bool {
        self.guides.iter().any(|guide| !guide.opacity.is_finished(now))
    }

    pub fn draw_lines(
        &self,
        surface: &mut dyn DrawingSurface,
        mapper: CoordinateMapper,
        color: Color,
        now: Millis,
    ) {
        let width = mapper.area().width;
        let Some(visible) = self.visible(surface, mapper, now) else {
            return;
        };
        for (_, y, opacity) in visible {
            surface.line(
                Point::new(0.0, y),
                Point::new(width, y),
                color.with_opacity(opacity),
                1.0,
            );
        }
        surface.restore_clip();
    }

    pub fn draw_labels(
        &self,
        surface: &mut dyn DrawingSurface,
        mapper: CoordinateMapper,
        color: Color,
        align: TextHAlign,
        now: Millis,
    ) {
        let x = match align {
            TextHAlign::Right => mapper.area().width,
            TextHAlign::Left | TextHAlign::Center => 0.0,
        };
        let Some(visible) = self.visible(surface, mapper, now) else {
            return;
        };
        for (guide, y, opacity) in visible {
            surface.text(
                &guide.label,
                Point::new(x, y - 6.0),
                color.with_opacity(opacity),
                GUIDE_FONT_SIZE_PX,
                align,
            );
        }
        surface.restore_clip();
    }

    /// Pushes the guide clip and returns the guides to paint with their
    /// canvas y and live opacity. Callers restore the clip.
    fn visible(
        &self,
        surface: &mut dyn DrawingSurface,
        mapper: CoordinateMapper,
        now: Millis,
    ) -> Option<Vec<(&AxisGuide, f64, f64)>> {
        if self.guides.is_empty() {
            return None;
        }
        let area = mapper.area();
        surface.save_clip(ClipRect::new(0.0, 0.0, area.width, area.plot_bottom() + 30.0));
        Some(
            self.guides
                .iter()
                .filter_map(|guide| {
                    let opacity = guide.opacity.value(now);
                    (opacity > 0.0).then(|| (guide, mapper.to_canvas_y(guide.value), opacity))
                })
                .collect(),
        )
    }
}

/// Guide label text for `value` on an axis spanning `span`.
///
/// Values of 100 and above keep two significant digits; large spans switch
/// to `K`/`M` suffixes. Percent axes print plain values.
#[must_use]
pub fn guide_label(value: f64, span: f64, percent: bool) -> String {
    if percent {
        return format_plain(value);
    }
    let value = two_significant_digits(value);
    if span > 5_000_000.0 {
        format!("{}M", format_plain((value / 1_000_000.0).round()))
    } else if span > 5_000.0 {
        format!("{}K", format_plain((value / 1_000.0).round()))
    } else {
        format_plain(value)
    }
}

fn two_significant_digits(value: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude < 100.0 {
        return value;
    }
    let digits = magnitude.log10().floor() as i32 + 1;
    let unit = 10f64.powi(digits - 2);
    value - value % unit
}

fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

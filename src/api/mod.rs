mod axis_guides;
mod chart;
mod chart_data;
mod display;
mod dual_axis_strategy;
mod engine_config;
mod label_format;
mod line_strategy;
mod milestones;
mod overview;
mod scheduler;
mod stacked_strategy;
mod strategy;

pub use axis_guides::{
    AxisGuide, AxisGuides, GUIDE_COUNT, PERCENT_GUIDE_COUNT, guide_label,
};
pub use chart::Chart;
pub use chart_data::{ChartData, ColumnType};
pub use display::{
    DisplaySurface, NoTooltip, RecordingTooltip, TooltipContent, TooltipHost, TooltipRow,
};
pub use dual_axis_strategy::DualAxisStrategy;
pub use engine_config::{ChartConfig, ChartKind, Palette, Theme};
pub use label_format::{DefaultLabelFormatter, LabelFormatter};
pub use line_strategy::LineStrategy;
pub use milestones::{
    DATE_LABEL_WIDTH_PX, LABEL_OPACITY_CUTOFF, MILESTONE_MARGIN_PX, Milestone, Milestones,
    MonthLabelCache, milestone_opacity, milestone_stride,
};
pub use overview::{OverviewSurface, drag_range};
pub use scheduler::{FrameScheduler, RedrawReason, RedrawReasons};
pub use stacked_strategy::{
    MIN_SLICE_HEIGHT_PX, StackBand, StackBaseline, StackSlice, StackedStrategy,
    normalize_percentages, stack_band,
};
pub use strategy::{DrawingStrategy, FrameContext, StrategyCore, StrategyOptions, StrategyRole};

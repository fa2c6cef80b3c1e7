//! overview-chart: headless animated time-series chart engine.
//!
//! Series are drawn by one of four strategies (line, stacked, stacked
//! percentage, dual axis) onto a display surface with value guides, date
//! milestones and a cursor tooltip, and onto a minimap whose range selector
//! picks the displayed time window. Frames are recorded as backend-agnostic
//! draw commands and handed to a [`render::Renderer`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartConfig, ChartData, ChartKind, Theme};
pub use error::{ChartError, ChartResult};

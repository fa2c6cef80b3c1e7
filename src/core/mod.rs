pub mod animation;
pub mod borders;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod types;
pub mod windowing;

pub use animation::{AnimatedScalar, Millis};
pub use borders::{BorderSet, Extent, ExtentRule, YFloor, compute_extent};
pub use scale::{CoordinateMapper, PlotArea};
pub use series::{Series, SeriesSet};
pub use types::{DataPoint, RangeFraction, TimeWindow, Viewport};
pub use windowing::{drawn_range, in_display_range};

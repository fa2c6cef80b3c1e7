use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("series `{id}` has {actual} values but the time axis has {expected}")]
    SeriesLengthMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("chart data has no `x` time axis column")]
    MissingTimeAxis,

    #[error("unknown series: {0}")]
    UnknownSeries(String),

    #[error("degenerate {axis} extent: min and max coincide")]
    DegenerateExtent { axis: Axis },
}

/// Axis named by geometry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

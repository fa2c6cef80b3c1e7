use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::engine_config::ChartKind;
use crate::core::{DataPoint, Series};
use crate::error::{ChartError, ChartResult};

const FALLBACK_COLOR: &str = "#3cc23f";

/// Column role declared in `types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    X,
    Line,
    Bar,
    Area,
}

/// Column-oriented chart payload.
///
/// Each column starts with its id followed by one cell per timestamp; the
/// column typed `x` holds the shared time axis in Unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub columns: Vec<Vec<Value>>,
    pub types: HashMap<String, ColumnType>,
    pub names: HashMap<String, String>,
    pub colors: HashMap<String, String>,
    pub y_scaled: bool,
    pub stacked: bool,
    pub percentage: bool,
}

impl ChartData {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| ChartError::InvalidData(format!("chart payload: {err}")))
    }

    /// Strategy implied by the payload flags and column types.
    #[must_use]
    pub fn chart_kind(&self) -> ChartKind {
        let bars = self.types.values().any(|kind| *kind == ColumnType::Bar);
        if self.stacked || bars {
            if self.percentage {
                ChartKind::StackedPercent
            } else {
                ChartKind::Stacked { bars }
            }
        } else if self.y_scaled {
            ChartKind::DualAxis
        } else {
            ChartKind::Line
        }
    }

    /// Validates the payload and builds one series per value column, in
    /// column order.
    ///
    /// `null` cells are missing samples and produce no point.
    pub fn into_series(self) -> ChartResult<Vec<Series>> {
        let mut time_axis = None;
        let mut value_columns = Vec::new();
        for column in &self.columns {
            let id = column_id(column)?;
            match self.types.get(id) {
                Some(ColumnType::X) => {
                    if time_axis.replace(&column[1..]).is_some() {
                        return Err(ChartError::InvalidData(
                            "chart payload has more than one `x` column".to_owned(),
                        ));
                    }
                }
                Some(_) => value_columns.push((id, &column[1..])),
                None => warn!(id, "column without a type; ignored"),
            }
        }
        let time_axis = time_axis.ok_or(ChartError::MissingTimeAxis)?;
        let timestamps = time_axis
            .iter()
            .map(|cell| {
                cell.as_f64().ok_or_else(|| {
                    ChartError::InvalidData(format!("time axis cell {cell} is not a number"))
                })
            })
            .collect::<ChartResult<Vec<f64>>>()?;

        let series = value_columns
            .into_iter()
            .map(|(id, cells)| self.build_series(id, &timestamps, cells))
            .collect::<ChartResult<Vec<Series>>>()?;
        debug!(series = series.len(), samples = timestamps.len(), "chart payload loaded");
        Ok(series)
    }

    fn build_series(&self, id: &str, timestamps: &[f64], cells: &[Value]) -> ChartResult<Series> {
        if cells.len() != timestamps.len() {
            return Err(ChartError::SeriesLengthMismatch {
                id: id.to_owned(),
                expected: timestamps.len(),
                actual: cells.len(),
            });
        }
        let mut points = Vec::with_capacity(cells.len());
        for (&x, cell) in timestamps.iter().zip(cells) {
            if cell.is_null() {
                continue;
            }
            let y = cell.as_f64().ok_or_else(|| {
                ChartError::InvalidData(format!("series `{id}` cell {cell} is not a number"))
            })?;
            points.push(DataPoint::new(x, y));
        }
        let name = self.names.get(id).map_or(id, String::as_str);
        let color = self.colors.get(id).map_or(FALLBACK_COLOR, String::as_str);
        Series::new(id, name, color, points)
    }
}

fn column_id(column: &[Value]) -> ChartResult<&str> {
    column
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| ChartError::InvalidData("column must start with its string id".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::ChartData;
    use crate::api::engine_config::ChartKind;
    use crate::error::ChartError;

    const PAYLOAD: &str = r##"{
        "columns": [
            ["x", 1542412800000, 1542499200000, 1542585600000],
            ["y0", 37, 20, null],
            ["y1", 22, 12, 30]
        ],
        "types": {"x": "x", "y0": "line", "y1": "line"},
        "names": {"y0": "Joined", "y1": "Left"},
        "colors": {"y0": "#3DC23F", "y1": "#F34C44"}
    }"##;

    #[test]
    fn builds_series_in_column_order() {
        let data = ChartData::from_json_str(PAYLOAD).expect("payload");
        assert_eq!(data.chart_kind(), ChartKind::Line);
        let series = data.into_series().expect("series");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name(), "Joined");
        assert_eq!(series[0].points().len(), 2);
        assert_eq!(series[1].color_hex(), "#F34C44");
    }

    #[test]
    fn length_mismatch_aborts_load() {
        let mut data = ChartData::from_json_str(PAYLOAD).expect("payload");
        data.columns[2].pop();
        match data.into_series() {
            Err(ChartError::SeriesLengthMismatch { id, expected, actual }) => {
                assert_eq!((id.as_str(), expected, actual), ("y1", 3, 2));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn missing_time_axis_is_reported() {
        let mut data = ChartData::from_json_str(PAYLOAD).expect("payload");
        data.columns.remove(0);
        assert!(matches!(data.into_series(), Err(ChartError::MissingTimeAxis)));
    }

    #[test]
    fn flags_select_the_strategy() {
        let mut data = ChartData {
            y_scaled: true,
            ..ChartData::default()
        };
        assert_eq!(data.chart_kind(), ChartKind::DualAxis);
        data.stacked = true;
        assert_eq!(data.chart_kind(), ChartKind::Stacked { bars: false });
        data.percentage = true;
        assert_eq!(data.chart_kind(), ChartKind::StackedPercent);
    }
}

use overview_chart::core::{
    CoordinateMapper, DataPoint, Extent, ExtentRule, PlotArea, Series, Viewport, YFloor,
    compute_extent,
};
use proptest::prelude::*;

fn line_rule() -> ExtentRule {
    ExtentRule::Line {
        y_floor: YFloor::Zero,
    }
}

#[test]
fn three_point_series_maps_to_half_width() {
    let series = Series::new(
        "y0",
        "Joined",
        "#3cc23f",
        vec![
            DataPoint::new(0.0, 10.0),
            DataPoint::new(1.0, 20.0),
            DataPoint::new(2.0, 15.0),
        ],
    )
    .expect("valid series");

    let extent = compute_extent([&series], line_rule(), true).expect("extent");
    assert_eq!(extent, Extent::new(0.0, 2.0, 0.0, 20.0));

    let area = PlotArea::new(Viewport::new(100, 100), 0.0, 0.0);
    let mapper = CoordinateMapper::new(extent, area).expect("mapper");
    assert_eq!(mapper.to_canvas_x(1.0), 50.0);
}

#[test]
fn inverted_y_axis_puts_max_at_top_padding() {
    let area = PlotArea::new(Viewport::new(400, 300), 30.0, 78.0);
    let mapper = CoordinateMapper::new(Extent::new(0.0, 10.0, 0.0, 100.0), area).expect("mapper");
    assert_eq!(mapper.to_canvas_y(100.0), 30.0);
    assert_eq!(mapper.to_canvas_y(0.0), area.plot_bottom());
}

#[test]
fn zero_plot_height_is_rejected() {
    let area = PlotArea::new(Viewport::new(400, 100), 50.0, 50.0);
    assert!(CoordinateMapper::new(Extent::new(0.0, 1.0, 0.0, 1.0), area).is_err());
}

proptest! {
    #[test]
    fn canvas_round_trip_within_tolerance(
        min_x in -1.0e9f64..1.0e9,
        x_span in 1.0f64..1.0e9,
        min_y in -1.0e6f64..1.0e6,
        y_span in 1.0e-3f64..1.0e6,
        x_fraction in 0.0f64..=1.0,
        y_fraction in 0.0f64..=1.0,
        width in 1u32..4_000,
        height in 120u32..4_000
    ) {
        let extent = Extent::new(min_x, min_x + x_span, min_y, min_y + y_span);
        let area = PlotArea::new(Viewport::new(width, height), 30.0, 78.0);
        let mapper = CoordinateMapper::new(extent, area).expect("mapper");

        let x = min_x + x_span * x_fraction;
        let y = min_y + y_span * y_fraction;
        let recovered_x = mapper.from_canvas_x(mapper.to_canvas_x(x));
        let recovered_y = mapper.from_canvas_y(mapper.to_canvas_y(y));

        prop_assert!((recovered_x - x).abs() <= 1e-9 * (x.abs() + x_span).max(1.0));
        prop_assert!((recovered_y - y).abs() <= 1e-9 * (y.abs() + y_span).max(1.0));
    }

    #[test]
    fn pixel_round_trip_within_tolerance(
        pixel in 0.0f64..1_000.0,
        max_x in 1.0f64..1.0e12
    ) {
        let area = PlotArea::new(Viewport::new(1_000, 500), 0.0, 0.0);
        let mapper = CoordinateMapper::new(Extent::new(0.0, max_x, 0.0, 1.0), area)
            .expect("mapper");
        let recovered = mapper.to_canvas_x(mapper.from_canvas_x(pixel));
        prop_assert!((recovered - pixel).abs() <= 1e-6);
    }
}

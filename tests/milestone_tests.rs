use overview_chart::api::{
    DefaultLabelFormatter, LABEL_OPACITY_CUTOFF, Milestones, milestone_opacity, milestone_stride,
};
use overview_chart::core::primitives::DAY_MILLIS;
use overview_chart::core::{CoordinateMapper, Extent, PlotArea, Viewport};
use overview_chart::render::{Color, RenderFrame};

// 2019-03-05T00:00:00Z
const START: f64 = 1_551_744_000_000.0;

#[test]
fn forty_labels_on_six_hundred_pixels() {
    assert_eq!(milestone_stride(40, 600.0), 4);

    for index in (0..40).step_by(4) {
        assert_eq!(milestone_opacity(index, 40, 600.0), 1.0, "index {index}");
    }
    for index in (2..40).step_by(4) {
        let opacity = milestone_opacity(index, 40, 600.0);
        assert!(opacity > 0.0 && opacity < 1.0, "index {index}: {opacity}");
    }
    for index in (1..40).step_by(2) {
        assert_eq!(milestone_opacity(index, 40, 600.0), 0.0, "index {index}");
    }
}

#[test]
fn sparse_labels_are_all_opaque() {
    assert_eq!(milestone_stride(5, 600.0), 1);
    assert!((0..5).all(|index| milestone_opacity(index, 5, 600.0) == 1.0));
}

#[test]
fn draws_only_labels_on_the_stride() {
    let mut milestones = Milestones::default();
    assert!(milestones.regenerate(START, START + 40.0 * DAY_MILLIS));
    assert_eq!(milestones.items().len(), 40);

    let viewport = Viewport::new(600, 300);
    let mapper = CoordinateMapper::new(
        Extent::new(START, START + 39.0 * DAY_MILLIS, 0.0, 1.0),
        PlotArea::new(viewport, 30.0, 78.0),
    )
    .expect("mapper");
    let mut frame = RenderFrame::new(viewport);
    milestones.draw(
        &mut frame,
        mapper,
        240.0,
        Color::rgb(0.5, 0.5, 0.5),
        &DefaultLabelFormatter,
    );

    let half_stride = milestone_opacity(2, 40, 600.0);
    let expected = if half_stride < LABEL_OPACITY_CUTOFF { 10 } else { 20 };
    let texts = frame.texts();
    assert_eq!(texts.len(), expected);
    assert_eq!(texts[0].text, "Mar 5");
    assert!(frame.validate().is_ok());
}

#[test]
fn labels_are_cached_after_first_draw() {
    let mut milestones = Milestones::default();
    milestones.regenerate(START, START + 3.0 * DAY_MILLIS);
    let viewport = Viewport::new(600, 300);
    let mapper = CoordinateMapper::new(
        Extent::new(START, START + 2.0 * DAY_MILLIS, 0.0, 1.0),
        PlotArea::new(viewport, 30.0, 78.0),
    )
    .expect("mapper");
    let mut frame = RenderFrame::new(viewport);
    milestones.draw(&mut frame, mapper, 240.0, Color::rgb(0.0, 0.0, 0.0), &DefaultLabelFormatter);

    let labels: Vec<_> = milestones.items().iter().map(|m| m.label()).collect();
    assert_eq!(labels, vec![Some("Mar 5"), Some("Mar 6"), Some("Mar 7")]);
}

use overview_chart::telemetry::init_default_tracing;

#[test]
fn default_tracing_follows_feature_flag() {
    let installed = init_default_tracing();
    if cfg!(feature = "telemetry") {
        // A second install always loses to the first global subscriber.
        assert!(!init_default_tracing() || !installed);
    } else {
        assert!(!installed);
    }
}

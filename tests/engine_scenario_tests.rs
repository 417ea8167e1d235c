use approx::assert_relative_eq;
use candle_chart::api::{ChartEngine, ChartEngineConfig};
use candle_chart::core::{HorizontalScaleMode, Margins, RawBar, Sentiment, Viewport};
use candle_chart::interaction::CrosshairPhase;
use candle_chart::render::NullRenderer;

const SESSION_OPEN_MS: i64 = 1_673_274_600_000;

fn engine(viewport: Viewport) -> ChartEngine<NullRenderer> {
    ChartEngine::new(NullRenderer::default(), ChartEngineConfig::new(viewport))
        .expect("engine init")
}

fn minute_bars(count: usize) -> Vec<RawBar> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.1;
            RawBar::new(
                SESSION_OPEN_MS + i as i64 * 60_000,
                base,
                base + 1.0,
                base - 1.0,
                base + 0.5,
            )
        })
        .collect()
}

#[test]
fn single_bearish_bar_compiles_one_candle() {
    let mut engine = engine(Viewport::new(100.0, 100.0));
    engine
        .set_raw_bars(vec![RawBar::new(0, 10.0, 11.0, 9.0, 8.0)])
        .expect("set bars");

    let candles = engine.candles();
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].sentiment, Sentiment::Bearish);

    let open_y = engine.map_price_to_pixel(10.0).expect("open y");
    let close_y = engine.map_price_to_pixel(8.0).expect("close y");
    assert_relative_eq!(candles[0].body_height, (open_y - close_y).abs());
    assert_eq!(engine.price_domain(), Some((8.0, 12.0)));
}

#[test]
fn two_hundred_bars_over_400px_show_every_24th_label() {
    let mut engine = engine(Viewport::new(400.0, 300.0).with_margins(Margins::zero()));
    engine.set_raw_bars(minute_bars(200)).expect("set bars");

    assert_eq!(engine.box_width(), Some(2.0));
    let labels = engine.tick_labels();
    assert_eq!(labels.len(), 200);
    for (index, label) in labels.iter().enumerate() {
        assert_eq!(label.visible, index % 24 == 0, "label {index}");
    }
}

#[test]
fn pointer_beyond_plot_width_stays_idle() {
    let mut engine = engine(Viewport::new(400.0, 300.0).with_margins(Margins::zero()));
    engine.set_raw_bars(minute_bars(10)).expect("set bars");

    for y in [-100.0, 0.0, 150.0, 10_000.0] {
        assert_eq!(engine.pointer_move(450.0, y), CrosshairPhase::Idle);
        assert!(engine.tooltip().is_none());
    }
}

#[test]
fn empty_bars_produce_nothing_and_stay_idle() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    engine.set_raw_bars(Vec::new()).expect("set bars");

    assert!(engine.candles().is_empty());
    assert!(engine.tick_labels().is_empty());
    assert!(engine.layout().is_none());
    assert_eq!(engine.box_width(), None);
    assert_eq!(engine.pointer_move(100.0, 100.0), CrosshairPhase::Idle);
    assert!(engine.tooltip().is_none());

    assert!(engine.render_frame().is_empty());
    engine.render().expect("render empty frame");
    assert_eq!(engine.renderer().frames_rendered, 1);
}

#[test]
fn resizing_to_zero_width_clears_geometry() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    engine.set_raw_bars(minute_bars(30)).expect("set bars");
    assert_eq!(engine.candles().len(), 30);

    assert!(engine.resize(0.0, 500.0).expect("resize"));
    assert!(engine.candles().is_empty());
    assert!(engine.tick_labels().is_empty());
    engine.render().expect("render");

    assert!(engine.resize(800.0, 500.0).expect("resize back"));
    assert_eq!(engine.candles().len(), 30);
}

#[test]
fn identical_resize_does_not_recompute() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    engine.set_raw_bars(minute_bars(5)).expect("set bars");
    let generation = engine.layout_generation();

    assert!(!engine.resize(800.0, 500.0).expect("resize"));
    assert_eq!(engine.layout_generation(), generation);
}

#[test]
fn negative_resize_is_rejected() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    assert!(engine.resize(-1.0, 500.0).is_err());
    assert!(engine.resize(f64::INFINITY, 500.0).is_err());
    assert_eq!(engine.viewport().width, 800.0);
}

#[test]
fn tracked_pointer_follows_layout_across_resizes() {
    let mut engine = engine(Viewport::new(400.0, 300.0).with_margins(Margins::zero()));
    engine.set_raw_bars(minute_bars(4)).expect("set bars");

    assert_eq!(engine.pointer_enter(350.0, 20.0), CrosshairPhase::Tracking);
    assert_eq!(engine.tooltip().map(|tip| tip.index), Some(3));

    engine.resize(300.0, 300.0).expect("shrink");
    assert_eq!(engine.crosshair_state().phase, CrosshairPhase::Idle);
    assert!(engine.tooltip().is_none());

    engine.resize(400.0, 300.0).expect("grow");
    assert_eq!(engine.crosshair_state().phase, CrosshairPhase::Tracking);
    assert_eq!(engine.tooltip().map(|tip| tip.index), Some(3));

    assert_eq!(engine.pointer_leave(), CrosshairPhase::Idle);
    engine.resize(401.0, 300.0).expect("resize after leave");
    assert_eq!(engine.crosshair_state().phase, CrosshairPhase::Idle);
}

#[test]
fn duplicate_and_unsorted_bars_are_canonicalized() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    engine
        .set_raw_bars(vec![
            RawBar::new(3_000, 1.0, 2.0, 0.5, 1.5),
            RawBar::new(1_000, 1.0, 2.0, 0.5, 1.5),
            RawBar::new(2_000, 1.0, 2.0, 0.5, 1.5),
            RawBar::new(1_000, 1.2, 2.5, 0.9, 2.0),
        ])
        .expect("set bars");

    let times: Vec<i64> = engine.bars().iter().map(|bar| bar.timestamp).collect();
    assert_eq!(times, vec![1_000, 2_000, 3_000]);
    assert_eq!(engine.bars()[0].close, 2.0);
}

#[test]
fn aggregates_body_loads_into_engine() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    let body = r#"{
        "ticker": "AAPL",
        "resultsCount": 3,
        "results": [
            {"t": 1673274600000, "o": 130.1, "h": 130.9, "l": 129.8, "c": 130.5, "v": 1200},
            {"t": 1673274900000, "o": 130.5, "h": 131.2, "l": 130.2, "c": 130.3},
            {"t": 1673275200000, "o": 130.3, "h": 130.4}
        ]
    }"#;

    assert_eq!(engine.load_aggregates_json(body).expect("load"), 2);
    assert_eq!(engine.candles().len(), 2);
    assert!(engine.load_aggregates_json("not json").is_err());
}

#[test]
fn aggregates_body_with_mistyped_entry_keeps_good_bars() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    let body = r#"{"results": [
        {"t": 1673274600000, "o": 130.1, "h": 130.9, "l": 129.8, "c": 130.5},
        {"t": 1673274900000, "o": "130.5", "h": 131.2, "l": 130.2, "c": 130.3},
        null
    ]}"#;

    assert_eq!(engine.load_aggregates_json(body).expect("load"), 1);
    assert_eq!(engine.candles().len(), 1);
}

#[test]
fn inverted_bar_is_dropped_and_engine_keeps_working() {
    let mut engine = engine(Viewport::new(800.0, 500.0));
    engine
        .set_raw_bars(vec![RawBar::new(60_000, 5.0, 0.0, 20.0, 5.0)])
        .expect("set bars");
    assert!(engine.bars().is_empty());
    assert!(engine.candles().is_empty());
    engine.resize(500.0, 300.0).expect("resize");

    engine
        .set_raw_bars(vec![
            RawBar::new(0, 5.0, 0.0, 20.0, 5.0),
            RawBar::new(60_000, 10.0, 12.0, 9.0, 11.0),
        ])
        .expect("set bars");
    assert_eq!(engine.candles().len(), 1);
    assert_eq!(engine.bars()[0].timestamp, 60_000);
}

#[test]
fn switching_scale_mode_keeps_geometry_count() {
    let mut engine = engine(Viewport::new(640.0, 480.0));
    engine.set_raw_bars(minute_bars(12)).expect("set bars");
    let band_x = engine.bar_x(11).expect("band x");

    engine
        .set_scale_mode(HorizontalScaleMode::Continuous)
        .expect("continuous");
    assert_eq!(engine.candles().len(), 12);
    assert_eq!(engine.config().scale_mode, HorizontalScaleMode::Continuous);

    let plot_width = engine.layout().expect("layout").plot.width;
    assert_relative_eq!(engine.bar_x(11).expect("continuous x"), plot_width);
    assert!(band_x < plot_width);
}

#[test]
fn invalid_offset_update_leaves_config_untouched() {
    let mut engine = engine(Viewport::new(640.0, 480.0));
    assert!(engine.set_utc_offset_minutes(20 * 60).is_err());
    assert_eq!(engine.config().utc_offset_minutes, 0);

    engine.set_utc_offset_minutes(-300).expect("offset");
    assert_eq!(engine.config().utc_offset_minutes, -300);
}

#[test]
fn render_counts_primitives_for_single_bar() {
    let mut engine = engine(Viewport::new(100.0, 100.0));
    engine
        .set_raw_bars(vec![RawBar::new(0, 10.0, 11.0, 9.0, 8.0)])
        .expect("set bars");
    engine.render().expect("render");

    let renderer = engine.renderer();
    // price ticks over [8, 12] step 0.5
    let price_tick_count = 9;
    assert_eq!(renderer.last_rect_count, 1);
    // wick, time axis, one time tick, price axis, price ticks
    assert_eq!(renderer.last_line_count, 4 + price_tick_count);
    assert_eq!(renderer.last_text_count, 1 + price_tick_count);
}

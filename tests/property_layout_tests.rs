use candle_chart::api::{ChartLayout, LayoutOptions};
use candle_chart::core::{
    Granularity, HorizontalScale, HorizontalScaleMode, Margins, OhlcBar, RawBar,
    TickLabelPolicy, Viewport, is_tick_label_visible, normalize_bars, tick_label_modulus,
};
use proptest::prelude::*;

const BASE_MS: i64 = 1_600_000_000_000;

fn bars_from(specs: &[(i64, f64, f64, f64, f64)]) -> Vec<OhlcBar> {
    let mut timestamp = BASE_MS;
    specs
        .iter()
        .map(|(gap, base, span, open_factor, close_factor)| {
            timestamp += gap;
            let low = *base;
            let high = base + span;
            OhlcBar::new(
                timestamp,
                low + open_factor * span,
                high,
                low,
                low + close_factor * span,
            )
            .expect("valid generated bar")
        })
        .collect()
}

fn bar_specs() -> impl Strategy<Value = Vec<(i64, f64, f64, f64, f64)>> {
    prop::collection::vec(
        (
            1_i64..3_600_000,
            -1_000.0f64..1_000.0,
            0.0f64..50.0,
            0.0f64..=1.0,
            0.0f64..=1.0,
        ),
        1..160,
    )
}

fn mode() -> impl Strategy<Value = HorizontalScaleMode> {
    prop_oneof![
        Just(HorizontalScaleMode::Band),
        Just(HorizontalScaleMode::Continuous)
    ]
}

fn options(scale_mode: HorizontalScaleMode) -> LayoutOptions {
    LayoutOptions {
        scale_mode,
        label_policy: TickLabelPolicy::new(Granularity::Minute),
        price_axis_tick_count: 10,
    }
}

proptest! {
    #[test]
    fn geometry_count_matches_bar_count(
        specs in bar_specs(),
        scale_mode in mode(),
        width in 1.0f64..2_000.0,
        height in 1.0f64..1_000.0
    ) {
        let bars = bars_from(&specs);
        let viewport = Viewport::new(width, height).with_margins(Margins::zero());
        let layout = ChartLayout::compute(&bars, viewport, options(scale_mode))
            .expect("compute")
            .expect("layout");

        prop_assert_eq!(layout.candles.len(), bars.len());
        prop_assert_eq!(layout.tick_labels.len(), bars.len());
        for candle in &layout.candles {
            prop_assert!(candle.body_width >= 0.0);
            prop_assert!(candle.body_height >= 0.0);
            prop_assert!(candle.wick_y2 <= candle.wick_y1);
        }
    }

    #[test]
    fn price_domain_pads_exact_extremes(specs in bar_specs(), height in 1.0f64..1_000.0) {
        let bars = bars_from(&specs);
        let viewport = Viewport::new(500.0, height).with_margins(Margins::zero());
        let layout = ChartLayout::compute(&bars, viewport, options(HorizontalScaleMode::Band))
            .expect("compute")
            .expect("layout");

        let min_low = bars.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min);
        let max_high = bars.iter().map(|bar| bar.high).fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(layout.price.domain(), (min_low - 1.0, max_high + 1.0));
    }

    #[test]
    fn tick_visibility_is_periodic(box_width in 0.01f64..40.0, index in 1usize..10_000) {
        let modulus = tick_label_modulus(box_width);
        prop_assert_eq!(is_tick_label_visible(index, box_width), index % modulus == 0);
        prop_assert_eq!(
            is_tick_label_visible(index, box_width),
            is_tick_label_visible(index + modulus, box_width)
        );
        prop_assert!(is_tick_label_visible(0, box_width));
    }

    #[test]
    fn band_index_stays_in_bounds(
        count in 1usize..500,
        width in 1.0f64..3_000.0,
        pixel in -10_000.0f64..10_000.0
    ) {
        let bars: Vec<OhlcBar> = (0..count)
            .map(|i| OhlcBar::new(i as i64, 1.0, 2.0, 0.5, 1.5).expect("bar"))
            .collect();
        let policy = TickLabelPolicy::new(Granularity::Minute);
        let scale = HorizontalScale::build(HorizontalScaleMode::Band, &bars, width, &policy)
            .expect("build")
            .expect("scale");
        let HorizontalScale::Band(band) = scale else {
            panic!("expected band scale");
        };
        prop_assert!(band.index_at(pixel) < count);
    }

    #[test]
    fn continuous_lookup_at_own_timestamp_is_exact(
        specs in bar_specs(),
        width in 10.0f64..2_000.0
    ) {
        let bars = bars_from(&specs);
        let viewport = Viewport::new(width, 300.0).with_margins(Margins::zero());
        let layout = ChartLayout::compute(&bars, viewport, options(HorizontalScaleMode::Continuous))
            .expect("compute")
            .expect("layout");
        let locator = layout.locator();

        for (index, bar) in bars.iter().enumerate() {
            let x = layout.horizontal.bar_x(index, bar.timestamp);
            let tooltip = locator.locate(x).expect("tooltip");
            prop_assert_eq!(tooltip.index, index);
            prop_assert_eq!(tooltip.bar, *bar);
        }
    }

    #[test]
    fn clustered_and_outlier_timestamps_resolve_to_own_bar(
        gaps in prop::collection::vec(
            prop_oneof![1_i64..10, 100_000_000_000_i64..1_000_000_000_000],
            1..60
        ),
        width in 10.0f64..2_000.0
    ) {
        let mut timestamp = BASE_MS;
        let bars: Vec<OhlcBar> = gaps
            .iter()
            .map(|gap| {
                timestamp += gap;
                OhlcBar::new(timestamp, 10.0, 12.0, 9.0, 11.0).expect("bar")
            })
            .collect();
        let viewport = Viewport::new(width, 300.0).with_margins(Margins::zero());
        let layout = ChartLayout::compute(&bars, viewport, options(HorizontalScaleMode::Continuous))
            .expect("compute")
            .expect("layout");
        let locator = layout.locator();

        for (index, bar) in bars.iter().enumerate() {
            prop_assert_eq!(locator.index_at_time(bar.timestamp as f64), index);
            let x = layout.horizontal.bar_x(index, bar.timestamp);
            let tooltip = locator.locate(x).expect("tooltip");
            prop_assert_eq!(tooltip.index, index);
        }
    }

    #[test]
    fn normalizer_output_is_sorted_and_unique(
        entries in prop::collection::vec(
            (0_i64..50, 1.0f64..100.0, prop::option::of(0.0f64..1.0)),
            0..80
        )
    ) {
        let raw: Vec<RawBar> = entries
            .iter()
            .map(|(t, price, close_factor)| {
                let mut raw = RawBar::new(*t, *price, price + 1.0, *price, *price);
                raw.close = close_factor.map(|f| price + f);
                raw
            })
            .collect();
        let expected_valid = entries.iter().filter(|(_, _, c)| c.is_some()).count();

        let bars = normalize_bars(raw);
        prop_assert!(bars.len() <= expected_valid);
        prop_assert!(bars.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
    }
}

use smallvec::SmallVec;

use crate::core::{CandleGeometry, Sentiment, Viewport};
use crate::interaction::CrosshairState;
use crate::render::{
    Color, LinePrimitive, LineStrokeStyle, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};

use super::ChartLayout;

const CANDLE_STROKE_WIDTH_PX: f64 = 1.0;
const AXIS_STROKE_WIDTH_PX: f64 = 1.0;
const AXIS_TICK_LENGTH_PX: f64 = 6.0;
const AXIS_LABEL_OFFSET_PX: f64 = 9.0;
const AXIS_FONT_SIZE_PX: f64 = 10.0;
const TIME_LABEL_ROTATION_DEG: f64 = -65.0;

const BULLISH_COLOR: Color = Color::GREEN;
const BEARISH_COLOR: Color = Color::RED;
const AXIS_COLOR: Color = Color::BLACK;
const CROSSHAIR_COLOR: Color = Color::BLACK;

/// Paints a committed layout into surface-space primitives.
///
/// With no layout the frame is empty. Hidden tick labels keep their tick
/// mark but emit no text.
#[must_use]
pub fn build_render_frame(
    viewport: Viewport,
    layout: Option<&ChartLayout>,
    crosshair: &CrosshairState,
) -> RenderFrame {
    let mut frame = RenderFrame::new(viewport);
    let Some(layout) = layout else {
        return frame;
    };

    let origin_x = layout.viewport.margins.left;
    let origin_y = layout.viewport.margins.top;
    let plot = layout.plot;

    for candle in &layout.candles {
        let (rect, wick) = candle_primitives(candle, origin_x, origin_y);
        frame.rects.push(rect);
        frame.lines.push(wick);
    }

    let axis_y = origin_y + plot.height;
    frame.lines.push(LinePrimitive::new(
        origin_x,
        axis_y,
        origin_x + plot.width,
        axis_y,
        AXIS_STROKE_WIDTH_PX,
        AXIS_COLOR,
    ));
    for tick in &layout.tick_labels {
        let x = origin_x + tick.pixel_position;
        frame.lines.push(LinePrimitive::new(
            x,
            axis_y,
            x,
            axis_y + AXIS_TICK_LENGTH_PX,
            AXIS_STROKE_WIDTH_PX,
            AXIS_COLOR,
        ));
        let text = tick.display_text();
        if !text.is_empty() {
            frame.texts.push(
                TextPrimitive::new(
                    text,
                    x,
                    axis_y + AXIS_LABEL_OFFSET_PX,
                    AXIS_FONT_SIZE_PX,
                    AXIS_COLOR,
                    TextHAlign::Right,
                )
                .with_rotation_deg(TIME_LABEL_ROTATION_DEG),
            );
        }
    }

    let axis_x = origin_x + plot.width;
    frame.lines.push(LinePrimitive::new(
        axis_x,
        origin_y,
        axis_x,
        origin_y + plot.height,
        AXIS_STROKE_WIDTH_PX,
        AXIS_COLOR,
    ));
    for tick in &layout.price_ticks {
        let y = origin_y + tick.pixel_y;
        frame.lines.push(LinePrimitive::new(
            axis_x,
            y,
            axis_x + AXIS_TICK_LENGTH_PX,
            y,
            AXIS_STROKE_WIDTH_PX,
            AXIS_COLOR,
        ));
        frame.texts.push(TextPrimitive::new(
            tick.text.clone(),
            axis_x + AXIS_LABEL_OFFSET_PX,
            y,
            AXIS_FONT_SIZE_PX,
            AXIS_COLOR,
            TextHAlign::Left,
        ));
    }

    frame.lines.extend(crosshair_lines(layout, crosshair));
    frame
}

fn candle_primitives(
    candle: &CandleGeometry,
    origin_x: f64,
    origin_y: f64,
) -> (RectPrimitive, LinePrimitive) {
    // Solid down-candles, hollow up-candles.
    let (stroke, fill) = match candle.sentiment {
        Sentiment::Bearish => (BEARISH_COLOR, BEARISH_COLOR),
        Sentiment::Bullish => (BULLISH_COLOR, Color::TRANSPARENT),
    };

    let body = RectPrimitive::new(
        origin_x + candle.body_x,
        origin_y + candle.body_y,
        candle.body_width,
        candle.rendered_body_height(),
        fill,
    )
    .with_border(CANDLE_STROKE_WIDTH_PX, stroke);

    let wick = LinePrimitive::new(
        origin_x + candle.wick_x,
        origin_y + candle.wick_y1,
        origin_x + candle.wick_x,
        origin_y + candle.wick_y2,
        CANDLE_STROKE_WIDTH_PX,
        stroke,
    );
    (body, wick)
}

/// Vertical and horizontal dashed guides through the tracked bar.
fn crosshair_lines(layout: &ChartLayout, crosshair: &CrosshairState) -> SmallVec<[LinePrimitive; 2]> {
    let mut lines = SmallVec::new();
    let Some(tooltip) = crosshair.tooltip.filter(|_| crosshair.is_tracking()) else {
        return lines;
    };

    let origin_x = layout.viewport.margins.left;
    let origin_y = layout.viewport.margins.top;
    let x = origin_x + tooltip.pixel_x;
    let y = origin_y + tooltip.pixel_y;

    lines.push(
        LinePrimitive::new(
            x,
            origin_y,
            x,
            origin_y + layout.plot.height,
            AXIS_STROKE_WIDTH_PX,
            CROSSHAIR_COLOR,
        )
        .with_stroke_style(LineStrokeStyle::Dashed),
    );
    lines.push(
        LinePrimitive::new(
            origin_x,
            y,
            origin_x + layout.plot.width,
            y,
            AXIS_STROKE_WIDTH_PX,
            CROSSHAIR_COLOR,
        )
        .with_stroke_style(LineStrokeStyle::Dashed),
    );
    lines
}

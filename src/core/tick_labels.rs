use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::core::{HorizontalScale, OhlcBar, candle_center_x};
use crate::error::{ChartError, ChartResult};

/// Largest supported label timezone shift, in minutes (UTC+14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Aggregation cadence of the bars; keys the time label format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Second,
    #[default]
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Self; 8] = [
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// `chrono` format string for labels at this granularity.
    #[must_use]
    pub fn label_format(self) -> &'static str {
        match self {
            // time of day, e.g. `9:35 AM`
            Self::Second | Self::Minute | Self::Hour => "%-I:%M %p",
            // calendar date, e.g. `01/09/2023`
            Self::Day | Self::Week | Self::Month | Self::Quarter => "%m/%d/%Y",
            Self::Year => "%Y",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ChartError;

    fn from_str(input: &str) -> ChartResult<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|granularity| granularity.as_str() == normalized)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown timespan `{input}`")))
    }
}

/// Horizontal axis tick for one bar.
///
/// `text` is always the formatted timestamp, hidden or not, so a label can be
/// shown without reformatting. What the axis paints is [`TickLabel::display_text`],
/// empty when `visible` is false; snapshot consumers should check `visible`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    pub pixel_position: f64,
    pub text: String,
    pub visible: bool,
}

impl TickLabel {
    /// Text to draw: the formatted label when visible, empty otherwise.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if self.visible { &self.text } else { "" }
    }
}

/// Formats bar timestamps and thins labels as bars get narrower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickLabelPolicy {
    pub granularity: Granularity,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl TickLabelPolicy {
    #[must_use]
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            utc_offset_minutes: 0,
        }
    }

    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ChartError::InvalidData(format!(
                "utc offset must be within +/-{MAX_UTC_OFFSET_MINUTES} minutes"
            )));
        }
        Ok(self)
    }

    /// Formats an epoch-millis timestamp; unrepresentable instants fall back to the raw number.
    #[must_use]
    pub fn format_timestamp(self, timestamp: i64) -> String {
        let Some(offset) = FixedOffset::east_opt(self.utc_offset_minutes * 60) else {
            return timestamp.to_string();
        };
        match DateTime::from_timestamp_millis(timestamp) {
            Some(time) => time
                .with_timezone(&offset)
                .format(self.granularity.label_format())
                .to_string(),
            None => timestamp.to_string(),
        }
    }

    /// Builds one tick per bar, positioned under the candle center.
    #[must_use]
    pub fn build_tick_labels(self, bars: &[OhlcBar], horizontal: &HorizontalScale) -> Vec<TickLabel> {
        let box_width = horizontal.box_width();
        bars.iter()
            .enumerate()
            .map(|(index, bar)| TickLabel {
                pixel_position: candle_center_x(horizontal.bar_x(index, bar.timestamp), box_width),
                text: self.format_timestamp(bar.timestamp),
                visible: is_tick_label_visible(index, box_width),
            })
            .collect()
    }
}

/// Decides whether the label at `index` is drawn given `box_width` pixels per bar.
///
/// Brackets are checked from widest to narrowest and the first match wins;
/// index 0 is always shown.
#[must_use]
pub fn is_tick_label_visible(index: usize, box_width: f64) -> bool {
    if index == 0 {
        return true;
    }
    index % tick_label_modulus(box_width) == 0
}

/// Label period for a `box_width` bracket.
#[must_use]
pub fn tick_label_modulus(box_width: f64) -> usize {
    if box_width > 10.0 {
        1
    } else if (3.0..=10.0).contains(&box_width) {
        3
    } else if (2.5..3.0).contains(&box_width) {
        6
    } else if (2.25..2.5).contains(&box_width) {
        12
    } else if box_width < 2.25 {
        24
    } else {
        // only NaN lands here
        2
    }
}

#[cfg(test)]
mod tests {
    use super::{Granularity, TickLabelPolicy, is_tick_label_visible, tick_label_modulus};

    #[test]
    fn modulus_staircase_matches_brackets() {
        assert_eq!(tick_label_modulus(10.5), 1);
        assert_eq!(tick_label_modulus(10.0), 3);
        assert_eq!(tick_label_modulus(3.0), 3);
        assert_eq!(tick_label_modulus(2.99), 6);
        assert_eq!(tick_label_modulus(2.5), 6);
        assert_eq!(tick_label_modulus(2.4), 12);
        assert_eq!(tick_label_modulus(2.25), 12);
        assert_eq!(tick_label_modulus(2.0), 24);
        assert_eq!(tick_label_modulus(f64::NAN), 2);
    }

    #[test]
    fn first_label_is_always_visible() {
        assert!(is_tick_label_visible(0, 0.1));
        assert!(is_tick_label_visible(0, f64::NAN));
        assert!(!is_tick_label_visible(1, f64::NAN));
        assert!(is_tick_label_visible(2, f64::NAN));
    }

    #[test]
    fn formats_by_granularity() {
        // 2023-01-09T14:35:00Z
        let ts = 1_673_274_900_000;
        assert_eq!(
            TickLabelPolicy::new(Granularity::Minute).format_timestamp(ts),
            "2:35 PM"
        );
        assert_eq!(
            TickLabelPolicy::new(Granularity::Day).format_timestamp(ts),
            "01/09/2023"
        );
        assert_eq!(
            TickLabelPolicy::new(Granularity::Year).format_timestamp(ts),
            "2023"
        );
    }

    #[test]
    fn utc_offset_shifts_time_of_day() {
        let ts = 1_673_274_900_000;
        let policy = TickLabelPolicy::new(Granularity::Hour).with_utc_offset_minutes(-5 * 60);
        assert_eq!(policy.format_timestamp(ts), "9:35 AM");
    }

    #[test]
    fn parses_wire_timespan_names() {
        assert_eq!("minute".parse::<Granularity>().ok(), Some(Granularity::Minute));
        assert_eq!(" Quarter ".parse::<Granularity>().ok(), Some(Granularity::Quarter));
        assert!("fortnight".parse::<Granularity>().is_err());
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let policy = TickLabelPolicy::new(Granularity::Day).with_utc_offset_minutes(15 * 60);
        assert!(policy.validate().is_err());
    }
}

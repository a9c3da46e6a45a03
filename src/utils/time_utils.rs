use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const SECS_IN_MIN: i64 = 60;
    pub const SECS_IN_3_MIN: i64 = Self::SECS_IN_MIN * 3;
    pub const SECS_IN_5_MIN: i64 = Self::SECS_IN_MIN * 5;
    pub const SECS_IN_15_MIN: i64 = Self::SECS_IN_MIN * 15;
    pub const SECS_IN_30_MIN: i64 = Self::SECS_IN_MIN * 30;
    pub const SECS_IN_H: i64 = Self::SECS_IN_MIN * 60;
    pub const SECS_IN_2_H: i64 = Self::SECS_IN_H * 2;
    pub const SECS_IN_4_H: i64 = Self::SECS_IN_H * 4;
    pub const SECS_IN_6_H: i64 = Self::SECS_IN_H * 6;
    pub const SECS_IN_8_H: i64 = Self::SECS_IN_H * 8;
    pub const SECS_IN_12_H: i64 = Self::SECS_IN_H * 12;
    pub const SECS_IN_D: i64 = Self::SECS_IN_H * 24;
    pub const SECS_IN_3_D: i64 = Self::SECS_IN_D * 3;
    pub const SECS_IN_W: i64 = Self::SECS_IN_D * 7;
    pub const SECS_IN_1_M: i64 = Self::SECS_IN_D * 30;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Parse a Binance-style interval shorthand (e.g. `15m`, `4h`, `1M`) into seconds.
    ///
    /// Lower-case `m` is minutes and upper-case `M` is months, matching exchange conventions.
    /// Returns `None` for anything that does not look like `<count><unit>`.
    pub fn interval_label_to_secs(label: &str) -> Option<i64> {
        let label = label.trim();
        let unit = label.chars().last()?;
        let count: i64 = label[..label.len() - unit.len_utf8()].parse().ok()?;
        if count <= 0 {
            return None;
        }
        let unit_secs = match unit {
            's' => 1,
            'm' => Self::SECS_IN_MIN,
            'h' | 'H' => Self::SECS_IN_H,
            'd' | 'D' => Self::SECS_IN_D,
            'w' | 'W' => Self::SECS_IN_W,
            'M' => Self::SECS_IN_1_M,
            _ => return None,
        };
        count.checked_mul(unit_secs)
    }

    /// Convert an interval in seconds back to its shorthand (e.g. `1800` -> `30m`).
    pub fn interval_secs_to_string(interval_secs: i64) -> &'static str {
        match interval_secs {
            1 => "1s",
            Self::SECS_IN_MIN => "1m",
            Self::SECS_IN_3_MIN => "3m",
            Self::SECS_IN_5_MIN => "5m",
            Self::SECS_IN_15_MIN => "15m",
            Self::SECS_IN_30_MIN => "30m",
            Self::SECS_IN_H => "1h",
            Self::SECS_IN_2_H => "2h",
            Self::SECS_IN_4_H => "4h",
            Self::SECS_IN_6_H => "6h",
            Self::SECS_IN_8_H => "8h",
            Self::SECS_IN_12_H => "12h",
            Self::SECS_IN_D => "1d",
            Self::SECS_IN_3_D => "3d",
            Self::SECS_IN_W => "1w",
            Self::SECS_IN_1_M => "1M",
            _ => "unknown",
        }
    }
}

/// Median spacing between consecutive timestamps, in seconds.
/// Returns `None` when fewer than two timestamps exist or none of the gaps are positive.
pub fn median_spacing_secs(times: &[i64]) -> Option<i64> {
    let mut gaps: Vec<i64> = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0)
        .collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_unstable();
    Some(gaps[gaps.len() / 2])
}

pub fn epoch_sec_to_utc(epoch_sec: i64) -> String {
    // Used for display purposes
    match DateTime::<Utc>::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

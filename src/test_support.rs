// Candle fixtures shared by the unit tests.

use chrono::{DateTime, Utc};

use crate::domain::{Candle, MultiTimeframeData, TimeframeData};

pub const BASE_VOLUME: f64 = 1000.0;
pub const HOUR: i64 = 3600;

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid fixture timestamp")
}

/// Candle with the given range; body spans the middle half of it.
pub fn candle_hl(time: i64, high: f64, low: f64) -> Candle {
    let range = high - low;
    Candle::new(
        time,
        low + range * 0.25,
        high,
        low,
        low + range * 0.75,
        BASE_VOLUME,
    )
}

/// Every price equal, hourly bars.
pub fn flat_series(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle::new(i as i64 * HOUR, price, price, price, price, BASE_VOLUME))
        .collect()
}

/// Hourly triangle wave around `base + slope * i`.
///
/// Closes peak at `i % (2 * half_period) == 0` and bottom out half a period later. Wicks
/// extend 0.2 beyond the close and the open leans at most 0.15 towards the previous close.
/// Swing highs/lows are strict as long as `slope < 2 * amplitude / half_period`.
pub fn zigzag_series(
    n: usize,
    base: f64,
    slope: f64,
    amplitude: f64,
    half_period: usize,
) -> Vec<Candle> {
    let h = half_period.max(1) as f64;
    let period = 2 * half_period.max(1);
    let mut prev_close: Option<f64> = None;

    (0..n)
        .map(|i| {
            let phase = (i % period) as f64;
            let tri = (phase - h).abs() / h * 2.0 - 1.0;
            let close = base + slope * i as f64 + amplitude * tri;
            let open = close + prev_close.map_or(0.0, |p| (p - close).clamp(-0.15, 0.15));
            prev_close = Some(close);
            Candle::new(
                i as i64 * HOUR,
                open,
                close + 0.2,
                close - 0.2,
                close,
                BASE_VOLUME,
            )
        })
        .collect()
}

/// Re-times a series onto a different bar length, keeping prices.
pub fn respaced(candles: &[Candle], interval_secs: i64) -> Vec<Candle> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| Candle {
            time: i as i64 * interval_secs,
            ..*c
        })
        .collect()
}

/// 30 hourly bars trading 101.2-102 with three 2x-volume tests of 100 (bars 5, 15, 22)
/// that close on the level and recover within the next bar.
pub fn tested_support_series() -> Vec<Candle> {
    (0..30)
        .map(|i| {
            let time = i as i64 * HOUR;
            if [5, 15, 22].contains(&i) {
                Candle::new(time, 100.4, 100.5, 100.0, 100.03, 2.0 * BASE_VOLUME)
            } else {
                Candle::new(time, 101.5, 102.0, 101.2, 101.6, BASE_VOLUME)
            }
        })
        .collect()
}

pub fn snapshot(symbol: &str, timeframes: Vec<(&str, Vec<Candle>)>) -> MultiTimeframeData {
    timeframes
        .into_iter()
        .fold(MultiTimeframeData::new(symbol, fixed_time()), |data, (label, candles)| {
            data.with_timeframe(label, TimeframeData::new(candles))
        })
}

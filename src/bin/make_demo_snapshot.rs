use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;

use line_sniper::data::save_snapshot;
use line_sniper::utils::TimeUtils;
use line_sniper::{Candle, MultiTimeframeData, TimeframeData};

#[derive(Parser, Debug)]
#[command(about = "Write a synthetic multi-timeframe snapshot for demos")]
struct Args {
    /// Output path
    #[arg(long, short, default_value = "demo_snapshot.json")]
    output: PathBuf,

    #[arg(long, default_value = "DEMOUSDT")]
    symbol: String,

    /// Candles per timeframe
    #[arg(long, default_value_t = 300)]
    candles: usize,
}

// Unix time of the last candle close: 2024-01-01 00:00 UTC
const END_TIME: i64 = 1_704_067_200;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let fetched_at = DateTime::<Utc>::from_timestamp(END_TIME, 0).unwrap_or_default();

    let data = [
        ("1h", TimeUtils::SECS_IN_H, 1.0),
        ("4h", TimeUtils::SECS_IN_4_H, 1.5),
        ("1d", TimeUtils::SECS_IN_D, 2.0),
    ]
    .into_iter()
    .fold(
        MultiTimeframeData::new(args.symbol.clone(), fetched_at),
        |data, (label, interval, weight)| {
            let candles = demo_candles(args.candles, interval);
            data.with_timeframe(label, TimeframeData::new(candles).with_weight(weight))
        },
    );

    save_snapshot(&data, &args.output)?;
    println!(
        "✅ Demo snapshot for {} written to {:?} ({} timeframes x {} candles)",
        data.symbol,
        args.output,
        data.timeframes.len(),
        args.candles
    );
    Ok(())
}

/// A slow uptrend with a fixed-period swing, ending at `END_TIME`.
///
/// The swing period is the same number of bars on every timeframe, so range extremes and
/// trough lines recur across timeframes. Volume spikes on swing lows.
fn demo_candles(n: usize, interval: i64) -> Vec<Candle> {
    const HALF_PERIOD: usize = 6;
    let start = END_TIME - n as i64 * interval;
    let mut prev_close: Option<f64> = None;

    (0..n)
        .map(|i| {
            let phase = (i % (2 * HALF_PERIOD)) as f64;
            let h = HALF_PERIOD as f64;
            let wave = (phase - h).abs() / h * 2.0 - 1.0;
            let close = 100.0 + 0.05 * i as f64 + 4.0 * wave;
            let open = close + prev_close.map_or(0.0, |p| (p - close).clamp(-0.3, 0.3));
            prev_close = Some(close);

            let volume = if (phase - h).abs() < 1.0 { 2500.0 } else { 1000.0 };
            Candle::new(
                start + i as i64 * interval,
                open,
                open.max(close) + 0.25,
                open.min(close) - 0.25,
                close,
                volume,
            )
        })
        .collect()
}

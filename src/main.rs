use anyhow::{Context, Result};
use clap::Parser;

use line_sniper::data::{load_config, load_snapshot};
use line_sniper::{Cli, DetectionConfig, DetectionResult, LineDetectionEngine};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => DetectionConfig::default(),
    };
    let engine = LineDetectionEngine::new(config).context("Invalid detection config")?;
    let data = load_snapshot(&args.input)?;

    let result = engine.detect(&data);
    let validation = args.validate_price.map(|price| engine.validate_price(&data, price));

    if args.json {
        let output = serde_json::json!({
            "result": result,
            "validation": validation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(&result);
    if let Some(v) = validation {
        print_price_context(&result, v.price);
        println!();
        println!(
            "Price {:.4}: validation score {:.3}, avg strength {:.3}",
            v.price, v.validation_score, v.average_strength
        );
        for (label, touches) in &v.touches_per_timeframe {
            println!("  {label}: {touches} touches");
        }
        if v.supporting_timeframes.is_empty() {
            println!("  no timeframe touches this price");
        }
    }
    Ok(())
}

fn print_summary(result: &DetectionResult) {
    let stats = &result.detection_stats;
    println!(
        "{}: {} horizontal, {} trendlines, {} zones ({} candidates, {} passed touches, {} passed quality, {}ms)",
        result.symbol,
        result.horizontal_lines.len(),
        result.trendlines.len(),
        result.confluence_zones.len(),
        stats.total_candidates,
        stats.touch_filtered,
        stats.quality_filtered,
        stats.processing_time_ms
    );

    if !result.horizontal_lines.is_empty() {
        println!("\nHorizontal levels:");
        for line in &result.horizontal_lines {
            println!("  {line}");
        }
    }
    if !result.trendlines.is_empty() {
        println!("\nTrendlines:");
        for line in &result.trendlines {
            println!("  {line}");
        }
    }
    if !result.confluence_zones.is_empty() {
        println!("\nConfluence zones:");
        for zone in &result.confluence_zones {
            println!(
                "  {} {:.4}-{:.4} | strength {:.2} | {} levels | tfs {}",
                zone.zone_type,
                zone.price_range.min,
                zone.price_range.max,
                zone.strength,
                zone.level_count(),
                zone.supporting_timeframes.join(",")
            );
        }
    }
}

fn print_price_context(result: &DetectionResult, price: f64) {
    println!();
    if let Some(line) = result.nearest_support(price) {
        println!("Nearest support below {price:.4}: {line}");
    }
    if let Some(line) = result.nearest_resistance(price) {
        println!("Nearest resistance above {price:.4}: {line}");
    }
    for zone in result.zones_at_price(price) {
        println!(
            "Inside {} zone {:.4}-{:.4} (width {:.4}, {} levels)",
            zone.zone_type,
            zone.price_range.min,
            zone.price_range.max,
            zone.price_range.width(),
            zone.level_count()
        );
    }
}

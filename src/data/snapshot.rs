use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::DetectionConfig;
use crate::domain::MultiTimeframeData;

/// Reads a multi-timeframe candle snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<MultiTimeframeData> {
    let file = File::open(path).context(format!("Failed to open snapshot: {}", path.display()))?;
    let reader = BufReader::new(file);
    let data: MultiTimeframeData = serde_json::from_reader(reader)
        .context(format!("Failed to parse snapshot: {}", path.display()))?;

    log::info!(
        "Loaded snapshot for {} ({} timeframes) from {}",
        data.symbol,
        data.timeframes.len(),
        path.display()
    );
    Ok(data)
}

pub fn save_snapshot(data: &MultiTimeframeData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, data)
        .context(format!("Failed to write snapshot to: {}", path.display()))
}

/// Reads detection overrides from a JSON file. Missing fields keep their defaults.
///
/// The result is not validated here; `LineDetectionEngine::new` does that.
pub fn load_config(path: &Path) -> Result<DetectionConfig> {
    let file = File::open(path).context(format!("Failed to open config: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse config: {}", path.display()))
}

// Snapshot and config files for the binaries. The detection core never touches the filesystem.
pub mod snapshot;

pub use snapshot::{load_config, load_snapshot, save_snapshot};

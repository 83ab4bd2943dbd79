/// Tracing setup for the binary.
///
/// The terminal is owned by the renderer, so log lines go to a file.
/// `RUST_LOG` overrides the default `info` filter.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("dungeon_crawler.log")
}

/// Install the global subscriber writing to `path`.  Only the first call
/// has any effect.
pub fn init_file_logging(path: &Path) -> std::io::Result<()> {
    // A later call must not truncate the file the live subscriber writes to.
    if TRACING_INIT.is_completed() {
        return Ok(());
    }
    let file = File::create(path)?;
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .compact();
        // Another subscriber may already be installed (tests).
        let _ = subscriber.try_init();
    });
    Ok(())
}

//! Graceful shutdown via atomic flag
//!
//! SIGINT/SIGTERM set the flag; the collector and the ingest loop check it
//! between queries and between partition writes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

static FLAG: LazyLock<Arc<AtomicBool>> = LazyLock::new(|| Arc::new(AtomicBool::new(false)));

pub fn is_shutdown_requested() -> bool {
    FLAG.load(Ordering::Relaxed)
}

/// Set the flag directly (tests, or internal bail-out paths).
pub fn request_shutdown() {
    FLAG.store(true, Ordering::Relaxed);
}

/// Route SIGINT and SIGTERM to the flag.
pub fn install_signal_handlers() -> anyhow::Result<()> {
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&FLAG))?;
    }
    Ok(())
}

//! Application constants in one place.

use std::sync::OnceLock;

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Config file looked up in the working directory (CLI only).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Timeout correction ----

/// Fixed prompt handed to a reactive collaborator that declares it takes one.
pub const TIMEOUT_PROMPT: &str = "A timeout event has occurred, please take appropriate action.";

/// Name of the one-shot timer thread (shows up in log lines from that thread).
pub const TIMER_THREAD_NAME: &str = "timeout";

// ---- Roots ----

/// Root used when none are given.
pub const DEFAULT_ROOT: &str = ".";

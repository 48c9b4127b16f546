//! Qrforge Core - QR code studio library
//!
//! This library provides the domain logic behind the qrforge CLI:
//! payload grammars for the supported content types, capacity
//! estimation, symbol rendering with style presets, still-image
//! decoding, and a SQLite-backed store for users, history, favorites
//! and usage analytics.

pub mod capacity;
pub mod payload;
pub mod render;
pub mod scan;
pub mod store;
pub mod style;

mod error;

pub use error::{Error, Result};

/// Configuration for the qrforge application
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to store persistent data (the SQLite database)
    pub data_dir: std::path::PathBuf,
}

impl Config {
    /// Location of the database file inside the data directory.
    pub fn db_path(&self) -> std::path::PathBuf {
        self.data_dir.join("qrforge.db")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs_home().join(".qrforge"),
        }
    }
}

fn dirs_home() -> std::path::PathBuf {
    dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."))
}

// Re-export key types for convenience
pub use capacity::CapacityEstimate;
pub use payload::{PayloadKind, PayloadRequest, WifiSecurity};
pub use qrcode::QrCode;
pub use store::Store;
pub use style::{EccLevel, Rgb, StyleOptions};

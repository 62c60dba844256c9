//! Paloma application settings
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const STANDARD_PORT_HTTP: u16 = 8420;
pub const DEFAULT_PORT_HTTP: &str = "8420";

/// Pacing and batching knobs for bulk dispatch.
///
/// The defaults match the downstream platform's tolerance: 25 sends per
/// 60-second window, five recipients per batch, a full second of settling
/// time between batches, and operator confirmation for anything above 50
/// recipients.
#[derive(Clone, Debug)]
pub struct DispatchSettings {
    // Pacer: max sends allowed per window
    pub pacer_max_sends: u32,

    // Pacer: length of the fixed window
    pub pacer_window: Duration,

    // Recipients launched concurrently per batch
    pub batch_size: usize,

    // Unconditional settling delay between batches
    pub batch_delay: Duration,

    // Slack added on top of the reported window remainder before a retry
    pub retry_slack: Duration,

    // Recipient count above which operator confirmation is required
    pub confirm_threshold: usize,

    // How long to wait for that confirmation
    pub confirm_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            pacer_max_sends: 25,
            pacer_window: Duration::from_secs(60),
            batch_size: 5,
            batch_delay: Duration::from_millis(1000),
            retry_slack: Duration::from_millis(100),
            confirm_threshold: 50,
            confirm_timeout: Duration::from_millis(30_000),
        }
    }
}

impl DispatchSettings {
    pub fn validate(&self) -> Result<()> {
        if self.pacer_max_sends == 0 {
            return Err(crate::config_error!("pacer-max-sends must be at least 1"));
        }
        if self.pacer_window.is_zero() {
            return Err(crate::config_error!("pacer-window must be non-zero"));
        }
        if self.batch_size == 0 {
            return Err(crate::config_error!("batch-size must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    // Server listen address
    pub listen_address: String,

    // HTTP API listen port
    pub listen_port: u16,

    // Optional path to the JSON roster of audience groups
    pub roster_path: Option<PathBuf>,

    // Dispatch pacing and batching configuration
    pub dispatch: DispatchSettings,
}

impl Settings {
    pub fn dispatch_settings(&self) -> DispatchSettings {
        self.dispatch.clone()
    }
}

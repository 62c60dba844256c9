//! CLI for this application
//!
use std::path::PathBuf;
use std::time::Duration;

use crate::settings;

#[derive(Clone, Debug, clap::Parser)]
pub struct Cli {
    // Server listen address
    #[clap(
        long,
        default_value = "0.0.0.0",
        env("PALOMA_LISTEN_ADDRESS"),
        help = "IP Address to listen on"
    )]
    pub listen_address: String,

    // HTTP API listen port
    #[clap(
        long,
        default_value = settings::DEFAULT_PORT_HTTP,
        env("PALOMA_HTTP_LISTEN_PORT"),
        help = "Port to bind the Paloma HTTP API server to"
    )]
    pub listen_port: u16,

    // Audience roster file
    #[clap(
        long,
        env("PALOMA_ROSTER"),
        help = "Path to the JSON audience roster (group name -> member list)"
    )]
    pub roster: Option<PathBuf>,

    // Pacer settings: max sends (over window)
    #[clap(
        long,
        default_value = "25",
        env("PALOMA_PACER_MAX_SENDS"),
        help = "Max sends allowed per pacing window"
    )]
    pub pacer_max_sends: u32,

    // Pacer settings: window length in seconds
    #[clap(
        long,
        default_value = "60",
        env("PALOMA_PACER_WINDOW_SECONDS"),
        help = "Pacing window length in seconds"
    )]
    pub pacer_window_seconds: u64,

    // Recipients launched concurrently per batch
    #[clap(
        long,
        default_value = "5",
        env("PALOMA_BATCH_SIZE"),
        help = "Recipients delivered concurrently per batch"
    )]
    pub batch_size: usize,

    // Settling delay between batches
    #[clap(
        long,
        default_value = "1000",
        env("PALOMA_BATCH_DELAY_MS"),
        help = "Settling delay between batches in milliseconds"
    )]
    pub batch_delay_ms: u64,

    // Confirmation threshold for oversized broadcasts
    #[clap(
        long,
        default_value = "50",
        env("PALOMA_CONFIRM_THRESHOLD"),
        help = "Recipient count above which operator confirmation is required"
    )]
    pub confirm_threshold: usize,

    // Confirmation timeout for oversized broadcasts
    #[clap(
        long,
        default_value = "30",
        env("PALOMA_CONFIRM_TIMEOUT_SECONDS"),
        help = "Seconds to wait for confirmation of an oversized broadcast"
    )]
    pub confirm_timeout_seconds: u64,
}

impl Cli {
    pub fn into_settings(self) -> settings::Settings {
        settings::Settings {
            listen_address: self.listen_address,
            listen_port: self.listen_port,
            roster_path: self.roster,
            dispatch: settings::DispatchSettings {
                pacer_max_sends: self.pacer_max_sends,
                pacer_window: Duration::from_secs(self.pacer_window_seconds),
                batch_size: self.batch_size,
                batch_delay: Duration::from_millis(self.batch_delay_ms),
                confirm_threshold: self.confirm_threshold,
                confirm_timeout: Duration::from_secs(self.confirm_timeout_seconds),
                ..settings::DispatchSettings::default()
            },
        }
    }
}

//! Paloma: rate-limited bulk-notification dispatch as a service.
//!
//! One message goes out to a large, bounded set of recipients without
//! tripping the downstream platform's anti-abuse detection. The pieces:
//!
//! - [`pacer`]: process-wide fixed-window send budget
//! - [`dispatch`]: batch-sequential, intra-batch-concurrent delivery with
//!   partial-failure tolerance and live progress
//! - [`cancel`]: per-job cancellation tokens linked to a cancel-all scope
//! - [`ports`]: collaborator seams (recipients, delivery, confirmation,
//!   progress)
//! - [`roster`] / [`sinks`]: the service's concrete collaborators
//! - [`api`]: HTTP surface for starting, confirming, observing, and
//!   cancelling broadcasts
pub mod api;
pub mod cancel;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod pacer;
pub mod ports;
pub mod roster;
pub mod settings;
pub mod sinks;

//! Pinlab command-line exercises
//!
//! The `pinlab` binary is a thin shell over these loops so they can be
//! driven in tests with a simulated board and scripted phrases.

pub mod blink;
pub mod phrases;
pub mod voice;

pub use blink::run_blink;
pub use phrases::{MicrophonePhrases, TypedPhrases};
pub use voice::{run_voice, VoiceSummary};

use tracing::warn;

/// Resolves on the first Ctrl-C
///
/// If the signal handler cannot be installed this never resolves, so the
/// loops keep running instead of exiting immediately.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

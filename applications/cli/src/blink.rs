//! Blink loop

use std::future::Future;

use pinlab_core::{Blinker, PinDriver, Result};
use tracing::info;

/// Toggle the LED every half-period until `shutdown` resolves
///
/// With `cycles` set, stops after that many on/off cycles. Returns the number
/// of completed cycles. The caller releases the blinker afterwards.
pub async fn run_blink<D, S>(
    blinker: &mut Blinker<D>,
    cycles: Option<u64>,
    shutdown: S,
) -> Result<u64>
where
    D: PinDriver,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    info!(
        pin = %blinker.pin(),
        half_period_ms = blinker.half_period().as_millis() as u64,
        "Blinking, press Ctrl+C to stop"
    );

    loop {
        if cycles.is_some_and(|limit| blinker.completed_cycles() >= limit) {
            break;
        }

        blinker.toggle()?;

        tokio::select! {
            () = tokio::time::sleep(blinker.half_period()) => {}
            () = &mut shutdown => {
                info!("Interrupted, stopping blink");
                break;
            }
        }
    }

    Ok(blinker.completed_cycles())
}

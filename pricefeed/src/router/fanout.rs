use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use pricefeed_core::{PollError, Subscriber};

/// Outcome of one [`fan_out`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Callbacks that returned `Ok`.
    pub delivered: usize,
    /// Callbacks that returned `Err` or panicked.
    pub failed: usize,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "callback panicked".to_string())
}

fn guarded<F>(f: F) -> Result<(), PollError>
where
    F: FnOnce() -> Result<(), PollError>,
{
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(PollError::subscriber(panic_message(payload.as_ref()))))
}

/// Invoke `f` for every subscriber, best effort.
///
/// A failing callback never stops delivery to the rest. Its error is wrapped
/// with the subscriber's identity, handed to that subscriber's
/// `on_update_error`, and logged.
pub fn fan_out<F>(subscribers: &[Arc<dyn Subscriber>], f: F) -> FanOutReport
where
    F: Fn(&dyn Subscriber) -> Result<(), PollError>,
{
    let mut report = FanOutReport::default();
    for s in subscribers {
        match guarded(|| f(s.as_ref())) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                let opts = s.options();
                let wrapped = PollError::subscriber(format!(
                    "error with subscriber {} {}{}: {e}",
                    opts.api, opts.base, opts.quote
                ));
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "pricefeed::fanout", error = %wrapped, "subscriber callback failed");
                if let Err(_nested) = guarded(|| s.on_update_error(&wrapped, None)) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(target: "pricefeed::fanout", error = %_nested, "subscriber error handler failed");
                }
            }
        }
    }
    report
}

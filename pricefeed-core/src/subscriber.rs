use crate::PollError;
use pricefeed_types::{PricePoint, SubscriptionOptions, Ticker};

/// External listener for one provider/ticker combination.
///
/// Callbacks run on the engine's tasks and must not block. A callback that
/// returns `Err` or panics is reported back through
/// [`on_update_error`](Self::on_update_error) and never affects delivery to
/// other subscribers.
pub trait Subscriber: Send + Sync {
    /// The subscriber's declared interest.
    fn options(&self) -> &SubscriptionOptions;

    /// A network refresh of this subscriber's URL is starting.
    ///
    /// # Errors
    /// Any error is logged and routed back to `on_update_error`.
    fn on_update_start(&self) -> Result<(), PollError> {
        Ok(())
    }

    /// A refresh failed. `ticker` is set when the failure is specific to one pair.
    ///
    /// # Errors
    /// Errors returned here are logged and dropped.
    fn on_update_error(&self, error: &PollError, ticker: Option<&Ticker>) -> Result<(), PollError>;

    /// New price history for this subscriber's ticker, newest first.
    ///
    /// # Errors
    /// Any error is logged and routed back to `on_update_error`.
    fn on_update_price_data(&self, history: &[PricePoint]) -> Result<(), PollError>;
}

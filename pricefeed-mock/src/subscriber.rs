use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use pricefeed_core::{PollError, PricePoint, Subscriber, SubscriptionOptions, Ticker};

/// One callback observed by a [`RecordingSubscriber`].
#[derive(Clone, Debug, PartialEq)]
pub enum SubscriberEvent {
    /// `on_update_start`.
    Start,
    /// `on_update_error`.
    Error {
        /// The delivered error.
        error: PollError,
        /// Ticker the error was scoped to, if any.
        ticker: Option<Ticker>,
    },
    /// `on_update_price_data`.
    PriceData(Vec<PricePoint>),
}

/// How a recording subscriber misbehaves when handed price data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailMode {
    /// Accept every callback.
    #[default]
    Never,
    /// Return an error from `on_update_price_data`.
    ReturnErr,
    /// Panic inside `on_update_price_data`.
    Panic,
}

/// Subscriber that records every callback and mirrors it onto a channel.
pub struct RecordingSubscriber {
    options: SubscriptionOptions,
    fail: FailMode,
    events: Mutex<Vec<SubscriberEvent>>,
    tx: mpsc::UnboundedSender<SubscriberEvent>,
}

impl RecordingSubscriber {
    /// Well-behaved subscriber for `options`.
    #[must_use]
    pub fn new(
        options: SubscriptionOptions,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SubscriberEvent>) {
        Self::with_fail_mode(options, FailMode::Never)
    }

    /// Subscriber whose price callback fails according to `fail`.
    #[must_use]
    pub fn with_fail_mode(
        options: SubscriptionOptions,
        fail: FailMode,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SubscriberEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let me = Arc::new(Self {
            options,
            fail,
            events: Mutex::new(Vec::new()),
            tx,
        });
        (me, rx)
    }

    /// Copy of every event seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<SubscriberEvent> {
        self.events
            .lock()
            .map(|g| g.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    fn record(&self, event: SubscriberEvent) {
        match self.events.lock() {
            Ok(mut g) => g.push(event.clone()),
            Err(p) => p.into_inner().push(event.clone()),
        }
        // Receiver may have been dropped by a test that only inspects `events`.
        let _ = self.tx.send(event);
    }
}

impl Subscriber for RecordingSubscriber {
    fn options(&self) -> &SubscriptionOptions {
        &self.options
    }

    fn on_update_start(&self) -> Result<(), PollError> {
        self.record(SubscriberEvent::Start);
        Ok(())
    }

    fn on_update_error(&self, error: &PollError, ticker: Option<&Ticker>) -> Result<(), PollError> {
        self.record(SubscriberEvent::Error {
            error: error.clone(),
            ticker: ticker.cloned(),
        });
        Ok(())
    }

    fn on_update_price_data(&self, history: &[PricePoint]) -> Result<(), PollError> {
        match self.fail {
            FailMode::Never => {
                self.record(SubscriberEvent::PriceData(history.to_vec()));
                Ok(())
            }
            FailMode::ReturnErr => Err(PollError::subscriber("display refused update")),
            FailMode::Panic => panic!("subscriber exploded"),
        }
    }
}

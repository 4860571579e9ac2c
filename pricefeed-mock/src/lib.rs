//! Test doubles for the pricefeed engine: a scriptable transport, a
//! fictional exchange adapter, and a recording subscriber.

mod adapter;
mod subscriber;
mod transport;

pub use adapter::MockAdapter;
pub use subscriber::{FailMode, RecordingSubscriber, SubscriberEvent};
pub use transport::{
    DynamicMockController, DynamicMockTransport, MockBehavior, RecordedRequest, ResponseHook,
};

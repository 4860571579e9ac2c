pub mod fanout;
pub mod scheduler;
pub mod subscriptions;

pub use fanout::{FanOutReport, fan_out};
pub use scheduler::PollScheduler;
pub use subscriptions::{Filter, Subscription, SubscriptionSet};

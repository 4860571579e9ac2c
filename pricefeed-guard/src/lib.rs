//! pricefeed-guard
//!
//! Provider-wide protection state: a failure-count circuit breaker and a
//! sticky, self-expiring error set by explicit rate-limit responses.

mod breaker;
mod permanent;
mod registry;

pub use crate::breaker::{CircuitBreaker, CircuitState};
pub use crate::permanent::PermanentError;
pub use crate::registry::{GuardSnapshot, HealthRegistry, ProviderGuard};

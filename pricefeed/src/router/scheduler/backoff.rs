use std::time::Duration;

use rand::Rng;

use pricefeed_core::RetryConfig;

/// `base_ms` plus up to `jitter_percent` percent of random extra delay.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms.saturating_add(rng.random_range(0..jitter_range))
}

/// Un-jittered wait after failed attempt `attempt` (0-based): `base * factor^attempt`.
pub const fn retry_delay_ms(cfg: &RetryConfig, attempt: u32) -> u64 {
    let mult = (cfg.factor as u64).saturating_pow(attempt);
    cfg.base_delay_ms.saturating_mul(mult)
}

/// Wait before the attempt following failed attempt `attempt`.
pub fn retry_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
    Duration::from_millis(jitter_wait(
        retry_delay_ms(cfg, attempt),
        u32::from(cfg.jitter_percent),
    ))
}

//! # Call Policy
//!
//! Timeout and retry rules for collaborator calls.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bounded()   call ──► timeout ──► Ok / Err (no second attempt)          │
//! │              used for create_order, open_table, close_table, ...        │
//! │                                                                         │
//! │  retried()   call ──► timeout ──► Ok ──────────────────────────► done   │
//! │                          │                                              │
//! │                          └─ Err ─► attempts left? ─ no ─► Err           │
//! │                                         │                               │
//! │                                        yes                              │
//! │                                         ▼                               │
//! │                               sleep(next_backoff) ──► call again        │
//! │              used for list_products, list_orders, list_tables           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only calls that are safe to repeat go through `retried`. Repeating a
//! create could place the same order twice.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::{TransportError, TransportResult};

/// Timeout and retry settings for one engine.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        CallPolicy::from(&TransportConfig::default())
    }
}

impl From<&TransportConfig> for CallPolicy {
    fn from(config: &TransportConfig) -> Self {
        CallPolicy {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

impl CallPolicy {
    /// Runs a call once, bounded by the timeout.
    pub async fn bounded<T, F>(&self, operation: &'static str, call: F) -> TransportResult<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                operation,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Runs an idempotent call, retrying transport failures with
    /// exponential backoff up to `max_retries` extra attempts.
    pub async fn retried<T, F, Fut>(&self, operation: &'static str, mut call: F) -> TransportResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            match self.bounded(operation, call()).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt, "Call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        warn!(operation, attempts = attempt + 1, error = %e, "Giving up");
                        return Err(e);
                    }

                    let Some(delay) = backoff.next_backoff() else {
                        return Err(e);
                    };

                    attempt += 1;
                    debug!(operation, attempt, ?delay, error = %e, "Retrying after backoff");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff,
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_millis(100),
            max_retries,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(40),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: TransportResult<()> = policy(0)
            .bounded("create_order", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert_eq!(
            result,
            Err(TransportError::Timeout {
                operation: "create_order",
                timeout_ms: 100
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retried_recovers() {
        let attempts = AtomicU32::new(0);

        let result = policy(3)
            .retried("list_orders", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(TransportError::backend("list_orders", "flaky"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retried_gives_up() {
        let attempts = AtomicU32::new(0);

        let result: TransportResult<()> = policy(2)
            .retried("list_tables", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::backend("list_tables", "down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_is_single_attempt() {
        let attempts = AtomicU32::new(0);

        let _ = policy(0)
            .retried("list_products", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(TransportError::CatalogUnavailable("down".into())) }
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

// crates/resilience/src/lib.rs
//! Timing policies for remote calls
//!
//! This crate provides:
//! - A trailing-edge debouncer keyed by logical input channel
//! - Retry with exponential backoff for idempotent async operations
//!
//! # Example
//!
//! ```rust
//! use libris_resilience::{Debouncer, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let debouncer = Debouncer::new();
//! debouncer
//!     .schedule("search", Duration::from_millis(300), async {
//!         // runs once typing has paused for 300ms
//!     })
//!     .expect("inside a tokio runtime");
//!
//! let policy = RetryPolicy::new(3).with_initial_delay(Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! # }
//! ```

mod debounce;
mod error;
mod retry;

pub use debounce::{Debouncer, DEFAULT_QUIET_WINDOW};
pub use error::{ResilienceError, ResilienceResult};
pub use retry::{with_retry, RetryPolicy};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;

/// Millisecond-timestamp ids that never repeat within a process: a checkout
/// landing in the same millisecond as the previous one gets the next value.
pub fn timestamp_ids() -> impl Fn() -> String + Send + Sync + 'static {
    let last = Arc::new(AtomicU64::new(0));
    move || {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = last.load(Ordering::SeqCst);
        loop {
            let next = now.max(prev + 1);
            match last.compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return next.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// `<prefix>_<n>` ids counting up from 1.
pub fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

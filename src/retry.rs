/// Scheduled retry helper shared by the readiness and model gates
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Call `probe` until it yields a value or `timeout` has elapsed, sleeping
/// `interval` between attempts.
///
/// The probe receives the 1-based attempt number. Returns `None` on timeout.
/// The deadline is checked before every attempt, so a zero timeout never probes.
pub async fn retry_until<T, F, Fut>(mut probe: F, interval: Duration, timeout: Duration) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    while start.elapsed() < timeout {
        attempt += 1;
        if let Some(value) = probe(attempt).await {
            return Some(value);
        }
        tokio::time::sleep(interval).await;
    }

    None
}

//! Runtime and channel helpers shared by the binary and its background tasks.

use std::future::Future;
use tokio::sync::mpsc;

/// Run `future` to completion on a fresh multi-threaded runtime, then drop
/// the runtime without waiting for blocking tasks still in flight.
///
/// A notifier stuck inside `spawn_blocking` would otherwise keep the process
/// alive after the dashboard has quit.
pub fn block_on_detached<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

/// Send a value through a channel, logging if the receiver is gone.
///
/// Returns `false` once the channel is closed so producer loops can stop:
/// ```ignore
/// if !send_or_log(&tx, LoopEvent::ScanTick, "scan tick").await {
///     break;
/// }
/// ```
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) -> bool {
    match tx.send(value).await {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!("event queue closed, dropping {}", context);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_or_log_success() {
        let (tx, mut rx) = mpsc::channel(1);
        assert!(send_or_log(&tx, 42, "test value").await);
        assert_eq!(rx.recv().await, Some(42));
    }

    #[tokio::test]
    async fn test_send_or_log_closed_channel() {
        let (tx, rx) = mpsc::channel::<i32>(1);
        drop(rx);
        assert!(!send_or_log(&tx, 42, "test value").await);
    }

    #[test]
    fn test_block_on_detached_does_not_wait_for_blocking_tasks() {
        let started = std::time::Instant::now();
        let output = block_on_detached(async {
            let _sleeper = tokio::task::spawn_blocking(|| {
                std::thread::sleep(std::time::Duration::from_secs(10))
            });
            7
        })
        .unwrap();

        assert_eq!(output, 7);
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
    }
}

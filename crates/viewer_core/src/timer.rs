use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default slideshow period: one minute.
pub const DEFAULT_ADVANCE_INTERVAL: Duration = Duration::from_millis(60_000);

/// Handle to a repeating background tick. Dropping it cancels the tick.
#[derive(Debug)]
pub struct AutoAdvance {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

/// Calls `tick` every `interval` on a worker thread until the returned
/// handle is cancelled or dropped.
pub fn start_auto_advance<F>(interval: Duration, mut tick: F) -> AutoAdvance
where
    F: FnMut() + Send + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let worker = thread::Builder::new()
        .name("auto-advance".into())
        .spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!("auto-advance stopped");
        });
    let worker = match worker {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("could not start auto-advance thread: {e}");
            None
        }
    };
    AutoAdvance {
        stop: Some(stop_tx),
        worker,
    }
}

impl AutoAdvance {
    /// Stops the tick and waits for the worker; no tick runs after this returns.
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("auto-advance tick panicked");
        }
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.cancel();
    }
}

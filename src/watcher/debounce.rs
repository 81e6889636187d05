use log::debug;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Turns a stream of events into one callback per burst.
///
/// A burst ends once no event has arrived for `duration`.
pub struct Debouncer {
    duration: Duration,
}

impl Debouncer {
    pub fn new(duration: Duration) -> Self {
        Debouncer { duration }
    }

    /// Blocks until `input_rx` disconnects, calling `on_quiet` after every
    /// burst. A burst cut short by disconnection does not fire.
    pub fn run<T>(&self, input_rx: Receiver<T>, mut on_quiet: impl FnMut()) {
        while input_rx.recv().is_ok() {
            let mut burst = 1usize;
            loop {
                match input_rx.recv_timeout(self.duration) {
                    Ok(_) => burst += 1,
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            debug!("watcher: {burst} event(s) settled after {:?}", self.duration);
            on_quiet();
        }
    }
}

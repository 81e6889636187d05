//! File change notification for the snippet store.
//!
//! [`watcher::setup_file_watcher`] forwards raw `notify` events for one file,
//! [`debounce::Debouncer`] collapses bursts of them, and
//! [`service::WatcherService`] wires the two to a callback on a background
//! thread.

pub mod debounce;
pub mod service;
pub mod watcher;

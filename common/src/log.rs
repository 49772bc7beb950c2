//! Logging helpers shared by every crate.
//!
//! Plain levels go through `tracing` directly. [`success!`](crate::success)
//! marks an `info` event with `status = "success"` so the terminal formatter
//! can render it differently.

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(status = "success", $($arg)+)
    };
}

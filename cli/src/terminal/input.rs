use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use sweepr_core::SessionCanceller;
use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cancels a session when 'q' or Ctrl-C is pressed.
///
/// The terminal is in raw mode while the handle lives.
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub fn start(canceller: SessionCanceller) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_ref = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            if let Err(e) = enable_raw_mode() {
                warn!("Keyboard input disabled: {e}");
                return;
            }
            while !stop_ref.load(Ordering::Relaxed) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    if is_interrupt(key_event.code, key_event.modifiers)
                        && key_event.kind == KeyEventKind::Press
                    {
                        canceller.cancel();
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Self {
            stop,
            thread: Some(thread),
        }
    }
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    let is_q = code == KeyCode::Char('q');
    let is_ctrl_c = code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
    is_q || is_ctrl_c
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        let _ = disable_raw_mode();
    }
}

//! Global pointer hook: emulates a single touch contact with the primary
//! mouse button.
//!
//! Left press starts a contact, motion while pressed moves it, release ends
//! it. Motion with the button up only updates the tracked position.

use crate::ContactSink;
use crossbeam_channel::{bounded, Receiver, Sender};
use rdev::{listen, Button, Event, EventType};
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Handle to control the pointer hook.
pub struct PointerHookHandle {
    stop_tx: Sender<()>,
    /// rdev's listener blocks for the life of the process, so the thread is
    /// never joined.
    #[allow(dead_code)]
    thread: Option<JoinHandle<()>>,
}

impl PointerHookHandle {
    /// Signal the hook to stop forwarding contacts.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

impl Drop for PointerHookHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start forwarding primary-button contacts into `sink`.
pub fn start_pointer_hook(sink: ContactSink) -> PointerHookHandle {
    let (stop_tx, stop_rx) = bounded(1);
    let thread = thread::spawn(move || run_hook(sink, stop_rx));

    PointerHookHandle {
        stop_tx,
        thread: Some(thread),
    }
}

fn run_hook(sink: ContactSink, stop_rx: Receiver<()>) {
    info!("Pointer hook thread started (rdev)");

    let mut position = (0.0_f32, 0.0_f32);
    let mut pressed = false;
    let mut stopped = false;

    let callback = move |event: Event| {
        if stopped || stop_rx.try_recv().is_ok() {
            stopped = true;
            return;
        }

        let (x, y) = position;
        let result = match event.event_type {
            EventType::MouseMove { x, y } => {
                position = (x as f32, y as f32);
                if !pressed {
                    return;
                }
                sink.moved(position.0, position.1)
            }
            EventType::ButtonPress(Button::Left) if !pressed => {
                pressed = true;
                sink.start(x, y)
            }
            EventType::ButtonRelease(Button::Left) if pressed => {
                pressed = false;
                sink.end(x, y)
            }
            _ => return,
        };

        if let Err(e) = result {
            warn!("Failed to forward contact: {}", e);
            stopped = true;
        }
    };

    if let Err(error) = listen(callback) {
        error!(?error, "Pointer hook error");
    }

    info!("Pointer hook thread exiting");
}

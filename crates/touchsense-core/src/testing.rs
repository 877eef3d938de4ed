//! Test doubles shared by the unit tests in this crate.

use crate::Surface;
use std::sync::Mutex;

pub(crate) struct TestSurface {
    renderable: bool,
    pulses: Mutex<Vec<Vec<u64>>>,
}

impl TestSurface {
    pub(crate) fn renderable() -> Self {
        Self {
            renderable: true,
            pulses: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn detached() -> Self {
        Self {
            renderable: false,
            pulses: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn pulses(&self) -> Vec<Vec<u64>> {
        self.pulses.lock().unwrap().clone()
    }
}

impl Surface for TestSurface {
    fn label(&self) -> String {
        if self.renderable {
            "test-surface".into()
        } else {
            "detached-node".into()
        }
    }

    fn is_renderable(&self) -> bool {
        self.renderable
    }

    fn vibrate(&self, pattern: &[u64]) -> bool {
        self.pulses.lock().unwrap().push(pattern.to_vec());
        true
    }
}

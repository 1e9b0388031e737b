#![allow(dead_code)]

use std::cell::Cell;
use std::sync::Once;

use puls::{Clock, Level, PulseClassifier, PulseKind};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

/// Clock that only moves when a test tells it to.
#[derive(Default)]
pub struct TestClock {
    micros: Cell<u64>,
}

impl TestClock {
    pub fn starting_at_ms(ms: u64) -> Self {
        Self {
            micros: Cell::new(ms * 1000),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000);
    }

    pub fn advance_us(&self, us: u64) {
        self.micros.set(self.micros.get() + us);
    }
}

impl Clock for TestClock {
    fn micros(&self) -> u32 {
        self.micros.get() as u32
    }

    fn millis(&self) -> u32 {
        (self.micros.get() / 1000) as u32
    }
}

/// Advances the clock by `ms` and then samples `level`.
pub fn step(
    classifier: &mut PulseClassifier<'_, &TestClock>,
    clock: &TestClock,
    ms: u64,
    level: Level,
) -> PulseKind {
    clock.advance_ms(ms);
    classifier.check_pulse(level)
}

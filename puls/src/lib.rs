#![no_std]

//! Classifies the edges of a polled digital input into high and low pulses and
//! measures their width.
//!
//! ```
//! use puls::{Clock, Level, PulseClassifier, PulseKind, PulseSettings};
//!
//! struct Ticks(u32);
//!
//! impl Clock for Ticks {
//!     fn micros(&self) -> u32 {
//!         self.0 * 1000
//!     }
//!
//!     fn millis(&self) -> u32 {
//!         self.0
//!     }
//! }
//!
//! let mut classifier: PulseClassifier<_> =
//!     PulseClassifier::new(Ticks(0), PulseSettings::default());
//!
//! classifier.check_pulse(Level::Low);
//! classifier.check_pulse(Level::High);
//! assert_eq!(classifier.check_pulse(Level::Low), PulseKind::High);
//! assert_eq!(classifier.pulse_count(), 1);
//! ```

pub mod classifier;
pub mod pin;
pub mod settings;

pub use classifier::{PulseClassifier, PulseKind, Trigger, PULSE_WIDTH_INVALID};
pub use puls_edge as edge;
pub use puls_edge::{
    Clock, EdgeDetector, EdgeError, EdgeEvent, EdgeKind, EdgeObserver, Level, Resolution,
    DEFAULT_OBSERVERS,
};
pub use settings::PulseSettings;

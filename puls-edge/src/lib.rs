#![no_std]

//! Edge detection for digital inputs that are sampled once per control loop cycle.
//!
//! The caller samples the pin, hands the level to an [`EdgeDetector`] and asks it
//! whether the level changed since the previous cycle. Detected edges are timestamped
//! with a [`Clock`] in the configured [`Resolution`] and handed to every registered
//! [`EdgeObserver`].

pub mod clock;
pub mod detector;
pub mod level;

pub use clock::{Clock, Resolution};
pub use detector::{EdgeDetector, EdgeError, EdgeEvent, EdgeKind, EdgeObserver, DEFAULT_OBSERVERS};
pub use level::Level;

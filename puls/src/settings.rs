use derivative::Derivative;
use puls_edge::{Level, Resolution};

use crate::Trigger;

/// Everything a [`crate::PulseClassifier`] is configured with.
///
/// Thresholds are in ticks of `resolution`, a threshold of 0 leaves the feature disabled.
#[derive(Derivative)]
#[derivative(Default)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSettings {
    #[derivative(Default(value = "Trigger::High"))]
    pub trigger: Trigger,
    /// Level the pin idles at before the first sample
    pub initial_level: Level,
    pub timeout: u32,
    pub debounce: u32,
    #[derivative(Default(value = "Resolution::Milliseconds"))]
    pub resolution: Resolution,
}

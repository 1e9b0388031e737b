#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};
use fugit::MicrosDurationU64;
#[cfg(not(feature = "defmt"))]
use log::{debug, info, warn};
use puls_edge::{
    Clock, EdgeDetector, EdgeError, EdgeEvent, EdgeKind, EdgeObserver, Level, Resolution,
    DEFAULT_OBSERVERS,
};

use crate::PulseSettings;

/// Width reported for a pulse that timed out.
pub const PULSE_WIDTH_INVALID: u32 = 0;

/// Which polarity of pulse the classifier is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Rising edge followed by a falling edge
    High,
    /// Falling edge followed by a rising edge
    Low,
    /// Any two consecutive edges
    Either,
}

/// Classification of the last processed cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseKind {
    #[default]
    NoPulse,
    /// Rising edge seen, waiting for the falling edge
    TriggeredHigh,
    /// Falling edge seen, waiting for the rising edge
    TriggeredLow,
    High,
    Low,
    /// Armed pulse did not complete within the timeout
    Timeout,
}

impl PulseKind {
    pub fn is_armed(&self) -> bool {
        matches!(self, PulseKind::TriggeredHigh | PulseKind::TriggeredLow)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PulseKind::High | PulseKind::Low)
    }
}

/// Edge pair making up a pulse of a single polarity.
struct Polarity {
    opening: EdgeKind,
    closing: EdgeKind,
    level: Level,
    armed: PulseKind,
    completed: PulseKind,
}

const HIGH_PULSE: Polarity = Polarity {
    opening: EdgeKind::Rising,
    closing: EdgeKind::Falling,
    level: Level::High,
    armed: PulseKind::TriggeredHigh,
    completed: PulseKind::High,
};

const LOW_PULSE: Polarity = Polarity {
    opening: EdgeKind::Falling,
    closing: EdgeKind::Rising,
    level: Level::Low,
    armed: PulseKind::TriggeredLow,
    completed: PulseKind::Low,
};

impl Trigger {
    fn polarity(&self) -> Option<&'static Polarity> {
        match self {
            Trigger::High => Some(&HIGH_PULSE),
            Trigger::Low => Some(&LOW_PULSE),
            Trigger::Either => None,
        }
    }
}

/// Turns the level of a pin, sampled once per cycle, into timed pulses.
///
/// A pulse is a pair of opposite edges in the order given by the [`Trigger`]. Completed
/// pulses not longer than the debounce threshold are dropped, pulses that were armed
/// but did not complete within the timeout are counted as errors.
///
/// The classification returned by [`Self::pulse_type`] only holds for the cycle that
/// produced it, read it right after [`Self::check_pulse`].
pub struct PulseClassifier<'a, C: Clock, const N: usize = DEFAULT_OBSERVERS> {
    detector: EdgeDetector<'a, C, N>,
    trigger: Trigger,

    kind: PulseKind,
    width: u32,
    pulse_count: u32,
    error_count: u32,

    last_edge: EdgeEvent,
    working_edge: EdgeEvent,
    armed_at: u32,

    timeout: Option<u32>,
    timeout_reference: u32,
    debounce: Option<u32>,
}

impl<'a, C: Clock, const N: usize> PulseClassifier<'a, C, N> {
    pub fn new(clock: C, settings: PulseSettings) -> Self {
        let mut classifier = Self {
            detector: EdgeDetector::new(clock, settings.initial_level, settings.resolution),
            trigger: settings.trigger,
            kind: PulseKind::NoPulse,
            width: 0,
            pulse_count: 0,
            error_count: 0,
            last_edge: EdgeEvent::NONE,
            working_edge: EdgeEvent::NONE,
            armed_at: 0,
            timeout: None,
            timeout_reference: 0,
            debounce: None,
        };

        classifier.apply_thresholds(&settings);

        classifier
    }

    /// Applies new settings. The level history of the pin is kept, so
    /// `initial_level` is ignored.
    pub fn configure(&mut self, settings: PulseSettings) {
        self.set_trigger(settings.trigger);
        self.set_resolution(settings.resolution);
        self.apply_thresholds(&settings);
    }

    fn apply_thresholds(&mut self, settings: &PulseSettings) {
        if settings.timeout > 0 {
            self.enable_timeout(settings.timeout);
        } else {
            self.disable_timeout();
        }

        if settings.debounce > 0 {
            self.enable_debounce(settings.debounce);
        } else {
            self.disable_debounce();
        }
    }

    /// Processes the level sampled this cycle and returns the resulting classification.
    pub fn check_pulse(&mut self, level: impl Into<Level>) -> PulseKind {
        let level = level.into();

        self.detector.set_level(level);
        let edge = self.detector.check_edges();

        if !edge.is_edge() {
            self.check_timeout();
            return self.kind;
        }

        self.working_edge = edge;

        if self.classify(level) {
            self.measure();
        }

        // The edge closing one pulse may open the next one
        self.last_edge = self.working_edge;
        self.working_edge = EdgeEvent::NONE;

        if self.timeout.is_some() {
            self.timeout_reference = self.detector.now();
        }

        self.kind
    }

    /// Updates `kind` for the working edge, returns whether it completed a pulse.
    fn classify(&mut self, level: Level) -> bool {
        let last = self.last_edge.kind;
        let current = self.working_edge.kind;

        let Some(polarity) = self.trigger.polarity() else {
            return match (last, current) {
                (EdgeKind::Rising, EdgeKind::Falling) => {
                    self.kind = PulseKind::High;
                    true
                }
                (EdgeKind::Falling, EdgeKind::Rising) => {
                    self.kind = PulseKind::Low;
                    true
                }
                _ => {
                    self.reset();
                    false
                }
            };
        };

        if last == polarity.opening && current == polarity.closing {
            self.kind = polarity.completed;
            debug!("{:?}: pulse detected", self.trigger);
            true
        } else if current == polarity.opening && level == polarity.level {
            if self.kind == polarity.armed {
                warn!("{:?}: triggered again while armed", self.trigger);
            } else {
                self.kind = polarity.armed;
                self.armed_at = self.working_edge.timestamp;
                debug!("{:?}: pulse start at {}", self.trigger, self.armed_at);
            }
            false
        } else {
            self.reset();
            debug!("{:?}: reset, {} errors", self.trigger, self.error_count);
            false
        }
    }

    /// Computes the width of the pulse that was just completed and filters bounces.
    fn measure(&mut self) {
        let width = self
            .working_edge
            .timestamp
            .wrapping_sub(self.last_edge.timestamp);

        match self.debounce {
            Some(debounce) if width <= debounce => {
                self.kind = PulseKind::NoPulse;
                self.width = 0;
                warn!("Pulse of {} within debounce time {}", width, debounce);
            }
            _ => {
                self.width = width;
                self.pulse_count = self.pulse_count.saturating_add(1);
                debug!(
                    "Width = ({} - {}) = {}",
                    self.working_edge.timestamp, self.last_edge.timestamp, width
                );
            }
        }
    }

    fn check_timeout(&mut self) {
        if !self.kind.is_armed() {
            return;
        }

        let Some(timeout) = self.timeout else {
            return;
        };

        let elapsed = self.detector.now().wrapping_sub(self.timeout_reference);
        if elapsed > timeout {
            self.kind = PulseKind::Timeout;
            self.width = PULSE_WIDTH_INVALID;
            self.error_count = self.error_count.saturating_add(1);
            self.last_edge = EdgeEvent::NONE;

            warn!("Pulse timeout detected, error {}", self.error_count);
        }
    }

    fn reset(&mut self) {
        self.kind = PulseKind::NoPulse;
        self.width = 0;
    }

    /// Forgets the pulse in progress and zeroes both counters. Configuration is kept.
    pub fn clear(&mut self) {
        self.reset();
        self.pulse_count = 0;
        self.error_count = 0;
        self.last_edge = EdgeEvent::NONE;
        self.working_edge = EdgeEvent::NONE;
        self.armed_at = 0;
    }

    pub fn pulse_type(&self) -> PulseKind {
        self.kind
    }

    /// Width of the last completed pulse, [`PULSE_WIDTH_INVALID`] after a timeout.
    /// While a pulse is armed this is the time elapsed since its first edge.
    pub fn pulse_width(&self) -> u32 {
        if self.kind.is_armed() {
            self.detector.now().wrapping_sub(self.armed_at)
        } else {
            self.width
        }
    }

    /// Width of the completed pulse as a duration, in the resolution it was measured in.
    pub fn pulse_duration(&self) -> Option<MicrosDurationU64> {
        self.kind
            .is_completed()
            .then(|| self.last_edge.resolution.to_duration(self.width))
    }

    pub fn pulse_count(&self) -> u32 {
        self.pulse_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn is_error_occurred(&self) -> bool {
        self.error_count > 0
    }

    /// Edge the next pulse will be paired against.
    pub fn last_edge(&self) -> EdgeEvent {
        self.last_edge
    }

    pub fn set_trigger(&mut self, trigger: Trigger) {
        self.trigger = trigger;
        info!("Trigger set to {:?}", trigger);
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// A threshold of 0 is not a valid timeout and disables it.
    pub fn enable_timeout(&mut self, threshold: u32) {
        if threshold > 0 {
            self.timeout = Some(threshold);
            self.timeout_reference = self.detector.now();
            info!("Timeout enabled = {}", threshold);
        } else {
            warn!("Timeout invalid = {}", threshold);
            self.disable_timeout();
        }
    }

    pub fn disable_timeout(&mut self) {
        self.timeout = None;
        info!("Timeout disabled");
    }

    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// A threshold of 0 is not a valid debounce time and disables debouncing.
    pub fn enable_debounce(&mut self, threshold: u32) {
        if threshold > 0 {
            self.debounce = Some(threshold);
            info!("Debouncing enabled = {}", threshold);
        } else {
            warn!("Debouncing invalid = {}", threshold);
            self.disable_debounce();
        }
    }

    pub fn disable_debounce(&mut self) {
        self.debounce = None;
    }

    pub fn debounce(&self) -> Option<u32> {
        self.debounce
    }

    /// Thresholds are not converted, they are read in the new resolution from now on.
    ///
    /// Switching to another unit drops the pulse in progress and the edge it would be
    /// paired with, since their timestamps are in the old unit. The timeout restarts.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        if resolution == self.detector.resolution() {
            return;
        }

        self.detector.set_resolution(resolution);

        self.reset();
        self.last_edge = EdgeEvent::NONE;
        self.armed_at = 0;
        self.timeout_reference = self.detector.now();
        info!("Resolution set to {:?}", resolution);
    }

    pub fn resolution(&self) -> Resolution {
        self.detector.resolution()
    }

    pub fn subscribe(&mut self, observer: &'a mut dyn EdgeObserver) -> Result<(), EdgeError> {
        self.detector.subscribe(observer)
    }

    pub fn detector(&self) -> &EdgeDetector<'a, C, N> {
        &self.detector
    }
}

#[cfg(feature = "defmt")]
use defmt::debug;
use heapless::Vec;
#[cfg(not(feature = "defmt"))]
use log::debug;

use crate::{Clock, Level, Resolution};

/// Amount of observers an [`EdgeDetector`] holds when no capacity is given.
pub const DEFAULT_OBSERVERS: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeKind {
    #[default]
    None,
    Rising,
    Falling,
}

/// Result of one edge check. Only meaningful for the cycle it was produced in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    pub kind: EdgeKind,
    /// Time of the edge in `resolution` ticks, 0 when there was no edge.
    pub timestamp: u32,
    pub resolution: Resolution,
}

impl EdgeEvent {
    pub const NONE: Self = Self {
        kind: EdgeKind::None,
        timestamp: 0,
        resolution: Resolution::Milliseconds,
    };

    pub fn is_edge(&self) -> bool {
        self.kind != EdgeKind::None
    }
}

/// Gets told about every detected edge, synchronously from within
/// [`EdgeDetector::check_edges`].
///
/// Implement either `on_edge` to see all edges, or only the `on_rising`/`on_falling`
/// hooks of interest. Closures taking an `&EdgeEvent` are observers as well.
pub trait EdgeObserver {
    fn on_edge(&mut self, event: &EdgeEvent) {
        match event.kind {
            EdgeKind::Rising => self.on_rising(event.timestamp),
            EdgeKind::Falling => self.on_falling(event.timestamp),
            EdgeKind::None => {}
        }
    }

    fn on_rising(&mut self, _timestamp: u32) {}

    fn on_falling(&mut self, _timestamp: u32) {}
}

impl<F> EdgeObserver for F
where
    F: FnMut(&EdgeEvent),
{
    fn on_edge(&mut self, event: &EdgeEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeError {
    ObserverListFull,
}

/// Compares the level sampled this cycle against the level of the previous cycle.
///
/// Every instance keeps its own level history, so one detector per pin is required.
/// Up to `N` observers can be registered.
pub struct EdgeDetector<'a, C: Clock, const N: usize = DEFAULT_OBSERVERS> {
    clock: C,
    level: Level,
    previous_level: Level,
    resolution: Resolution,
    info: EdgeEvent,
    observers: Vec<&'a mut dyn EdgeObserver, N>,
}

impl<'a, C: Clock, const N: usize> EdgeDetector<'a, C, N> {
    /// The initial level is taken as both the current and the previous level,
    /// so the first check does not report an edge for a pin that idles high.
    pub fn new(clock: C, initial_level: Level, resolution: Resolution) -> Self {
        Self {
            clock,
            level: initial_level,
            previous_level: initial_level,
            resolution,
            info: EdgeEvent::NONE,
            observers: Vec::new(),
        }
    }

    /// Registers an observer, observers are notified in registration order.
    pub fn subscribe(&mut self, observer: &'a mut dyn EdgeObserver) -> Result<(), EdgeError> {
        self.observers
            .push(observer)
            .map_err(|_| EdgeError::ObserverListFull)
    }

    pub fn unsubscribe_all(&mut self) {
        self.observers.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Stores the level sampled this cycle, evaluated by the next [`Self::check_edges`].
    pub fn set_level(&mut self, level: impl Into<Level>) {
        self.level = level.into();
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Level as it was at the end of the last [`Self::check_edges`].
    pub fn previous_level(&self) -> Level {
        self.previous_level
    }

    pub fn check_edges(&mut self) -> EdgeEvent {
        let kind = match (self.previous_level, self.level) {
            (Level::Low, Level::High) => EdgeKind::Rising,
            (Level::High, Level::Low) => EdgeKind::Falling,
            _ => EdgeKind::None,
        };

        let timestamp = match kind {
            EdgeKind::None => 0,
            _ => self.now(),
        };

        self.info = EdgeEvent {
            kind,
            timestamp,
            resolution: self.resolution,
        };

        if self.info.is_edge() {
            debug!("{:?} edge at {}", kind, timestamp);

            let event = self.info;
            for observer in self.observers.iter_mut() {
                observer.on_edge(&event);
            }
        }

        self.previous_level = self.level;

        self.info
    }

    /// The event produced by the last [`Self::check_edges`].
    pub fn info(&self) -> EdgeEvent {
        self.info
    }

    pub fn current_edge(&self) -> EdgeKind {
        self.info.kind
    }

    pub fn current_edge_time(&self) -> u32 {
        self.info.timestamp
    }

    /// Only affects timestamps taken after the change.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        debug!("New resolution {:?}", resolution);
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Current time in the configured resolution.
    pub fn now(&self) -> u32 {
        self.resolution.now(&self.clock)
    }
}

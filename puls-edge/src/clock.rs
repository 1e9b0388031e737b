use fugit::MicrosDurationU64;

/// Free running monotonic time source. Both counters wrap around at `u32::MAX`,
/// users of the clock only ever look at differences between two readings.
pub trait Clock {
    fn micros(&self) -> u32;
    fn millis(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn micros(&self) -> u32 {
        (**self).micros()
    }

    fn millis(&self) -> u32 {
        (**self).millis()
    }
}

/// Unit of every timestamp and width produced while this resolution is configured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Microseconds,
    #[default]
    Milliseconds,
}

impl Resolution {
    /// Reads `clock` in this resolution.
    pub fn now<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        match self {
            Resolution::Microseconds => clock.micros(),
            Resolution::Milliseconds => clock.millis(),
        }
    }

    /// Converts an amount of ticks in this resolution to a duration.
    pub fn to_duration(&self, ticks: u32) -> MicrosDurationU64 {
        match self {
            Resolution::Microseconds => MicrosDurationU64::micros(ticks as u64),
            Resolution::Milliseconds => MicrosDurationU64::millis(ticks as u64),
        }
    }
}

use core::ops::Not;

/// Logic level of a sampled digital input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(&self) -> bool {
        *self == Level::High
    }

    pub fn is_low(&self) -> bool {
        *self == Level::Low
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Raw register style levels, anything non zero reads as high.
impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Level::from(value != 0)
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

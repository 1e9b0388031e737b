use embedded_hal::digital::v2::InputPin;
use puls_edge::{Clock, Level};

use crate::{PulseClassifier, PulseKind};

impl<C: Clock, const N: usize> PulseClassifier<'_, C, N> {
    /// Samples `pin` and feeds its level through [`PulseClassifier::check_pulse`].
    /// Nothing changes when the pin can not be read.
    pub fn check_pin<P: InputPin>(&mut self, pin: &P) -> Result<PulseKind, P::Error> {
        let level = Level::from(pin.is_high()?);
        Ok(self.check_pulse(level))
    }
}

use std::cell::Cell;

use env_logger::{Builder, Env};
use log::{info, warn, LevelFilter};
use puls::{
    Clock, EdgeEvent, EdgeKind, Level, PulseClassifier, PulseKind, PulseSettings, Resolution,
    Trigger,
};
use rand::{rngs::ThreadRng, Rng};

// 10 kHz control loop sampling a 50 Hz servo style signal
const POLL_PERIOD_US: u64 = 100;
const PWM_PERIOD_US: u64 = 20_000;
const PERIODS: u64 = 60;

const MIN_HIGH_US: u64 = 1_000;
const MAX_HIGH_US: u64 = 2_000;

// Contacts chatter for a while after every transition
const BOUNCE_US: u64 = 300;
const BOUNCE_PROBABILITY: f64 = 0.3;

const DEBOUNCE_US: u32 = 500;
const TIMEOUT_US: u32 = 25_000;

/// The signal gets stuck high during these periods to provoke timeouts.
const STUCK_PERIODS: core::ops::Range<u64> = 40..43;

#[derive(Default)]
struct SimClock {
    micros: Cell<u64>,
}

impl SimClock {
    fn advance(&self, us: u64) {
        self.micros.set(self.micros.get() + us);
    }
}

impl Clock for SimClock {
    fn micros(&self) -> u32 {
        self.micros.get() as u32
    }

    fn millis(&self) -> u32 {
        (self.micros.get() / 1000) as u32
    }
}

/// PWM signal sweeping its duty cycle, with contact bounce on every transition.
struct PwmSignal {
    rng: ThreadRng,
}

impl PwmSignal {
    fn high_time(period: u64) -> u64 {
        let sweep = period % 10;
        MIN_HIGH_US + (MAX_HIGH_US - MIN_HIGH_US) * sweep / 9
    }

    fn level_at(&mut self, time_us: u64) -> Level {
        let period = time_us / PWM_PERIOD_US;
        let phase = time_us % PWM_PERIOD_US;

        if STUCK_PERIODS.contains(&period) {
            return Level::High;
        }

        let high_time = Self::high_time(period);
        let ideal = Level::from(phase < high_time);

        let since_transition = if ideal.is_high() {
            phase
        } else {
            phase - high_time
        };

        if since_transition < BOUNCE_US && self.rng.gen_bool(BOUNCE_PROBABILITY) {
            !ideal
        } else {
            ideal
        }
    }
}

fn main() {
    Builder::from_env(Env::default().default_filter_or(LevelFilter::Info.to_string())).init();

    let clock = SimClock::default();
    let mut signal = PwmSignal {
        rng: rand::thread_rng(),
    };

    let mut edges = 0u32;
    let mut count_edges = |_: &EdgeEvent| edges += 1;

    let mut classifier: PulseClassifier<_> = PulseClassifier::new(
        &clock,
        PulseSettings {
            trigger: Trigger::High,
            initial_level: Level::Low,
            timeout: TIMEOUT_US,
            debounce: DEBOUNCE_US,
            resolution: Resolution::Microseconds,
        },
    );

    if let Err(e) = classifier.subscribe(&mut count_edges) {
        warn!("Not counting edges: {e:?}");
    }

    let mut bounces = 0;
    let mut last_counts = (0, 0);

    for _ in 0..(PERIODS * PWM_PERIOD_US / POLL_PERIOD_US) {
        let now = clock.micros.get();
        let level = signal.level_at(now);

        let kind = classifier.check_pulse(level);
        let counts = (classifier.pulse_count(), classifier.error_count());

        if counts.0 != last_counts.0 {
            let width = classifier
                .pulse_duration()
                .map(|duration| duration.to_micros())
                .unwrap_or_default();
            info!(
                "[{:>4}] {:?} pulse of {} us, expected {} us",
                now / PWM_PERIOD_US,
                kind,
                width,
                PwmSignal::high_time(now / PWM_PERIOD_US)
            );
        } else if counts.1 != last_counts.1 {
            warn!("[{:>4}] Timeout, {} errors so far", now / PWM_PERIOD_US, counts.1);
        } else if kind == PulseKind::NoPulse
            && classifier.detector().current_edge() != EdgeKind::None
        {
            bounces += 1;
        }

        last_counts = counts;
        clock.advance(POLL_PERIOD_US);
    }

    let (pulses, errors) = last_counts;
    drop(classifier);

    info!(
        "{PERIODS} periods: {pulses} pulses, {errors} timeouts, \
         {bounces} filtered edges, {edges} edges in total"
    );
}

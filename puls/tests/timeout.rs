mod common;

use common::{init_logger, step, TestClock};
use puls::{
    EdgeKind, Level, PulseClassifier, PulseKind, PulseSettings, Resolution, Trigger,
    PULSE_WIDTH_INVALID,
};
use rand::Rng;

use Level::{High, Low};

fn classifier(
    clock: &TestClock,
    trigger: Trigger,
    timeout: u32,
) -> PulseClassifier<'_, &TestClock> {
    PulseClassifier::new(
        clock,
        PulseSettings {
            trigger,
            timeout,
            ..Default::default()
        },
    )
}

#[test]
fn test_armed_high_pulse_times_out() {
    init_logger();

    let clock = TestClock::default();
    let mut puls = classifier(&clock, Trigger::High, 100);
    assert_eq!(puls.timeout(), Some(100));

    step(&mut puls, &clock, 1, Low);
    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::TriggeredHigh);

    // Exactly at the threshold the pulse is still alive
    for _ in 0..10 {
        assert_eq!(step(&mut puls, &clock, 10, High), PulseKind::TriggeredHigh);
    }
    assert_eq!(puls.error_count(), 0);

    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::Timeout);
    assert_eq!(puls.pulse_type(), PulseKind::Timeout);
    assert_eq!(puls.error_count(), 1);
    assert!(puls.is_error_occurred());
    assert_eq!(puls.pulse_width(), PULSE_WIDTH_INVALID);
    assert_eq!(puls.pulse_duration(), None);
    assert_eq!(puls.last_edge().kind, EdgeKind::None);

    // A timed out pulse is only counted once
    for _ in 0..10 {
        assert_eq!(step(&mut puls, &clock, 50, High), PulseKind::Timeout);
    }
    assert_eq!(puls.error_count(), 1);
    assert_eq!(puls.pulse_count(), 0);
}

#[test]
fn test_recovers_after_timeout() {
    let clock = TestClock::default();
    let mut puls = classifier(&clock, Trigger::High, 100);

    step(&mut puls, &clock, 1, High);
    assert_eq!(step(&mut puls, &clock, 150, High), PulseKind::Timeout);

    // The falling edge of the timed out pulse has nothing to pair with
    assert_eq!(step(&mut puls, &clock, 1, Low), PulseKind::NoPulse);
    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::TriggeredHigh);
    assert_eq!(step(&mut puls, &clock, 40, Low), PulseKind::High);

    assert_eq!(puls.pulse_width(), 40);
    assert_eq!(puls.pulse_count(), 1);
    assert_eq!(puls.error_count(), 1);
}

#[test]
fn test_low_pulse_times_out() {
    let clock = TestClock::default();
    let mut puls = classifier(&clock, Trigger::Low, 30);

    step(&mut puls, &clock, 1, High);
    assert_eq!(step(&mut puls, &clock, 1, Low), PulseKind::TriggeredLow);
    assert_eq!(step(&mut puls, &clock, 20, Low), PulseKind::TriggeredLow);
    assert_eq!(step(&mut puls, &clock, 20, Low), PulseKind::Timeout);
    assert_eq!(puls.error_count(), 1);
}

#[test]
fn test_no_timeout_when_disabled() {
    let clock = TestClock::default();
    let mut puls = classifier(&clock, Trigger::High, 0);
    assert_eq!(puls.timeout(), None);

    step(&mut puls, &clock, 1, High);
    for _ in 0..100 {
        assert_eq!(step(&mut puls, &clock, 1000, High), PulseKind::TriggeredHigh);
    }
    assert_eq!(puls.error_count(), 0);

    puls.enable_timeout(500);
    assert_eq!(step(&mut puls, &clock, 400, High), PulseKind::TriggeredHigh);
    assert_eq!(step(&mut puls, &clock, 200, High), PulseKind::Timeout);

    puls.disable_timeout();
    assert_eq!(puls.timeout(), None);
}

#[test]
fn test_either_trigger_never_arms() {
    let clock = TestClock::default();
    let mut puls = classifier(&clock, Trigger::Either, 10);

    step(&mut puls, &clock, 1, High);
    assert_eq!(step(&mut puls, &clock, 100, High), PulseKind::NoPulse);
    assert_eq!(puls.error_count(), 0);
}

#[test]
fn test_timeout_across_clock_wraparound() {
    let clock = TestClock::starting_at_ms(u32::MAX as u64 - 20);
    let mut puls = classifier(&clock, Trigger::High, 50);

    step(&mut puls, &clock, 1, High);
    assert_eq!(step(&mut puls, &clock, 45, High), PulseKind::TriggeredHigh);
    assert_eq!(step(&mut puls, &clock, 10, High), PulseKind::Timeout);
}

#[test]
fn test_resolution_change_drops_armed_pulse() {
    let clock = TestClock::starting_at_ms(5000);
    let mut puls = classifier(&clock, Trigger::High, 100_000);

    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::TriggeredHigh);

    // Same unit again, nothing changes
    puls.set_resolution(Resolution::Milliseconds);
    assert_eq!(puls.pulse_type(), PulseKind::TriggeredHigh);

    // The rising edge was timestamped in milliseconds and is forgotten
    puls.set_resolution(Resolution::Microseconds);
    assert_eq!(puls.pulse_type(), PulseKind::NoPulse);
    assert_eq!(puls.last_edge().kind, EdgeKind::None);

    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::NoPulse);
    assert_eq!(puls.error_count(), 0);
    assert_eq!(step(&mut puls, &clock, 1, Low), PulseKind::NoPulse);
    assert_eq!(puls.pulse_count(), 0);

    assert_eq!(step(&mut puls, &clock, 1, High), PulseKind::TriggeredHigh);
    assert_eq!(step(&mut puls, &clock, 2, High), PulseKind::TriggeredHigh);
    assert_eq!(step(&mut puls, &clock, 1, Low), PulseKind::High);
    assert_eq!(puls.pulse_width(), 3000);
    assert_eq!(puls.error_count(), 0);
}

#[test]
fn test_counts_never_decrease() {
    init_logger();

    let mut rng = rand::thread_rng();

    for trigger in [Trigger::High, Trigger::Low, Trigger::Either] {
        let clock = TestClock::default();
        let mut puls: PulseClassifier<_> = PulseClassifier::new(
            &clock,
            PulseSettings {
                trigger,
                timeout: 800,
                debounce: 30,
                resolution: Resolution::Microseconds,
                ..Default::default()
            },
        );

        let mut level = Low;
        let (mut pulses, mut errors) = (0, 0);

        for _ in 0..5_000 {
            if rng.gen_bool(0.3) {
                level = !level;
            }
            clock.advance_us(rng.gen_range(1..200));

            let kind = puls.check_pulse(level);
            let edge = puls.detector().current_edge() != EdgeKind::None;

            assert!(puls.pulse_count() >= pulses);
            assert!(puls.error_count() >= errors);
            if puls.pulse_count() != pulses {
                assert!(edge);
                assert!(kind.is_completed());
                assert_eq!(puls.pulse_count(), pulses + 1);
                assert!(puls.pulse_width() > 30);
            }
            if !edge {
                // Cycles without an edge only repeat the previous classification
                assert_eq!(puls.pulse_count(), pulses);
            }
            if kind == PulseKind::Timeout {
                assert_eq!(puls.pulse_width(), PULSE_WIDTH_INVALID);
            }

            pulses = puls.pulse_count();
            errors = puls.error_count();
        }
    }
}

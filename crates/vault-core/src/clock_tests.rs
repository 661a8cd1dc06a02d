use super::*;

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(0);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 500);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_set_overrides() {
    let clock = FakeClock::new(0);
    clock.set_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new(0);
    let other = clock.clone();
    clock.advance_ms(10);
    assert_eq!(other.epoch_ms(), 10);
}

#[test]
fn system_clock_is_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

#[test]
fn now_utc_roundtrips_epoch_ms() {
    let clock = FakeClock::new(1_700_000_000_000);
    let dt = clock.now_utc();
    assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
}

// Burn meter scenarios: threshold crossing, near misses and monotonicity.

use hero_core::{BurnMeter, BurnPhase, HeroParams};

#[test]
fn held_contact_fires_exactly_once_at_frame_417() {
    let mut meter = BurnMeter::new(&HeroParams::default());
    let mut fired_at = Vec::new();
    for frame in 1..=600 {
        if let Some(burned) = meter.tick(true) {
            assert!(burned);
            fired_at.push(frame);
        }
    }
    assert_eq!(fired_at, vec![417]);
    assert_eq!(meter.phase(), BurnPhase::Triggered);
}

#[test]
fn single_frame_contact_never_fires_and_decays_in_one_frame() {
    let mut meter = BurnMeter::default();
    assert_eq!(meter.tick(true), None);
    assert!((meter.level() - 0.006).abs() < 1e-6);
    assert_eq!(meter.tick(false), None);
    assert_eq!(meter.level(), 0.0);
    assert_eq!(meter.phase(), BurnPhase::Dormant);
    for _ in 0..50 {
        assert_eq!(meter.tick(false), None);
    }
}

#[test]
fn level_is_monotone_per_contact_run_and_never_negative() {
    let mut meter = BurnMeter::default();
    // 30 frames on, 50 off, repeated.
    let pattern = (0..400).map(|f| (f % 80) < 30);
    let mut prev = meter.level();
    let mut prev_active = None;
    for active in pattern {
        meter.tick(active);
        let level = meter.level();
        assert!(level >= 0.0);
        if prev_active == Some(active) {
            if active {
                assert!(level >= prev);
            } else {
                assert!(level <= prev);
            }
        }
        prev = level;
        prev_active = Some(active);
    }
    assert!(!meter.burned());
}

#[test]
fn custom_threshold_is_respected() {
    let params = HeroParams {
        burn_threshold: 0.05,
        ..HeroParams::default()
    };
    let mut meter = BurnMeter::new(&params);
    let fired: Vec<_> = (0..20).filter_map(|_| meter.tick(true)).collect();
    assert_eq!(fired, vec![true]);
}

//! Integration tests for identity tracking
//!
//! Tests the full path: detection boxes → IdentityRegistry → stable ids

use maneki::core::IdentityRegistry;
use maneki::types::DetectionBox;
use maneki::{EVICTION_TIMEOUT_MS, TRACKING_DISTANCE_THRESHOLD};
use std::time::{Duration, Instant};

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

/// A person keeps the same id while moving below the matching threshold
#[test]
fn test_id_stability_across_movement() {
    let mut registry = IdentityRegistry::new();
    let t0 = Instant::now();

    registry.update(&[DetectionBox::new(100.0, 100.0, 40.0, 40.0)], t0);
    let id = registry.people()[0].id;

    // Walk right in sub-threshold steps
    for step in 1..=10u64 {
        let x = 100.0 + step as f64 * (TRACKING_DISTANCE_THRESHOLD - 10.0);
        registry.update(&[DetectionBox::new(x, 100.0, 40.0, 40.0)], at(t0, step * 100));
    }

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.people()[0].id, id);
}

/// A detection jumping further than the threshold starts a fresh track
#[test]
fn test_jump_creates_new_person() {
    let mut registry = IdentityRegistry::new();
    let t0 = Instant::now();

    registry.update(&[DetectionBox::new(100.0, 100.0, 40.0, 40.0)], t0);
    registry.update(&[DetectionBox::new(400.0, 100.0, 40.0, 40.0)], at(t0, 100));

    assert_eq!(registry.len(), 2);
    assert_ne!(registry.people()[0].id, registry.people()[1].id);
}

/// Two people tracked in parallel, evicted independently
#[test]
fn test_two_people_independent_eviction() {
    let mut registry = IdentityRegistry::new();
    let t0 = Instant::now();

    let left = DetectionBox::new(50.0, 100.0, 40.0, 40.0);
    let right = DetectionBox::new(500.0, 100.0, 40.0, 40.0);
    registry.update(&[left, right], t0);
    assert_eq!(registry.len(), 2);
    let right_id = registry.people()[1].id;

    // Only the right person stays visible past the eviction timeout
    let later = at(t0, EVICTION_TIMEOUT_MS + 100);
    let evicted = registry.update(&[right], later);

    assert_eq!(registry.len(), 1);
    assert_eq!(evicted.len(), 1);
    assert_eq!(registry.people()[0].id, right_id);
}

/// Unseen people survive gaps shorter than the timeout
#[test]
fn test_short_gap_does_not_evict() {
    let mut registry = IdentityRegistry::new();
    let t0 = Instant::now();

    registry.update(&[DetectionBox::new(100.0, 100.0, 40.0, 40.0)], t0);
    let id = registry.people()[0].id;

    // Missed for 400ms, then reappears
    let evicted = registry.update(&[], at(t0, 400));
    assert!(evicted.is_empty());

    registry.update(&[DetectionBox::new(105.0, 100.0, 40.0, 40.0)], at(t0, 450));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.people()[0].id, id);
}

/// Dwell time accumulates from first sighting, not last
#[test]
fn test_dwell_accumulates_from_first_sighting() {
    let mut registry = IdentityRegistry::new();
    let t0 = Instant::now();
    let detection = DetectionBox::new(100.0, 100.0, 40.0, 40.0);

    registry.update(&[detection], t0);
    registry.update(&[detection], at(t0, 1000));
    registry.update(&[detection], at(t0, 2500));

    assert_eq!(registry.people()[0].dwell_ms(at(t0, 2500)), 2500);
}

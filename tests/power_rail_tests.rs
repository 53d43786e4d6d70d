//! Integration tests for the power-rail sequencer: discovery caching,
//! voltage selection, and the settle-time wait.

#![cfg(feature = "camera-power-rail")]

mod common;

use common::{default_caps, open, open_with, RAIL_ADDRESS};
use std::time::Instant;
use tegra_gpio::consts::CAMERA_PORT;
use tegra_gpio::Error;

#[test]
fn missing_connectivity_fails_first_acquire_and_unwinds() {
    let (gpio, state) = open_with(default_caps(), |s| s.board_present = false);

    let err = gpio.acquire_pin(CAMERA_PORT, 0).unwrap_err();
    assert!(matches!(err, Error::ModuleNotPresent));

    let s = state.lock().unwrap();
    // Everything completed before the rail step was unwound.
    assert_eq!(s.clients_registered, 1);
    assert_eq!(s.clients_unregistered, 1);
    assert_eq!(s.clock_calls, vec![true, false]);
}

#[test]
fn rail_enable_uses_the_capability_requested_voltage() {
    let (gpio, state) = open_with(default_caps(), |s| s.rail_millivolts = 2850);

    let handle = gpio.acquire_pin(CAMERA_PORT, 2).unwrap();
    {
        let s = state.lock().unwrap();
        assert_eq!(s.rail_sets, vec![(RAIL_ADDRESS, Some(2850))]);
        assert_eq!(s.rail_queries, 1);
    }

    gpio.release_pins(&[handle]).unwrap();
    let s = state.lock().unwrap();
    assert_eq!(
        s.rail_sets,
        vec![(RAIL_ADDRESS, Some(2850)), (RAIL_ADDRESS, None)]
    );
    // Disable never needs the capability query.
    assert_eq!(s.rail_queries, 1);
}

#[test]
fn rail_enable_failure_unwinds_the_clock_and_voltage_steps() {
    let (gpio, state) = open_with(default_caps(), |s| s.fail_rail_enable = true);

    assert!(gpio.acquire_pin(CAMERA_PORT, 0).is_err());

    let s = state.lock().unwrap();
    assert_eq!(s.clients_registered, 1);
    assert_eq!(s.clients_unregistered, 1);
    assert_eq!(s.clock_calls, vec![true, false]);
    // The failed enable left no successful set to invert.
    assert!(s.rail_sets.iter().all(|(_, mv)| mv.is_none()) || s.rail_sets.is_empty());
}

#[test]
fn connectivity_is_discovered_once_per_context() {
    let (gpio, state) = open(default_caps());

    for pin in [0, 3] {
        let handle = gpio.acquire_pin(CAMERA_PORT, pin).unwrap();
        gpio.release_pins(&[handle]).unwrap();
    }

    // Two full power cycles, one board lookup: the descriptor is cached.
    assert_eq!(state.lock().unwrap().board_lookups, 1);
}

#[test]
fn settle_time_blocks_the_caller() {
    let (gpio, state) = open_with(default_caps(), |s| s.rail_settle_us = 5_000);

    let start = Instant::now();
    gpio.acquire_pin(CAMERA_PORT, 0).unwrap();
    let elapsed = start.elapsed();
    assert!(
        elapsed.as_micros() >= 5_000,
        "settle wait skipped: {elapsed:?}"
    );
    assert_eq!(state.lock().unwrap().rail_sets.len(), 1);
}

//! Integration tests for the tick pipeline: console → motion → sampling →
//! breathing, driven through mock ports with a 1 ms simulated clock.

use crate::mock_hw::{Harness, MockEeprom, quick_config};

use hydrobot::app::ports::Axis;
use hydrobot::config::SystemConfig;
use hydrobot::fsm::BreathingPhase;
use hydrobot::status::{PumpMode, StatusFlag, ValveState};

fn breathing_config() -> SystemConfig {
    SystemConfig {
        standby_full_ms: 20,
        standby_sampling_ms: 10,
        wait_empty_ms: 30,
        wait_full_ms: 40,
        ..quick_config()
    }
}

// ── Valve ─────────────────────────────────────────────────────

#[test]
fn boot_homes_valve_closed_and_reports_once() {
    let mut h = Harness::new(quick_config());
    assert_eq!(h.sink.take_lines(), ["ERR CAL"]);
    assert_eq!(h.app.status().valve, ValveState::Closing);
    assert_eq!(h.app.status().valve_position, -2);

    h.run(10);

    assert_eq!(h.app.status().valve, ValveState::Closed);
    assert_eq!(h.app.status().valve_position, 2);
    assert_eq!(h.rig.net_steps(Axis::Valve), 4);
    assert_eq!(h.sink.count("OK S0 DONE CLOSE"), 1);
    assert!(!h.rig.powered(Axis::Valve));
}

#[test]
fn valve_coil_released_on_completing_tick() {
    let mut h = Harness::new(quick_config());
    h.run(3);
    assert!(h.rig.powered(Axis::Valve));
    h.run(1);
    assert_eq!(h.app.status().valve, ValveState::Closed);
    assert!(!h.rig.powered(Axis::Valve));
}

#[test]
fn open_request_runs_to_completion_and_rejects_reversal() {
    let mut h = Harness::quick();

    assert_eq!(h.send("S0 ON"), ["OK S0 PENDING"]);
    assert_eq!(h.app.status().valve, ValveState::Opening);
    assert_eq!(h.app.status().valve_position, 1);

    assert_eq!(h.send("S0 OFF"), ["ERR BUSY"]);
    assert_eq!(h.app.status().valve, ValveState::Opening);

    h.run(2);
    assert_eq!(h.app.status().valve, ValveState::Opened);
    assert_eq!(h.app.status().valve_position, -2);
    assert_eq!(h.sink.take_lines(), ["OK S0 DONE OPEN"]);

    assert_eq!(h.send("s0 open"), ["OK S0 ALREADY OPEN"]);
    assert_eq!(h.send("S0 CLOSE"), ["OK S0 PENDING"]);
}

#[test]
fn valve_position_never_leaves_travel() {
    let mut h = Harness::quick();
    for cmd in ["S0 ON", "S0 OFF", "S0 ON", "S0 OFF"] {
        h.send(cmd);
        for _ in 0..6 {
            h.tick();
            let p = h.app.status().valve_position;
            assert!((-2..=2).contains(&p), "position {p} out of travel");
        }
    }
}

// ── Pump ──────────────────────────────────────────────────────

#[test]
fn pump_steps_every_tick_in_commanded_direction() {
    let mut h = Harness::quick();
    let before = h.rig.net_steps(Axis::Pump);
    assert_eq!(before, 0);

    assert_eq!(h.send("S1 ON"), ["OK S1 ON"]);
    h.run(9);
    assert_eq!(h.rig.net_steps(Axis::Pump), 10);
    assert!(h.rig.powered(Axis::Pump));

    assert_eq!(h.send("S1 REV"), ["OK S1 REV"]);
    h.run(4);
    assert_eq!(h.rig.net_steps(Axis::Pump), 5);

    assert_eq!(h.send("S1 OFF"), ["OK S1 OFF"]);
    let steps = h.rig.step_count(Axis::Pump);
    h.run(10);
    assert_eq!(h.rig.step_count(Axis::Pump), steps);
    assert!(!h.rig.powered(Axis::Pump));
    assert_eq!(h.app.status().pump, PumpMode::Off);
}

#[test]
fn bad_pump_argument_changes_nothing() {
    let mut h = Harness::quick();
    assert_eq!(h.send("S1 FAST"), ["ERR BAD_REQUEST"]);
    assert_eq!(h.send("S1"), ["ERR BAD_REQUEST"]);
    assert_eq!(h.app.status().pump, PumpMode::Off);
}

// ── Breathing cycle ───────────────────────────────────────────

#[test]
fn breathing_visits_phases_in_order_with_relays() {
    let mut h = Harness::new(breathing_config());

    h.run(9);
    assert_eq!(h.app.phase(), BreathingPhase::StandbySampling);
    assert!(!h.rig.fill && !h.rig.empty);

    h.run(1);
    assert_eq!(h.app.phase(), BreathingPhase::WaitEmpty);
    assert!(h.rig.empty && !h.rig.fill);

    h.run(30);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    assert!(h.rig.fill && !h.rig.empty);

    h.run(40);
    assert_eq!(h.app.phase(), BreathingPhase::StandbyFull);
    assert!(!h.rig.fill && !h.rig.empty);

    h.run(20);
    assert_eq!(h.app.phase(), BreathingPhase::StandbySampling);

    assert_eq!(
        h.sink.phases,
        [
            (BreathingPhase::StandbySampling, BreathingPhase::WaitEmpty),
            (BreathingPhase::WaitEmpty, BreathingPhase::WaitFull),
            (BreathingPhase::WaitFull, BreathingPhase::StandbyFull),
            (BreathingPhase::StandbyFull, BreathingPhase::StandbySampling),
        ]
    );
}

#[test]
fn breathing_can_be_parked_and_resumed() {
    let mut h = Harness::new(breathing_config());
    h.run(45);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    assert!(h.rig.fill);

    assert_eq!(h.send("S2 OFF"), ["OK S2 OFF"]);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    assert!(!h.rig.fill && !h.rig.empty);
    let bits = h.app.status().bits();
    assert_eq!(bits & StatusFlag::Breathing.mask(), 0);
    assert_ne!(bits & StatusFlag::WaitFull.mask(), 0);

    h.run(500);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    assert!(!h.rig.fill);

    // Resuming restarts the frozen phase's dwell from the S2 ON tick.
    assert_eq!(h.send("S2 ON"), ["OK S2 ON"]);
    assert!(h.rig.fill);
    h.run(39);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    h.run(1);
    assert_eq!(h.app.phase(), BreathingPhase::StandbyFull);
}

#[test]
fn parking_mid_drain_skips_no_phase_and_no_ph_sample() {
    let config = SystemConfig {
        standby_sampling_ms: 600,
        ..breathing_config()
    };
    let mut h = Harness::new(config);
    h.rig.ph_1 = 700;

    h.run(610);
    assert_eq!(h.app.phase(), BreathingPhase::WaitEmpty);
    assert_eq!(h.app.readings().ph_1.raw, 700);

    h.send("S2 OFF");
    h.rig.ph_1 = 333;
    h.run(5_000);
    assert_eq!(h.app.phase(), BreathingPhase::WaitEmpty);
    assert_eq!(h.app.readings().ph_1.raw, 700);

    h.send("S2 ON");
    h.run(30);
    assert_eq!(h.app.phase(), BreathingPhase::WaitFull);
    assert_eq!(h.app.readings().ph_1.raw, 700);
    assert_eq!(
        h.sink.phases,
        [
            (BreathingPhase::StandbySampling, BreathingPhase::WaitEmpty),
            (BreathingPhase::WaitEmpty, BreathingPhase::WaitFull),
        ]
    );
}

#[test]
fn dwell_survives_clock_wrap() {
    let start = u32::MAX - 4;
    let mut h = Harness::starting_at(breathing_config(), MockEeprom::blank(), start);

    h.run(9);
    assert_eq!(h.now, 4);
    assert_eq!(h.app.phase(), BreathingPhase::StandbySampling);
    h.run(1);
    assert_eq!(h.app.phase(), BreathingPhase::WaitEmpty);
}

// ── Sampling ──────────────────────────────────────────────────

#[test]
fn ph_is_only_sampled_in_standby_sampling() {
    let config = SystemConfig {
        standby_sampling_ms: 600,
        ..quick_config()
    };
    let mut h = Harness::new(config);
    h.rig.ph_1 = 1024;

    h.run(500);
    assert!(h.app.status().ph_connected);
    assert_eq!(h.app.readings().ph_1.raw, 1024);

    h.run(100);
    assert_eq!(h.app.phase(), BreathingPhase::WaitEmpty);

    h.rig.ph_1 = 2048;
    h.run(1000);
    assert_eq!(h.send("G0"), ["OK G0 TDS1 0 TDS2 0 PH1 1024"]);
}

#[test]
fn filtered_tds_converges_to_calibrated_value() {
    let mut h = Harness::quick();
    h.rig.tds_1 = 250;
    h.rig.tds_2 = 500;

    h.run(10_000);

    assert_eq!(h.app.readings().tds_2.value, 2000);
    assert!(h.app.status().tds_2_connected);

    let expected = StatusFlag::TdsConnected.mask()
        | StatusFlag::ValveClosed.mask()
        | StatusFlag::StandbySampling.mask()
        | StatusFlag::Breathing.mask();
    assert_eq!(
        h.send("G1"),
        [format!("OK G1 TDS1 1000 PH1 0.00 STATUS {expected}")]
    );
}

#[test]
fn second_tds_channel_stays_out_of_g1() {
    let mut h = Harness::quick();
    h.rig.tds_2 = 500;

    h.run(10_000);

    assert!(h.app.status().tds_2_connected);
    let expected = StatusFlag::ValveClosed.mask()
        | StatusFlag::StandbySampling.mask()
        | StatusFlag::Breathing.mask();
    assert_eq!(
        h.send("G1"),
        [format!("OK G1 TDS1 0 PH1 0.00 STATUS {expected}")]
    );
    assert_eq!(h.send("G0"), ["OK G0 TDS1 0 TDS2 500 PH1 0"]);
}

#[test]
fn temperature_waits_for_steppers_to_stop() {
    let mut h = Harness::quick();
    h.rig.temperature = Some(2150);

    h.send("S1 ON");
    h.run(5_000);
    assert_eq!(h.rig.temperature_requests, 0);

    h.send("S1 OFF");
    assert_eq!(h.rig.temperature_requests, 1);

    h.run(760);
    assert_eq!(h.rig.temperature_reads, 1);
    assert!(h.app.status().temperature_connected);

    let expected = StatusFlag::TemperatureConnected.mask()
        | StatusFlag::ValveClosed.mask()
        | StatusFlag::StandbySampling.mask()
        | StatusFlag::Breathing.mask();
    assert_eq!(
        h.send("G1"),
        [format!("OK G1 TDS1 0 PH1 0.00 T1 21.50 STATUS {expected}")]
    );
}

#[test]
fn conversion_in_flight_is_held_during_motion() {
    let mut h = Harness::quick();
    h.rig.temperature = Some(1900);

    h.run(2_000);
    assert_eq!(h.rig.temperature_requests, 1);

    // Pump starts before the conversion window closes.
    h.send("S1 ON");
    h.run(2_000);
    assert_eq!(h.rig.temperature_reads, 0);

    h.send("S1 OFF");
    assert_eq!(h.rig.temperature_reads, 1);
    assert_eq!(h.app.readings().temperature_centi_c, Some(1900));
}

#[test]
fn missing_probe_clears_flag_and_keeps_last_value() {
    let mut h = Harness::quick();

    h.run(3_000);
    assert_eq!(h.rig.temperature_reads, 1);
    assert!(!h.app.status().temperature_connected);
    let g1 = h.send("G1");
    assert!(!g1[0].contains(" T1 "), "{g1:?}");

    h.rig.temperature = Some(1875);
    h.run(2_000);
    assert!(h.app.status().temperature_connected);
    assert!(h.send("G1")[0].contains(" T1 18.75 "));

    h.rig.temperature = None;
    h.run(2_000);
    assert!(!h.app.status().temperature_connected);
    assert!(h.send("G1")[0].contains(" T1 18.75 "));
}

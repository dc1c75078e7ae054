//! Console protocol tests: line framing, verb parsing, replies and the
//! calibration record's persistence.

use crate::mock_hw::{Harness, MockEeprom, quick_config};

use hydrobot::settings::{Calibration, Probe, Settings};

const DEFAULT_ECHO: &str = "TDS1 500 2000 TDS2 500 2000 PH1 1024 1400";

// ── Calibration ───────────────────────────────────────────────

#[test]
fn calibration_update_is_echoed_and_persisted() {
    let mut h = Harness::quick();

    assert_eq!(
        h.send("M1 TDS1 100 200 PH1 1000 1500"),
        ["OK M1 TDS1 100 200 TDS2 500 2000 PH1 1000 1500"]
    );
    assert_eq!(
        h.send("M2"),
        ["OK M2 TDS1 100 200 TDS2 500 2000 PH1 1000 1500"]
    );

    let stored = Settings::load(&mut h.eeprom).unwrap();
    assert_eq!(stored.calibration(Probe::Tds1), Calibration::new(100, 200));
    assert_eq!(stored.calibration(Probe::Ph1), Calibration::new(1000, 1500));
    assert_eq!(stored, *h.app.settings());
}

#[test]
fn invalid_calibration_changes_nothing() {
    let mut h = Harness::quick();
    let writes = h.eeprom.writes;

    for line in [
        "M1",
        "M1 TDS1 0 200",
        "M1 TDS1 100",
        "M1 TDS1 abc 5",
        "M1 PH1 70000 1",
        "M1 TDS1 100 200 TDS3 1 1",
        "M1 TDS1 100 200 PH1 0 5",
    ] {
        assert_eq!(h.send(line), ["ERR BAD_REQUEST"], "{line}");
    }

    assert_eq!(*h.app.settings(), Settings::default());
    assert_eq!(h.eeprom.writes, writes);
}

#[test]
fn reset_restores_and_persists_defaults() {
    let mut h = Harness::quick();
    h.send("M1 TDS2 10 20");

    assert_eq!(h.send("m0"), ["OK M0"]);
    assert_eq!(h.send("M2"), [format!("OK M2 {DEFAULT_ECHO}")]);
    assert_eq!(Settings::load(&mut h.eeprom), Ok(Settings::default()));
}

#[test]
fn failed_write_reports_storage_error_but_keeps_update() {
    let mut h = Harness::quick();
    h.eeprom.fail_writes = true;

    assert_eq!(h.send("M1 TDS2 10 20"), ["ERR STORAGE"]);
    assert_eq!(
        h.send("M2"),
        ["OK M2 TDS1 500 2000 TDS2 10 20 PH1 1024 1400"]
    );
}

#[test]
fn calibration_applies_to_next_samples() {
    let mut h = Harness::quick();
    h.rig.tds_1 = 400;
    h.send("M1 TDS1 400 800");

    h.run(10_000);
    assert_eq!(h.app.readings().tds_1.value, 800);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn stored_settings_are_used_silently() {
    let mut eeprom = MockEeprom::blank();
    let mut stored = Settings::default();
    stored.set_calibration(Probe::Tds1, Calibration::new(321, 654));
    stored.save(&mut eeprom).unwrap();

    let mut h = Harness::with_eeprom(quick_config(), eeprom);
    assert!(h.sink.lines.is_empty());
    assert_eq!(
        h.send("M2"),
        ["OK M2 TDS1 321 654 TDS2 500 2000 PH1 1024 1400"]
    );
}

#[test]
fn corrupted_settings_report_cal_and_are_rebuilt() {
    let mut eeprom = MockEeprom::blank();
    Settings::default().save(&mut eeprom).unwrap();
    eeprom.bytes[0] ^= 0x55;

    let mut h = Harness::with_eeprom(quick_config(), eeprom);
    assert_eq!(h.sink.take_lines(), ["ERR CAL"]);
    assert_eq!(Settings::load(&mut h.eeprom), Ok(Settings::default()));
}

#[test]
fn unwritable_blank_storage_reports_both_errors() {
    let mut eeprom = MockEeprom::blank();
    eeprom.fail_writes = true;

    let mut h = Harness::with_eeprom(quick_config(), eeprom);
    assert_eq!(h.sink.take_lines(), ["ERR CAL", "ERR STORAGE"]);
    assert_eq!(*h.app.settings(), Settings::default());
}

// ── Framing & parsing ─────────────────────────────────────────

#[test]
fn unknown_and_empty_lines() {
    let mut h = Harness::quick();
    assert_eq!(h.send("HELLO world"), ["ERR UNKNOW HELLO world"]);
    assert_eq!(h.send(""), ["PROCESS ERROR EMPTY COMMAND"]);
    assert_eq!(h.send("   "), ["PROCESS ERROR EMPTY COMMAND"]);
}

#[test]
fn verbs_match_whole_tokens_case_insensitively() {
    let mut h = Harness::quick();
    assert_eq!(h.send("g0"), ["OK G0 TDS1 0 TDS2 0 PH1 0"]);
    assert_eq!(h.send("G01"), ["ERR UNKNOW G01"]);
    assert_eq!(h.send("S0ON"), ["ERR UNKNOW S0ON"]);
    assert_eq!(h.send("s1 rev"), ["OK S1 REV"]);
}

#[test]
fn carriage_returns_are_ignored() {
    let mut h = Harness::quick();
    assert_eq!(h.send("G0\r"), ["OK G0 TDS1 0 TDS2 0 PH1 0"]);
}

#[test]
fn non_ascii_bytes_are_replaced() {
    let mut h = Harness::quick();
    h.rig.rx.extend(b"X\xC3\xA9\n");
    h.tick();
    assert_eq!(h.sink.take_lines(), ["ERR UNKNOW X??"]);
}

#[test]
fn one_line_per_tick() {
    let mut h = Harness::quick();
    h.rig.rx.extend(b"S1 ON\nS1 OFF\n");

    h.tick();
    assert_eq!(h.sink.take_lines(), ["OK S1 ON"]);
    h.tick();
    assert_eq!(h.sink.take_lines(), ["OK S1 OFF"]);
    h.tick();
    assert!(h.sink.lines.is_empty());
}

#[test]
fn longest_line_fits() {
    let mut h = Harness::quick();
    let line = "Z".repeat(63);
    assert_eq!(h.send(&line), [format!("ERR UNKNOW {line}")]);
}

#[test]
fn overflow_is_reported_once_then_recovers() {
    let mut h = Harness::quick();
    h.rig.rx.extend([b'A'; 100]);
    h.rig.rx.extend(b"\nM2\n");

    h.run(3);
    assert_eq!(
        h.sink.take_lines(),
        ["ERR OVERFLOW".to_string(), format!("OK M2 {DEFAULT_ECHO}")]
    );
}

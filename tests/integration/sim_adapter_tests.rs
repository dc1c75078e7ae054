//! End-to-end run through the real adapters on their host simulation
//! backends: UART bytes in, GPIO levels and console text out.
//!
//! The simulation state is process-wide, so this file holds a single test.

use hydrobot::adapters::hardware::HardwareAdapter;
use hydrobot::adapters::nvs::NvsEeprom;
use hydrobot::adapters::serial_sink::SerialEventSink;
use hydrobot::app::ports::Axis;
use hydrobot::app::service::AppService;
use hydrobot::drivers::hw_init;
use hydrobot::pins;

use crate::mock_hw::quick_config;

#[test]
fn console_to_gpio_through_simulated_board() {
    hw_init::init_peripherals().unwrap();
    hw_init::sim_set_adc(pins::TDS_1_ADC_CHANNEL, 250);
    hw_init::sim_set_temperature(Some(2230));

    let mut hw = HardwareAdapter::new();
    let mut eeprom = NvsEeprom::new().unwrap();
    let mut out = Vec::new();
    let mut sink = SerialEventSink::new(&mut out);
    let mut app = AppService::new(quick_config());

    app.start(0, &mut eeprom, &mut sink);
    let mut now = 0;
    let mut run = |app: &mut AppService, hw: &mut HardwareAdapter, ms: u32| {
        for _ in 0..ms {
            now += 1;
            app.tick(now, hw, &mut eeprom, &mut sink);
        }
    };

    // Boot homing, then a pump run.
    run(&mut app, &mut hw, 4);
    assert!(!hw.is_powered(Axis::Valve));

    hw_init::sim_push_serial(b"S1 ON\r\n");
    run(&mut app, &mut hw, 1);
    assert!(hw.is_powered(Axis::Pump));
    assert!(!hw_init::gpio_read(pins::PUMP_EN_GPIO), "enable is active-low");
    assert!(hw_init::gpio_read(pins::PUMP_DIR_GPIO));

    hw_init::sim_push_serial(b"S1 OFF\n");
    run(&mut app, &mut hw, 5_000);
    assert!(hw_init::gpio_read(pins::PUMP_EN_GPIO));

    hw_init::sim_push_serial(b"G0\nG1\n");
    run(&mut app, &mut hw, 2);
    drop(run);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines[0], "ERR CAL");
    assert_eq!(lines[1], "OK S0 DONE CLOSE");
    assert_eq!(lines[2], "OK S1 ON");
    assert_eq!(lines[3], "OK S1 OFF");
    assert_eq!(lines[4], "OK G0 TDS1 250 TDS2 0 PH1 0");
    assert!(
        lines[5].starts_with("OK G1 TDS1 1000 PH1 0.00 T1 22.30 STATUS "),
        "{}",
        lines[5]
    );
    assert_eq!(lines.len(), 6);
}

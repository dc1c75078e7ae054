//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, ADC1 oneshot channels and the console UART
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! control loop starts.
//!
//! On the host every accessor is backed by process-wide simulation state
//! (`sim_*` functions) so the adapters can be driven end to end in tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "console UART init failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_onewire()?;
        init_adc()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::VALVE_STEP_GPIO,
        pins::VALVE_DIR_GPIO,
        pins::VALVE_EN_GPIO,
        pins::PUMP_STEP_GPIO,
        pins::PUMP_DIR_GPIO,
        pins::PUMP_EN_GPIO,
        pins::FILL_RELAY_GPIO,
        pins::EMPTY_RELAY_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    // Stepper enables are active-low: park both drivers de-energised.
    unsafe {
        gpio_set_level(pins::VALVE_EN_GPIO, 1);
        gpio_set_level(pins::PUMP_EN_GPIO, 1);
        gpio_set_level(pins::FILL_RELAY_GPIO, 0);
        gpio_set_level(pins::EMPTY_RELAY_GPIO, 0);
    }

    info!("hw_init: GPIO outputs configured (steppers, relays)");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_onewire() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ONEWIRE_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    // Released bus idles high.
    unsafe { gpio_set_level(pins::ONEWIRE_GPIO, 1) };
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::TDS_1_ADC_CHANNEL, pins::TDS_2_ADC_CHANNEL, pins::PH_1_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (CH0=TDS1, CH1=TDS2, CH2=PH1)");
    Ok(())
}

/// One-shot 12-bit read.  A failed conversion reads as 0, which the
/// samplers treat as a disconnected probe.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── Console UART ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const UART_RX_BUFFER: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::CONSOLE_BAUD,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let port = pins::CONSOLE_UART_PORT;

    let ret = unsafe { uart_driver_install(port, UART_RX_BUFFER, 0, 0, core::ptr::null_mut(), 0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    let ret = unsafe { uart_param_config(port, &cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    let ret = unsafe { uart_set_pin(port, pins::UART_TX_GPIO, pins::UART_RX_GPIO, -1, -1) };
    if ret != ESP_OK as i32 { return Err(HwInitError::UartInitFailed(ret)); }

    info!("hw_init: console UART{} at {} baud", port, pins::CONSOLE_BAUD);
    Ok(())
}

/// Non-blocking single-byte read from the console UART.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: driver installed in init_uart(); zero tick timeout never blocks.
    let n = unsafe {
        uart_read_bytes(
            pins::CONSOLE_UART_PORT,
            (&raw mut byte).cast(),
            1,
            0,
        )
    };
    (n == 1).then_some(byte)
}

/// Busy-wait for microsecond-scale bus timing.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM routine, no shared state.
    unsafe { esp_rom_delay_us(us) };
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, AtomicU16, AtomicU64, Ordering};

    /// Output levels, one bit per GPIO number.
    static GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
    static ADC: [AtomicU16; 4] = [const { AtomicU16::new(0) }; 4];
    static SERIAL_RX: Mutex<VecDeque<u8>> = Mutex::new(VecDeque::new());

    /// `i32::MIN` marks an absent probe.
    const NO_PROBE: i32 = i32::MIN;
    static TEMPERATURE: AtomicI32 = AtomicI32::new(NO_PROBE);

    pub fn gpio_write(pin: i32, high: bool) {
        let mask = 1u64 << pin;
        if high {
            GPIO_LEVELS.fetch_or(mask, Ordering::Relaxed);
        } else {
            GPIO_LEVELS.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    pub fn gpio_read(pin: i32) -> bool {
        GPIO_LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
    }

    pub fn adc1_read(channel: u32) -> u16 {
        ADC.get(channel as usize)
            .map_or(0, |a| a.load(Ordering::Relaxed))
    }

    pub fn set_adc(channel: u32, raw: u16) {
        if let Some(a) = ADC.get(channel as usize) {
            a.store(raw, Ordering::Relaxed);
        }
    }

    pub fn uart_read_byte() -> Option<u8> {
        SERIAL_RX.lock().ok()?.pop_front()
    }

    pub fn push_serial(bytes: &[u8]) {
        if let Ok(mut q) = SERIAL_RX.lock() {
            q.extend(bytes);
        }
    }

    pub fn temperature() -> Option<i32> {
        let t = TEMPERATURE.load(Ordering::Relaxed);
        (t != NO_PROBE).then_some(t)
    }

    pub fn set_temperature(centi_c: Option<i32>) {
        TEMPERATURE.store(centi_c.unwrap_or(NO_PROBE), Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{adc1_read, gpio_read, gpio_write, uart_read_byte};

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

/// Inject a raw ADC1 value (host simulation).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    sim::set_adc(channel, raw);
}

/// Queue bytes on the simulated console UART.
#[cfg(not(target_os = "espidf"))]
pub fn sim_push_serial(bytes: &[u8]) {
    sim::push_serial(bytes);
}

/// Set the simulated DS18B20 reading; `None` removes the probe.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature(centi_c: Option<i32>) {
    sim::set_temperature(centi_c);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_temperature() -> Option<i32> {
    sim::temperature()
}

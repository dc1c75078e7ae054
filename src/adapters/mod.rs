//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements    | Connects to                    |
//! |---------------|---------------|--------------------------------|
//! | `hardware`    | SensorPort    | ESP32 ADC1, DS18B20 one-wire   |
//! |               | ActuatorPort  | Stepper drivers, relays        |
//! |               | SerialPort    | Console UART                   |
//! | `nvs`         | SettingsPort  | NVS blob / in-memory EEPROM    |
//! | `serial_sink` | EventSink     | Console writer + logger        |
//! | `time`        | -             | ESP32 high-resolution timer    |

pub mod hardware;
pub mod nvs;
pub mod serial_sink;
pub mod time;

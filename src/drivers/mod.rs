//! Actuator and sensor drivers, hardware initialisation, and HAL glue.

pub mod ds18b20;
pub mod gpio;
pub mod hw_init;
pub mod relay;
pub mod stepper;

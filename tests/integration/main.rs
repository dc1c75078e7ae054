//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one slice of the
//! controller against mock ports. Everything runs on the host.

mod controller_tests;
mod mock_hw;
mod protocol_tests;
#[cfg(not(target_os = "espidf"))]
mod sim_adapter_tests;

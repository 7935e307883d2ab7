//! Sensor backends for the spoke sensor link.
//!
//! - `sim`: clock-driven simulated gauges, contacts and scale (default)
//! - `gpio`: Raspberry Pi input pins via `rppal` (`hardware` feature)
pub mod error;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

pub use error::HwError;
pub use sim::{
    GaugeTiming, LineEncoding, SimClockLine, SimDataLine, SimulatedContact, SimulatedGauge,
    SimulatedScale,
};

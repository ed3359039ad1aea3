// Allow unusual byte groupings for register bit masks which follow the datasheet
#![allow(clippy::unusual_byte_groupings)]

//! # lm75-thermal
//!
//! A Rust library for monitoring LM75B-class digital temperature sensors on a
//! register-addressed serial bus, with an event-driven thermal dispatch task
//! suitable for onboard/flight software stacks.
//!
//! Two layers, composed bottom-up:
//!
//! - **Register driver** ([`Lm75b`]): encodes the configuration register and
//!   decodes the 11-bit two's-complement temperature register (0.125 °C/LSB)
//!   over an abstract [`BusTransport`].
//! - **Thermal dispatch task** ([`ThermalManager`]): a bounded event queue
//!   with a single consumer task. Producers submit events without blocking;
//!   each event yields a fresh reading published as telemetry, and
//!   hardware-interrupt events are additionally classified against a
//!   hysteresis threshold.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lm75_thermal::{DeviceConfig, Event, Lm75b, Result, ThermalManager};
//! # use lm75_thermal::bus::{BusTransport, TransportError};
//! # struct MyBus;
//! # impl BusTransport for MyBus {
//! #     fn send(&mut self, _: u8, _: &[u8]) -> std::result::Result<(), TransportError> { Ok(()) }
//! #     fn receive(&mut self, _: u8, _: &mut [u8]) -> std::result::Result<(), TransportError> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = DeviceConfig::default();
//!
//!     // Write the configuration register, then hand the driver to the task.
//!     let mut sensor = Lm75b::new(MyBus);
//!     sensor.initialize(&config)?;
//!     let manager = ThermalManager::spawn(sensor, config);
//!
//!     // React to threshold crossings reported by the alert interrupt.
//!     let _alert = manager.on_over_temperature(|| println!("Over temperature!"));
//!
//!     // Wire the hardware alert line to the dispatch queue.
//!     let interrupt = manager.interrupt_handle();
//!     interrupt.raise();
//!
//!     // Request an on-demand reading (telemetry only, no classification).
//!     manager.submit(Event::MeasureCommand)?;
//!
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod protocol;
pub mod utils;

// Re-exports for convenience
pub use bus::{BusTransport, TransportError};
pub use config::{AlertMode, AlertPolarity, DeviceConfig, DeviceMode};
pub use dispatch::{
    CallbackHandle, Event, InterruptHandle, TemperatureReading, ThermalAlert, ThermalManager,
    QUEUE_DEPTH,
};
pub use driver::Lm75b;
pub use error::{Error, Result};
pub use protocol::RawTemperature;
pub use utils::{celsius_to_fahrenheit, fahrenheit_to_celsius};

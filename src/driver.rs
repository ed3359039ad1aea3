//! Sensor register driver.
//!
//! Translates between the abstract bus transport and the sensor's two
//! registers. The driver has no concurrency of its own and performs no
//! retries; transport failures propagate verbatim to the caller.

use tracing::debug;

use crate::bus::BusTransport;
use crate::config::{AlertMode, AlertPolarity, DeviceConfig, DeviceMode};
use crate::error::Result;
use crate::protocol::{encode_config_frame, RawTemperature, REG_TEMPERATURE};

/// Register driver for an LM75B-class temperature sensor.
pub struct Lm75b<B> {
    bus: B,
}

impl<B: BusTransport> Lm75b<B> {
    /// Create a driver on top of a bus transport.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Write the configuration register from a [`DeviceConfig`].
    ///
    /// The overtemperature and hysteresis trip-point registers are assumed
    /// to be programmed out of band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// if the fault queue size is not one of {1, 2, 4, 6}, or a transport
    /// error if the bus write fails.
    pub fn initialize(&mut self, config: &DeviceConfig) -> Result<()> {
        self.write_config(
            config.bus_address,
            config.fault_queue_size,
            config.alert_polarity,
            config.alert_mode,
            config.device_mode,
        )
    }

    /// Read and decode the temperature register.
    ///
    /// Issues a 1-byte register-select write followed by a 2-byte read.
    /// Either transport failure short-circuits; no retry is performed.
    pub fn read_temperature(&mut self, address: u8) -> Result<RawTemperature> {
        self.bus.send(address, &[REG_TEMPERATURE])?;

        let mut buffer = [0u8; 2];
        self.bus.receive(address, &mut buffer)?;

        let temperature = RawTemperature::from_register_bytes(buffer[0], buffer[1]);
        debug!(
            "Read temperature register {:02X?} -> {:.3} deg C",
            buffer,
            temperature.to_celsius()
        );

        Ok(temperature)
    }

    /// Build and write the 2-byte configuration frame.
    ///
    /// Validation happens before any bus traffic: an invalid fault queue
    /// size fails without touching the wire.
    pub fn write_config(
        &mut self,
        address: u8,
        fault_queue_size: u8,
        polarity: AlertPolarity,
        alert_mode: AlertMode,
        device_mode: DeviceMode,
    ) -> Result<()> {
        let frame = encode_config_frame(fault_queue_size, polarity, alert_mode, device_mode)?;

        debug!("Writing configuration frame {:02X?} to {:#04x}", frame, address);
        self.bus.send(address, &frame)?;

        Ok(())
    }

    /// Consume the driver and return the underlying bus transport.
    pub fn into_inner(self) -> B {
        self.bus
    }
}

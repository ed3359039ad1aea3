//! Configuration register frame construction.
//!
//! The configuration register is written as a 2-byte frame: the register
//! address followed by the packed value.
//!
//! Packed value layout:
//! - Bits 4:3 — overtemperature fault queue code
//! - Bit 2 — alert polarity (OS_POL)
//! - Bit 1 — alert operation mode (OS_COMP_INT)
//! - Bit 0 — device operation mode (SHUTDOWN)

use crate::config::{AlertMode, AlertPolarity, DeviceMode};
use crate::error::{Error, Result};

/// Temperature register address.
pub const REG_TEMPERATURE: u8 = 0x00;

/// Configuration register address.
pub const REG_CONFIGURATION: u8 = 0x01;

/// Map a fault queue depth to its 2-bit register code.
///
/// The sensor only supports depths of 1, 2, 4 and 6; anything else is
/// rejected before a single byte goes out on the bus.
pub fn fault_queue_code(fault_queue_size: u8) -> Result<u8> {
    match fault_queue_size {
        1 => Ok(0),
        2 => Ok(1),
        4 => Ok(2),
        6 => Ok(3),
        other => Err(Error::InvalidParameter {
            name: "fault_queue_size",
            value: other.to_string(),
        }),
    }
}

/// Build the 2-byte configuration write frame.
pub fn encode_config_frame(
    fault_queue_size: u8,
    polarity: AlertPolarity,
    alert_mode: AlertMode,
    device_mode: DeviceMode,
) -> Result<[u8; 2]> {
    let mut value = fault_queue_code(fault_queue_size)? << 3;
    value |= polarity.as_bit() << 2;
    value |= alert_mode.as_bit() << 1;
    value |= device_mode.as_bit();

    Ok([REG_CONFIGURATION, value])
}

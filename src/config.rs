//! Sensor device configuration.
//!
//! [`DeviceConfig`] is handed to [`crate::driver::Lm75b::initialize`] and to
//! [`crate::dispatch::ThermalManager::spawn`], which stores its own copy.
//! After startup the dispatch task treats the configuration as immutable.

/// Alert pin polarity (OS_POL bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlertPolarity {
    /// Alert pin is active-low (power-on default).
    #[default]
    ActiveLow = 0,
    /// Alert pin is active-high.
    ActiveHigh = 1,
}

impl AlertPolarity {
    /// Create from raw bit value.
    pub fn from_raw(value: u8) -> Self {
        match value & 0x01 {
            0 => Self::ActiveLow,
            _ => Self::ActiveHigh,
        }
    }

    /// Convert to raw bit value.
    pub fn as_bit(&self) -> u8 {
        *self as u8
    }
}

/// Alert operation mode (OS_COMP_INT bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlertMode {
    /// Comparator mode: the alert pin tracks the threshold comparator
    /// (power-on default).
    #[default]
    Comparator = 0,
    /// Interrupt mode: the alert pin latches until a register read clears it.
    Interrupt = 1,
}

impl AlertMode {
    /// Create from raw bit value.
    pub fn from_raw(value: u8) -> Self {
        match value & 0x01 {
            0 => Self::Comparator,
            _ => Self::Interrupt,
        }
    }

    /// Convert to raw bit value.
    pub fn as_bit(&self) -> u8 {
        *self as u8
    }
}

/// Device operation mode (SHUTDOWN bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DeviceMode {
    /// Normal continuous-conversion operation (power-on default).
    #[default]
    Normal = 0,
    /// Shutdown mode: conversions stop, bus interface stays live.
    Shutdown = 1,
}

impl DeviceMode {
    /// Create from raw bit value.
    pub fn from_raw(value: u8) -> Self {
        match value & 0x01 {
            0 => Self::Normal,
            _ => Self::Shutdown,
        }
    }

    /// Convert to raw bit value.
    pub fn as_bit(&self) -> u8 {
        *self as u8
    }
}

/// Configuration for one sensor and its thermal supervision.
///
/// The overtemperature and hysteresis trip-point registers are assumed to be
/// programmed out of band; `hysteresis_threshold_celsius` is the software
/// threshold the dispatch task classifies interrupt readings against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Bus address of the sensor.
    pub bus_address: u8,
    /// Overtemperature fault queue depth. Valid values: 1, 2, 4 or 6
    /// consecutive faults before the alert pin asserts.
    pub fault_queue_size: u8,
    /// Alert pin polarity.
    pub alert_polarity: AlertPolarity,
    /// Alert operation mode.
    pub alert_mode: AlertMode,
    /// Device operation mode.
    pub device_mode: DeviceMode,
    /// Software hysteresis threshold in degrees Celsius.
    pub hysteresis_threshold_celsius: f64,
}

impl Default for DeviceConfig {
    /// Sensor power-on defaults with a 75 °C hysteresis threshold.
    fn default() -> Self {
        Self {
            bus_address: 0x48,
            fault_queue_size: 1,
            alert_polarity: AlertPolarity::ActiveLow,
            alert_mode: AlertMode::Comparator,
            device_mode: DeviceMode::Normal,
            hysteresis_threshold_celsius: 75.0,
        }
    }
}

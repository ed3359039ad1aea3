//! Temperature register format.
//!
//! The sensor reports temperature as an 11-bit two's-complement fixed-point
//! value at 0.125 °C per LSB, left-justified across the two bytes of the
//! temperature register:
//!
//! `| D10 D9 D8 D7 D6 D5 D4 D3 | D2 D1 D0 x x x x x |`

use crate::utils::celsius_to_fahrenheit;

/// Raw temperature value from the sensor (11-bit two's complement).
///
/// The conversion formula is `temperature_celsius = raw * 0.125`, giving a
/// range of −128 °C to +127.875 °C with 0.125 °C resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTemperature(pub i16);

impl RawTemperature {
    /// Minimum representable raw value (−128 °C).
    pub const MIN_RAW: i16 = -1024;

    /// Maximum representable raw value (+127.875 °C).
    pub const MAX_RAW: i16 = 1023;

    /// Create a new RawTemperature, truncating to the 11-bit signed range.
    pub fn new(value: i16) -> Self {
        let mut raw = value & 0x7FF;
        if raw & 0x400 != 0 {
            raw -= 0x800;
        }
        Self(raw)
    }

    /// Decode from the two bytes of the temperature register.
    ///
    /// The 11 data bits are the top bits of the 16-bit register; the low
    /// 5 bits of `lo` are undefined and ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use lm75_thermal::protocol::RawTemperature;
    ///
    /// // 75.0 °C
    /// let temp = RawTemperature::from_register_bytes(0x4B, 0x00);
    /// assert_eq!(temp.to_celsius(), 75.0);
    ///
    /// // -25.0 °C
    /// let temp = RawTemperature::from_register_bytes(0xE7, 0x00);
    /// assert_eq!(temp.to_celsius(), -25.0);
    /// ```
    pub fn from_register_bytes(hi: u8, lo: u8) -> Self {
        let mut raw = (((hi as i16) << 3) & 0x7F8) | (((lo as i16) >> 5) & 0x07);

        // D10 set means negative; sign-extend the 11-bit value.
        if raw & (1 << 10) != 0 {
            raw |= !0x7FF;
        }

        Self(raw)
    }

    /// Encode into the two bytes of the temperature register.
    ///
    /// Inverse of [`from_register_bytes`](Self::from_register_bytes); the
    /// undefined low bits of the second byte are written as zero.
    pub fn to_register_bytes(&self) -> [u8; 2] {
        let raw = (self.0 & 0x7FF) as u16;
        [(raw >> 3) as u8, ((raw & 0x07) << 5) as u8]
    }

    /// Convert the raw value to degrees Celsius.
    pub fn to_celsius(&self) -> f64 {
        self.0 as f64 * 0.125
    }

    /// Convert the raw value to degrees Fahrenheit.
    pub fn to_fahrenheit(&self) -> f64 {
        celsius_to_fahrenheit(self.to_celsius())
    }

    /// Create a RawTemperature from a Celsius value.
    ///
    /// Rounds to the nearest representable 0.125 °C step and clamps to the
    /// sensor's range.
    pub fn from_celsius(celsius: f64) -> Self {
        let raw = (celsius * 8.0).round() as i32;
        Self(raw.clamp(Self::MIN_RAW as i32, Self::MAX_RAW as i32) as i16)
    }

    /// Get the raw 11-bit signed value.
    pub fn raw_value(&self) -> i16 {
        self.0
    }
}

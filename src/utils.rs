//! Utility functions for the lm75-thermal crate.

/// Convert Celsius to Fahrenheit.
///
/// # Example
///
/// ```
/// use lm75_thermal::celsius_to_fahrenheit;
///
/// let fahrenheit = celsius_to_fahrenheit(100.0);
/// assert!((fahrenheit - 212.0).abs() < 0.001);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius.
///
/// # Example
///
/// ```
/// use lm75_thermal::fahrenheit_to_celsius;
///
/// let celsius = fahrenheit_to_celsius(212.0);
/// assert!((celsius - 100.0).abs() < 0.001);
/// ```
#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(75.0) - 167.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(-40.0) - (-40.0)).abs() < 0.001);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert!((fahrenheit_to_celsius(32.0) - 0.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(167.0) - 75.0).abs() < 0.001);
    }

    #[test]
    fn test_temperature_roundtrip() {
        let original = 25.125;
        let converted = fahrenheit_to_celsius(celsius_to_fahrenheit(original));
        assert!((converted - original).abs() < 0.0001);
    }
}

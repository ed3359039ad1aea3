//! Protocol module for the sensor's register formats.
//!
//! This module contains the implementations for:
//! - Temperature register decoding/encoding
//! - Configuration register frame construction

pub mod config_register;
pub mod temperature;

pub use config_register::{encode_config_frame, REG_CONFIGURATION, REG_TEMPERATURE};
pub use temperature::RawTemperature;

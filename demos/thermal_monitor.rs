//! Thermal monitoring demo against a simulated sensor bus
//!
//! Run with: cargo run --example thermal_monitor

use std::time::Duration;

use lm75_thermal::bus::{BusTransport, TransportError};
use lm75_thermal::{
    celsius_to_fahrenheit, DeviceConfig, Event, Lm75b, RawTemperature, Result, ThermalManager,
};

/// Simulated sensor: temperature ramps up past the threshold and back down.
struct SimulatedBus {
    step: u32,
}

impl BusTransport for SimulatedBus {
    fn send(&mut self, _address: u8, _bytes: &[u8]) -> std::result::Result<(), TransportError> {
        Ok(())
    }

    fn receive(
        &mut self,
        _address: u8,
        buffer: &mut [u8],
    ) -> std::result::Result<(), TransportError> {
        // Triangle wave between 60 °C and 90 °C.
        let phase = (self.step % 24) as f64;
        let celsius = if phase < 12.0 {
            60.0 + phase * 2.5
        } else {
            90.0 - (phase - 12.0) * 2.5
        };
        self.step += 1;

        let bytes = RawTemperature::from_celsius(celsius).to_register_bytes();
        buffer.copy_from_slice(&bytes);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (minimal)
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Thermal Monitor");
    println!("===============\n");

    let config = DeviceConfig {
        hysteresis_threshold_celsius: 75.0,
        ..DeviceConfig::default()
    };

    let mut sensor = Lm75b::new(SimulatedBus { step: 0 });
    sensor.initialize(&config)?;

    let manager = ThermalManager::spawn(sensor, config);

    let _telemetry = manager.on_telemetry(|reading| {
        println!(
            "Telemetry [{:?}]: {:.3} deg C ({:.1} deg F)",
            reading.source,
            reading.celsius,
            celsius_to_fahrenheit(reading.celsius)
        );
    });
    let _over = manager.on_over_temperature(|| println!("  -> Over temperature detected!"));
    let _safe = manager.on_safe_operating(|| println!("  -> Safe operating conditions"));

    // The simulated alert line fires periodically; on-demand measurements
    // are interleaved to show that they skip threshold classification.
    let interrupt = manager.interrupt_handle();

    for i in 0..24 {
        if i % 3 == 0 {
            manager.submit(Event::MeasureCommand)?;
        } else {
            interrupt.raise();
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    manager.shutdown().await;
    println!("\nDone.");
    Ok(())
}

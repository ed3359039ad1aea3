//! Integration tests for the thermal dispatch task.
//!
//! These drive a [`ThermalManager`] against in-memory bus transports: a
//! scripted bus whose reads follow a fixed sequence, and a blocking bus
//! that parks the consumer so queue backpressure can be observed.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::timeout;

use lm75_thermal::bus::{BusTransport, TransportError};
use lm75_thermal::{
    DeviceConfig, Error, Event, Lm75b, RawTemperature, ThermalAlert, ThermalManager, QUEUE_DEPTH,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

type ScriptedRead = Result<[u8; 2], TransportError>;

/// Bus whose temperature reads follow a fixed script; the last entry
/// repeats once the script is exhausted.
struct ScriptedBus {
    reads: VecDeque<ScriptedRead>,
    last: ScriptedRead,
}

impl ScriptedBus {
    fn new(reads: Vec<ScriptedRead>) -> Self {
        let last = reads
            .last()
            .cloned()
            .unwrap_or_else(|| reading(0.0));
        Self {
            reads: reads.into(),
            last,
        }
    }
}

/// Script entry for a successful read of `celsius`.
fn reading(celsius: f64) -> ScriptedRead {
    let [hi, lo] = RawTemperature::from_celsius(celsius).to_register_bytes();
    Ok([hi, lo])
}

impl BusTransport for ScriptedBus {
    fn send(&mut self, _address: u8, _bytes: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn receive(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), TransportError> {
        let next = self.reads.pop_front().unwrap_or_else(|| self.last.clone());
        let bytes = next?;
        buffer.copy_from_slice(&bytes);
        Ok(())
    }
}

fn test_config(threshold: f64) -> DeviceConfig {
    DeviceConfig {
        hysteresis_threshold_celsius: threshold,
        ..DeviceConfig::default()
    }
}

fn spawn_with_script(
    threshold: f64,
    reads: Vec<ScriptedRead>,
) -> ThermalManager {
    ThermalManager::spawn(Lm75b::new(ScriptedBus::new(reads)), test_config(threshold))
}

#[tokio::test]
async fn interrupt_events_classify_but_measure_commands_do_not() {
    let manager = spawn_with_script(75.0, vec![reading(80.0), reading(80.0), reading(70.0)]);
    let mut telemetry = manager.subscribe_telemetry();
    let mut alerts = manager.subscribe_alerts();

    // Same over-threshold reading for a command and an interrupt, then a
    // safe reading for a second interrupt.
    manager.submit(Event::MeasureCommand).unwrap();
    manager.submit(Event::HardwareInterrupt).unwrap();
    manager.submit(Event::HardwareInterrupt).unwrap();

    // Telemetry is published for every event, regardless of source.
    let first = timeout(RECV_TIMEOUT, telemetry.recv()).await.unwrap().unwrap();
    assert_eq!(first.source, Event::MeasureCommand);
    assert_eq!(first.celsius, 80.0);

    let second = timeout(RECV_TIMEOUT, telemetry.recv()).await.unwrap().unwrap();
    assert_eq!(second.source, Event::HardwareInterrupt);
    assert_eq!(second.celsius, 80.0);

    let third = timeout(RECV_TIMEOUT, telemetry.recv()).await.unwrap().unwrap();
    assert_eq!(third.source, Event::HardwareInterrupt);
    assert_eq!(third.celsius, 70.0);

    // Only the interrupts were classified: had the over-threshold command
    // been evaluated too, an extra OverTemperature would precede these.
    let alert = timeout(RECV_TIMEOUT, alerts.recv()).await.unwrap().unwrap();
    assert_eq!(alert, ThermalAlert::OverTemperature);
    let alert = timeout(RECV_TIMEOUT, alerts.recv()).await.unwrap().unwrap();
    assert_eq!(alert, ThermalAlert::SafeOperating);

    manager.shutdown().await;
}

#[tokio::test]
async fn classification_is_strictly_greater_than_threshold() {
    // A reading exactly at the threshold is still safe operating.
    let manager = spawn_with_script(75.0, vec![reading(75.0)]);
    let mut alerts = manager.subscribe_alerts();

    manager.submit(Event::HardwareInterrupt).unwrap();

    let alert = timeout(RECV_TIMEOUT, alerts.recv()).await.unwrap().unwrap();
    assert_eq!(alert, ThermalAlert::SafeOperating);

    manager.shutdown().await;
}

#[tokio::test]
async fn repeated_interrupts_reclassify_every_time() {
    // No latched alert state: three interrupts above threshold publish
    // three OverTemperature classifications.
    let manager = spawn_with_script(75.0, vec![reading(90.0)]);
    let mut alerts = manager.subscribe_alerts();

    for _ in 0..3 {
        manager.submit(Event::HardwareInterrupt).unwrap();
    }

    for _ in 0..3 {
        let alert = timeout(RECV_TIMEOUT, alerts.recv()).await.unwrap().unwrap();
        assert_eq!(alert, ThermalAlert::OverTemperature);
    }

    manager.shutdown().await;
}

#[tokio::test]
async fn transport_failure_is_isolated_to_its_event() {
    let manager = spawn_with_script(75.0, vec![Err(TransportError::Timeout), reading(25.0)]);
    let mut telemetry = manager.subscribe_telemetry();
    let mut alerts = manager.subscribe_alerts();

    manager.submit(Event::HardwareInterrupt).unwrap();
    manager.submit(Event::HardwareInterrupt).unwrap();

    // The failed first read produced nothing; the second event went
    // through untouched.
    let only = timeout(RECV_TIMEOUT, telemetry.recv()).await.unwrap().unwrap();
    assert_eq!(only.celsius, 25.0);

    let alert = timeout(RECV_TIMEOUT, alerts.recv()).await.unwrap().unwrap();
    assert_eq!(alert, ThermalAlert::SafeOperating);

    manager.shutdown().await;
}

#[tokio::test]
async fn submit_after_shutdown_reports_invalid_state() {
    let manager = spawn_with_script(75.0, vec![reading(25.0)]);
    assert!(manager.is_running());

    manager.shutdown().await;
    assert!(!manager.is_running());

    let err = manager.submit(Event::MeasureCommand).unwrap_err();
    assert!(matches!(err, Error::InvalidState));

    // Shutdown is idempotent.
    manager.shutdown().await;
}

/// Bus that parks the consumer task inside its first register-select write
/// until the test releases it, and tells the test when the consumer
/// entered the bus.
struct BlockingBus {
    entered_tx: std::sync::mpsc::Sender<()>,
    release_rx: std::sync::mpsc::Receiver<()>,
}

impl BusTransport for BlockingBus {
    fn send(&mut self, _address: u8, _bytes: &[u8]) -> Result<(), TransportError> {
        let _ = self.entered_tx.send(());
        // Unblocks with an error (and proceeds) once the test drops its
        // sender, so teardown cannot deadlock.
        let _ = self.release_rx.recv();
        Ok(())
    }

    fn receive(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), TransportError> {
        let [hi, lo] = RawTemperature::from_celsius(25.0).to_register_bytes();
        buffer.copy_from_slice(&[hi, lo]);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn eleventh_pending_event_is_rejected_without_blocking() {
    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let bus = BlockingBus {
        entered_tx,
        release_rx,
    };
    let manager = ThermalManager::spawn(Lm75b::new(bus), test_config(75.0));

    // Park the consumer inside a bus transaction so the queue stays full.
    manager.submit(Event::MeasureCommand).unwrap();
    entered_rx
        .recv_timeout(RECV_TIMEOUT)
        .expect("consumer never reached the bus");

    // The queue is now empty and the consumer is busy: exactly QUEUE_DEPTH
    // submissions fit.
    for i in 0..QUEUE_DEPTH {
        manager
            .submit(Event::MeasureCommand)
            .unwrap_or_else(|e| panic!("submit {} should fit: {}", i + 1, e));
    }

    let err = manager.submit(Event::MeasureCommand).unwrap_err();
    assert!(matches!(err, Error::QueueFull));

    // The interrupt path drops its event silently under the same pressure.
    let interrupt = manager.interrupt_handle();
    interrupt.raise();

    drop(release_tx);
    manager.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn over_temperature_callback_fires_on_interrupt() {
    let manager = spawn_with_script(75.0, vec![reading(90.0)]);

    let (fired_tx, fired_rx) = std::sync::mpsc::channel();
    let handle = manager.on_over_temperature(move || {
        let _ = fired_tx.send(());
    });

    let interrupt = manager.interrupt_handle();
    interrupt.raise();

    fired_rx
        .recv_timeout(RECV_TIMEOUT)
        .expect("over-temperature callback never fired");

    handle.unregister();
    manager.shutdown().await;
}

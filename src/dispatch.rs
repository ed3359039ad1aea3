//! Thermal dispatch task.
//!
//! This module owns the bounded event queue and the single consumer task
//! that drains it. Producers (the hardware alert interrupt adapter and any
//! caller wanting an on-demand reading) enqueue events without ever
//! blocking; the consumer acquires a reading through the driver for each
//! event, publishes it as telemetry and, for interrupt-sourced events only,
//! classifies it against the hysteresis threshold.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::bus::BusTransport;
use crate::config::DeviceConfig;
use crate::driver::Lm75b;
use crate::error::{Error, Result};

/// Capacity of the event queue. Hard contract: the 11th pending event is
/// rejected with [`Error::QueueFull`], never queued and never waited for.
pub const QUEUE_DEPTH: usize = 10;

/// Event consumed by the thermal dispatch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Event {
    /// On-demand measurement request. Publishes telemetry only; never
    /// evaluated against the hysteresis threshold.
    MeasureCommand = 0,
    /// Hardware alert interrupt. Publishes telemetry and classifies the
    /// reading against the hysteresis threshold.
    HardwareInterrupt = 1,
}

impl Event {
    /// Create from a raw tag byte, as delivered by command uplinks or
    /// interrupt vector tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQueueMessage`] for an unknown tag.
    pub fn from_raw(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::MeasureCommand),
            1 => Ok(Self::HardwareInterrupt),
            tag => Err(Error::InvalidQueueMessage { tag }),
        }
    }

    /// Convert to the raw tag byte.
    pub fn as_raw(&self) -> u8 {
        *self as u8
    }
}

/// Temperature reading published on the telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureReading {
    /// Temperature in degrees Celsius.
    pub celsius: f64,
    /// The event that triggered this reading.
    pub source: Event,
}

/// Threshold classification published on the alert channel.
///
/// A per-evaluation classification, not a latched mode: consecutive
/// interrupts above the threshold publish `OverTemperature` every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThermalAlert {
    /// The reading was strictly above the hysteresis threshold.
    OverTemperature,
    /// The reading was at or below the hysteresis threshold.
    SafeOperating,
}

/// Callback handle for unregistering callbacks.
pub struct CallbackHandle {
    id: u64,
    unregister_fn: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl CallbackHandle {
    /// Create a new callback handle.
    pub(crate) fn new(id: u64, unregister_fn: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            unregister_fn: Some(Box::new(unregister_fn)),
        }
    }

    /// Unregister this callback.
    pub fn unregister(mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }

    /// Get the callback ID.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }
}

/// Producer handle for the hardware alert interrupt context.
///
/// Capability-restricted: only the zero-wait submit path is reachable from
/// it, so the interrupt context can never suspend, and failures are logged
/// rather than propagated (an interrupt cannot fail loudly).
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    event_tx: mpsc::Sender<Event>,
}

impl InterruptHandle {
    /// Signal a hardware alert condition.
    pub fn raise(&self) {
        if let Err(e) = try_submit(&self.event_tx, Event::HardwareInterrupt) {
            warn!("Dropping hardware interrupt event: {}", e);
        }
    }
}

/// Zero-wait enqueue shared by all producer paths.
fn try_submit(event_tx: &mpsc::Sender<Event>, event: Event) -> Result<()> {
    match event_tx.try_send(event) {
        Ok(()) => Ok(()),
        Err(mpsc::error::TrySendError::Full(_)) => Err(Error::QueueFull),
        Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::InvalidState),
    }
}

/// Thermal dispatch task manager.
///
/// Owns the event queue and the long-lived consumer task. The sensor
/// driver moves into the task at startup together with a private copy of
/// the configuration; later mutation of the caller's config has no effect.
pub struct ThermalManager {
    /// Private copy of the device configuration.
    config: DeviceConfig,
    /// Producer side of the event queue.
    event_tx: mpsc::Sender<Event>,
    /// Telemetry channel.
    telemetry_tx: broadcast::Sender<TemperatureReading>,
    /// Alert channel.
    alert_tx: broadcast::Sender<ThermalAlert>,
    /// Consumer task handle.
    task_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
    /// Running flag.
    is_running: Arc<AtomicBool>,
    /// Callback ID counter.
    callback_counter: AtomicU64,
}

impl ThermalManager {
    /// Spawn the dispatch task.
    ///
    /// Creates the depth-[`QUEUE_DEPTH`] event queue, copies the
    /// configuration and moves the sensor driver into the consumer task.
    /// Call [`Lm75b::initialize`] before handing the driver over if the
    /// configuration register needs to be written.
    pub fn spawn<B>(sensor: Lm75b<B>, config: DeviceConfig) -> Self
    where
        B: BusTransport + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(QUEUE_DEPTH);
        let (telemetry_tx, _) = broadcast::channel(64);
        let (alert_tx, _) = broadcast::channel(16);
        let is_running = Arc::new(AtomicBool::new(true));

        let handle = tokio::spawn(Self::dispatch_loop(
            sensor,
            config,
            event_rx,
            telemetry_tx.clone(),
            alert_tx.clone(),
            is_running.clone(),
        ));

        Self {
            config,
            event_tx,
            telemetry_tx,
            alert_tx,
            task_handle: RwLock::new(Some(handle)),
            is_running,
            callback_counter: AtomicU64::new(0),
        }
    }

    /// Submit an event for processing.
    ///
    /// Attempts a zero-wait enqueue and never blocks the caller.
    ///
    /// # Errors
    ///
    /// [`Error::QueueFull`] if [`QUEUE_DEPTH`] events are already pending
    /// (recoverable; retry or drop), [`Error::InvalidState`] if the
    /// dispatch task is no longer running.
    pub fn submit(&self, event: Event) -> Result<()> {
        try_submit(&self.event_tx, event)
    }

    /// Get a producer handle for the hardware alert interrupt context.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// The configuration the dispatch task operates with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Subscribe to temperature telemetry.
    pub fn subscribe_telemetry(&self) -> broadcast::Receiver<TemperatureReading> {
        self.telemetry_tx.subscribe()
    }

    /// Subscribe to threshold classifications.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<ThermalAlert> {
        self.alert_tx.subscribe()
    }

    /// Register a callback for every published temperature reading.
    pub fn on_telemetry<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(TemperatureReading) + Send + Sync + 'static,
    {
        let callback_id = self.callback_counter.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.telemetry_tx.subscribe();

        let handle = tokio::spawn(async move {
            while let Ok(reading) = rx.recv().await {
                callback(reading);
            }
        });

        CallbackHandle::new(callback_id, move || {
            handle.abort();
        })
    }

    /// Register a callback for over-temperature classifications.
    pub fn on_over_temperature<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_alert(move |alert| {
            if alert == ThermalAlert::OverTemperature {
                callback();
            }
        })
    }

    /// Register a callback for safe-operating classifications.
    pub fn on_safe_operating<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_alert(move |alert| {
            if alert == ThermalAlert::SafeOperating {
                callback();
            }
        })
    }

    fn on_alert<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(ThermalAlert) + Send + Sync + 'static,
    {
        let callback_id = self.callback_counter.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.alert_tx.subscribe();

        let handle = tokio::spawn(async move {
            while let Ok(alert) = rx.recv().await {
                callback(alert);
            }
        });

        CallbackHandle::new(callback_id, move || {
            handle.abort();
        })
    }

    /// Check if the dispatch task is running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Stop the dispatch task and wait for it to finish.
    ///
    /// Idempotent; pending events are discarded.
    pub async fn shutdown(&self) {
        let handle = self.task_handle.write().take();
        if let Some(handle) = handle {
            info!("Shutting down thermal dispatch task");
            handle.abort();
            let _ = handle.await;
        }
        self.is_running.store(false, Ordering::SeqCst);
    }

    /// The consumer loop. Sole caller of the driver; runs until the queue
    /// closes or the task is aborted.
    async fn dispatch_loop<B: BusTransport>(
        mut sensor: Lm75b<B>,
        config: DeviceConfig,
        mut event_rx: mpsc::Receiver<Event>,
        telemetry_tx: broadcast::Sender<TemperatureReading>,
        alert_tx: broadcast::Sender<ThermalAlert>,
        is_running: Arc<AtomicBool>,
    ) {
        info!(
            "Thermal dispatch task started (sensor {:#04x}, queue depth {})",
            config.bus_address, QUEUE_DEPTH
        );

        loop {
            // The only suspension point: wait indefinitely for the next event.
            let event = match event_rx.recv().await {
                Some(event) => event,
                None => {
                    // A closed queue can never yield again, so exiting is the
                    // process-teardown path rather than a per-event failure.
                    warn!("{}", Error::FailedQueueOperation);
                    break;
                }
            };

            let raw = match sensor.read_temperature(config.bus_address) {
                Ok(raw) => raw,
                Err(e) => {
                    // Measurement failure is non-fatal; move on to the next event.
                    warn!("Temperature measurement failed: {}", e);
                    continue;
                }
            };

            let celsius = raw.to_celsius();
            let _ = telemetry_tx.send(TemperatureReading {
                celsius,
                source: event,
            });

            // Only hardware interrupts model the sensor's alert comparator;
            // on-demand commands are passive polling and skip classification.
            if event == Event::HardwareInterrupt {
                let alert = if celsius > config.hysteresis_threshold_celsius {
                    ThermalAlert::OverTemperature
                } else {
                    ThermalAlert::SafeOperating
                };
                debug!(
                    "Interrupt reading {:.3} deg C vs threshold {:.3} deg C: {:?}",
                    celsius, config.hysteresis_threshold_celsius, alert
                );
                let _ = alert_tx.send(alert);
            }
        }

        is_running.store(false, Ordering::SeqCst);
        debug!("Thermal dispatch task ended");
    }
}

impl Drop for ThermalManager {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.task_handle.write().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_roundtrip() {
        assert_eq!(Event::from_raw(0).unwrap(), Event::MeasureCommand);
        assert_eq!(Event::from_raw(1).unwrap(), Event::HardwareInterrupt);
        assert_eq!(Event::MeasureCommand.as_raw(), 0);
        assert_eq!(Event::HardwareInterrupt.as_raw(), 1);
    }

    #[test]
    fn test_event_unknown_tag_rejected() {
        let err = Event::from_raw(0x7F).unwrap_err();
        assert!(matches!(err, Error::InvalidQueueMessage { tag: 0x7F }));
    }

    #[test]
    fn test_queue_depth_contract() {
        assert_eq!(QUEUE_DEPTH, 10);
    }
}

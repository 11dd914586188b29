//! Simulated radio driver
//!
//! An in-process broadcast bus standing in for the shared radio
//! medium. Every [`SimDriver`] attached to one [`SimBus`] hears every
//! frame sent while its scan window is open, exactly like passive
//! advertisement pickup. This is the default driver whenever a real
//! radio is not obtainable, not only in test builds.

use aidmesh_locate::RssiSample;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::debug;

use crate::driver::{DutyCycle, RadioDriver, ScanMode, ADVERTISED_NAME_PREFIX};
use crate::rssi::RssiRing;

/// One transmission on the simulated medium
#[derive(Debug, Clone)]
pub struct BusFrame {
    /// Advertised device name of the sender
    pub from: String,
    /// Point-to-point target device name, `None` for broadcast
    pub target: Option<String>,
    pub bytes: Vec<u8>,
    /// Signal strength a receiver observes for this frame
    pub rssi: i32,
}

/// Shared simulated medium
#[derive(Debug, Clone)]
pub struct SimBus {
    tx: broadcast::Sender<BusFrame>,
}

impl SimBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        SimBus { tx }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated radio driver
pub struct SimDriver {
    device_name: String,
    bus: SimBus,
    mode: Arc<Mutex<ScanMode>>,
    duty_override: Option<DutyCycle>,
    ring: Arc<Mutex<RssiRing>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
    stop: Mutex<Option<watch::Sender<bool>>>,
}

impl SimDriver {
    /// Attach a driver to a bus. `device_id` is suffixed onto the
    /// application's advertising name prefix.
    pub fn new(bus: &SimBus, device_id: &str) -> Self {
        Self::build(bus, device_id, None)
    }

    /// Attach with a fixed duty cycle instead of the mode-derived one.
    pub fn with_duty(bus: &SimBus, device_id: &str, duty: DutyCycle) -> Self {
        Self::build(bus, device_id, Some(duty))
    }

    fn build(bus: &SimBus, device_id: &str, duty_override: Option<DutyCycle>) -> Self {
        SimDriver {
            device_name: format!("{ADVERTISED_NAME_PREFIX}{device_id}"),
            bus: bus.clone(),
            mode: Arc::new(Mutex::new(ScanMode::Normal)),
            duty_override,
            ring: Arc::new(Mutex::new(RssiRing::default())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            stop: Mutex::new(None),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn deliver(
    device_name: &str,
    frame: BusFrame,
    ring: &Arc<Mutex<RssiRing>>,
    subscribers: &Arc<Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
) {
    if frame.from == device_name {
        return;
    }
    // advertising signature check: ignore devices running other apps
    if !frame.from.starts_with(ADVERTISED_NAME_PREFIX) {
        return;
    }

    lock(ring).push(RssiSample {
        device_id: frame.from.clone(),
        lat: None,
        lon: None,
        rssi: frame.rssi,
        ts: now_ms(),
    });

    let addressed_to_us = match frame.target.as_deref() {
        Some(t) => t == device_name,
        None => true,
    };
    if addressed_to_us {
        lock(subscribers).retain(|tx| tx.send(frame.bytes.clone()).is_ok());
    }
}

async fn run_discovery(
    device_name: String,
    bus_tx: broadcast::Sender<BusFrame>,
    mode: Arc<Mutex<ScanMode>>,
    duty_override: Option<DutyCycle>,
    ring: Arc<Mutex<RssiRing>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        // mode is re-read per cycle so a switch applies on the next
        // window without tearing down the driver
        let cycle = duty_override.unwrap_or_else(|| DutyCycle::for_mode(*lock(&mode)));

        let mut rx = bus_tx.subscribe();
        let window = tokio::time::sleep(cycle.scan);
        tokio::pin!(window);
        loop {
            tokio::select! {
                _ = &mut window => break,
                res = stop.changed() => {
                    if res.is_err() || *stop.borrow() {
                        return;
                    }
                }
                frame = rx.recv() => match frame {
                    Ok(f) => deliver(&device_name, f, &ring, &subscribers),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(missed = n, "sim scan lagged behind bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
            }
        }

        // radio off between windows: frames sent now are simply missed
        drop(rx);
        tokio::select! {
            _ = tokio::time::sleep(cycle.idle) => {}
            res = stop.changed() => {
                if res.is_err() || *stop.borrow() {
                    return;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl RadioDriver for SimDriver {
    async fn start_discovery(&self) {
        let mut stop_slot = lock(&self.stop);
        if stop_slot.is_some() {
            return;
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        *stop_slot = Some(stop_tx);

        tokio::spawn(run_discovery(
            self.device_name.clone(),
            self.bus.tx.clone(),
            Arc::clone(&self.mode),
            self.duty_override,
            Arc::clone(&self.ring),
            Arc::clone(&self.subscribers),
            stop_rx,
        ));
        debug!(device = %self.device_name, "sim discovery started");
    }

    async fn stop_discovery(&self) {
        if let Some(stop_tx) = lock(&self.stop).take() {
            let _ = stop_tx.send(true);
            debug!(device = %self.device_name, "sim discovery stopped");
        }
    }

    async fn send(&self, bytes: Vec<u8>, target: Option<String>) -> bool {
        let frame = BusFrame {
            from: self.device_name.clone(),
            target,
            bytes,
            rssi: -40 - rand::thread_rng().gen_range(0..50),
        };
        match self.bus.tx.send(frame) {
            Ok(_) => true,
            Err(_) => {
                debug!(device = %self.device_name, "send with nobody listening");
                false
            }
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    fn set_mode(&self, mode: ScanMode) {
        *lock(&self.mode) = mode;
    }

    fn rssi_samples(&self) -> Vec<RssiSample> {
        lock(&self.ring).snapshot()
    }
}

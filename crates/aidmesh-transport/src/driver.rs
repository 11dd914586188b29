//! Radio transport abstraction
//!
//! The driver owns the radio (or its simulated stand-in) and exposes
//! duty-cycled discovery plus a broadcast/point-to-point send
//! primitive. It is independent of message semantics: payloads are
//! opaque bytes.
//!
//! Failure posture: a driver never raises to its caller. Whether the
//! radio is off, permission-denied, or simply unheard, everything
//! degrades to a `false` send result or an empty sample set, observed
//! (or not) by upper layers through delivered messages and RSSI
//! samples.

use aidmesh_locate::RssiSample;
use std::time::Duration;
use tokio::sync::mpsc;

/// Device-name prefix that marks a peer as running this application.
/// Frames from peers advertising other names are ignored during scans.
pub const ADVERTISED_NAME_PREFIX: &str = "aidmesh-";

/// Discovery intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Battery-conserving background operation
    Normal,
    /// Active emergency: longer scan windows, shorter idle gaps
    Emergency,
}

/// Scan/idle pattern for one discovery cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    pub scan: Duration,
    pub idle: Duration,
}

impl DutyCycle {
    /// Cycle parameters for a mode: 3 s scan / 7 s idle normally,
    /// 6 s / 4 s in emergency mode.
    pub fn for_mode(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Normal => DutyCycle {
                scan: Duration::from_secs(3),
                idle: Duration::from_secs(7),
            },
            ScanMode::Emergency => DutyCycle {
                scan: Duration::from_secs(6),
                idle: Duration::from_secs(4),
            },
        }
    }
}

/// Radio transport driver
///
/// Implementations must make `send` and `start_discovery` safe to call
/// unconditionally: when the radio is unavailable they become no-ops,
/// never errors. `send` reports whether the payload was handed to the
/// radio (`false` lets the outbound queue schedule a retry); it must be
/// non-blocking from the caller's perspective either way.
#[async_trait::async_trait]
pub trait RadioDriver: Send + Sync {
    /// Begin duty-cycled discovery. Idempotent.
    async fn start_discovery(&self);

    /// Stop discovery and cancel the pending window timer.
    async fn stop_discovery(&self);

    /// Transmit `bytes`, point-to-point when `target` names a peer,
    /// otherwise as a broadcast advertisement for passive pickup.
    async fn send(&self, bytes: Vec<u8>, target: Option<String>) -> bool;

    /// Register for raw inbound payloads.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<u8>>;

    /// Switch discovery intensity; takes effect on the next cycle
    /// without tearing down the driver.
    fn set_mode(&self, mode: ScanMode);

    /// Recent signal observations, oldest first.
    fn rssi_samples(&self) -> Vec<RssiSample>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_cycles() {
        let normal = DutyCycle::for_mode(ScanMode::Normal);
        assert_eq!(normal.scan, Duration::from_secs(3));
        assert_eq!(normal.idle, Duration::from_secs(7));

        let emergency = DutyCycle::for_mode(ScanMode::Emergency);
        assert_eq!(emergency.scan, Duration::from_secs(6));
        assert_eq!(emergency.idle, Duration::from_secs(4));

        // emergency spends more of the cycle listening
        assert!(emergency.scan > normal.scan);
        assert!(emergency.idle < normal.idle);
    }
}

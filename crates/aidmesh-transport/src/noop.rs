//! Driver used when no radio hardware is present at all.

use aidmesh_locate::RssiSample;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::driver::{RadioDriver, ScanMode};

/// A radio that hears nothing and reaches nobody. Every send fails,
/// which keeps outbound traffic parked in the retry queue until a
/// real driver comes up.
#[derive(Debug, Default)]
pub struct NoopDriver {
    // held open so subscribers wait forever instead of seeing EOF
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>,
}

#[async_trait::async_trait]
impl RadioDriver for NoopDriver {
    async fn start_discovery(&self) {}

    async fn stop_discovery(&self) {}

    async fn send(&self, _bytes: Vec<u8>, _target: Option<String>) -> bool {
        false
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    fn set_mode(&self, _mode: ScanMode) {}

    fn rssi_samples(&self) -> Vec<RssiSample> {
        Vec::new()
    }
}

//! Signal-strength samples
//!
//! Produced by the transport driver during discovery windows, consumed
//! by the centroid computation within a short recency window. Samples
//! are ephemeral; nothing here persists.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default recency window for localization input (30 s)
pub const DEFAULT_MAX_AGE_MS: u64 = 30_000;

/// One RSSI observation of a nearby device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSample {
    /// Observed device id
    pub device_id: String,

    /// Reported latitude, when the device advertised one
    pub lat: Option<f64>,

    /// Reported longitude, when the device advertised one
    pub lon: Option<f64>,

    /// Received signal strength (dBm, typically -30 to -100)
    pub rssi: i32,

    /// Observation time (unix ms)
    pub ts: u64,
}

/// Drop samples older than `max_age_ms` relative to `now_ms`.
pub fn filter_recent(samples: &[RssiSample], now_ms: u64, max_age_ms: u64) -> Vec<RssiSample> {
    samples
        .iter()
        .filter(|s| now_ms.saturating_sub(s.ts) <= max_age_ms)
        .cloned()
        .collect()
}

/// Group samples by originating device.
pub fn group_by_device(samples: &[RssiSample]) -> HashMap<String, Vec<RssiSample>> {
    let mut groups: HashMap<String, Vec<RssiSample>> = HashMap::new();
    for s in samples {
        groups.entry(s.device_id.clone()).or_default().push(s.clone());
    }
    groups
}

/// Keep only the `n` strongest samples (highest RSSI).
///
/// Cheap approximate input selection for tight compute/battery budgets.
pub fn strongest(samples: &[RssiSample], n: usize) -> Vec<RssiSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    sorted.truncate(n);
    sorted
}

//! Bounded RSSI sample ring
//!
//! Discovery windows append one sample per sighting; the ring caps
//! memory on long-running low-power devices by evicting oldest first.

use aidmesh_locate::RssiSample;
use std::collections::VecDeque;

/// Default ring capacity
pub const DEFAULT_RSSI_CAP: usize = 200;

/// Fixed-capacity ring of recent signal observations
#[derive(Debug)]
pub struct RssiRing {
    buf: VecDeque<RssiSample>,
    cap: usize,
}

impl RssiRing {
    pub fn new(cap: usize) -> Self {
        RssiRing {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, sample: RssiSample) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
    }

    /// Copy out the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<RssiSample> {
        self.buf.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for RssiRing {
    fn default() -> Self {
        Self::new(DEFAULT_RSSI_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(device: &str, ts: u64) -> RssiSample {
        RssiSample {
            device_id: device.into(),
            lat: None,
            lon: None,
            rssi: -60,
            ts,
        }
    }

    #[test]
    fn test_eviction_oldest_first() {
        let mut ring = RssiRing::new(3);
        for i in 0..5 {
            ring.push(sample(&format!("d{i}"), i));
        }
        assert_eq!(ring.len(), 3);
        let snap = ring.snapshot();
        assert_eq!(snap[0].device_id, "d2");
        assert_eq!(snap[2].device_id, "d4");
    }

    #[test]
    fn test_default_cap() {
        let mut ring = RssiRing::default();
        for i in 0..500 {
            ring.push(sample("d", i));
        }
        assert_eq!(ring.len(), DEFAULT_RSSI_CAP);
    }
}

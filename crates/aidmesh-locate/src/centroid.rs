//! RSSI-weighted centroid localization
//!
//! Collaborative search-and-rescue triangulation: nearby devices report
//! their own fixes, the RSSI at which we hear them is a rough distance
//! proxy, and the weighted centroid of those reports estimates where we
//! (or a heard beacon) sit. Confidence grows with sample count, weight
//! evenness and spatial tightness; it is a hint for rescuers, never
//! ground truth.

use serde::{Deserialize, Serialize};

use crate::sample::RssiSample;

/// Default smoothing factor for temporal fusion
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Axis-aligned bounding box over sample coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Larger of height and width, in degrees
    pub fn spread(&self) -> f64 {
        let height = self.max_lat - self.min_lat;
        let width = self.max_lon - self.min_lon;
        height.max(width)
    }
}

/// A derived position estimate; recomputed on demand, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub lat: f64,
    pub lon: f64,
    /// In [0, 1]
    pub confidence: f64,
    pub samples_used: usize,
    pub bbox: Option<BoundingBox>,
}

/// Compute the RSSI-weighted centroid of a batch of samples.
///
/// Samples without coordinates contribute nothing and are skipped.
/// Zero usable samples yield confidence 0 at (0, 0); a single sample is
/// returned as-is at the fixed low confidence 0.1.
pub fn compute_weighted_centroid(samples: &[RssiSample]) -> LocationEstimate {
    let positioned: Vec<(&RssiSample, f64, f64)> = samples
        .iter()
        .filter_map(|s| match (s.lat, s.lon) {
            (Some(lat), Some(lon)) => Some((s, lat, lon)),
            _ => None,
        })
        .collect();

    match positioned.len() {
        0 => LocationEstimate {
            lat: 0.0,
            lon: 0.0,
            confidence: 0.0,
            samples_used: 0,
            bbox: None,
        },
        1 => {
            let (_, lat, lon) = positioned[0];
            LocationEstimate {
                lat,
                lon,
                confidence: 0.1,
                samples_used: 1,
                bbox: None,
            }
        }
        n => {
            let raw: Vec<f64> = positioned
                .iter()
                .map(|(s, _, _)| (s.rssi as f64 / 10.0).exp())
                .collect();
            let total: f64 = raw.iter().sum();

            let bbox = bounding_box(&positioned);

            if total == 0.0 {
                // Degenerate weights: plain arithmetic mean
                let lat = positioned.iter().map(|(_, lat, _)| lat).sum::<f64>() / n as f64;
                let lon = positioned.iter().map(|(_, _, lon)| lon).sum::<f64>() / n as f64;
                return LocationEstimate {
                    lat,
                    lon,
                    confidence: 0.3,
                    samples_used: n,
                    bbox: Some(bbox),
                };
            }

            let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
            let lat = positioned
                .iter()
                .zip(&weights)
                .map(|((_, lat, _), w)| lat * w)
                .sum();
            let lon = positioned
                .iter()
                .zip(&weights)
                .map(|((_, _, lon), w)| lon * w)
                .sum();

            let uniform = 1.0 / n as f64;
            let weight_variance =
                weights.iter().map(|w| (w - uniform).powi(2)).sum::<f64>() / n as f64;

            let spread = bbox.spread();
            let confidence = (0.2
                + (n as f64 / 10.0) * 0.3
                + (1.0 - weight_variance) * 0.2
                + (1.0 - (spread * 1000.0).min(1.0)) * 0.3)
                .clamp(0.1, 0.9);

            LocationEstimate {
                lat,
                lon,
                confidence,
                samples_used: n,
                bbox: Some(bbox),
            }
        }
    }
}

/// Temporal fusion of successive centroid estimates.
///
/// Exponential smoothing over latitude and longitude independently.
/// The fused confidence is bounded above by the best single estimate
/// and discounted when the inputs disagree.
pub fn combine_estimates(estimates: &[LocationEstimate], alpha: f64) -> Option<LocationEstimate> {
    match estimates.len() {
        0 => None,
        1 => Some(estimates[0].clone()),
        n => {
            let mut lat = estimates[0].lat;
            let mut lon = estimates[0].lon;
            for next in &estimates[1..] {
                lat = alpha * lat + (1.0 - alpha) * next.lat;
                lon = alpha * lon + (1.0 - alpha) * next.lon;
            }

            let max_conf = estimates
                .iter()
                .map(|e| e.confidence)
                .fold(f64::MIN, f64::max);
            let mean_conf =
                estimates.iter().map(|e| e.confidence).sum::<f64>() / n as f64;

            Some(LocationEstimate {
                lat,
                lon,
                confidence: max_conf.min(1.1 * mean_conf),
                samples_used: estimates.iter().map(|e| e.samples_used).sum(),
                bbox: None,
            })
        }
    }
}

fn bounding_box(positioned: &[(&RssiSample, f64, f64)]) -> BoundingBox {
    let mut bbox = BoundingBox {
        min_lat: f64::MAX,
        max_lat: f64::MIN,
        min_lon: f64::MAX,
        max_lon: f64::MIN,
    };
    for (_, lat, lon) in positioned {
        bbox.min_lat = bbox.min_lat.min(*lat);
        bbox.max_lat = bbox.max_lat.max(*lat);
        bbox.min_lon = bbox.min_lon.min(*lon);
        bbox.max_lon = bbox.max_lon.max(*lon);
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(device: &str, lat: f64, lon: f64, rssi: i32) -> RssiSample {
        RssiSample {
            device_id: device.into(),
            lat: Some(lat),
            lon: Some(lon),
            rssi,
            ts: 0,
        }
    }

    #[test]
    fn test_empty_input() {
        let est = compute_weighted_centroid(&[]);
        assert_eq!(est.confidence, 0.0);
        assert_eq!(est.lat, 0.0);
        assert_eq!(est.lon, 0.0);
        assert_eq!(est.samples_used, 0);
    }

    #[test]
    fn test_single_sample() {
        let est = compute_weighted_centroid(&[at("a", 41.0, 29.0, -55)]);
        assert_eq!(est.confidence, 0.1);
        assert_eq!(est.lat, 41.0);
        assert_eq!(est.lon, 29.0);
        assert_eq!(est.samples_used, 1);
    }

    #[test]
    fn test_unpositioned_samples_skipped() {
        let blind = RssiSample {
            device_id: "x".into(),
            lat: None,
            lon: None,
            rssi: -40,
            ts: 0,
        };
        let est = compute_weighted_centroid(&[blind.clone()]);
        assert_eq!(est.samples_used, 0);

        let est = compute_weighted_centroid(&[blind, at("a", 41.0, 29.0, -55)]);
        assert_eq!(est.samples_used, 1);
        assert_eq!(est.lat, 41.0);
    }

    #[test]
    fn test_stronger_sample_pulls_centroid() {
        let est = compute_weighted_centroid(&[
            at("near", 41.0, 29.0, -40),
            at("far", 42.0, 30.0, -90),
        ]);
        // -40 dBm outweighs -90 dBm by e^5; centroid sits near the strong one
        assert!(est.lat < 41.01);
        assert!(est.lon < 29.01);
        assert_eq!(est.samples_used, 2);
    }

    #[test]
    fn test_tight_even_cluster_beats_sparse_uneven() {
        let tight: Vec<RssiSample> = (0..6)
            .map(|i| at(&format!("d{i}"), 41.0001 + i as f64 * 1e-5, 29.0001, -60))
            .collect();
        let sparse = vec![at("a", 41.0, 29.0, -30), at("b", 42.0, 30.0, -95)];

        let tight_est = compute_weighted_centroid(&tight);
        let sparse_est = compute_weighted_centroid(&sparse);
        assert!(tight_est.confidence > sparse_est.confidence);
    }

    #[test]
    fn test_confidence_bounds() {
        let many: Vec<RssiSample> = (0..40)
            .map(|i| at(&format!("d{i}"), 41.0, 29.0, -60))
            .collect();
        let est = compute_weighted_centroid(&many);
        assert!(est.confidence <= 0.9);
        assert!(est.confidence >= 0.1);
    }

    #[test]
    fn test_combine_empty_and_identity() {
        assert!(combine_estimates(&[], DEFAULT_ALPHA).is_none());

        let one = compute_weighted_centroid(&[at("a", 41.0, 29.0, -55)]);
        let combined = combine_estimates(std::slice::from_ref(&one), DEFAULT_ALPHA).unwrap();
        assert_eq!(combined, one);
    }

    #[test]
    fn test_combine_smooths_and_sums() {
        let a = LocationEstimate {
            lat: 41.0,
            lon: 29.0,
            confidence: 0.5,
            samples_used: 3,
            bbox: None,
        };
        let b = LocationEstimate {
            lat: 41.1,
            lon: 29.1,
            confidence: 0.7,
            samples_used: 4,
            bbox: None,
        };
        let fused = combine_estimates(&[a, b], DEFAULT_ALPHA).unwrap();

        assert!((fused.lat - (0.7 * 41.0 + 0.3 * 41.1)).abs() < 1e-9);
        assert!((fused.lon - (0.7 * 29.0 + 0.3 * 29.1)).abs() < 1e-9);
        assert_eq!(fused.samples_used, 7);
        // bounded above by best individual, discounted by disagreement
        assert!((fused.confidence - f64::min(0.7, 1.1 * 0.6)).abs() < 1e-9);
    }
}

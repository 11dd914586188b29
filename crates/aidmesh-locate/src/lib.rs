//! AidMesh collaborative localization
//!
//! Pure functions turning batches of signal-strength observations into
//! position/confidence estimates for search-and-rescue triangulation,
//! plus temporal fusion across successive estimates. No state beyond
//! call arguments.

pub mod centroid;
pub mod sample;

pub use centroid::{
    combine_estimates, compute_weighted_centroid, BoundingBox, LocationEstimate, DEFAULT_ALPHA,
};
pub use sample::{filter_recent, group_by_device, strongest, RssiSample, DEFAULT_MAX_AGE_MS};

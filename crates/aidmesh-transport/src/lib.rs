//! Radio transport layer
//!
//! Abstracts the physical radio behind the [`RadioDriver`] trait so
//! the relay engine stays independent of any particular hardware. The
//! crate ships a simulated driver backed by an in-process bus and a
//! no-op driver for radio-less hosts; a duty-cycled scan loop and
//! signal-strength bookkeeping are shared by both.

pub mod driver;
pub mod noop;
pub mod rssi;
pub mod sim;

pub use driver::{DutyCycle, RadioDriver, ScanMode, ADVERTISED_NAME_PREFIX};
pub use noop::NoopDriver;
pub use rssi::{RssiRing, DEFAULT_RSSI_CAP};
pub use sim::{BusFrame, SimBus, SimDriver};

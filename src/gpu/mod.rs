//! Compute device selection

mod device;

pub use device::{default_dtype, select_device};

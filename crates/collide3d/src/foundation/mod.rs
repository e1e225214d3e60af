//! Foundation utilities shared by every other module
//!
//! Math type aliases over nalgebra and logging initialization.

pub mod logging;
pub mod math;

//! Configuration and parameters
//!
//! Default constants and cloth construction settings.

pub mod cloth_params;
pub mod constants;

pub use cloth_params::*;
pub use constants::*;

// src/solver/mod.rs
pub mod assembly;
pub mod factor;
pub mod stepper;

// Re-export from the solver module
pub use assembly::*;
pub use factor::*;
pub use stepper::*;

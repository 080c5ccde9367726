// Default construction parameters for the cloth
use bevy::math::DVec2;

use crate::math::Real;

// Grid
pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;
pub const DEFAULT_CELL_SPACING: Real = 1.0;

// Springs and integration
pub const DEFAULT_STIFFNESS: Real = 10.0;
pub const DEFAULT_TIMESTEP: Real = 0.016;
pub const DEFAULT_PARTICLE_MASS: Real = 1.0;

// Fixed screen coordinates for particles 0 and width-1
pub const DEFAULT_ANCHORS: [DVec2; 2] = [DVec2::new(250.0, 150.0), DVec2::new(250.0, 250.0)];

pub mod cloth;
pub mod particle;
pub mod spring;
pub mod topology;

pub use cloth::Cloth;
pub use particle::Particle;
pub use spring::Spring;
pub use topology::{Topology, expected_spring_count};

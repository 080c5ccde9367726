//! Mass-spring cloth advanced by a prefactored projective-dynamics solver.
//!
//! Setup builds the grid topology, assembles the sparse mass, Laplacian and
//! coupling operators, and factorizes `M + dt^2 L` once. Each tick then runs a
//! global step (per-spring target directions) and a local step (one sparse
//! solve) through [`Cloth::advance`].

use bevy::ecs::error::Result as SystemResult;
use bevy::prelude::*;

pub mod config;
pub mod core;
pub mod error;
pub mod math;
pub mod solver;

// Public re-exports for clean API
pub use config::{ClothParams, InitialLayout};
pub use crate::core::{Cloth, Particle, Spring, Topology};
pub use error::{ClothError, ClothResult};
pub use math::{Real, Vector};

/// Advances the [`Cloth`] resource once per fixed tick. The app inserts the
/// cloth itself so that construction errors stay with the caller.
pub struct ClothPlugin;

/// Optional force applied to every particle on each tick (gravity, wind).
#[derive(Resource, Clone, Copy, Debug)]
pub struct UniformForce(pub Vector);

impl Plugin for ClothPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            advance_cloth.run_if(resource_exists::<Cloth>),
        );
    }
}

fn advance_cloth(mut cloth: ResMut<Cloth>, force: Option<Res<UniformForce>>) -> SystemResult {
    match force {
        Some(force) => cloth.advance_with_force(force.0)?,
        None => cloth.advance()?,
    }
    Ok(())
}

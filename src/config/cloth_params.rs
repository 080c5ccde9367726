use bevy::prelude::*;

use crate::error::{ClothError, ClothResult};
use crate::math::{Real, Vector, zero_vector};

use super::constants::*;

/// Where particles start before the first tick.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialLayout {
    /// Column `c`, row `r` placed at `origin + (c * spacing, -r * spacing)`.
    Grid { origin: Vector },
    /// Every particle at the origin.
    Zeroed,
    /// One position per particle, row-major.
    Explicit(Vec<Vector>),
}

impl Default for InitialLayout {
    fn default() -> Self {
        Self::Grid {
            origin: zero_vector(),
        }
    }
}

/// Construction parameters for a [`Cloth`](crate::Cloth)
#[derive(Resource, Clone, Debug)]
pub struct ClothParams {
    /// Particles per row
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Rest length of every structural spring
    pub cell_spacing: Real,
    pub stiffness: Real,
    pub timestep: Real,
    pub particle_mass: Real,

    /// Fraction of the previous tick's velocity dropped in the inertial
    /// prediction (0.0 keeps `2 * pos - last_pos`)
    pub damping: Real,

    /// Fixed positions of particles 0 and width - 1
    pub anchors: [Vector; 2],
    pub layout: InitialLayout,
}

impl Default for ClothParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_spacing: DEFAULT_CELL_SPACING,
            stiffness: DEFAULT_STIFFNESS,
            timestep: DEFAULT_TIMESTEP,
            particle_mass: DEFAULT_PARTICLE_MASS,
            damping: 0.0,
            anchors: DEFAULT_ANCHORS,
            layout: InitialLayout::default(),
        }
    }
}

impl ClothParams {
    pub fn new(width: usize, height: usize, cell_spacing: Real, stiffness: Real, timestep: Real) -> Self {
        Self {
            width,
            height,
            cell_spacing,
            stiffness,
            timestep,
            ..Self::default()
        }
    }

    pub fn with_particle_mass(mut self, mass: Real) -> Self {
        self.particle_mass = mass;
        self
    }

    pub fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_anchors(mut self, first: Vector, last: Vector) -> Self {
        self.anchors = [first, last];
        self
    }

    pub fn with_layout(mut self, layout: InitialLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_grid_origin(self, origin: Vector) -> Self {
        self.with_layout(InitialLayout::Grid { origin })
    }

    pub fn with_initial_positions(self, positions: Vec<Vector>) -> Self {
        self.with_layout(InitialLayout::Explicit(positions))
    }

    /// Move both anchors onto the layout's own positions for particles 0 and
    /// `width - 1`, so a grid layout starts without any stretched spring.
    pub fn with_anchors_on_layout(mut self) -> Self {
        let last = self.width.saturating_sub(1);
        if let (Some(first), Some(second)) = (self.layout_position(0), self.layout_position(last)) {
            self.anchors = [first, second];
        }
        self
    }

    pub fn particle_count(&self) -> usize {
        self.width * self.height
    }

    /// Initial position of particle `index` before anchors are applied.
    pub fn layout_position(&self, index: usize) -> Option<Vector> {
        if index >= self.particle_count() {
            return None;
        }
        match &self.layout {
            InitialLayout::Grid { origin } => {
                let column = (index % self.width) as Real;
                let row = (index / self.width) as Real;
                Some(*origin + Vector::new(column, -row) * self.cell_spacing)
            }
            InitialLayout::Zeroed => Some(zero_vector()),
            InitialLayout::Explicit(positions) => positions.get(index).copied(),
        }
    }

    /// Check everything that can be rejected before any matrix work starts.
    pub fn validate(&self) -> ClothResult<()> {
        if self.width < 2 || self.height < 1 {
            return Err(ClothError::InvalidTopology {
                width: self.width,
                height: self.height,
            });
        }

        positive("cell_spacing", self.cell_spacing)?;
        positive("stiffness", self.stiffness)?;
        positive("timestep", self.timestep)?;
        positive("particle_mass", self.particle_mass)?;

        if !(0.0..1.0).contains(&self.damping) {
            return Err(ClothError::InvalidParameter {
                name: "damping",
                value: self.damping,
            });
        }

        for anchor in self.anchors {
            if !anchor.is_finite() {
                return Err(ClothError::InvalidParameter {
                    name: "anchors",
                    value: if anchor.x.is_finite() { anchor.y } else { anchor.x },
                });
            }
        }

        if let InitialLayout::Explicit(positions) = &self.layout {
            if positions.len() != self.particle_count() {
                return Err(ClothError::LayoutMismatch {
                    expected: self.particle_count(),
                    actual: positions.len(),
                });
            }
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: Real) -> ClothResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ClothError::InvalidParameter { name, value })
    }
}
